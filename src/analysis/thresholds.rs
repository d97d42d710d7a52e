use crate::errors::{EngineError, EngineResult};
use crate::stats::StatKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-statistic gates an over/under line must pass to become an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatThresholds {
    pub over_min: f64,
    pub under_min: f64,
    pub confidence_min: f64,
    /// Lines below this value are ignored.
    #[serde(default)]
    pub line_min: f64,
}

impl StatThresholds {
    pub const fn new(over_min: f64, under_min: f64, confidence_min: f64) -> Self {
        Self {
            over_min,
            under_min,
            confidence_min,
            line_min: 0.0,
        }
    }
}

/// Filtering knobs for a scan. Pure data; check with [`AnalysisConfig::validate`]
/// before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Lines whose favoured side reaches this probability are skipped.
    pub probability_cutoff: f64,
    /// Minimum |over - under|.
    pub min_edge: f64,
    /// Statistics missing from the map are not analysed.
    pub stat_thresholds: BTreeMap<StatKey, StatThresholds>,
    pub show_over: bool,
    pub show_under: bool,
}

impl Default for AnalysisConfig {
    /// Relaxed preset: surfaces more candidates.
    fn default() -> Self {
        Self {
            probability_cutoff: 0.98,
            min_edge: 0.15,
            stat_thresholds: StatKey::ALL
                .iter()
                .map(|&k| (k, StatThresholds::new(0.55, 0.55, 0.65)))
                .collect(),
            show_over: true,
            show_under: true,
        }
    }
}

impl AnalysisConfig {
    /// Strict preset: higher per-stat gates and a wider edge.
    pub fn strict() -> Self {
        let stat_thresholds = StatKey::ALL
            .iter()
            .map(|&k| {
                let over_min = match k {
                    StatKey::Goals | StatKey::YellowCards => 0.60,
                    _ => 0.65,
                };
                (k, StatThresholds::new(over_min, 0.65, 0.70))
            })
            .collect();

        Self {
            min_edge: 0.30,
            stat_thresholds,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_probability("probability_cutoff", self.probability_cutoff)?;
        check_probability("min_edge", self.min_edge)?;

        for (key, t) in &self.stat_thresholds {
            check_probability(&format!("{key}.over_min"), t.over_min)?;
            check_probability(&format!("{key}.under_min"), t.under_min)?;
            check_probability(&format!("{key}.confidence_min"), t.confidence_min)?;
            if !(t.line_min.is_finite() && t.line_min >= 0.0) {
                return Err(EngineError::Config(format!(
                    "{key}.line_min must be a non-negative number, got {}",
                    t.line_min
                )));
            }
        }

        Ok(())
    }

    #[inline]
    pub fn thresholds(&self, key: StatKey) -> Option<&StatThresholds> {
        self.stat_thresholds.get(&key)
    }
}

fn check_probability(name: &str, v: f64) -> EngineResult<()> {
    if (0.0..=1.0).contains(&v) {
        Ok(())
    } else {
        Err(EngineError::Config(format!("{name} must be within [0, 1], got {v}")))
    }
}
