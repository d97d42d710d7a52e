use crate::models::stability::{confidence, confidence_label};
use crate::models::ConfidenceLabel;
use crate::stats::{PerStat, SideFilter, StatKey, StatMetric, TeamStatistics};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionValue {
    pub value: f64,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
}

impl PredictionValue {
    fn new(value: f64, cv: f64, sample_size: u32) -> Self {
        let c = confidence(cv, sample_size);
        Self {
            value: round1(value),
            confidence: c,
            confidence_label: confidence_label(c),
        }
    }
}

/// Home, away and total expectation for one statistic.
/// `total.value == home.value + away.value` at one-decimal precision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionStat {
    pub home: PredictionValue,
    pub away: PredictionValue,
    pub total: PredictionValue,
}

pub type MatchPredictions = PerStat<PredictionStat>;

/// The home-advantage multipliers double count when both samples are already
/// side-conditioned (home team on home games, away team on away games).
#[inline]
pub fn should_apply_home_advantage(home_side: Option<SideFilter>, away_side: Option<SideFilter>) -> bool {
    !matches!((home_side, away_side), (Some(SideFilter::Home), Some(SideFilter::Away)))
}

/// Expected values for every statistic of a fixture.
///
/// Split statistics blend attack with the opponent's defence:
///   lambda_home = (home.made + away.conceded) / 2
///   lambda_away = (away.made + home.conceded) / 2
/// Single-valued statistics use each team's mean directly.
///
/// Home/away factors multiply the side values before they are summed.
/// Confidence always comes from the unadjusted CVs.
pub fn compute_predictions(
    home: &TeamStatistics,
    away: &TeamStatistics,
    sample_size: u32,
    home_side: Option<SideFilter>,
    away_side: Option<SideFilter>,
) -> MatchPredictions {
    let adjust = should_apply_home_advantage(home_side, away_side);
    PerStat::from_fn(|key| predict_stat(key, home, away, sample_size, adjust))
}

fn predict_stat(
    key: StatKey,
    home: &TeamStatistics,
    away: &TeamStatistics,
    sample_size: u32,
    adjust: bool,
) -> PredictionStat {
    let (mut lambda_home, cv_home, mut lambda_away, cv_away) = match (home.metric(key), away.metric(key)) {
        (StatMetric::Dual(h), StatMetric::Dual(a)) => (
            (h.made.mean + a.conceded.mean) / 2.0,
            (h.made.confidence_cv() + a.conceded.confidence_cv()) / 2.0,
            (a.made.mean + h.conceded.mean) / 2.0,
            (a.made.confidence_cv() + h.conceded.confidence_cv()) / 2.0,
        ),
        _ => {
            let (h, a) = (home.made(key), away.made(key));
            (h.mean, h.confidence_cv(), a.mean, a.confidence_cv())
        }
    };

    if adjust {
        let profile = key.profile();
        lambda_home *= profile.home_factor;
        lambda_away *= profile.away_factor;
    }

    let home_value = PredictionValue::new(lambda_home, cv_home, sample_size);
    let away_value = PredictionValue::new(lambda_away, cv_away, sample_size);
    // Sum of the rounded sides keeps the displayed total consistent with its parts.
    let total = PredictionValue::new(
        home_value.value + away_value.value,
        (cv_home + cv_away) / 2.0,
        sample_size,
    );

    PredictionStat {
        home: home_value,
        away: away_value,
        total,
    }
}

#[inline]
fn round1(v: f64) -> f64 {
    if v.is_finite() { (v * 10.0).round() / 10.0 } else { 0.0 }
}
