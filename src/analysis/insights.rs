use crate::analysis::chance::adjusted_chance;
use crate::analysis::opportunities::MarketSide;
use crate::models::over_under::{MatchOverUnder, OverUnderLine, OverUnderStat};
use crate::models::ConfidenceLabel;
use crate::stats::StatKey;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Above this line uncertainty the reason text calls the line out as noisy.
const ELEVATED_UNCERTAINTY: f64 = 0.35;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightRules {
    /// Lines at or above this uncertainty are tagged `avoid`.
    pub avoid_uncertainty: f64,
    pub max_insights: usize,
}

impl Default for InsightRules {
    fn default() -> Self {
        Self {
            avoid_uncertainty: 0.40,
            max_insights: 6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Opportunity,
    Avoid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchInsight {
    pub kind: InsightKind,
    pub stat: StatKey,
    pub stat_label: String,
    /// e.g. "Under 2.5"
    pub market_label: String,
    pub side: MarketSide,
    pub line: f64,
    pub chance_adjusted: f64,
    pub chance_model: f64,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub uncertainty: Option<f64>,
    pub reason: String,
}

struct BestLine<'a> {
    line: &'a OverUnderLine,
    side: MarketSide,
    chance_model: f64,
    chance_adjusted: f64,
}

/// Line of a statistic with the strongest adjusted chance on either side.
/// Ties keep the earliest line.
fn best_line(stat: &OverUnderStat) -> Option<BestLine<'_>> {
    let mut best: Option<BestLine<'_>> = None;
    for line in &stat.lines {
        let over_adj = adjusted_chance(line.over, stat.confidence, line.uncertainty.unwrap_or(0.0));
        let under_adj = 1.0 - over_adj;

        let (side, chance_adjusted, chance_model) = if over_adj >= under_adj {
            (MarketSide::Over, over_adj, line.over)
        } else {
            (MarketSide::Under, under_adj, line.under)
        };

        if best.as_ref().map_or(true, |b| chance_adjusted > b.chance_adjusted) {
            best = Some(BestLine {
                line,
                side,
                chance_model,
                chance_adjusted,
            });
        }
    }
    best
}

fn reason_for(label: ConfidenceLabel, uncertainty: Option<f64>, no_edge: bool) -> &'static str {
    if no_edge {
        return "No edge over an even split: avoid.";
    }
    let noisy = uncertainty.is_some_and(|u| u >= ELEVATED_UNCERTAINTY);
    match (label, noisy) {
        (ConfidenceLabel::High, _) => "High model confidence for this statistic.",
        (ConfidenceLabel::Medium, true) => "Medium confidence, but the line carries high uncertainty.",
        (ConfidenceLabel::Medium, false) => "Medium confidence, size stakes conservatively.",
        (ConfidenceLabel::Low, true) => "Low confidence and high uncertainty: avoid.",
        (ConfidenceLabel::Low, false) => "Low model confidence: avoid.",
    }
}

/// One insight per statistic (its best line), opportunities first then by
/// descending adjusted chance, capped at `rules.max_insights`.
pub fn build_insights(over_under: &MatchOverUnder, rules: &InsightRules) -> Vec<MatchInsight> {
    let mut out: Vec<MatchInsight> = over_under
        .iter()
        .filter_map(|(key, stat)| {
            let best = best_line(stat)?;
            let uncertainty = best.line.uncertainty;
            // A best line at 50% carries no information either way
            let no_edge = best.chance_adjusted <= 0.5;

            let kind = if no_edge
                || stat.confidence_label == ConfidenceLabel::Low
                || uncertainty.unwrap_or(0.0) >= rules.avoid_uncertainty
            {
                InsightKind::Avoid
            } else {
                InsightKind::Opportunity
            };

            Some(MatchInsight {
                kind,
                stat: key,
                stat_label: stat.label.clone(),
                market_label: format!("{} {}", best.side, best.line.line),
                side: best.side,
                line: best.line.line,
                chance_adjusted: best.chance_adjusted,
                chance_model: best.chance_model,
                confidence: stat.confidence,
                confidence_label: stat.confidence_label,
                uncertainty,
                reason: reason_for(stat.confidence_label, uncertainty, no_edge).to_string(),
            })
        })
        .collect();

    // Stable sort keeps StatKey order among equal chances
    out.sort_by(|a, b| match (a.kind, b.kind) {
        (InsightKind::Opportunity, InsightKind::Avoid) => Ordering::Less,
        (InsightKind::Avoid, InsightKind::Opportunity) => Ordering::Greater,
        _ => b.chance_adjusted.total_cmp(&a.chance_adjusted),
    });
    out.truncate(rules.max_insights);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::distribution::DistributionKind;
    use crate::models::over_under::PredictionInterval;
    use crate::models::stability::confidence_label;
    use crate::stats::PerStat;

    fn line(line: f64, over: f64, uncertainty: Option<f64>) -> OverUnderLine {
        OverUnderLine {
            line,
            over,
            under: 1.0 - over,
            uncertainty,
        }
    }

    fn stat(confidence: f64, lines: &[OverUnderLine]) -> OverUnderStat {
        OverUnderStat {
            label: "Goals".into(),
            lambda: 2.5,
            lambda_home: 1.4,
            lambda_away: 1.1,
            sigma: None,
            distribution: DistributionKind::Poisson,
            lines: lines.iter().copied().collect(),
            confidence,
            confidence_label: confidence_label(confidence),
            interval: PredictionInterval { low: 2.0, high: 3.0, level: 0.9 },
        }
    }

    fn bundle(f: impl Fn(StatKey) -> OverUnderStat) -> MatchOverUnder {
        PerStat::from_fn(f)
    }

    #[test]
    fn test_best_line_picks_strongest_side() {
        let s = stat(0.8, &[line(1.5, 0.7, Some(0.1)), line(2.5, 0.45, Some(0.1)), line(3.5, 0.2, Some(0.1))]);
        let best = best_line(&s).unwrap();
        // under 3.5 at 0.8 beats over 1.5 at 0.7
        assert_eq!(best.line.line, 3.5);
        assert_eq!(best.side, MarketSide::Under);
        assert!((best.chance_model - 0.8).abs() < 1e-12);
        // 0.5 + 0.3 * 0.8 * 0.9
        assert!((best.chance_adjusted - 0.716).abs() < 1e-12);
    }

    #[test]
    fn test_best_line_tie_keeps_first() {
        let s = stat(1.0, &[line(1.5, 0.75, None), line(2.5, 0.25, None)]);
        let best = best_line(&s).unwrap();
        assert_eq!(best.line.line, 1.5);
        assert_eq!(best.side, MarketSide::Over);
    }

    #[test]
    fn test_avoid_classification() {
        let ou = bundle(|key| match key {
            StatKey::Goals => stat(0.8, &[line(2.5, 0.7, Some(0.45))]),
            StatKey::Corners => stat(0.4, &[line(9.5, 0.7, Some(0.05))]),
            _ => stat(0.8, &[line(2.5, 0.7, Some(0.05))]),
        });
        let insights = build_insights(&ou, &InsightRules::default());
        let kind_of = |k: StatKey| insights.iter().find(|i| i.stat == k).map(|i| i.kind);

        assert_eq!(kind_of(StatKey::Goals), Some(InsightKind::Avoid));
        assert_eq!(kind_of(StatKey::Corners), Some(InsightKind::Avoid));
        assert_eq!(kind_of(StatKey::Shots), Some(InsightKind::Opportunity));

        let goals = insights.iter().find(|i| i.stat == StatKey::Goals).unwrap();
        assert_eq!(goals.reason, "High model confidence for this statistic.");
        let corners = insights.iter().find(|i| i.stat == StatKey::Corners).unwrap();
        assert_eq!(corners.reason, "Low model confidence: avoid.");
    }

    #[test]
    fn test_even_lines_are_avoided() {
        let ou = bundle(|key| match key {
            StatKey::Goals => stat(0.95, &[line(0.5, 0.5, Some(0.0)), line(1.5, 0.5, Some(0.0))]),
            _ => stat(0.8, &[line(2.5, 0.7, Some(0.05))]),
        });
        let insights = build_insights(&ou, &InsightRules::default());
        let goals = insights.iter().find(|i| i.stat == StatKey::Goals).unwrap();
        assert_eq!(goals.kind, InsightKind::Avoid);
        assert_eq!(goals.chance_adjusted, 0.5);
        assert_eq!(goals.reason, "No edge over an even split: avoid.");
        assert_eq!(insights.last().unwrap().stat, StatKey::Goals);
        assert!(insights.iter().filter(|i| i.stat != StatKey::Goals).all(|i| i.kind == InsightKind::Opportunity));
    }

    #[test]
    fn test_threshold_is_configurable() {
        let ou = bundle(|_| stat(0.8, &[line(2.5, 0.7, Some(0.3))]));
        let strict = InsightRules { avoid_uncertainty: 0.25, ..InsightRules::default() };
        assert!(build_insights(&ou, &strict).iter().all(|i| i.kind == InsightKind::Avoid));
        assert!(build_insights(&ou, &InsightRules::default())
            .iter()
            .all(|i| i.kind == InsightKind::Opportunity));
    }

    #[test]
    fn test_ordering_and_cap() {
        let ou = bundle(|key| match key {
            StatKey::Goals => stat(0.4, &[line(2.5, 0.95, Some(0.0))]),
            StatKey::Corners => stat(0.9, &[line(9.5, 0.6, Some(0.0))]),
            StatKey::Shots => stat(0.9, &[line(22.5, 0.8, Some(0.0))]),
            _ => stat(0.9, &[line(2.5, 0.7, Some(0.0))]),
        });
        let insights = build_insights(&ou, &InsightRules::default());
        assert_eq!(insights.len(), 6);
        assert_eq!(insights[0].stat, StatKey::Shots);
        // Low-confidence goals lands last despite the highest raw chance
        assert_eq!(insights[5].stat, StatKey::Goals);
        assert_eq!(insights[5].kind, InsightKind::Avoid);
        for w in insights[..5].windows(2) {
            assert!(w[0].chance_adjusted >= w[1].chance_adjusted);
        }

        let capped = build_insights(&ou, &InsightRules { max_insights: 2, ..InsightRules::default() });
        assert_eq!(capped.len(), 2);
    }

    #[test]
    fn test_market_label() {
        let ou = bundle(|_| stat(0.8, &[line(2.5, 0.3, Some(0.1))]));
        let insights = build_insights(&ou, &InsightRules::default());
        assert_eq!(insights[0].market_label, "Under 2.5");
        assert_eq!(insights[0].uncertainty, Some(0.1));
    }

    #[test]
    fn test_empty_lines_skipped() {
        let s = stat(0.8, &[]);
        let ou = bundle(|k| if k == StatKey::Goals { s.clone() } else { stat(0.8, &[line(2.5, 0.6, None)]) });
        let insights = build_insights(&ou, &InsightRules::default());
        assert_eq!(insights.len(), 5);
        assert!(insights.iter().all(|i| i.stat != StatKey::Goals));
    }
}
