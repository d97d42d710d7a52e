pub mod chance;
pub mod insights;
pub mod opportunities;
pub mod thresholds;

use crate::backend::types::{FixtureSummary, MatchStatsResponse};
use crate::models::over_under::{compute_over_under, MatchOverUnder};
use crate::models::prediction::{compute_predictions, MatchPredictions};
use crate::stats::StatsQuery;
use insights::{build_insights, InsightRules, MatchInsight};
use serde::Serialize;

/// Full engine output for one fixture.
#[derive(Debug, Clone, Serialize)]
pub struct MatchAnalysis {
    pub fixture: FixtureSummary,
    pub query: StatsQuery,
    pub sample_size: u32,
    pub predictions: MatchPredictions,
    pub over_under: MatchOverUnder,
    pub insights: Vec<MatchInsight>,
}

impl MatchAnalysis {
    /// Prediction -> over/under -> insights, all on the same sample size.
    pub fn build(stats: &MatchStatsResponse, query: StatsQuery, rules: &InsightRules) -> Self {
        let (predictions, over_under, sample_size) = run_models(stats, &query);
        let insights = build_insights(&over_under, rules);
        Self {
            fixture: stats.fixture.clone(),
            query,
            sample_size,
            predictions,
            over_under,
            insights,
        }
    }
}

/// Predictions and over/under for a fetched match.
pub fn run_models(stats: &MatchStatsResponse, query: &StatsQuery) -> (MatchPredictions, MatchOverUnder, u32) {
    let n = stats.effective_sample_size();
    let home = &stats.home.statistics;
    let away = &stats.away.statistics;
    let predictions = compute_predictions(home, away, n, query.home_side, query.away_side);
    let over_under = compute_over_under(&predictions, home, away, n);
    (predictions, over_under, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::types::tests::match_stats;
    use crate::stats::SideFilter;

    #[test]
    fn test_build_is_consistent() {
        let stats = match_stats("m1");
        let a = MatchAnalysis::build(&stats, StatsQuery::default(), &InsightRules::default());

        assert_eq!(a.sample_size, 10);
        assert_eq!(a.over_under.goals.lambda, a.predictions.goals.total.value);
        assert!(!a.insights.is_empty() && a.insights.len() <= 6);
        for (_, stat) in a.over_under.iter() {
            assert!((1..=4).contains(&stat.lines.len()));
        }
    }

    #[test]
    fn test_side_conditioned_query_skips_home_advantage() {
        let stats = match_stats("m1");
        let plain = MatchAnalysis::build(&stats, StatsQuery::default(), &InsightRules::default());
        let sided = MatchAnalysis::build(
            &stats,
            StatsQuery {
                home_side: Some(SideFilter::Home),
                away_side: Some(SideFilter::Away),
                ..StatsQuery::default()
            },
            &InsightRules::default(),
        );
        assert_ne!(plain.predictions.goals.home.value, sided.predictions.goals.home.value);
    }
}
