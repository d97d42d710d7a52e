pub mod cache;
pub mod client;
pub mod types;

use crate::errors::EngineResult;
use crate::stats::StatsQuery;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use types::{FixtureSummary, MatchStatsResponse};

/// Where fixtures and per-match team statistics come from.
/// The scanner only talks to this trait.
#[async_trait]
pub trait StatsSource: Send + Sync + 'static {
    async fn fetch_fixtures(&self, date: NaiveDate) -> EngineResult<Vec<FixtureSummary>>;

    /// Both teams' statistics for one fixture under a single query; the home
    /// and away side filters apply independently in the same request.
    async fn fetch_match_stats(&self, match_id: &str, query: &StatsQuery) -> EngineResult<Arc<MatchStatsResponse>>;
}
