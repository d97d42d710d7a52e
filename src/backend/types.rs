use crate::stats::{Period, TeamStatistics};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Fixtures ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureSummary {
    pub id: String,
    pub date: NaiveDate,
    /// Local kickoff, `HH:MM:SS` from the backend.
    #[serde(default)]
    pub kickoff: Option<String>,
    pub competition: String,
    #[serde(default)]
    pub venue: Option<String>,
    pub home: TeamInfo,
    pub away: TeamInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureListResponse {
    pub date: NaiveDate,
    #[serde(default)]
    pub fixtures: Vec<FixtureSummary>,
}

// ── Match statistics ──

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamWithStatistics {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub logo: Option<String>,
    pub statistics: TeamStatistics,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchStatsResponse {
    pub fixture: FixtureSummary,
    #[serde(default)]
    pub period: Period,
    #[serde(default)]
    pub matches_analyzed: u32,
    #[serde(default)]
    pub home_matches_analyzed: Option<u32>,
    #[serde(default)]
    pub away_matches_analyzed: Option<u32>,
    pub home: TeamWithStatistics,
    pub away: TeamWithStatistics,
}

impl MatchStatsResponse {
    /// Smallest positive per-side sample count when the backend reports
    /// them, else the overall count.
    pub fn effective_sample_size(&self) -> u32 {
        [self.home_matches_analyzed, self.away_matches_analyzed]
            .into_iter()
            .flatten()
            .filter(|&n| n > 0)
            .min()
            .unwrap_or(self.matches_analyzed)
    }
}
