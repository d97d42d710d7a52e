use crate::analysis::thresholds::AnalysisConfig;
use crate::backend::types::{FixtureSummary, TeamInfo};
use crate::models::over_under::{MatchOverUnder, OverUnderStat};
use crate::models::ConfidenceLabel;
use crate::stats::StatKey;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketSide {
    Over,
    Under,
}

impl std::fmt::Display for MarketSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Over => write!(f, "Over"),
            Self::Under => write!(f, "Under"),
        }
    }
}

/// A line that passed every gate of an [`AnalysisConfig`].
/// Unique per `(match_id, stat, side, line)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub match_id: String,
    pub home: TeamInfo,
    pub away: TeamInfo,
    pub competition: String,
    /// `HH:MM`, or `--:--` when unknown.
    pub kickoff: String,
    pub stat: StatKey,
    pub stat_label: String,
    pub side: MarketSide,
    pub line: f64,
    pub probability: f64,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    /// confidence * probability
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub date: NaiveDate,
    /// Successfully fetched and analysed matches only.
    pub matches_analyzed: usize,
    pub matches_with_opportunities: usize,
    pub total_opportunities: usize,
    pub opportunities: Vec<Opportunity>,
    pub completed_at: DateTime<Utc>,
}

impl ScanResult {
    pub fn empty(scan_id: Uuid, date: NaiveDate) -> Self {
        Self {
            scan_id,
            date,
            matches_analyzed: 0,
            matches_with_opportunities: 0,
            total_opportunities: 0,
            opportunities: Vec::new(),
            completed_at: Utc::now(),
        }
    }

    /// Aggregate counts are taken before `limit` trims the ranked list.
    pub fn from_opportunities(
        scan_id: Uuid,
        date: NaiveDate,
        matches_analyzed: usize,
        opportunities: Vec<Opportunity>,
        limit: Option<usize>,
    ) -> Self {
        let matches_with_opportunities = opportunities
            .iter()
            .map(|o| o.match_id.as_str())
            .collect::<HashSet<_>>()
            .len();
        let total_opportunities = opportunities.len();

        Self {
            scan_id,
            date,
            matches_analyzed,
            matches_with_opportunities,
            total_opportunities,
            opportunities: rank(opportunities, limit),
            completed_at: Utc::now(),
        }
    }
}

/// `HH:MM:SS` or `HH:MM` -> `HH:MM`; anything else -> `--:--`.
pub fn format_kickoff(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .and_then(|s| {
            NaiveTime::parse_from_str(s, "%H:%M:%S")
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .ok()
        })
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|| "--:--".to_string())
}

/// Every line of every configured statistic that passes the filters.
pub fn analyze_match(fixture: &FixtureSummary, over_under: &MatchOverUnder, config: &AnalysisConfig) -> Vec<Opportunity> {
    let kickoff = format_kickoff(fixture.kickoff.as_deref());
    let mut out = Vec::new();
    for (key, stat) in over_under.iter() {
        analyze_stat(key, stat, config, |side, line, probability| Opportunity {
            match_id: fixture.id.clone(),
            home: fixture.home.clone(),
            away: fixture.away.clone(),
            competition: fixture.competition.clone(),
            kickoff: kickoff.clone(),
            stat: key,
            stat_label: stat.label.clone(),
            side,
            line,
            probability,
            confidence: stat.confidence,
            confidence_label: stat.confidence_label,
            score: stat.confidence * probability,
        }, &mut out);
    }
    out
}

fn analyze_stat(
    key: StatKey,
    stat: &OverUnderStat,
    config: &AnalysisConfig,
    make: impl Fn(MarketSide, f64, f64) -> Opportunity,
    out: &mut Vec<Opportunity>,
) {
    let Some(t) = config.thresholds(key) else {
        return;
    };
    if stat.confidence < t.confidence_min {
        return;
    }

    for line in &stat.lines {
        if line.line < t.line_min {
            continue;
        }
        if line.over >= config.probability_cutoff || line.under >= config.probability_cutoff {
            continue;
        }
        if (line.over - line.under).abs() < config.min_edge {
            continue;
        }

        if config.show_over && line.over >= t.over_min {
            out.push(make(MarketSide::Over, line.line, line.over));
        }
        if config.show_under && line.under >= t.under_min {
            out.push(make(MarketSide::Under, line.line, line.under));
        }
    }
}

/// Score desc, then probability desc, then confidence desc.
pub fn rank(mut opportunities: Vec<Opportunity>, limit: Option<usize>) -> Vec<Opportunity> {
    opportunities.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.probability.total_cmp(&a.probability))
            .then_with(|| b.confidence.total_cmp(&a.confidence))
    });
    if let Some(limit) = limit {
        opportunities.truncate(limit);
    }
    opportunities
}
