use super::cache::TtlCache;
use super::types::*;
use super::StatsSource;
use crate::errors::{EngineError, EngineResult};
use crate::stats::StatsQuery;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;

/// Statistics backend REST client. All methods return Result, never panic.
pub struct BackendClient {
    client: Client,
    base_url: String,
    cache: TtlCache<MatchStatsResponse>,
}

impl BackendClient {
    /// `timeout` is the single per-request deadline; nothing else times out.
    pub fn new(base_url: &str, timeout: Duration, cache_ttl: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .pool_max_idle_per_host(8)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
            cache: TtlCache::new(cache_ttl),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> EngineResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EngineError::Backend {
                status: status.as_u16(),
                body,
            });
        }

        resp.json::<T>().await.map_err(|e| EngineError::Parse(format!("GET {path}: {e}")))
    }

    pub async fn cached_entries(&self) -> usize {
        self.cache.len().await
    }
}

pub(crate) fn fixtures_path(date: NaiveDate) -> String {
    format!("/api/fixtures?date={}", date.format("%Y-%m-%d"))
}

pub(crate) fn match_stats_path(match_id: &str, query: &StatsQuery) -> String {
    let mut parts: SmallVec<[String; 4]> = SmallVec::new();
    parts.push(format!("period={}", query.period.as_str()));
    parts.push(format!("half={}", query.half.as_str()));
    if let Some(s) = query.home_side { parts.push(format!("home_side={}", s.as_str())); }
    if let Some(s) = query.away_side { parts.push(format!("away_side={}", s.as_str())); }
    format!("/api/matches/{match_id}/stats?{}", parts.join("&"))
}

#[async_trait]
impl StatsSource for BackendClient {
    async fn fetch_fixtures(&self, date: NaiveDate) -> EngineResult<Vec<FixtureSummary>> {
        let resp: FixtureListResponse = self.get(&fixtures_path(date)).await?;
        tracing::debug!(%date, fixtures = resp.fixtures.len(), "fixture list fetched");
        Ok(resp.fixtures)
    }

    async fn fetch_match_stats(&self, match_id: &str, query: &StatsQuery) -> EngineResult<Arc<MatchStatsResponse>> {
        if let Some(hit) = self.cache.get(match_id, query).await {
            tracing::debug!(match_id, "match stats cache hit");
            return Ok(hit);
        }

        let stats: MatchStatsResponse = self.get(&match_stats_path(match_id, query)).await?;
        let stats = Arc::new(stats);
        self.cache.insert(match_id, *query, Arc::clone(&stats)).await;
        Ok(stats)
    }
}
