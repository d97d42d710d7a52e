use crate::analysis::thresholds::AnalysisConfig;
use crate::analysis::MatchAnalysis;
use crate::backend::StatsSource;
use crate::errors::EngineError;
use crate::scanner::ScanState;
use crate::state::AppState;
use crate::stats::StatsQuery;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{NaiveDate, Utc};
use portable_atomic::Ordering::Relaxed;
use std::sync::Arc;

/// Engine errors rendered as `{ "error": ... }` with a matching status.
pub struct ApiError(EngineError);

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            EngineError::Config(_) => StatusCode::BAD_REQUEST,
            EngineError::Backend { status: 404, .. } => StatusCode::NOT_FOUND,
            EngineError::Backend { .. } | EngineError::Network(_) | EngineError::Parse(_) => StatusCode::BAD_GATEWAY,
            EngineError::ScanCancelled => StatusCode::CONFLICT,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(serde::Deserialize)]
pub struct FixturesQuery {
    pub date: Option<NaiveDate>,
}

#[derive(serde::Deserialize)]
pub struct ScanRequest {
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub config: AnalysisConfig,
}

/// GET /api/fixtures?date=YYYY-MM-DD -- fixture list (defaults to today, UTC)
pub async fn get_fixtures(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FixturesQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
    let fixtures = state.backend.fetch_fixtures(date).await?;
    Ok(Json(serde_json::json!({
        "date": date,
        "total": fixtures.len(),
        "fixtures": fixtures,
    })))
}

/// GET /api/matches/{id}/analysis -- predictions, over/under and insights for one match
pub async fn get_match_analysis(
    State(state): State<Arc<AppState>>,
    Path(match_id): Path<String>,
    Query(query): Query<StatsQuery>,
) -> Result<Json<MatchAnalysis>, ApiError> {
    let stats = state.backend.fetch_match_stats(&match_id, &query).await?;
    let analysis = MatchAnalysis::build(&stats, query, &state.insight_rules);
    state.counters.analyses_served.fetch_add(1, Relaxed);
    Ok(Json(analysis))
}

/// POST /api/scan -- validate, start a scan in the background, return immediately.
/// A scan already running is superseded.
pub async fn start_scan(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScanRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    req.config.validate()?;

    let date = req.date.unwrap_or_else(|| Utc::now().date_naive());
    let superseded = state.scanner.state().is_running();
    let scanner = Arc::clone(&state.scanner);
    let config = req.config;

    tokio::spawn(async move {
        match scanner.scan(date, &config).await {
            Ok(_) | Err(EngineError::ScanCancelled) => {}
            Err(e) => tracing::warn!(%date, error = %e, "scan ended with error"),
        }
    });

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "date": date, "superseded": superseded })),
    ))
}

/// GET /api/scan -- current scan state (from watch channel, no lock)
pub async fn get_scan(State(state): State<Arc<AppState>>) -> Json<ScanState> {
    Json(state.scanner.state())
}

/// DELETE /api/scan -- discard any running scan and return to idle
pub async fn reset_scan(State(state): State<Arc<AppState>>) -> Json<ScanState> {
    state.scanner.reset();
    Json(state.scanner.state())
}

/// GET /api/counters -- performance counters (lock-free reads)
pub async fn get_counters(
    State(state): State<Arc<AppState>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "scans_started": state.counters.scans_started.load(Relaxed),
        "matches_fetched": state.counters.matches_fetched.load(Relaxed),
        "match_fetch_failures": state.counters.match_fetch_failures.load(Relaxed),
        "opportunities_found": state.counters.opportunities_found.load(Relaxed),
        "analyses_served": state.counters.analyses_served.load(Relaxed),
        "ws_messages_sent": state.counters.ws_messages_sent.load(Relaxed),
        "cached_match_stats": state.backend.cached_entries().await,
    }))
}
