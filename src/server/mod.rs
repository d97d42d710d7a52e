pub mod routes;
pub mod ws;

use crate::state::AppState;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/fixtures", get(routes::get_fixtures))
        .route("/api/matches/{id}/analysis", get(routes::get_match_analysis))
        .route(
            "/api/scan",
            get(routes::get_scan).post(routes::start_scan).delete(routes::reset_scan),
        )
        .route("/api/counters", get(routes::get_counters))
        .route("/ws", get(ws::ws_handler))
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::stats::Period;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use std::time::Duration;
    use tower::ServiceExt;

    fn test_state() -> Arc<AppState> {
        // Nothing listens on the discard port, so backend calls fail fast
        AppState::new(AppConfig {
            stats_api_base_url: "http://127.0.0.1:9".into(),
            stats_api_timeout: Duration::from_millis(500),
            stats_cache_ttl: Duration::from_secs(60),
            scan_batch_size: 5,
            scan_batch_delay: Duration::ZERO,
            scan_period: Period::Last10,
            server_port: 0,
        })
    }

    async fn body_json(resp: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_scan_starts_idle() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/scan").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "idle");
    }

    #[tokio::test]
    async fn test_reset_returns_idle() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::delete("/api/scan").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await["status"], "idle");
    }

    #[tokio::test]
    async fn test_invalid_scan_config_rejected() {
        let state = test_state();
        let app = build_router(Arc::clone(&state));
        let req = Request::post("/api/scan")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"date": "2026-03-14", "config": {"min_edge": 2.0}}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(resp).await["error"].as_str().unwrap().contains("min_edge"));
        assert_eq!(state.scanner.state(), crate::scanner::ScanState::Idle);
    }

    #[tokio::test]
    async fn test_valid_scan_accepted() {
        let app = build_router(test_state());
        let req = Request::post("/api/scan")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"date": "2026-03-14"}"#))
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::ACCEPTED);
        let body = body_json(resp).await;
        assert_eq!(body["date"], "2026-03-14");
        assert_eq!(body["superseded"], false);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_bad_gateway() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(
                Request::get("/api/matches/abc/analysis?period=last5&home_side=home")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_counters() {
        let app = build_router(test_state());
        let resp = app
            .oneshot(Request::get("/api/counters").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["scans_started"], 0);
        assert_eq!(body["cached_match_stats"], 0);
    }
}
