mod analysis;
mod backend;
mod config;
mod errors;
mod models;
mod scanner;
mod server;
mod state;
mod stats;

#[tokio::main]
async fn main() {
    // Structured logging (line-buffered on stderr)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("matchstats engine starting");

    // Load config
    let cfg = match config::AppConfig::from_env() {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("config error: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        backend = %cfg.stats_api_base_url,
        batch_size = cfg.scan_batch_size,
        batch_delay_ms = cfg.scan_batch_delay.as_millis() as u64,
        period = cfg.scan_period.as_str(),
        "configuration loaded"
    );

    let app_state = state::AppState::new(cfg);
    let port = app_state.config.server_port;
    let app = server::build_router(app_state);

    let addr = format!("0.0.0.0:{port}");
    tracing::info!("server listening on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("bind error: {e}");
            std::process::exit(1);
        });

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("server error: {e}");
    }
}
