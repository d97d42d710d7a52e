use crate::analysis::insights::InsightRules;
use crate::backend::client::BackendClient;
use crate::config::AppConfig;
use crate::scanner::{ScanOptions, ScanState, Scanner};
use portable_atomic::AtomicU64;
use std::sync::Arc;

// ── Messages OUT to dashboard clients ──

#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "type")]
pub enum WsMessage {
    #[serde(rename = "scan_state")]
    ScanState { state: ScanState },
}

// ── Performance Counters (lock-free) ──

pub struct PerfCounters {
    pub scans_started: AtomicU64,
    pub matches_fetched: AtomicU64,
    pub match_fetch_failures: AtomicU64,
    pub opportunities_found: AtomicU64,
    pub analyses_served: AtomicU64,
    pub ws_messages_sent: AtomicU64,
}

impl PerfCounters {
    pub fn new() -> Self {
        Self {
            scans_started: AtomicU64::new(0),
            matches_fetched: AtomicU64::new(0),
            match_fetch_failures: AtomicU64::new(0),
            opportunities_found: AtomicU64::new(0),
            analyses_served: AtomicU64::new(0),
            ws_messages_sent: AtomicU64::new(0),
        }
    }
}

// ── Application shared state ──

pub struct AppState {
    pub config: AppConfig,
    pub backend: Arc<BackendClient>,
    /// Scan progress is published through the scanner's watch channel.
    pub scanner: Arc<Scanner<BackendClient>>,
    pub insight_rules: InsightRules,
    pub counters: Arc<PerfCounters>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Arc<Self> {
        let counters = Arc::new(PerfCounters::new());
        let backend = Arc::new(BackendClient::new(
            &config.stats_api_base_url,
            config.stats_api_timeout,
            config.stats_cache_ttl,
        ));
        let scanner = Arc::new(Scanner::new(
            Arc::clone(&backend),
            ScanOptions::from_config(&config),
            Arc::clone(&counters),
        ));

        Arc::new(Self {
            config,
            backend,
            scanner,
            insight_rules: InsightRules::default(),
            counters,
        })
    }
}
