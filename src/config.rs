use crate::errors::{EngineError, EngineResult};
use crate::stats::Period;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub stats_api_base_url: String,
    pub stats_api_timeout: Duration,
    pub stats_cache_ttl: Duration,
    pub scan_batch_size: usize,
    pub scan_batch_delay: Duration,
    pub scan_period: Period,
    pub server_port: u16,
}

impl AppConfig {
    pub fn from_env() -> EngineResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> EngineResult<Self> {
        let env_var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let timeout_secs = env_var_or("STATS_API_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| EngineError::Config(format!("STATS_API_TIMEOUT_SECS: {e}")))?;

        let cache_ttl_secs = env_var_or("STATS_CACHE_TTL_SECS", "300")
            .parse::<u64>()
            .map_err(|e| EngineError::Config(format!("STATS_CACHE_TTL_SECS: {e}")))?;

        let scan_batch_size = env_var_or("SCAN_BATCH_SIZE", "5")
            .parse::<usize>()
            .map_err(|e| EngineError::Config(format!("SCAN_BATCH_SIZE: {e}")))?;
        if scan_batch_size == 0 {
            return Err(EngineError::Config("SCAN_BATCH_SIZE: must be at least 1".into()));
        }

        let batch_delay_ms = env_var_or("SCAN_BATCH_DELAY_MS", "100")
            .parse::<u64>()
            .map_err(|e| EngineError::Config(format!("SCAN_BATCH_DELAY_MS: {e}")))?;

        let scan_period = env_var_or("SCAN_PERIOD", "last10")
            .parse::<Period>()
            .map_err(|e| EngineError::Config(format!("SCAN_PERIOD: {e}")))?;

        let server_port = env_var_or("SERVER_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| EngineError::Config(format!("SERVER_PORT: {e}")))?;

        Ok(Self {
            stats_api_base_url: env_var_or("STATS_API_BASE_URL", "http://localhost:8000"),
            stats_api_timeout: Duration::from_secs(timeout_secs),
            stats_cache_ttl: Duration::from_secs(cache_ttl_secs),
            scan_batch_size,
            scan_batch_delay: Duration::from_millis(batch_delay_ms),
            scan_period,
            server_port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> EngineResult<AppConfig> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        AppConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = from_pairs(&[]).unwrap();
        assert_eq!(cfg.stats_api_base_url, "http://localhost:8000");
        assert_eq!(cfg.stats_api_timeout, Duration::from_secs(30));
        assert_eq!(cfg.stats_cache_ttl, Duration::from_secs(300));
        assert_eq!(cfg.scan_batch_size, 5);
        assert_eq!(cfg.scan_batch_delay, Duration::from_millis(100));
        assert_eq!(cfg.scan_period, Period::Last10);
        assert_eq!(cfg.server_port, 3001);
    }

    #[test]
    fn test_overrides() {
        let cfg = from_pairs(&[("SCAN_BATCH_SIZE", "8"), ("SCAN_PERIOD", "last5"), ("SERVER_PORT", "9000")]).unwrap();
        assert_eq!(cfg.scan_batch_size, 8);
        assert_eq!(cfg.scan_period, Period::Last5);
        assert_eq!(cfg.server_port, 9000);
    }

    #[test]
    fn test_parse_errors_name_the_variable() {
        let err = from_pairs(&[("SERVER_PORT", "not-a-port")]).unwrap_err();
        assert!(matches!(err, EngineError::Config(ref m) if m.starts_with("SERVER_PORT")));

        let err = from_pairs(&[("SCAN_BATCH_SIZE", "0")]).unwrap_err();
        assert!(err.to_string().contains("SCAN_BATCH_SIZE"));
    }
}
