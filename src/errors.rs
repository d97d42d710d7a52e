/// Domain-specific error types for the analysis engine.
/// The pure engine (stability, prediction, over/under, insights) never errors;
/// these cover the fetch layer, configuration and the scanner:
/// - Isolated match failures are logged and skipped
/// - Fixture-list failures end the scan in the `Error` state
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("stats backend error: {status} {body}")]
    Backend { status: u16, body: String },

    #[error("config error: {0}")]
    Config(String),

    #[error("scan superseded by reset or a newer scan")]
    ScanCancelled,
}

impl From<reqwest::Error> for EngineError {
    fn from(e: reqwest::Error) -> Self {
        EngineError::Network(e.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Parse(e.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
