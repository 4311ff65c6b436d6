use thiserror::Error;

#[derive(Error, Debug)]
pub enum NewsLensError {
    /// Missing or invalid startup configuration. Fatal.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feed or page unreachable, timed out, or non-2xx.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed feed or unparseable analysis.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Intelligence service unavailable or misbehaving.
    #[error("Intelligence service error: {0}")]
    Intelligence(String),

    /// Storage rejected a write.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl NewsLensError {
    /// Only configuration failures stop a run from starting.
    pub fn is_fatal(&self) -> bool {
        matches!(self, NewsLensError::Config(_))
    }
}
