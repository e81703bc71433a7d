use thiserror::Error;

/// Validation and contract errors exposed by `closewatch-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("ticker cannot be empty")]
    EmptyTicker,
    #[error("ticker length {len} exceeds max {max}")]
    TickerTooLong { len: usize, max: usize },
    #[error("ticker must start with an ASCII letter or digit: '{ch}'")]
    TickerInvalidStart { ch: char },
    #[error("ticker contains invalid character '{ch}' at index {index}")]
    TickerInvalidChar { ch: char, index: usize },

    #[error("reference date must be YYYYMMDD: '{value}'")]
    InvalidReferenceDate { value: String },

    #[error("timestamp must be RFC3339: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("batch size must be greater than zero")]
    ZeroBatchSize,
    #[error("window '{field}' must be non-negative, got {value}")]
    NegativeWindow { field: &'static str, value: i64 },
    #[error("window '{field}' must be at most {max} days, got {value}")]
    WindowTooLarge {
        field: &'static str,
        value: i64,
        max: i64,
    },
    #[error("market utc offset {hours}h is outside -12..=14")]
    InvalidUtcOffset { hours: i8 },
    #[error("session window {open}..{close} is empty or out of range")]
    InvalidSession { open: String, close: String },
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidEnvValue { name: &'static str, value: String },
}

/// Misuse of the batch orchestrator.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OrchestratorError {
    #[error("reconciliation requires at least one instrument")]
    EmptyInput,
    #[error("a reconciliation run is already in progress")]
    AlreadyRunning,
}

/// Top-level error type for core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
