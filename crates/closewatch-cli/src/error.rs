use closewatch_core::{CoreError, OrchestratorError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Orchestrator(#[from] OrchestratorError),

    #[error("config error: {0}")]
    Config(#[source] CoreError),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("strict mode failed: {failed_count} instrument(s) failed")]
    StrictModeViolation { failed_count: usize },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error("time formatting failed: {0}")]
    TimeFormat(#[from] time::error::Format),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Orchestrator(_) => 2,
            Self::Config(_) => 4,
            Self::Core(inner) => match inner {
                CoreError::Validation(_) | CoreError::Orchestrator(_) => 2,
                CoreError::Serialization(_) => 4,
                CoreError::Io(_) => 10,
            },
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::TimeFormat(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
