//! Quote provider contract and the instrument-scoped error type.
//!
//! A provider turns a [`ChartRequest`] into the raw parallel arrays of a
//! [`DailyChart`]. Everything after that (filtering, anchoring, change
//! computation) happens in the resolver so providers stay thin.
//!
//! # Error classes
//!
//! | Kind | Code | Raised when |
//! |------|------|-------------|
//! | [`ResolveErrorKind::InvalidInput`] | `resolve.invalid_input` | ticker fails validation, before I/O |
//! | [`ResolveErrorKind::Transport`] | `resolve.transport` | network failure or non-2xx status |
//! | [`ResolveErrorKind::Data`] | `resolve.data` | missing result, empty arrays, no valid closes |
//! | [`ResolveErrorKind::Compute`] | `resolve.compute` | unparseable payload or unexpected failure |

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Classification of a per-instrument failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolveErrorKind {
    InvalidInput,
    Transport,
    Data,
    Compute,
}

/// Failure while resolving one instrument. Never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveError {
    kind: ResolveErrorKind,
    message: String,
}

impl ResolveError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::InvalidInput, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Transport, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Data, message)
    }

    pub fn compute(message: impl Into<String>) -> Self {
        Self::new(ResolveErrorKind::Compute, message)
    }

    fn new(kind: ResolveErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> ResolveErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn into_message(self) -> String {
        self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ResolveErrorKind::InvalidInput => "resolve.invalid_input",
            ResolveErrorKind::Transport => "resolve.transport",
            ResolveErrorKind::Data => "resolve.data",
            ResolveErrorKind::Compute => "resolve.compute",
        }
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ResolveError {}

/// Daily history window for one ticker, in unix seconds (inclusive).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub ticker: Ticker,
    pub start: i64,
    pub end: i64,
}

impl ChartRequest {
    pub fn new(ticker: Ticker, start: i64, end: i64) -> Result<Self, ResolveError> {
        if start > end {
            return Err(ResolveError::invalid_input(format!(
                "chart window start {start} is after end {end}"
            )));
        }
        Ok(Self { ticker, start, end })
    }
}

/// Raw provider payload: parallel timestamp and close arrays.
///
/// `closes` may contain `None` for days without a recorded close.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyChart {
    pub timestamps: Vec<i64>,
    pub closes: Vec<Option<f64>>,
}

impl DailyChart {
    pub fn new(timestamps: Vec<i64>, closes: Vec<Option<f64>>) -> Self {
        Self { timestamps, closes }
    }
}

/// Quote provider contract.
///
/// Implementations must be `Send + Sync`; a run shares one provider across
/// every concurrent fetch in a batch.
pub trait QuoteProvider: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &'static str;

    /// Fetch daily closes for `req.ticker` within `[req.start, req.end]`.
    ///
    /// # Errors
    ///
    /// - [`ResolveErrorKind::Transport`] on network failure or non-2xx status
    /// - [`ResolveErrorKind::Data`] when the payload has no result or empty arrays
    /// - [`ResolveErrorKind::Compute`] when the payload cannot be parsed
    fn daily_closes<'a>(
        &'a self,
        req: ChartRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DailyChart, ResolveError>> + Send + 'a>>;
}
