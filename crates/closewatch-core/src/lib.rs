//! # Closewatch Core
//!
//! Trading-day price reconciliation for exchange-listed instruments.
//!
//! ## Overview
//!
//! Given a list of instruments and the current instant, a run picks one
//! reference date, fetches daily closes for every instrument in paced batches,
//! and reports for each one the close on (or nearest before) that date along
//! with its 1, 7, 14, 30 and 180 day percentage changes.
//!
//! - **Reference date** from exchange trading hours ([`calendar`])
//! - **Sparse series** with nearest-trading-day lookup ([`series`])
//! - **Change rates** with fixed reporting precision ([`change`])
//! - **Single-instrument resolver** that never fails ([`resolver`])
//! - **Batch orchestrator** with a re-entrancy guard ([`orchestrator`])
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | Quote provider adapters (Yahoo chart endpoint) |
//! | [`calendar`] | Reference date and market session window |
//! | [`change`] | Percentage change and price rounding |
//! | [`config`] | Run configuration (defaults, JSON file, environment) |
//! | [`domain`] | Instruments, tickers, price results |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`orchestrator`] | Batched reconciliation runs |
//! | [`provider`] | Quote provider trait and resolve errors |
//! | [`resolver`] | Single-instrument resolution |
//! | [`series`] | Trading-day series |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use closewatch_core::{
//!     BatchOrchestrator, Instrument, InstrumentResolver, MarketCalendar, NoProgress,
//!     YahooChartProvider,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let resolver = InstrumentResolver::new(
//!         Arc::new(YahooChartProvider::default()),
//!         MarketCalendar::default(),
//!     );
//!     let orchestrator = BatchOrchestrator::new(resolver, Default::default())?;
//!
//!     let instruments = vec![Instrument::from_code("7203", "Toyota Motor")];
//!     let run = orchestrator.run(&instruments, &NoProgress).await?;
//!
//!     println!("{:?}", run.results["7203"].price);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Per-instrument failures never abort a run; they are folded into
//! [`PriceResult::error`] and listed in [`ReconciliationRun::errors`]:
//!
//! ```rust
//! use closewatch_core::{ResolveError, ResolveErrorKind};
//!
//! fn describe(error: &ResolveError) -> &'static str {
//!     match error.kind() {
//!         ResolveErrorKind::InvalidInput => "fix the instrument list",
//!         ResolveErrorKind::Transport => "provider unreachable",
//!         ResolveErrorKind::Data => "no closes for this window",
//!         ResolveErrorKind::Compute => "unexpected payload",
//!     }
//! }
//! ```

pub mod adapters;
pub mod calendar;
pub mod change;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod orchestrator;
pub mod provider;
pub mod resolver;
pub mod series;

// Adapter implementations
pub use adapters::{YahooChartProvider, DEFAULT_CHART_BASE_URL};

// Calendar
pub use calendar::{MarketCalendar, ReferenceDate};

// Change calculator
pub use change::{change_rate, round_price};

// Configuration
pub use config::{MarketConfig, ReconcileConfig};

// Domain models
pub use domain::{
    dedup_by_code, normalize_code, Changes, Instrument, PricePoint, PriceResult, RunError,
    Ticker, EXCHANGE_SUFFIX,
};

// Error types
pub use error::{CoreError, OrchestratorError, ValidationError};

// HTTP client types
pub use http_client::{HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient};

// Orchestration
pub use orchestrator::{
    BatchOrchestrator, BatchPolicy, NoProgress, ProgressSink, ReconciliationRun, RunState,
    RunSummary,
};

// Provider contract
pub use provider::{ChartRequest, DailyChart, QuoteProvider, ResolveError, ResolveErrorKind};

// Resolution
pub use resolver::{summarize, InstrumentResolver, DAY_SECONDS, MAX_WINDOW_DAYS};

// Series
pub use series::{Observation, TradingDaySeries};

/// Build a resolver and orchestrator against the Yahoo chart endpoint from `config`.
pub fn orchestrator_from_config(config: &ReconcileConfig) -> Result<BatchOrchestrator, CoreError> {
    config.validate()?;
    let http_client = ReqwestHttpClient::new(&config.user_agent);
    let provider = YahooChartProvider::new(std::sync::Arc::new(http_client))
        .with_base_url(config.chart_base_url.clone())
        .with_timeout_ms(config.request_timeout_ms);
    let resolver = InstrumentResolver::new(std::sync::Arc::new(provider), config.calendar()?)
        .with_window(config.lookback_days, config.lookahead_days);
    Ok(BatchOrchestrator::new(resolver, config.batch_policy())?)
}
