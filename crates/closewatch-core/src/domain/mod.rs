//! # Domain Models
//!
//! Canonical domain types for closewatch reconciliation runs.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Instrument`] | Exchange code, provider ticker and display name |
//! | [`Ticker`] | Validated provider ticker |
//! | [`PricePoint`] | Raw daily observation with an optional close |
//! | [`PriceResult`] | Per-instrument outcome (value or error) |
//! | [`RunError`] | Failed instrument entry in a run's error list |
//!
//! Results are keyed by [`Instrument::code`], the raw identifier the caller
//! supplied, never by the normalized ticker.

mod models;
mod ticker;

pub use models::{
    dedup_by_code, normalize_code, Changes, Instrument, PricePoint, PriceResult, RunError,
    EXCHANGE_SUFFIX,
};
pub use ticker::Ticker;
