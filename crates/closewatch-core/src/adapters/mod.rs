//! Quote provider adapters.

pub mod yahoo;

pub use yahoo::{YahooChartProvider, DEFAULT_CHART_BASE_URL};
