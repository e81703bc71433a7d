use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::Ticker;

/// Suffix the quote provider expects for bare exchange codes.
pub const EXCHANGE_SUFFIX: &str = ".T";

const BARE_CODE_LEN: usize = 4;

/// One security to reconcile.
///
/// `code` is the raw exchange identifier exactly as supplied by the caller and
/// is the identity key for results. `ticker` is the provider-facing symbol and
/// may be empty when the code could not be normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub ticker: String,
    pub code: String,
    pub name: String,
}

impl Instrument {
    pub fn new(
        ticker: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            code: code.into(),
            name: name.into(),
        }
    }

    /// Build an instrument from a raw exchange code, deriving the ticker.
    pub fn from_code(code: impl Into<String>, name: impl Into<String>) -> Self {
        let code = code.into();
        let ticker = normalize_code(&code).unwrap_or_default();
        Self::new(ticker, code, name)
    }
}

/// Map a raw exchange code to a provider ticker.
///
/// Bare 4-character alphanumeric codes get [`EXCHANGE_SUFFIX`]; codes that
/// already carry a suffix pass through once they validate as a [`Ticker`].
pub fn normalize_code(code: &str) -> Option<String> {
    let trimmed = code.trim().to_ascii_uppercase();
    if trimmed.is_empty() {
        return None;
    }

    if trimmed.contains('.') || trimmed.starts_with('^') {
        return Ticker::parse(&trimmed).ok().map(String::from);
    }

    if trimmed.len() == BARE_CODE_LEN && trimmed.chars().all(|ch| ch.is_ascii_alphanumeric()) {
        return Some(format!("{trimmed}{EXCHANGE_SUFFIX}"));
    }

    None
}

/// Keep the first instrument per `code`, preserving input order.
pub fn dedup_by_code(instruments: impl IntoIterator<Item = Instrument>) -> Vec<Instrument> {
    let mut seen = HashSet::new();
    instruments
        .into_iter()
        .filter(|instrument| seen.insert(instrument.code.clone()))
        .collect()
}

/// Raw daily observation from the provider. `close` is absent on halts and holidays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub close: Option<f64>,
}

impl PricePoint {
    pub const fn new(timestamp: i64, close: Option<f64>) -> Self {
        Self { timestamp, close }
    }
}

/// Outcome of reconciling one instrument.
///
/// Either `price` or `error` is populated, never both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceResult {
    pub price: Option<f64>,
    pub actual_date: Option<String>,
    pub change_1d: Option<f64>,
    pub change_7d: Option<f64>,
    pub change_14d: Option<f64>,
    pub change_30d: Option<f64>,
    pub change_180d: Option<f64>,
    pub error: Option<String>,
}

/// Percentage changes for every lookback horizon.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Changes {
    pub d1: Option<f64>,
    pub d7: Option<f64>,
    pub d14: Option<f64>,
    pub d30: Option<f64>,
    pub d180: Option<f64>,
}

impl PriceResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            price: None,
            actual_date: None,
            change_1d: None,
            change_7d: None,
            change_14d: None,
            change_30d: None,
            change_180d: None,
            error: Some(error.into()),
        }
    }

    pub fn resolved(price: f64, actual_date: impl Into<String>, changes: Changes) -> Self {
        Self {
            price: Some(price),
            actual_date: Some(actual_date.into()),
            change_1d: changes.d1,
            change_7d: changes.d7,
            change_14d: changes.d14,
            change_30d: changes.d30,
            change_180d: changes.d180,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn changes(&self) -> Changes {
        Changes {
            d1: self.change_1d,
            d7: self.change_7d,
            d14: self.change_14d,
            d30: self.change_30d,
            d180: self.change_180d,
        }
    }
}

/// Failed instrument as reported in a run's error list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunError {
    pub code: String,
    pub name: String,
    pub ticker: String,
    pub error: String,
}

impl RunError {
    pub fn new(instrument: &Instrument, error: impl Into<String>) -> Self {
        Self {
            code: instrument.code.clone(),
            name: instrument.name.clone(),
            ticker: instrument.ticker.clone(),
            error: error.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_codes_receive_exchange_suffix() {
        assert_eq!(normalize_code(" 7203 ").as_deref(), Some("7203.T"));
        assert_eq!(normalize_code("130a").as_deref(), Some("130A.T"));
    }

    #[test]
    fn suffixed_codes_pass_through() {
        assert_eq!(normalize_code("6758.t").as_deref(), Some("6758.T"));
        assert_eq!(normalize_code("^N225").as_deref(), Some("^N225"));
    }

    #[test]
    fn unrecognized_codes_leave_ticker_empty() {
        let instrument = Instrument::from_code("72-03", "Broken");
        assert_eq!(instrument.ticker, "");
        assert_eq!(instrument.code, "72-03");
        assert!(Ticker::parse(&instrument.ticker).is_err());
    }

    #[test]
    fn dedup_keeps_first_occurrence_in_order() {
        let deduped = dedup_by_code(vec![
            Instrument::from_code("7203", "Toyota"),
            Instrument::from_code("6758", "Sony"),
            Instrument::from_code("7203", "Toyota (dup)"),
        ]);

        let names = deduped.iter().map(|i| i.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["Toyota", "Sony"]);
    }

    #[test]
    fn failed_result_has_no_numeric_fields() {
        let result = PriceResult::failed("no data");
        assert!(result.is_error());
        assert_eq!(result.price, None);
        assert_eq!(result.changes(), Changes::default());
    }

    #[test]
    fn resolved_result_has_no_error() {
        let result = PriceResult::resolved(
            1520.5,
            "2024-06-14",
            Changes {
                d1: Some(1.25),
                ..Changes::default()
            },
        );
        assert!(!result.is_error());
        assert_eq!(result.price, Some(1520.5));
        assert_eq!(result.change_1d, Some(1.25));
        assert_eq!(result.change_180d, None);
    }
}
