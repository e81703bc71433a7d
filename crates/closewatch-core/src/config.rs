//! Run configuration.
//!
//! Precedence, lowest first: [`ReconcileConfig::default`], an optional JSON
//! file, `CLOSEWATCH_*` environment variables, then explicit overrides from the
//! caller (the CLI applies its flags last).

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::DEFAULT_CHART_BASE_URL;
use crate::calendar::{parse_hm, MarketCalendar};
use crate::orchestrator::BatchPolicy;
use crate::resolver::MAX_WINDOW_DAYS;
use crate::{CoreError, ValidationError};

pub const ENV_BATCH_SIZE: &str = "CLOSEWATCH_BATCH_SIZE";
pub const ENV_BATCH_DELAY_MS: &str = "CLOSEWATCH_BATCH_DELAY_MS";
pub const ENV_CHART_BASE_URL: &str = "CLOSEWATCH_CHART_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "CLOSEWATCH_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarketConfig {
    pub utc_offset_hours: i8,
    /// `HH:MM`, inclusive.
    pub session_open: String,
    /// `HH:MM`, exclusive.
    pub session_close: String,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: 9,
            session_open: String::from("09:00"),
            session_close: String::from("15:00"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReconcileConfig {
    pub batch_size: usize,
    pub batch_delay_ms: u64,
    /// Days of history requested before the reference date.
    pub lookback_days: i64,
    /// Days requested past the reference date.
    pub lookahead_days: i64,
    pub market: MarketConfig,
    pub chart_base_url: String,
    pub request_timeout_ms: Option<u64>,
    pub user_agent: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            batch_delay_ms: 1_500,
            lookback_days: 200,
            lookahead_days: 14,
            market: MarketConfig::default(),
            chart_base_url: String::from(DEFAULT_CHART_BASE_URL),
            request_timeout_ms: None,
            user_agent: String::from(concat!("closewatch/", env!("CARGO_PKG_VERSION"))),
        }
    }
}

impl ReconcileConfig {
    /// Load from a JSON file; missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str::<Self>(&raw)?;
        Ok(config)
    }

    /// Apply `CLOSEWATCH_*` overrides from the process environment.
    pub fn with_env_overrides(self) -> Result<Self, ValidationError> {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply `CLOSEWATCH_*` overrides from an arbitrary lookup.
    pub fn with_overrides_from(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ValidationError> {
        if let Some(value) = lookup(ENV_BATCH_SIZE) {
            self.batch_size = parse_env(ENV_BATCH_SIZE, &value)?;
        }
        if let Some(value) = lookup(ENV_BATCH_DELAY_MS) {
            self.batch_delay_ms = parse_env(ENV_BATCH_DELAY_MS, &value)?;
        }
        if let Some(value) = lookup(ENV_CHART_BASE_URL) {
            if !value.trim().is_empty() {
                self.chart_base_url = value.trim().to_owned();
            }
        }
        if let Some(value) = lookup(ENV_TIMEOUT_MS) {
            self.request_timeout_ms = Some(parse_env(ENV_TIMEOUT_MS, &value)?);
        }
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.batch_size == 0 {
            return Err(ValidationError::ZeroBatchSize);
        }
        check_window("lookback_days", self.lookback_days)?;
        check_window("lookahead_days", self.lookahead_days)?;
        self.calendar()?;
        Ok(())
    }

    pub fn calendar(&self) -> Result<MarketCalendar, ValidationError> {
        let invalid = || ValidationError::InvalidSession {
            open: self.market.session_open.clone(),
            close: self.market.session_close.clone(),
        };
        let open = parse_hm(&self.market.session_open).ok_or_else(invalid)?;
        let close = parse_hm(&self.market.session_close).ok_or_else(invalid)?;
        MarketCalendar::new(self.market.utc_offset_hours, open, close)
    }

    pub fn batch_policy(&self) -> BatchPolicy {
        BatchPolicy {
            batch_size: self.batch_size,
            batch_delay: Duration::from_millis(self.batch_delay_ms),
        }
    }
}

fn check_window(field: &'static str, value: i64) -> Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::NegativeWindow { field, value });
    }
    if value > MAX_WINDOW_DAYS {
        return Err(ValidationError::WindowTooLarge {
            field,
            value,
            max: MAX_WINDOW_DAYS,
        });
    }
    Ok(())
}

fn parse_env<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ValidationError> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| ValidationError::InvalidEnvValue {
            name,
            value: value.to_owned(),
        })
}
