//! Single-instrument resolution: one provider fetch folded into one [`PriceResult`].
//!
//! [`InstrumentResolver::resolve`] never fails. Every failure, including a
//! panic inside a provider, ends up in [`PriceResult::error`] with all numeric
//! fields empty.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use crate::calendar::{MarketCalendar, ReferenceDate};
use crate::change::{change_rate, round_price};
use crate::provider::{ChartRequest, QuoteProvider, ResolveError};
use crate::series::TradingDaySeries;
use crate::{Changes, PriceResult, Ticker};

pub const DAY_SECONDS: i64 = 86_400;
/// Upper bound on either side of the fetch window, roughly a century.
pub const MAX_WINDOW_DAYS: i64 = 36_500;
pub const DEFAULT_LOOKBACK_DAYS: i64 = 200;
pub const DEFAULT_LOOKAHEAD_DAYS: i64 = 14;

/// Calendar-day horizons resolved through nearest-match lookup.
/// The one-day change uses the preceding trading day instead.
const LOOKBACK_HORIZONS: [i64; 4] = [7, 14, 30, 180];

#[derive(Clone)]
pub struct InstrumentResolver {
    provider: Arc<dyn QuoteProvider>,
    calendar: MarketCalendar,
    lookback_days: i64,
    lookahead_days: i64,
}

impl InstrumentResolver {
    pub fn new(provider: Arc<dyn QuoteProvider>, calendar: MarketCalendar) -> Self {
        Self {
            provider,
            calendar,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
            lookahead_days: DEFAULT_LOOKAHEAD_DAYS,
        }
    }

    /// Override the fetch window around the target date, in days.
    pub fn with_window(mut self, lookback_days: i64, lookahead_days: i64) -> Self {
        self.lookback_days = lookback_days;
        self.lookahead_days = lookahead_days;
        self
    }

    pub fn calendar(&self) -> &MarketCalendar {
        &self.calendar
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Resolve `ticker` against `reference`.
    pub async fn resolve(&self, ticker: &str, reference: ReferenceDate) -> PriceResult {
        let outcome = AssertUnwindSafe(self.try_resolve(ticker, reference))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(error)) => {
                debug!(ticker, code = error.code(), error = error.message(), "resolve failed");
                PriceResult::failed(error.into_message())
            }
            Err(payload) => {
                let error = ResolveError::compute(panic_message(payload.as_ref()));
                debug!(ticker, code = error.code(), error = error.message(), "resolve panicked");
                PriceResult::failed(error.into_message())
            }
        }
    }

    async fn try_resolve(
        &self,
        ticker: &str,
        reference: ReferenceDate,
    ) -> Result<PriceResult, ResolveError> {
        let ticker =
            Ticker::parse(ticker).map_err(|_| ResolveError::invalid_input("invalid ticker"))?;

        let target = self.calendar.midnight_timestamp(reference);
        let out_of_range = || ResolveError::invalid_input("fetch window out of range");
        let start = self
            .lookback_days
            .checked_mul(DAY_SECONDS)
            .and_then(|span| target.checked_sub(span))
            .ok_or_else(out_of_range)?;
        let end = self
            .lookahead_days
            .checked_mul(DAY_SECONDS)
            .and_then(|span| target.checked_add(span))
            .ok_or_else(out_of_range)?;
        let request = ChartRequest::new(ticker, start, end)?;

        let chart = self.provider.daily_closes(request).await?;
        let series = TradingDaySeries::from_raw(&chart.timestamps, &chart.closes);

        summarize(&series, target, &self.calendar)
    }
}

/// Derive the reported price, its date and every change from a filtered series.
pub fn summarize(
    series: &TradingDaySeries,
    target: i64,
    calendar: &MarketCalendar,
) -> Result<PriceResult, ResolveError> {
    let anchor_index = series
        .anchor_index(target)
        .ok_or_else(|| ResolveError::data("no valid close data"))?;
    let anchor = series
        .get(anchor_index)
        .copied()
        .ok_or_else(|| ResolveError::data("no valid close data"))?;

    let actual_date = calendar.local_date_label(anchor.timestamp).ok_or_else(|| {
        ResolveError::compute(format!("timestamp {} is out of range", anchor.timestamp))
    })?;

    let current = Some(anchor.close);
    let previous_close = anchor_index
        .checked_sub(1)
        .and_then(|index| series.get(index))
        .map(|point| point.close);

    let [d7, d14, d30, d180] = LOOKBACK_HORIZONS.map(|days| {
        let past = series
            .find_closest(anchor.timestamp.saturating_sub(days * DAY_SECONDS))
            .map(|point| point.close);
        change_rate(current, past)
    });

    let changes = Changes {
        d1: change_rate(current, previous_close),
        d7,
        d14,
        d30,
        d180,
    };

    Ok(PriceResult::resolved(
        round_price(anchor.close),
        actual_date,
        changes,
    ))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("unexpected failure while resolving")
    }
}
