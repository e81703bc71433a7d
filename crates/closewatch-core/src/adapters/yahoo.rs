use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;
use tracing::debug;

use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::provider::{ChartRequest, DailyChart, QuoteProvider, ResolveError};

pub const DEFAULT_CHART_BASE_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart endpoint, daily interval.
///
/// The base URL is configurable so requests can be routed through a proxy
/// that mirrors the chart API.
#[derive(Clone)]
pub struct YahooChartProvider {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout_ms: Option<u64>,
}

impl Default for YahooChartProvider {
    fn default() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::default()))
    }
}

impl YahooChartProvider {
    pub fn new(http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            http_client,
            base_url: String::from(DEFAULT_CHART_BASE_URL),
            timeout_ms: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: Option<u64>) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    fn chart_url(&self, req: &ChartRequest) -> String {
        format!(
            "{}/{}?period1={}&period2={}&interval=1d",
            self.base_url,
            urlencoding::encode(req.ticker.as_str()),
            req.start,
            req.end
        )
    }

    async fn fetch_chart(&self, req: ChartRequest) -> Result<DailyChart, ResolveError> {
        let request = HttpRequest::get(self.chart_url(&req))
            .with_header("accept", "application/json")
            .with_timeout_ms(self.timeout_ms);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| ResolveError::transport(e.message()))?;

        if !response.is_success() {
            return Err(ResolveError::transport(format!("HTTP {}", response.status)));
        }

        parse_chart(&req, &response.body)
    }
}

impl QuoteProvider for YahooChartProvider {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    fn daily_closes<'a>(
        &'a self,
        req: ChartRequest,
    ) -> Pin<Box<dyn Future<Output = Result<DailyChart, ResolveError>> + Send + 'a>> {
        Box::pin(self.fetch_chart(req))
    }
}

fn parse_chart(req: &ChartRequest, body: &str) -> Result<DailyChart, ResolveError> {
    let payload: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| ResolveError::compute(format!("failed to parse chart payload: {e}")))?;

    let chart = payload.chart.ok_or_else(|| ResolveError::data("no data"))?;

    if let Some(error) = &chart.error {
        debug!(
            ticker = %req.ticker,
            code = error.code.as_deref().unwrap_or(""),
            description = error.description.as_deref().unwrap_or(""),
            "chart endpoint reported an error"
        );
    }

    let result = chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ResolveError::data("no data"))?;

    let timestamps = result.timestamp.unwrap_or_default();
    let closes = result
        .indicators
        .and_then(|indicators| indicators.quote.into_iter().next())
        .and_then(|quote| quote.close)
        .unwrap_or_default();

    if timestamps.is_empty() || closes.is_empty() {
        return Err(ResolveError::data("no chart data"));
    }

    Ok(DailyChart::new(timestamps, closes))
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: Option<YahooChart>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChart {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    timestamp: Option<Vec<i64>>,
    #[serde(default)]
    indicators: Option<YahooChartIndicators>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    #[serde(default)]
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    close: Option<Vec<Option<f64>>>,
}
