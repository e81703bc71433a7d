//! Behavior-driven tests for error handling
//!
//! These tests verify that bad input is rejected with a clear error and that
//! per-instrument failures stay instrument-scoped.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use closewatch_core::{
    BatchOrchestrator, BatchPolicy, CoreError, HttpClient, HttpError, HttpRequest, HttpResponse,
    Instrument, InstrumentResolver, MarketCalendar, NoProgress, OrchestratorError,
    ReconcileConfig, ReferenceDate, RunState, Ticker, ValidationError, YahooChartProvider,
};
use time::macros::date;

/// Counts requests and always answers with the same body.
struct CountingHttpClient {
    body: &'static str,
    calls: AtomicUsize,
}

impl CountingHttpClient {
    fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self {
            body,
            calls: AtomicUsize::new(0),
        })
    }
}

impl HttpClient for CountingHttpClient {
    fn execute<'a>(
        &'a self,
        _request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let body = self.body;
        Box::pin(async move { Ok(HttpResponse::ok_json(body)) })
    }
}

fn orchestrator_over(client: Arc<CountingHttpClient>) -> BatchOrchestrator {
    let provider = YahooChartProvider::new(client);
    let resolver = InstrumentResolver::new(Arc::new(provider), MarketCalendar::default());
    BatchOrchestrator::new(resolver, BatchPolicy::default()).expect("valid policy")
}

fn reference() -> ReferenceDate {
    ReferenceDate::from_date(date!(2024 - 06 - 14))
}

// =============================================================================
// Input validation
// =============================================================================

#[test]
fn when_ticker_is_malformed_user_receives_validation_error() {
    assert_eq!(Ticker::parse("   "), Err(ValidationError::EmptyTicker));
    assert!(matches!(
        Ticker::parse("7203 T"),
        Err(ValidationError::TickerInvalidChar { ch: ' ', .. })
    ));
    assert!(matches!(
        Ticker::parse("ABCDEFGHIJKLMNOPQRSTUVWXYZ"),
        Err(ValidationError::TickerTooLong { .. })
    ));
}

#[test]
fn when_reference_date_is_malformed_user_receives_validation_error() {
    for input in ["2024-06-14", "20241314", "2024061", "abcdefgh"] {
        let error = ReferenceDate::parse(input).expect_err(input);
        assert!(
            matches!(error, ValidationError::InvalidReferenceDate { .. }),
            "input '{input}' should be rejected"
        );
    }
}

#[test]
fn when_config_file_is_missing_user_receives_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let error = ReconcileConfig::from_json_file(dir.path().join("absent.json"))
        .expect_err("missing file must fail");
    assert!(matches!(error, CoreError::Io(_)));
}

#[test]
fn when_config_file_has_zero_batch_size_validation_rejects_it() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    write!(file, r#"{{"batch_size": 0}}"#).expect("write config");

    let config = ReconcileConfig::from_json_file(file.path()).expect("syntactically valid");
    assert_eq!(config.validate(), Err(ValidationError::ZeroBatchSize));
    assert!(matches!(
        closewatch_core::orchestrator_from_config(&config),
        Err(CoreError::Validation(ValidationError::ZeroBatchSize))
    ));
}

// =============================================================================
// Orchestrator misuse
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_instrument_list_is_empty_run_is_rejected() {
    let client = CountingHttpClient::new("{}");
    let orchestrator = orchestrator_over(client.clone());

    let error = orchestrator
        .run_for_date(reference(), &[], &NoProgress)
        .await
        .expect_err("empty list must be rejected");

    assert_eq!(error, OrchestratorError::EmptyInput);
    assert_eq!(orchestrator.state(), RunState::Idle);
    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
}

// =============================================================================
// Instrument-scoped failures
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_codes_cannot_be_normalized_no_request_is_sent() {
    let client = CountingHttpClient::new("{}");
    let orchestrator = orchestrator_over(client.clone());
    let input = vec![
        Instrument::from_code("", "Blank"),
        Instrument::from_code("12-34", "Dashed"),
    ];

    let run = orchestrator
        .run_for_date(reference(), &input, &NoProgress)
        .await
        .expect("run completes despite bad codes");

    assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    assert_eq!(run.errors.len(), 2);
    assert!(run.errors.iter().all(|e| e.error == "invalid ticker"));
}

#[tokio::test(start_paused = true)]
async fn when_payload_is_not_json_the_instrument_reports_a_parse_error() {
    let client = CountingHttpClient::new("<html>rate limited</html>");
    let orchestrator = orchestrator_over(client.clone());
    let input = vec![Instrument::from_code("7203", "Toyota Motor")];

    let run = orchestrator
        .run_for_date(reference(), &input, &NoProgress)
        .await
        .expect("run completes");

    let result = &run.results["7203"];
    assert_eq!(result.price, None);
    assert!(result
        .error
        .as_deref()
        .is_some_and(|e| e.starts_with("failed to parse chart payload")));
    assert_eq!(client.calls.load(Ordering::SeqCst), 1, "no retries");
}

#[tokio::test(start_paused = true)]
async fn when_every_close_is_absent_the_instrument_reports_no_valid_close_data() {
    let client = CountingHttpClient::new(
        r#"{"chart":{"result":[{"timestamp":[1718204400,1718290800],"indicators":{"quote":[{"close":[null,null]}]}}]}}"#,
    );
    let orchestrator = orchestrator_over(client);
    let input = vec![Instrument::from_code("7203", "Toyota Motor")];

    let run = orchestrator
        .run_for_date(reference(), &input, &NoProgress)
        .await
        .expect("run completes");

    let result = &run.results["7203"];
    assert_eq!(result.error.as_deref(), Some("no valid close data"));
    assert_eq!(result.price, None);
    assert_eq!(result.actual_date, None);
    assert_eq!(result.change_1d, None);
    assert_eq!(result.change_180d, None);
}

#[tokio::test(start_paused = true)]
async fn failed_and_successful_results_never_mix_price_and_error() {
    let client = CountingHttpClient::new(
        r#"{"chart":{"result":[{"timestamp":[1718290800],"indicators":{"quote":[{"close":[980.0]}]}}]}}"#,
    );
    let orchestrator = orchestrator_over(client);
    let input = vec![
        Instrument::from_code("7203", "Toyota Motor"),
        Instrument::from_code("bad", "Broken"),
    ];

    let run = orchestrator
        .run_for_date(reference(), &input, &NoProgress)
        .await
        .expect("run completes");

    for (code, result) in &run.results {
        assert_ne!(
            result.price.is_some(),
            result.error.is_some(),
            "instrument '{code}' must carry exactly one of price or error"
        );
    }
}
