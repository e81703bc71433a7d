use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

use closewatch_core::{
    ChartRequest, HttpClient, HttpError, HttpRequest, HttpResponse, QuoteProvider,
    ResolveErrorKind, Ticker, YahooChartProvider,
};

/// Replays one canned response for every request and records what was sent.
struct CannedHttpClient {
    response: Result<HttpResponse, HttpError>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl CannedHttpClient {
    fn new(response: Result<HttpResponse, HttpError>) -> Arc<Self> {
        Arc::new(Self {
            response,
            requests: Mutex::new(Vec::new()),
        })
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("not poisoned").clone()
    }
}

impl HttpClient for CannedHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        self.requests.lock().expect("not poisoned").push(request);
        let response = self.response.clone();
        Box::pin(async move { response })
    }
}

struct FailureCase {
    name: &'static str,
    response: Result<HttpResponse, HttpError>,
    kind: ResolveErrorKind,
    message: &'static str,
}

fn failure_cases() -> Vec<FailureCase> {
    vec![
        FailureCase {
            name: "server error",
            response: Ok(HttpResponse::new(500, "")),
            kind: ResolveErrorKind::Transport,
            message: "HTTP 500",
        },
        FailureCase {
            name: "not found",
            response: Ok(HttpResponse::new(404, r#"{"chart":{"result":null}}"#)),
            kind: ResolveErrorKind::Transport,
            message: "HTTP 404",
        },
        FailureCase {
            name: "connection refused",
            response: Err(HttpError::new("connection failed: refused")),
            kind: ResolveErrorKind::Transport,
            message: "connection failed: refused",
        },
        FailureCase {
            name: "missing chart",
            response: Ok(HttpResponse::ok_json("{}")),
            kind: ResolveErrorKind::Data,
            message: "no data",
        },
        FailureCase {
            name: "empty result list",
            response: Ok(HttpResponse::ok_json(r#"{"chart":{"result":[]}}"#)),
            kind: ResolveErrorKind::Data,
            message: "no data",
        },
        FailureCase {
            name: "empty timestamps",
            response: Ok(HttpResponse::ok_json(
                r#"{"chart":{"result":[{"timestamp":[],"indicators":{"quote":[{"close":[1.0]}]}}]}}"#,
            )),
            kind: ResolveErrorKind::Data,
            message: "no chart data",
        },
        FailureCase {
            name: "missing quote block",
            response: Ok(HttpResponse::ok_json(
                r#"{"chart":{"result":[{"timestamp":[1],"indicators":{"quote":[]}}]}}"#,
            )),
            kind: ResolveErrorKind::Data,
            message: "no chart data",
        },
    ]
}

fn chart_request(symbol: &str) -> ChartRequest {
    ChartRequest::new(
        Ticker::parse(symbol).expect("valid ticker"),
        1_700_000_000,
        1_718_000_000,
    )
    .expect("valid window")
}

#[test]
fn provider_failures_map_to_stable_kinds_and_messages() {
    for case in failure_cases() {
        let client = CannedHttpClient::new(case.response.clone());
        let provider = YahooChartProvider::new(client);

        let error = block_on(provider.daily_closes(chart_request("7203.T")))
            .expect_err(case.name);

        assert_eq!(error.kind(), case.kind, "case '{}': kind", case.name);
        assert_eq!(error.message(), case.message, "case '{}': message", case.name);
    }
}

#[test]
fn provider_requests_exactly_the_given_window() {
    let body = r#"{"chart":{"result":[{"timestamp":[1718000000],"indicators":{"quote":[{"close":[1.0]}]}}]}}"#;
    let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(body)));
    let provider = YahooChartProvider::new(client.clone());

    block_on(provider.daily_closes(chart_request("6758.T"))).expect("chart should parse");

    let requests = client.requests();
    assert_eq!(requests.len(), 1, "one request per fetch, no retries");
    assert!(requests[0].url.contains("/6758.T?"));
    assert!(requests[0].url.contains("period1=1700000000"));
    assert!(requests[0].url.contains("period2=1718000000"));
    assert!(requests[0].url.ends_with("interval=1d"));
}

#[test]
fn failed_fetch_is_never_retried() {
    let client = CannedHttpClient::new(Ok(HttpResponse::new(503, "")));
    let provider = YahooChartProvider::new(client.clone());

    let _ = block_on(provider.daily_closes(chart_request("7203.T")));

    assert_eq!(client.requests().len(), 1);
}

#[test]
fn absent_closes_are_preserved_for_the_series_to_filter() {
    let body = r#"{"chart":{"result":[{
        "timestamp":[10,20,30,40],
        "indicators":{"quote":[{"close":[1.5,null,null,4.5]}]}
    }]}}"#;
    let client = CannedHttpClient::new(Ok(HttpResponse::ok_json(body)));
    let provider = YahooChartProvider::new(client);

    let chart = block_on(provider.daily_closes(chart_request("7203.T"))).expect("chart");

    assert_eq!(chart.timestamps.len(), chart.closes.len());
    assert_eq!(chart.closes, vec![Some(1.5), None, None, Some(4.5)]);
}

fn block_on<F>(future: F) -> F::Output
where
    F: Future,
{
    let waker = noop_waker();
    let mut context = Context::from_waker(&waker);
    let mut future = std::pin::pin!(future);

    loop {
        match future.as_mut().poll(&mut context) {
            Poll::Ready(output) => return output,
            Poll::Pending => std::thread::yield_now(),
        }
    }
}

fn noop_waker() -> Waker {
    // SAFETY: The vtable functions never dereference the data pointer and are no-op operations.
    unsafe { Waker::from_raw(noop_raw_waker()) }
}

fn noop_raw_waker() -> RawWaker {
    RawWaker::new(std::ptr::null(), &NOOP_RAW_WAKER_VTABLE)
}

unsafe fn noop_raw_waker_clone(_: *const ()) -> RawWaker {
    noop_raw_waker()
}

unsafe fn noop_raw_waker_wake(_: *const ()) {}

unsafe fn noop_raw_waker_wake_by_ref(_: *const ()) {}

unsafe fn noop_raw_waker_drop(_: *const ()) {}

static NOOP_RAW_WAKER_VTABLE: RawWakerVTable = RawWakerVTable::new(
    noop_raw_waker_clone,
    noop_raw_waker_wake,
    noop_raw_waker_wake_by_ref,
    noop_raw_waker_drop,
);
