//! Test doubles for the backend module.

use std::io;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use reqwest::header::CONTENT_TYPE;

use super::adapter::{BackendAdapter, DIRECT_API_PREFIX, LEGACY_ENDPOINT_PATH, REST_PREFIX};
use crate::configs::config_sys::BackendConfig;
use crate::retrieve::ky_http::{
    CredentialsMode, HttpTransport, OutgoingRequest, RawResponse, RequestBody, TransportFailure,
};

pub(crate) const TEST_BASE_URL: &str = "https://stockscan.example.com";

/// An adapter for [`TEST_BASE_URL`] talking to `transport`.
pub(crate) fn mock_adapter(transport: &Arc<MockTransport>) -> BackendAdapter {
    let config = BackendConfig::new(TEST_BASE_URL);
    BackendAdapter::new(&config, transport.clone())
}

enum Outcome {
    Respond(RawResponse),
    Fail(TransportFailure),
}

/// Records every request and answers each one the same way.
pub(crate) struct MockTransport {
    outcome: Outcome,
    requests: Mutex<Vec<OutgoingRequest>>,
}

impl MockTransport {
    fn with(outcome: Outcome) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answers 200 with `body` serialized as JSON.
    pub(crate) fn ok(body: Value) -> Arc<Self> {
        Self::status(200, &body.to_string())
    }

    pub(crate) fn status(status: u16, body: &str) -> Arc<Self> {
        Self::with(Outcome::Respond(RawResponse {
            status,
            body: body.as_bytes().to_vec(),
        }))
    }

    /// Fails every request as if the connection was refused.
    pub(crate) fn refused() -> Arc<Self> {
        Self::with(Outcome::Fail(TransportFailure::Connect("connection refused".into())))
    }

    pub(crate) fn requests(&self) -> Vec<OutgoingRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The only request seen; panics unless exactly one was sent.
    pub(crate) fn single_request(&self) -> OutgoingRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "expected exactly one request, got {requests:?}");
        requests.into_iter().next().unwrap()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        self.requests.lock().unwrap().push(request);
        match &self.outcome {
            Outcome::Respond(response) => Ok(response.clone()),
            Outcome::Fail(failure) => Err(failure.clone()),
        }
    }
}

/// Value of the form part named `name`, if the body is a form and has one.
pub(crate) fn form_field(request: &OutgoingRequest, name: &str) -> Option<String> {
    match &request.body {
        RequestBody::Form(fields) => fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.clone()),
        _ => None,
    }
}

#[derive(Clone)]
struct BufferWriter(Arc<Mutex<Vec<u8>>>);

impl io::Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Log output captured on the current thread until dropped.
pub(crate) struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl CapturedLogs {
    pub(crate) fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock().unwrap()).into_owned()
    }
}

/// Routes this thread's tracing output into memory.
pub(crate) fn capture_logs() -> CapturedLogs {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let writer = BufferWriter(Arc::clone(&buffer));
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();

    CapturedLogs {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

/// Checks that `request` is an admin-ajax POST for `action`.
pub(crate) fn assert_legacy(request: &OutgoingRequest, action: &str) {
    assert_eq!(request.method, reqwest::Method::POST);
    assert_eq!(request.url, format!("{TEST_BASE_URL}{LEGACY_ENDPOINT_PATH}"));
    assert_eq!(request.credentials, CredentialsMode::Include);
    assert_eq!(form_field(request, "action").as_deref(), Some(action));
}

/// Checks that `request` is a credentialed REST call to `endpoint`.
pub(crate) fn assert_rest(request: &OutgoingRequest, endpoint: &str) {
    assert_eq!(request.url, format!("{TEST_BASE_URL}{REST_PREFIX}{endpoint}"));
    assert_eq!(request.credentials, CredentialsMode::Include);
    assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
}

/// Checks that `request` is a cookieless direct API call to `endpoint`.
pub(crate) fn assert_direct(request: &OutgoingRequest, endpoint: &str) {
    assert_eq!(request.url, format!("{TEST_BASE_URL}{DIRECT_API_PREFIX}{endpoint}"));
    assert_eq!(request.credentials, CredentialsMode::Omit);
    assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
}
