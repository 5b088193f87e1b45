//! # HTTP Retrieval Utilities
//!
//! This module provides the transport seam the backend adapter talks through.
//! A request is described as plain data ([`OutgoingRequest`]) and handed to an
//! [`HttpTransport`]; the answer comes back as a status code plus raw body
//! bytes. Interpreting status codes and decoding JSON is left to the caller.
//!
//! [`ReqwestTransport`] is the production implementation. It keeps two lanes
//! built on `reqwest_middleware`: one sharing a cookie jar (the equivalent of
//! a browser's `credentials: 'include'`) and one without cookies. Both lanes
//! run the [`RequestTrace`] middleware, which logs every exchange.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::multipart::Form;
use reqwest::{Method, Request, Response, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, Middleware, Next};
use serde_json::Value;
use thiserror::Error;

/// Whether a request carries the session cookies held by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialsMode {
    /// Send and store cookies through the shared jar.
    Include,
    /// Send no cookies at all.
    #[default]
    Omit,
}

/// The encoded body of an outgoing request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    /// No body.
    #[default]
    Empty,
    /// A `multipart/form-data` body made of text parts, in order.
    Form(Vec<(String, String)>),
    /// A JSON document. The `Content-Type` header is the caller's business.
    Json(Value),
}

/// A fully described HTTP request, independent of any client library.
#[derive(Debug, Clone)]
pub struct OutgoingRequest {
    /// The HTTP verb.
    pub method: Method,
    /// The absolute target URL as a string; parsing happens in the transport.
    pub url: String,
    /// Headers to send verbatim.
    pub headers: HeaderMap,
    /// The request body.
    pub body: RequestBody,
    /// Which cookie lane to use.
    pub credentials: CredentialsMode,
}

impl OutgoingRequest {
    /// A bodiless request with no headers that omits credentials.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: RequestBody::Empty,
            credentials: CredentialsMode::Omit,
        }
    }
}

/// The raw answer to an [`OutgoingRequest`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawResponse {
    /// The numeric HTTP status code.
    pub status: u16,
    /// The response body, unparsed.
    pub body: Vec<u8>,
}

impl RawResponse {
    /// Indicates if the status code is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures that happen before a response is obtained.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportFailure {
    /// Connection, DNS, TLS or timeout failure, or a body that could not be read.
    #[error("connection failed: {0}")]
    Connect(String),
    /// The request could not be built (bad URL, unencodable body).
    #[error("request could not be built: {0}")]
    Build(String),
}

/// The seam between the backend adapter and the network.
///
/// Implementations must send each request exactly once; retrying is not
/// their call to make.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Sends one request and returns the raw response.
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure>;
}

/// Logs every HTTP exchange passing through a reqwest-middleware client.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestTrace;

#[async_trait]
impl Middleware for RequestTrace {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut http::Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        let method = req.method().clone();
        let url = req.url().clone();
        let start = Instant::now();

        let result = next.run(req, extensions).await;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(response) => tracing::debug!(
                method = %method,
                url = %url,
                status = response.status().as_u16(),
                elapsed_ms,
                "HTTP exchange completed"
            ),
            Err(e) => tracing::warn!(
                method = %method,
                url = %url,
                elapsed_ms,
                error = %e,
                "HTTP exchange failed before a response"
            ),
        }
        result
    }
}

/// One reqwest client together with its middleware wrapper.
#[derive(Clone)]
struct Lane {
    /// Used to build requests (multipart support lives on the plain builder).
    builder: reqwest::Client,
    /// Used to execute them through the middleware stack.
    executor: ClientWithMiddleware,
}

impl Lane {
    fn new(client: reqwest::Client) -> Self {
        let executor = ClientBuilder::new(client.clone()).with(RequestTrace).build();
        Self {
            builder: client,
            executor,
        }
    }
}

/// [`HttpTransport`] backed by `reqwest`.
#[derive(Clone)]
pub struct ReqwestTransport {
    /// Requests with [`CredentialsMode::Include`].
    with_credentials: Lane,
    /// Requests with [`CredentialsMode::Omit`].
    without_credentials: Lane,
    /// Cookies shared by the credentialed lane.
    cookie_jar: Arc<Jar>,
}

impl fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReqwestTransport").finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    /// Creates a transport with an empty cookie jar.
    pub fn new() -> Result<Self, TransportFailure> {
        Self::with_cookie_jar(Arc::new(Jar::default()))
    }

    /// Creates a transport whose credentialed lane uses `cookie_jar`.
    ///
    /// # Errors
    /// Returns [`TransportFailure::Build`] if the TLS backend cannot be initialised.
    pub fn with_cookie_jar(cookie_jar: Arc<Jar>) -> Result<Self, TransportFailure> {
        let credentialed = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&cookie_jar))
            .build()
            .map_err(|e| TransportFailure::Build(e.to_string()))?;
        let anonymous = reqwest::Client::builder()
            .build()
            .map_err(|e| TransportFailure::Build(e.to_string()))?;

        Ok(Self {
            with_credentials: Lane::new(credentialed),
            without_credentials: Lane::new(anonymous),
            cookie_jar,
        })
    }

    /// The jar shared by credentialed requests.
    pub fn cookie_jar(&self) -> &Arc<Jar> {
        &self.cookie_jar
    }

    fn lane(&self, credentials: CredentialsMode) -> &Lane {
        match credentials {
            CredentialsMode::Include => &self.with_credentials,
            CredentialsMode::Omit => &self.without_credentials,
        }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: OutgoingRequest) -> Result<RawResponse, TransportFailure> {
        let url = Url::parse(&request.url)
            .map_err(|e| TransportFailure::Build(format!("{}: {}", request.url, e)))?;
        let lane = self.lane(request.credentials);

        let mut builder = lane
            .builder
            .request(request.method, url)
            .headers(request.headers);

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(fields) => {
                let form = fields
                    .into_iter()
                    .fold(Form::new(), |form, (name, value)| form.text(name, value));
                builder.multipart(form)
            }
            RequestBody::Json(document) => {
                let bytes = serde_json::to_vec(&document)
                    .map_err(|e| TransportFailure::Build(e.to_string()))?;
                builder.body(bytes)
            }
        };

        let prepared = builder
            .build()
            .map_err(|e| TransportFailure::Build(e.to_string()))?;

        let response = lane
            .executor
            .execute(prepared)
            .await
            .map_err(|e| TransportFailure::Connect(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportFailure::Connect(e.to_string()))?;

        Ok(RawResponse {
            status,
            body: body.to_vec(),
        })
    }
}
