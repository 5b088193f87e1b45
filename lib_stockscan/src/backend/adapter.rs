//! # Backend Request Adapter
//!
//! One configured base URL, three backend styles:
//!
//! | Style | Path | Body | Cookies |
//! |---|---|---|---|
//! | Legacy form (admin-ajax) | `/wp-admin/admin-ajax.php` | multipart: `action`, optional `nonce`, fields | yes |
//! | WordPress REST | `/wp-json/stock-scanner/v1/<endpoint>` | JSON | yes |
//! | Direct API | `/api/<endpoint>` | JSON | no |
//!
//! Plus the endpoint-status page (`/endpoint-status/?format=json`, plain GET).
//!
//! Each call is a single exchange. Failures are logged with the action or
//! endpoint that was addressed and returned unchanged: no retry, no fallback
//! to another style, no substitute value.

use std::fmt;
use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;

use super::error::{BackendError, BackendResult};
use super::payload::Payload;
use crate::configs::config_sys::BackendConfig;
use crate::retrieve::ky_http::{
    CredentialsMode, HttpTransport, OutgoingRequest, RawResponse, ReqwestTransport, RequestBody,
};

/// admin-ajax endpoint, relative to the base URL.
pub const LEGACY_ENDPOINT_PATH: &str = "/wp-admin/admin-ajax.php";
/// WordPress REST namespace, relative to the base URL.
pub const REST_PREFIX: &str = "/wp-json/stock-scanner/v1/";
/// Direct API prefix, relative to the base URL.
pub const DIRECT_API_PREFIX: &str = "/api/";
/// Endpoint-status page, relative to the base URL.
pub const ENDPOINT_STATUS_PATH: &str = "/endpoint-status/?format=json";

/// Which backend style a call went through. Used for log context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendStyle {
    LegacyForm,
    Rest,
    DirectApi,
    EndpointStatus,
}

impl BackendStyle {
    fn label(self) -> &'static str {
        match self {
            BackendStyle::LegacyForm => "admin-ajax",
            BackendStyle::Rest => "wp-rest",
            BackendStyle::DirectApi => "direct-api",
            BackendStyle::EndpointStatus => "endpoint-status",
        }
    }
}

/// Per-call options for the JSON styles.
///
/// Headers given here are layered over the defaults, winning on collision.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Defaults to GET.
    pub method: Option<Method>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// Defaults to the style's own mode (REST includes, direct API omits).
    pub credentials: Option<CredentialsMode>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn credentials(mut self, mode: CredentialsMode) -> Self {
        self.credentials = Some(mode);
        self
    }
}

/// Uniform calling convention over the three backend styles.
#[derive(Clone)]
pub struct BackendAdapter {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
}

impl fmt::Debug for BackendAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendAdapter")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendAdapter {
    /// Creates an adapter over an arbitrary transport.
    pub fn new(config: &BackendConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Creates an adapter over [`ReqwestTransport`], seeding the session
    /// cookie (if any) into the credentialed lane for the base URL.
    pub fn from_config(config: &BackendConfig) -> BackendResult<Self> {
        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            let url = Url::parse(&config.backend_url).map_err(|e| BackendError::InvalidRequest {
                target: config.backend_url.clone(),
                message: format!("session cookie needs an absolute backend URL: {e}"),
            })?;
            jar.add_cookie_str(cookie, &url);
        }

        let transport = ReqwestTransport::with_cookie_jar(jar)
            .map_err(|failure| BackendError::from_failure(&config.backend_url, failure))?;
        Ok(Self::new(config, Arc::new(transport)))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// POSTs a multipart form to admin-ajax.
    ///
    /// The form carries `action`, then `nonce` when `security_token` is present
    /// and non-empty, then every field of `fields` coerced to a string.
    ///
    /// # Errors
    /// - [`BackendError::InvalidRequest`] for an empty action (nothing is sent).
    /// - [`BackendError::Transport`] for a non-2xx status.
    /// - [`BackendError::Network`] when no response was obtained.
    /// - [`BackendError::Decode`] when the body is not JSON.
    pub async fn legacy_form_call(
        &self,
        action: &str,
        fields: &Payload,
        security_token: Option<&str>,
    ) -> BackendResult<Value> {
        if action.is_empty() {
            let err = BackendError::InvalidRequest {
                target: String::new(),
                message: "admin-ajax action must not be empty".to_string(),
            };
            tracing::error!(backend = BackendStyle::LegacyForm.label(), error = %err, "Admin-ajax request rejected");
            return Err(err);
        }

        let mut form = Vec::with_capacity(fields.len() + 2);
        form.push(("action".to_string(), action.to_string()));
        if let Some(token) = security_token.filter(|token| !token.is_empty()) {
            form.push(("nonce".to_string(), token.to_string()));
        }
        form.extend(fields.to_string_pairs());

        let request = OutgoingRequest {
            method: Method::POST,
            url: self.url(LEGACY_ENDPOINT_PATH, ""),
            headers: HeaderMap::new(),
            body: RequestBody::Form(form),
            credentials: CredentialsMode::Include,
        };
        self.exchange(BackendStyle::LegacyForm, action, request).await
    }

    /// Calls `<base>/wp-json/stock-scanner/v1/<endpoint>` with cookies included.
    pub async fn rest_call(&self, endpoint: &str, options: RequestOptions) -> BackendResult<Value> {
        let request = self.json_request(REST_PREFIX, endpoint, options, CredentialsMode::Include);
        self.exchange(BackendStyle::Rest, endpoint, request).await
    }

    /// Calls `<base>/api/<endpoint>` without cookies unless the options say otherwise.
    pub async fn direct_api_call(&self, endpoint: &str, options: RequestOptions) -> BackendResult<Value> {
        let request = self.json_request(DIRECT_API_PREFIX, endpoint, options, CredentialsMode::Omit);
        self.exchange(BackendStyle::DirectApi, endpoint, request).await
    }

    /// GETs the endpoint-status page.
    ///
    /// Unlike the three primitives the HTTP status is not inspected; the body
    /// is parsed as JSON whatever it is.
    pub async fn endpoint_status(&self) -> BackendResult<Value> {
        let request = OutgoingRequest::new(Method::GET, self.url(ENDPOINT_STATUS_PATH, ""));
        let response = self
            .send(BackendStyle::EndpointStatus, ENDPOINT_STATUS_PATH, request)
            .await?;
        self.decode(BackendStyle::EndpointStatus, ENDPOINT_STATUS_PATH, &response)
    }

    fn url(&self, prefix: &str, endpoint: &str) -> String {
        format!("{}{}{}", self.base_url, prefix, endpoint)
    }

    fn json_request(
        &self,
        prefix: &str,
        endpoint: &str,
        options: RequestOptions,
        default_credentials: CredentialsMode,
    ) -> OutgoingRequest {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.extend(options.headers);

        OutgoingRequest {
            method: options.method.unwrap_or(Method::GET),
            url: self.url(prefix, endpoint),
            headers,
            body: options.body.map(RequestBody::Json).unwrap_or_default(),
            credentials: options.credentials.unwrap_or(default_credentials),
        }
    }

    async fn exchange(
        &self,
        style: BackendStyle,
        target: &str,
        request: OutgoingRequest,
    ) -> BackendResult<Value> {
        let response = self.send(style, target, request).await?;

        if !response.is_success() {
            let err = BackendError::Transport {
                target: target.to_string(),
                status: response.status,
            };
            tracing::error!(
                backend = style.label(),
                call = target,
                status = response.status,
                "Backend request failed with non-success status"
            );
            return Err(err);
        }

        self.decode(style, target, &response)
    }

    async fn send(
        &self,
        style: BackendStyle,
        target: &str,
        request: OutgoingRequest,
    ) -> BackendResult<RawResponse> {
        self.transport.send(request).await.map_err(|failure| {
            let err = BackendError::from_failure(target, failure);
            tracing::error!(
                backend = style.label(),
                call = target,
                error = %err,
                "Backend request failed before a response"
            );
            err
        })
    }

    fn decode(&self, style: BackendStyle, target: &str, response: &RawResponse) -> BackendResult<Value> {
        serde_json::from_slice(&response.body).map_err(|source| {
            tracing::error!(
                backend = style.label(),
                call = target,
                status = response.status,
                error = %source,
                "Backend response is not valid JSON"
            );
            BackendError::Decode {
                target: target.to_string(),
                source,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{capture_logs, form_field, mock_adapter, MockTransport};
    use reqwest::header::AUTHORIZATION;
    use serde_json::json;

    #[tokio::test]
    async fn legacy_call_without_token_has_no_nonce() {
        let transport = MockTransport::ok(json!({"success": true}));
        let fields = Payload::new().with("symbol", "AAPL");

        let value = mock_adapter(&transport)
            .legacy_form_call("stock_scanner_get_quote", &fields, None)
            .await
            .unwrap();
        assert_eq!(value, json!({"success": true}));

        let request = transport.single_request();
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.url, "https://stockscan.example.com/wp-admin/admin-ajax.php");
        assert_eq!(request.credentials, CredentialsMode::Include);
        assert_eq!(form_field(&request, "action").as_deref(), Some("stock_scanner_get_quote"));
        assert_eq!(form_field(&request, "symbol").as_deref(), Some("AAPL"));
        assert_eq!(form_field(&request, "nonce"), None);
    }

    #[tokio::test]
    async fn legacy_call_with_token_sends_nonce() {
        let transport = MockTransport::ok(json!({}));
        mock_adapter(&transport)
            .legacy_form_call("get_usage_stats", &Payload::new(), Some("a1b2c3"))
            .await
            .unwrap();

        let request = transport.single_request();
        assert_eq!(form_field(&request, "nonce").as_deref(), Some("a1b2c3"));
        match &request.body {
            RequestBody::Form(fields) => {
                let names: Vec<&str> = fields.iter().map(|(name, _)| name.as_str()).collect();
                assert_eq!(names, vec!["action", "nonce"]);
            }
            other => panic!("expected a form body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn legacy_call_with_empty_token_has_no_nonce() {
        let transport = MockTransport::ok(json!({}));
        mock_adapter(&transport)
            .legacy_form_call("get_usage_stats", &Payload::new(), Some(""))
            .await
            .unwrap();
        assert_eq!(form_field(&transport.single_request(), "nonce"), None);
    }

    #[tokio::test]
    async fn empty_action_is_rejected_without_sending() {
        let transport = MockTransport::ok(json!({}));
        let err = mock_adapter(&transport)
            .legacy_form_call("", &Payload::new(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, BackendError::InvalidRequest { .. }));
        assert_eq!(transport.call_count(), 0);
    }

    #[tokio::test]
    async fn rest_call_merges_caller_headers_over_defaults() {
        let transport = MockTransport::ok(json!([]));
        let options = RequestOptions::new().header(AUTHORIZATION, HeaderValue::from_static("x"));

        mock_adapter(&transport).rest_call("watchlist", options).await.unwrap();

        let request = transport.single_request();
        assert_eq!(request.url, "https://stockscan.example.com/wp-json/stock-scanner/v1/watchlist");
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.credentials, CredentialsMode::Include);
        assert_eq!(request.headers.get(AUTHORIZATION).unwrap(), "x");
        assert_eq!(request.headers.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn caller_content_type_wins_on_collision() {
        let transport = MockTransport::ok(json!({}));
        let options = RequestOptions::new().header(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        mock_adapter(&transport).direct_api_call("health/", options).await.unwrap();

        let request = transport.single_request();
        let values: Vec<_> = request.headers.get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(values, vec!["text/plain"]);
    }

    #[tokio::test]
    async fn direct_call_omits_credentials_and_sends_json_body() {
        let transport = MockTransport::ok(json!({"id": "1"}));
        let options = RequestOptions::new()
            .method(Method::POST)
            .json(json!({"client_name": "smoke"}));

        mock_adapter(&transport).direct_api_call("status", options).await.unwrap();

        let request = transport.single_request();
        assert_eq!(request.url, "https://stockscan.example.com/api/status");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.credentials, CredentialsMode::Omit);
        assert_eq!(request.body, RequestBody::Json(json!({"client_name": "smoke"})));
    }

    #[tokio::test]
    async fn direct_call_credentials_can_be_overridden() {
        let transport = MockTransport::ok(json!({}));
        let options = RequestOptions::new().credentials(CredentialsMode::Include);

        mock_adapter(&transport).direct_api_call("portfolio/list/", options).await.unwrap();
        assert_eq!(transport.single_request().credentials, CredentialsMode::Include);
    }

    #[tokio::test]
    async fn non_success_status_is_a_transport_error_for_every_style() {
        for status in [400u16, 403, 404, 500, 503] {
            let transport = MockTransport::status(status, "{}");
            let adapter = mock_adapter(&transport);

            let legacy = adapter
                .legacy_form_call("get_market_movers", &Payload::new(), None)
                .await
                .unwrap_err();
            let rest = adapter.rest_call("market-data", RequestOptions::new()).await.unwrap_err();
            let direct = adapter
                .direct_api_call("market-stats/", RequestOptions::new())
                .await
                .unwrap_err();

            for (err, target) in [
                (legacy, "get_market_movers"),
                (rest, "market-data"),
                (direct, "market-stats/"),
            ] {
                assert_eq!(err.status(), Some(status));
                assert_eq!(err.target(), target);
            }
            assert_eq!(transport.call_count(), 3);
        }
    }

    #[tokio::test]
    async fn transport_errors_are_logged_with_their_target() {
        let logs = capture_logs();
        let transport = MockTransport::status(502, "bad gateway");
        let adapter = mock_adapter(&transport);

        let _ = adapter
            .legacy_form_call("get_major_indices", &Payload::new(), None)
            .await;
        let _ = adapter.rest_call("realtime-data/MSFT", RequestOptions::new()).await;
        let _ = adapter.direct_api_call("news/feed/", RequestOptions::new()).await;

        let output = logs.contents();
        assert!(output.contains("get_major_indices"), "missing action in logs: {output}");
        assert!(output.contains("realtime-data/MSFT"), "missing endpoint in logs: {output}");
        assert!(output.contains("news/feed/"), "missing endpoint in logs: {output}");
        assert!(output.contains("502"));
    }

    #[tokio::test]
    async fn connection_failure_is_a_network_error_without_retry() {
        let logs = capture_logs();

        let transport = MockTransport::refused();
        let err = mock_adapter(&transport)
            .legacy_form_call("add_to_watchlist", &Payload::new().with("symbol", "TSLA"), None)
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(transport.call_count(), 1);

        let transport = MockTransport::refused();
        let err = mock_adapter(&transport).rest_call("portfolio", RequestOptions::new()).await.unwrap_err();
        assert!(err.is_network());
        assert_eq!(transport.call_count(), 1);

        let transport = MockTransport::refused();
        let err = mock_adapter(&transport)
            .direct_api_call("watchlist/list/", RequestOptions::new())
            .await
            .unwrap_err();
        assert!(err.is_network());
        assert_eq!(transport.call_count(), 1);

        let output = logs.contents();
        assert!(output.contains("add_to_watchlist"));
        assert!(output.contains("portfolio"));
        assert!(output.contains("watchlist/list/"));
    }

    #[tokio::test]
    async fn non_json_success_body_is_a_decode_error() {
        let transport = MockTransport::status(200, "<html>maintenance</html>");
        let err = mock_adapter(&transport).rest_call("market-data", RequestOptions::new()).await.unwrap_err();
        assert!(matches!(err, BackendError::Decode { .. }));
    }

    #[tokio::test]
    async fn endpoint_status_ignores_http_status() {
        let transport = MockTransport::status(503, r#"{"wordpress": "down"}"#);
        let value = mock_adapter(&transport).endpoint_status().await.unwrap();
        assert_eq!(value, json!({"wordpress": "down"}));

        let request = transport.single_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, "https://stockscan.example.com/endpoint-status/?format=json");
        assert_eq!(request.credentials, CredentialsMode::Omit);
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn same_origin_base_produces_relative_urls() {
        let transport = MockTransport::ok(json!({}));
        let adapter = BackendAdapter::new(&BackendConfig::default(), transport.clone());

        adapter.direct_api_call("health/", RequestOptions::new()).await.unwrap();
        assert_eq!(transport.single_request().url, "/api/health/");
    }

    #[test]
    fn session_cookie_requires_absolute_backend_url() {
        let config = BackendConfig::default().with_session_cookie("wordpress_logged_in=abc");
        let err = BackendAdapter::from_config(&config).unwrap_err();
        assert!(matches!(err, BackendError::InvalidRequest { .. }));
    }
}
