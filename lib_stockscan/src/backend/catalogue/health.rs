//! Liveness and status-check calls.
//!
//! `get_health` and `get_endpoint_status` report on the site itself. The
//! status-check calls (`get_api_root`, `create_status_check`,
//! `list_status_checks`) are what the smoke runner drives against the
//! direct API.

use reqwest::Method;
use serde_json::{json, Value};

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;

#[derive(Debug, Clone, Copy)]
pub struct HealthApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> HealthApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    /// Direct API `health/`.
    pub async fn get_health(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("health/", RequestOptions::new())
            .await
    }

    /// The endpoint-status page. See [`BackendAdapter::endpoint_status`].
    pub async fn get_endpoint_status(&self) -> BackendResult<Value> {
        self.adapter.endpoint_status().await
    }

    /// GET `/api/`.
    pub async fn get_api_root(&self) -> BackendResult<Value> {
        self.adapter.direct_api_call("", RequestOptions::new()).await
    }

    /// POST `/api/status` with `{"client_name": client_name}`.
    pub async fn create_status_check(&self, client_name: &str) -> BackendResult<Value> {
        let options = RequestOptions::new()
            .method(Method::POST)
            .json(json!({ "client_name": client_name }));
        self.adapter.direct_api_call("status", options).await
    }

    /// GET `/api/status`.
    pub async fn list_status_checks(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("status", RequestOptions::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::adapter::ENDPOINT_STATUS_PATH;
    use crate::backend::error::BackendError;
    use crate::backend::testing::*;
    use crate::retrieve::ky_http::{CredentialsMode, RequestBody};
    use reqwest::Method;
    use serde_json::json;

    #[tokio::test]
    async fn get_health_uses_direct_api() {
        let transport = MockTransport::ok(json!({"status": "ok"}));
        let health = mock_adapter(&transport).health().get_health().await.unwrap();
        assert_eq!(health, json!({"status": "ok"}));
        assert_direct(&transport.single_request(), "health/");
    }

    #[tokio::test]
    async fn endpoint_status_is_a_cookieless_get() {
        let transport = MockTransport::ok(json!({"endpoints": []}));
        mock_adapter(&transport).health().get_endpoint_status().await.unwrap();

        let request = transport.single_request();
        assert_eq!(request.method, Method::GET);
        assert_eq!(request.url, format!("{TEST_BASE_URL}{ENDPOINT_STATUS_PATH}"));
        assert_eq!(request.credentials, CredentialsMode::Omit);
        assert_eq!(request.body, RequestBody::Empty);
    }

    #[tokio::test]
    async fn create_status_check_posts_client_name() {
        let transport = MockTransport::ok(json!({"id": "a1", "client_name": "smoke"}));
        let created = mock_adapter(&transport)
            .health()
            .create_status_check("smoke")
            .await
            .unwrap();
        assert_eq!(created["client_name"], json!("smoke"));

        let request = transport.single_request();
        assert_direct(&request, "status");
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body, RequestBody::Json(json!({"client_name": "smoke"})));
    }

    #[tokio::test]
    async fn api_root_and_status_list_are_gets() {
        let transport = MockTransport::ok(json!({"message": "Hello World"}));
        mock_adapter(&transport).health().get_api_root().await.unwrap();
        let request = transport.single_request();
        assert_direct(&request, "");
        assert_eq!(request.method, Method::GET);

        let transport = MockTransport::ok(json!([]));
        mock_adapter(&transport).health().list_status_checks().await.unwrap();
        assert_direct(&transport.single_request(), "status");
    }

    #[tokio::test]
    async fn failures_are_not_retried() {
        let transport = MockTransport::status(503, "unavailable");
        let err = mock_adapter(&transport).health().get_health().await.unwrap_err();
        assert!(matches!(err, BackendError::Transport { status: 503, .. }));
        assert_eq!(transport.call_count(), 1);
    }
}
