//! # Backend Adapter Integration Tests
//!
//! Drives `BackendAdapter` over the real reqwest transport against a local
//! `wiremock` server, checking what actually goes over the wire for each
//! backend style and how failures come back.

use lib_stockscan::{BackendAdapter, BackendConfig, BackendError, Payload, RequestOptions};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn adapter_for(server: &MockServer) -> BackendAdapter {
    BackendAdapter::from_config(&BackendConfig::new(server.uri())).unwrap()
}

fn is_multipart(request: &Request) -> bool {
    request
        .headers
        .get("content-type")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("multipart/form-data"))
}

#[tokio::test]
async fn legacy_form_posts_multipart_with_action_nonce_and_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .and(is_multipart)
        .and(body_string_contains("name=\"action\""))
        .and(body_string_contains("stock_scanner_get_quote"))
        .and(body_string_contains("name=\"nonce\""))
        .and(body_string_contains("n0nc3"))
        .and(body_string_contains("name=\"symbol\""))
        .and(body_string_contains("AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": {"price": 189.5}})))
        .expect(1)
        .mount(&server)
        .await;

    let fields = Payload::new().with("symbol", "AAPL");
    let body = adapter_for(&server)
        .legacy_form_call("stock_scanner_get_quote", &fields, Some("n0nc3"))
        .await
        .unwrap();

    assert_eq!(body["data"]["price"], json!(189.5));
}

#[tokio::test]
async fn legacy_form_omits_empty_nonce() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    adapter_for(&server)
        .legacy_form_call("get_market_movers", &Payload::new(), Some(""))
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("get_market_movers"));
    assert!(!body.contains("name=\"nonce\""));
}

#[tokio::test]
async fn rest_call_sends_json_and_caller_headers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-json/stock-scanner/v1/watchlist"))
        .and(header("content-type", "application/json"))
        .and(header("authorization", "Bearer t0k3n"))
        .and(body_json(json!({"symbol": "TSLA"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"added": "TSLA"})))
        .expect(1)
        .mount(&server)
        .await;

    let options = RequestOptions::new()
        .method(Method::POST)
        .header(AUTHORIZATION, HeaderValue::from_static("Bearer t0k3n"))
        .json(json!({"symbol": "TSLA"}));
    let body = adapter_for(&server).rest_call("watchlist", options).await.unwrap();

    assert_eq!(body, json!({"added": "TSLA"}));
}

#[tokio::test]
async fn non_success_status_fails_once_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/market-stats/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&server)
        .await;

    let err = adapter_for(&server)
        .direct_api_call("market-stats/", RequestOptions::new())
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Transport { status: 503, .. }));
    assert_eq!(err.target(), "market-stats/");
    assert_eq!(err.to_string(), "HTTP error! status: 503 (market-stats/)");
}

#[tokio::test]
async fn html_body_on_success_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>0</html>"))
        .mount(&server)
        .await;

    let err = adapter_for(&server)
        .legacy_form_call("get_usage_stats", &Payload::new(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, BackendError::Decode { .. }));
    assert_eq!(err.target(), "get_usage_stats");
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    // Bind then drop to get a port nobody listens on.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let adapter =
        BackendAdapter::from_config(&BackendConfig::new(format!("http://127.0.0.1:{port}"))).unwrap();

    let err = adapter.rest_call("portfolio", RequestOptions::new()).await.unwrap_err();

    assert!(err.is_network());
    assert_eq!(err.target(), "portfolio");
}

#[tokio::test]
async fn endpoint_status_parses_body_whatever_the_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/endpoint-status/"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"endpoints": [{"name": "quote", "ok": false}]})))
        .expect(1)
        .mount(&server)
        .await;

    let body = adapter_for(&server).endpoint_status().await.unwrap();

    assert_eq!(body["endpoints"][0]["name"], json!("quote"));
}

#[tokio::test]
async fn trailing_slash_on_base_url_is_ignored() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::new(format!("{}/", server.uri()));
    let adapter = BackendAdapter::from_config(&config).unwrap();

    assert_eq!(adapter.base_url(), server.uri());
    assert_eq!(adapter.health().get_health().await.unwrap(), json!({"status": "ok"}));
}
