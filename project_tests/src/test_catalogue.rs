//! # Catalogue Integration Tests
//!
//! Catalogue calls, session cookie handling and the smoke run, end to end
//! against a local `wiremock` server.

use std::sync::Arc;

use lib_stockscan::{run_smoke_checks, BackendAdapter, BackendConfig, Payload, ReqwestTransport};
use reqwest::Url;
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const SESSION_COOKIE: &str = "wordpress_logged_in_stockscan=member%7C1700000000";

fn adapter_for(server: &MockServer) -> BackendAdapter {
    BackendAdapter::from_config(&BackendConfig::new(server.uri())).unwrap()
}

fn carries_session(request: &Request) -> bool {
    request
        .headers
        .get("cookie")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains(SESSION_COOKIE))
}

fn has_no_cookie(request: &Request) -> bool {
    request.headers.get("cookie").is_none()
}

#[tokio::test]
async fn get_stocks_sends_params_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks/"))
        .and(query_param("sector", "tech"))
        .and(query_param("limit", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"symbol": "MSFT"}])))
        .expect(1)
        .mount(&server)
        .await;

    let params = Payload::new().with("sector", "tech").with("limit", 10);
    let stocks = adapter_for(&server).stocks().get_stocks(&params).await.unwrap();

    assert_eq!(stocks[0]["symbol"], json!("MSFT"));
}

#[tokio::test]
async fn get_news_asks_for_five_by_default() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/stock-scanner/v1/news"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    adapter_for(&server).news().get_news(None).await.unwrap();
}

#[tokio::test]
async fn session_cookie_goes_to_wordpress_but_not_direct_api() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/wp-admin/admin-ajax.php"))
        .and(carries_session)
        .and(body_string_contains("add_to_watchlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/wp-json/stock-scanner/v1/portfolio"))
        .and(carries_session)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"holdings": []})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/watchlist/list/"))
        .and(has_no_cookie)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/endpoint-status/"))
        .and(has_no_cookie)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"endpoints": []})))
        .expect(1)
        .mount(&server)
        .await;

    let config = BackendConfig::new(server.uri()).with_session_cookie(SESSION_COOKIE);
    let adapter = BackendAdapter::from_config(&config).unwrap();

    adapter.watchlist().add_to_watchlist("AMD").await.unwrap();
    adapter.portfolio().get_portfolio().await.unwrap();
    adapter.watchlist().get_watchlist_list().await.unwrap();
    adapter.health().get_endpoint_status().await.unwrap();
}

#[tokio::test]
async fn cookie_seeded_into_transport_jar_reaches_rest_calls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wp-json/stock-scanner/v1/watchlist"))
        .and(carries_session)
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["NVDA"])))
        .expect(1)
        .mount(&server)
        .await;

    let transport = ReqwestTransport::new().unwrap();
    let base = Url::parse(&server.uri()).unwrap();
    transport.cookie_jar().add_cookie_str(SESSION_COOKIE, &base);
    let adapter = BackendAdapter::new(&BackendConfig::new(server.uri()), Arc::new(transport));

    let watchlist = adapter.watchlist().get_watchlist().await.unwrap();
    assert_eq!(watchlist, json!(["NVDA"]));
}

#[tokio::test]
async fn smoke_run_passes_against_healthy_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Hello World"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/status"))
        .and(body_json(json!({"client_name": "test_client_120000"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "9b2e", "client_name": "test_client_120000"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "9b2e"}])))
        .expect(1)
        .mount(&server)
        .await;

    let report = run_smoke_checks(&adapter_for(&server), "test_client_120000").await;

    assert_eq!(report.to_string(), "Tests passed: 3/3");
    assert_eq!(report.listed_status_checks(), Some(1));
    assert_eq!(report.created_id, Some(json!("9b2e")));
    assert_eq!(report.exit_code(), 0);
}

#[tokio::test]
async fn smoke_run_reports_failure_when_api_is_down() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let report = run_smoke_checks(&adapter_for(&server), "test_client_120000").await;

    assert_eq!(report.tests_run, 3);
    assert_eq!(report.tests_passed, 0);
    assert_eq!(report.exit_code(), 1);
}
