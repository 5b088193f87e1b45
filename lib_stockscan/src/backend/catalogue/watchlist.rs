use serde_json::Value;

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

/// Watchlist calls. Reads exist in all three styles; writes only in admin-ajax.
#[derive(Debug, Clone, Copy)]
pub struct WatchlistApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> WatchlistApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    pub async fn add_to_watchlist(&self, symbol: &str) -> BackendResult<Value> {
        let fields = Payload::new().with("symbol", symbol);
        self.adapter
            .legacy_form_call("add_to_watchlist", &fields, None)
            .await
    }

    pub async fn remove_from_watchlist(&self, symbol: &str) -> BackendResult<Value> {
        let fields = Payload::new().with("symbol", symbol);
        self.adapter
            .legacy_form_call("remove_from_watchlist", &fields, None)
            .await
    }

    /// REST `watchlist`.
    pub async fn get_watchlist(&self) -> BackendResult<Value> {
        self.adapter.rest_call("watchlist", RequestOptions::new()).await
    }

    /// admin-ajax `get_formatted_watchlist_data`.
    pub async fn get_formatted_watchlist_data(&self) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("get_formatted_watchlist_data", &Payload::new(), None)
            .await
    }

    /// Direct API `watchlist/list/`.
    pub async fn get_watchlist_list(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("watchlist/list/", RequestOptions::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::testing::*;
    use serde_json::json;

    #[tokio::test]
    async fn writes_carry_the_symbol() {
        let transport = MockTransport::ok(json!({"success": true}));
        mock_adapter(&transport).watchlist().add_to_watchlist("AMD").await.unwrap();
        let request = transport.single_request();
        assert_legacy(&request, "add_to_watchlist");
        assert_eq!(form_field(&request, "symbol").as_deref(), Some("AMD"));

        let transport = MockTransport::ok(json!({"success": true}));
        mock_adapter(&transport).watchlist().remove_from_watchlist("AMD").await.unwrap();
        let request = transport.single_request();
        assert_legacy(&request, "remove_from_watchlist");
        assert_eq!(form_field(&request, "symbol").as_deref(), Some("AMD"));
    }

    #[tokio::test]
    async fn reads_are_exposed_through_every_style() {
        let transport = MockTransport::ok(json!([]));
        mock_adapter(&transport).watchlist().get_watchlist().await.unwrap();
        assert_rest(&transport.single_request(), "watchlist");

        let transport = MockTransport::ok(json!([]));
        mock_adapter(&transport).watchlist().get_formatted_watchlist_data().await.unwrap();
        assert_legacy(&transport.single_request(), "get_formatted_watchlist_data");

        let transport = MockTransport::ok(json!([]));
        mock_adapter(&transport).watchlist().get_watchlist_list().await.unwrap();
        assert_direct(&transport.single_request(), "watchlist/list/");
    }
}
