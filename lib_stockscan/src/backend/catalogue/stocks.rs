//! Stock quotes and price data.

use serde_json::Value;

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;
use crate::backend::payload::{with_query, Payload};

/// Stock calls across all three backend styles.
#[derive(Debug, Clone, Copy)]
pub struct StocksApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> StocksApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    /// admin-ajax `stock_scanner_get_quote` with `symbol`.
    pub async fn get_quote(&self, symbol: &str) -> BackendResult<Value> {
        let fields = Payload::new().with("symbol", symbol);
        self.adapter
            .legacy_form_call("stock_scanner_get_quote", &fields, None)
            .await
    }

    /// REST `stock-data/{symbol}`.
    pub async fn get_stock_data(&self, symbol: &str) -> BackendResult<Value> {
        self.adapter
            .rest_call(&format!("stock-data/{symbol}"), RequestOptions::new())
            .await
    }

    /// REST `historical-data/{symbol}`.
    pub async fn get_historical_data(&self, symbol: &str) -> BackendResult<Value> {
        self.adapter
            .rest_call(&format!("historical-data/{symbol}"), RequestOptions::new())
            .await
    }

    /// REST `realtime-data/{symbol}`.
    pub async fn get_realtime_data(&self, symbol: &str) -> BackendResult<Value> {
        self.adapter
            .rest_call(&format!("realtime-data/{symbol}"), RequestOptions::new())
            .await
    }

    /// Direct API `stocks/`, with `params` as the query string when non-empty.
    pub async fn get_stocks(&self, params: &Payload) -> BackendResult<Value> {
        self.adapter
            .direct_api_call(&with_query("stocks/", params), RequestOptions::new())
            .await
    }
}
