//! Market news.

use serde_json::Value;

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

/// Number of articles requested by [`NewsApi::get_news`] when no limit is given.
pub const DEFAULT_NEWS_LIMIT: u32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct NewsApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> NewsApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    /// REST `news?limit=<n>`, `n` defaulting to [`DEFAULT_NEWS_LIMIT`].
    pub async fn get_news(&self, limit: Option<u32>) -> BackendResult<Value> {
        let limit = limit.unwrap_or(DEFAULT_NEWS_LIMIT);
        self.adapter
            .rest_call(&format!("news?limit={limit}"), RequestOptions::new())
            .await
    }

    /// admin-ajax `get_stock_news`. The `symbol` field is always sent, empty
    /// when no symbol is given, so the backend falls back to general news.
    pub async fn get_stock_news(&self, symbol: Option<&str>) -> BackendResult<Value> {
        let fields = Payload::new().with("symbol", symbol.unwrap_or_default());
        self.adapter
            .legacy_form_call("get_stock_news", &fields, None)
            .await
    }

    /// Direct API `news/feed/`.
    pub async fn get_news_feed(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("news/feed/", RequestOptions::new())
            .await
    }
}
