use serde_json::Value;

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

/// Index levels, movers and market-wide statistics.
#[derive(Debug, Clone, Copy)]
pub struct MarketApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> MarketApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    pub async fn get_major_indices(&self) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("get_major_indices", &Payload::new(), None)
            .await
    }

    pub async fn get_market_movers(&self) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("get_market_movers", &Payload::new(), None)
            .await
    }

    pub async fn get_market_data(&self) -> BackendResult<Value> {
        self.adapter.rest_call("market-data", RequestOptions::new()).await
    }

    pub async fn get_market_stats(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("market-stats/", RequestOptions::new())
            .await
    }
}
