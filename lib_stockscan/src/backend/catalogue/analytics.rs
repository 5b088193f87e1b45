use serde_json::Value;

use crate::backend::adapter::BackendAdapter;
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

#[derive(Debug, Clone, Copy)]
pub struct AnalyticsApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> AnalyticsApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    /// Per-account API usage for the current billing period.
    pub async fn get_usage_stats(&self) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("get_usage_stats", &Payload::new(), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::testing::*;
    use serde_json::json;

    #[tokio::test]
    async fn usage_stats_use_admin_ajax() {
        let transport = MockTransport::ok(json!({"api_calls": 1200, "limit": 5000}));
        let stats = mock_adapter(&transport).analytics().get_usage_stats().await.unwrap();
        assert_eq!(stats["limit"], json!(5000));
        assert_legacy(&transport.single_request(), "get_usage_stats");
    }
}
