use serde_json::Value;

use crate::backend::adapter::{BackendAdapter, RequestOptions};
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

#[derive(Debug, Clone, Copy)]
pub struct PortfolioApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> PortfolioApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    pub async fn get_portfolio(&self) -> BackendResult<Value> {
        self.adapter.rest_call("portfolio", RequestOptions::new()).await
    }

    pub async fn get_formatted_portfolio_data(&self) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("get_formatted_portfolio_data", &Payload::new(), None)
            .await
    }

    pub async fn get_portfolio_list(&self) -> BackendResult<Value> {
        self.adapter
            .direct_api_call("portfolio/list/", RequestOptions::new())
            .await
    }
}

#[cfg(test)]
mod tests {
    use crate::backend::testing::*;
    use serde_json::json;

    #[tokio::test]
    async fn each_call_reaches_its_backend_once() {
        let transport = MockTransport::ok(json!({"holdings": []}));
        let portfolio = mock_adapter(&transport).portfolio().get_portfolio().await.unwrap();
        assert_eq!(portfolio, json!({"holdings": []}));
        assert_rest(&transport.single_request(), "portfolio");

        let transport = MockTransport::ok(json!({}));
        mock_adapter(&transport).portfolio().get_formatted_portfolio_data().await.unwrap();
        assert_legacy(&transport.single_request(), "get_formatted_portfolio_data");

        let transport = MockTransport::ok(json!({}));
        mock_adapter(&transport).portfolio().get_portfolio_list().await.unwrap();
        assert_direct(&transport.single_request(), "portfolio/list/");
    }
}
