//! PayPal checkout, handled by the WordPress plugin through admin-ajax only.

use serde_json::Value;

use crate::backend::adapter::BackendAdapter;
use crate::backend::error::BackendResult;
use crate::backend::payload::Payload;

#[derive(Debug, Clone, Copy)]
pub struct PaymentsApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    /// `create_paypal_order` with the selected plan's fields.
    pub async fn create_paypal_order(&self, plan: &Payload) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("create_paypal_order", plan, None)
            .await
    }

    /// `capture_paypal_order` with the approved order's fields.
    pub async fn capture_paypal_order(&self, order: &Payload) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("capture_paypal_order", order, None)
            .await
    }

    pub async fn create_paypal_subscription(&self, subscription: &Payload) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("create_paypal_subscription", subscription, None)
            .await
    }
}
