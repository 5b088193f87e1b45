//! Contact, newsletter and cancellation feedback (admin-ajax only).

use serde_json::Value;

use crate::backend::adapter::BackendAdapter;
use crate::backend::error::BackendResult;
use crate::backend::payload::{ContactForm, Payload};

#[derive(Debug, Clone, Copy)]
pub struct SupportApi<'a> {
    adapter: &'a BackendAdapter,
}

impl<'a> SupportApi<'a> {
    pub(crate) fn new(adapter: &'a BackendAdapter) -> Self {
        Self { adapter }
    }

    pub async fn submit_contact_form(&self, form: &Payload) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("submit_contact_form", form, None)
            .await
    }

    /// Typed variant of [`SupportApi::submit_contact_form`].
    pub async fn submit_contact(&self, form: &ContactForm) -> BackendResult<Value> {
        self.submit_contact_form(&Payload::from(form)).await
    }

    pub async fn subscribe_newsletter(&self, email: &str) -> BackendResult<Value> {
        let fields = Payload::new().with("email", email);
        self.adapter
            .legacy_form_call("subscribe_newsletter", &fields, None)
            .await
    }

    pub async fn submit_cancellation_feedback(&self, feedback: &Payload) -> BackendResult<Value> {
        self.adapter
            .legacy_form_call("submit_cancellation_feedback", feedback, None)
            .await
    }
}
