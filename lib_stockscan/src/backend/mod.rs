//! # Backend Module
//!
//! Everything needed to talk to the StockScan backends through one base URL.
//!
//! ## Contained Modules:
//!
//! - **`adapter`**: [`adapter::BackendAdapter`] and its four calls
//!   (`legacy_form_call`, `rest_call`, `direct_api_call`, `endpoint_status`).
//! - **`payload`**: insertion-ordered field maps coerced to strings for forms
//!   and query strings.
//! - **`error`**: the one error type every call returns.
//! - **`catalogue`**: domain facades (`stocks()`, `market()`, `news()`, ...)
//!   that bind action names and endpoint paths to those calls.
//! - **`smoke`**: the direct API status-check run used by `stockscan smoke`.

pub mod adapter;
pub mod catalogue;
pub mod error;
pub mod payload;
pub mod smoke;

#[cfg(test)]
pub(crate) mod testing;
