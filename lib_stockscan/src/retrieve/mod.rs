//! # Data Retrieval Module
//!
//! This module holds the HTTP plumbing shared by every backend style:
//! the [`ky_http::HttpTransport`] seam, the plain-data request and response
//! types that cross it, and the `reqwest` implementation used in production.
//!
//! ## Contained Modules:
//!
//! - **`ky_http`**: `HttpTransport`, `OutgoingRequest`, `RawResponse`, and
//!   `ReqwestTransport`, a two-lane client (with and without cookies) built on
//!   `reqwest` and `reqwest-middleware` with a request-tracing middleware.
//!   It never retries: one request in, one response or failure out.

#![forbid(unsafe_code)]

/// HTTP transport seam and its reqwest implementation.
pub mod ky_http;
