//! # Configuration Modules
//!
//! Resolves the explicit configuration value handed to the backend adapter.
//! Nothing here is process-wide: callers load a [`config_sys::BackendConfig`]
//! and pass it on.

/// Backend configuration from layered JSON files and environment variables.
pub mod config_sys;
