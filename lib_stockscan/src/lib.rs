// Declare the modules to re-export
#[cfg(feature = "backend")]
pub mod backend; // Adapter over admin-ajax, WordPress REST and the direct API
#[cfg(feature = "configs")]
pub mod configs;
#[cfg(feature = "loggers")]
pub mod loggers;
#[cfg(feature = "retrieve")]
pub mod retrieve; // HTTP transport seam

// Re-export the everyday surface
#[cfg(feature = "backend")]
pub use backend::{
    adapter::{BackendAdapter, BackendStyle, RequestOptions},
    error::{BackendError, BackendResult},
    payload::{with_query, ContactForm, FieldValue, Payload},
    smoke::{run_smoke_checks, SmokeReport},
};
#[cfg(feature = "configs")]
pub use configs::config_sys::{BackendConfig, ConfigError};
#[cfg(feature = "loggers")]
pub use loggers::loggerlocal::{init_logging, LoggerOptions, LoggingError};
#[cfg(feature = "retrieve")]
pub use retrieve::ky_http::{CredentialsMode, HttpTransport, ReqwestTransport};
