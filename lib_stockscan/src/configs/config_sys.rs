//! # Backend Configuration
//!
//! Resolves the single value the backend adapter needs (the base URL, plus an
//! optional session cookie) from three sources, lowest precedence first:
//!
//! 1. layered JSON files in the config directory, read with `more-config`:
//!    `config.global.json`, `stockscan.common.json`, `stockscan.<mode>.json`
//!    and `stockscan.<mode>.<os>.json`;
//! 2. the `STOCKSCAN_BACKEND_URL` and `STOCKSCAN_SESSION_COOKIE` environment
//!    variables;
//! 3. whatever the caller sets explicitly on the returned [`BackendConfig`].
//!
//! The mode comes from `RUNNING_MODE_STOCKSCAN`; when it is unset only the
//! global and common files are read.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::{env, fmt};

use config::{ext::*, *};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

const CONFIG_GLOBAL_NAME: &str = "config.global.json";
const CONFIG_BASENAME: &str = "stockscan";

/// Environment variable holding the backend base URL.
pub const BACKEND_URL_ENV: &str = "STOCKSCAN_BACKEND_URL";
/// Environment variable holding a session cookie (`name=value`).
pub const SESSION_COOKIE_ENV: &str = "STOCKSCAN_SESSION_COOKIE";
/// Environment variable pointing at the configuration directory.
pub const CONFIGS_LOCATION_ENV: &str = "CONFIGS_LOCATION";
/// Environment variable selecting the running mode files.
pub const RUNNING_MODE_ENV: &str = "RUNNING_MODE_STOCKSCAN";

const BACKEND_URL_KEY: &str = "BackendUrl";
const SESSION_COOKIE_KEY: &str = "SessionCookie";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration files: {0}")]
    LoadError(String),

    #[error("Invalid backend URL {value:?}: {reason}")]
    InvalidBackendUrl { value: String, reason: String },
}

/// Everything the backend adapter is configured with.
#[derive(Default, Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(rename_all(deserialize = "PascalCase"))]
#[serde(rename_all(serialize = "PascalCase"))]
pub struct BackendConfig {
    /// Base URL shared by every backend style. Empty means same-origin.
    pub backend_url: String,
    /// Cookie seeded into the credentialed lane, e.g. `wordpress_logged_in_x=...`.
    pub session_cookie: Option<String>,
}

impl BackendConfig {
    /// A configuration pointing at `backend_url`, trailing slashes removed.
    pub fn new(backend_url: impl Into<String>) -> Self {
        Self {
            backend_url: normalize_base_url(&backend_url.into()),
            session_cookie: None,
        }
    }

    pub fn with_session_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.session_cookie = if cookie.trim().is_empty() {
            None
        } else {
            Some(cookie)
        };
        self
    }

    /// Applies overrides found through `lookup` (usually the process environment).
    pub fn apply_lookup<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(BACKEND_URL_ENV) {
            self.backend_url = normalize_base_url(&url);
        }
        if let Some(cookie) = lookup(SESSION_COOKIE_ENV) {
            self = self.with_session_cookie(cookie);
        }
        self
    }

    /// Configuration from the environment alone; unset means same-origin.
    pub fn from_env() -> Self {
        Self::default().apply_lookup(|key| env::var(key).ok())
    }

    /// Reads the layered files from `config_dir` and applies the environment on top.
    pub fn load_from_dir(config_dir: &Path) -> Result<Self, ConfigError> {
        let mode = env::var(RUNNING_MODE_ENV).ok();
        let files = config_files(config_dir, mode.as_deref());
        let options = read_layered(&files)?;

        let config = Self::from_options(&options).apply_lookup(|key| env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Like [`BackendConfig::load_from_dir`], with the directory taken from
    /// `CONFIGS_LOCATION`. Without it only the environment is consulted.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var(CONFIGS_LOCATION_ENV) {
            Ok(dir) => Self::load_from_dir(Path::new(&dir)),
            Err(_) => {
                let config = Self::from_env();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Builds a configuration from flattened file options.
    pub fn from_options(options: &BTreeMap<String, String>) -> Self {
        let mut config = Self::default();
        for (key, value) in options {
            if key.eq_ignore_ascii_case(BACKEND_URL_KEY) {
                config.backend_url = normalize_base_url(value);
            } else if key.eq_ignore_ascii_case(SESSION_COOKIE_KEY) {
                config = config.with_session_cookie(value.clone());
            }
        }
        config
    }

    /// An empty base URL is accepted; anything else must be an absolute http(s) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.is_empty() {
            return Ok(());
        }
        let invalid = |reason: String| ConfigError::InvalidBackendUrl {
            value: self.backend_url.clone(),
            reason,
        };
        let url = Url::parse(&self.backend_url).map_err(|e| invalid(e.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }
}

impl fmt::Display for BackendConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = if self.backend_url.is_empty() {
            "(same origin)"
        } else {
            self.backend_url.as_str()
        };
        write!(
            f,
            "BackendConfig
    Backend URL: {},
    Session cookie: {}
",
            backend,
            if self.session_cookie.is_some() { "set" } else { "unset" }
        )
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

/// Candidate files in increasing precedence, keeping only those that exist.
fn config_files(config_dir: &Path, mode: Option<&str>) -> Vec<PathBuf> {
    let mut candidates = vec![
        config_dir.join(CONFIG_GLOBAL_NAME),
        config_dir.join(format!("{}.common.json", CONFIG_BASENAME)),
    ];
    if let Some(mode) = mode {
        candidates.push(config_dir.join(format!("{}.{}.json", CONFIG_BASENAME, mode)));
        candidates.push(config_dir.join(format!(
            "{}.{}.{}.json",
            CONFIG_BASENAME,
            mode,
            env::consts::OS
        )));
    }
    candidates.into_iter().filter(|path| path.is_file()).collect()
}

fn read_layered(files: &[PathBuf]) -> Result<BTreeMap<String, String>, ConfigError> {
    let mut options = BTreeMap::new();
    if files.is_empty() {
        return Ok(options);
    }

    let mut builder = DefaultConfigurationBuilder::new();
    for file in files {
        let file = file.to_string_lossy().to_string();
        builder.add_json_file(&file.is().optional());
    }
    let root: Box<dyn ConfigurationRoot> = builder
        .build()
        .map_err(|e| ConfigError::LoadError(format!("{:?}", e)))?;

    for (key, value) in root.iter(None) {
        options.insert(key.to_string(), value.to_string());
    }
    Ok(options)
}
