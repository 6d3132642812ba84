use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::masking::mask_token;

const CONFIG_FILE_PATH: &str = "repair-console.toml";
const DEFAULT_API_BASE: &str = "http://localhost:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Connection settings for the admin API.
///
/// Owned by the composition root and handed to [`crate::AdminClient`];
/// nothing in the workspace mutates request defaults after construction.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub auth_token: Option<String>,
    pub http_proxy: String,
    pub https_proxy: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            auth_token: None,
            http_proxy: String::new(),
            https_proxy: String::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_base", &self.api_base)
            .field("auth_token", &self.auth_token.as_deref().map(mask_token))
            .field("http_proxy", &self.http_proxy)
            .field("https_proxy", &self.https_proxy)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ClientConfig {
    /// Resolve the configuration: defaults, then the config file, then the
    /// process environment.
    ///
    /// An explicit `path` must exist. Without one, `repair-console.toml` in
    /// the working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE_PATH).exists() => {
                Self::from_file(Path::new(CONFIG_FILE_PATH))?
            }
            None => Self::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str::<ClientConfig>(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override fields from variables resolved through `lookup`.
    ///
    /// Recognized: `REPAIR_API_BASE`, `REPAIR_API_TOKEN`, `HTTP_PROXY`,
    /// `HTTPS_PROXY` and `REPAIR_TIMEOUT_SECS`. Blank values and
    /// non-numeric timeouts are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(api_base) = lookup("REPAIR_API_BASE") {
            self.api_base = api_base;
        }
        if let Some(token) = lookup("REPAIR_API_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Some(http_proxy) = lookup("HTTP_PROXY") {
            self.http_proxy = http_proxy;
        }
        if let Some(https_proxy) = lookup("HTTPS_PROXY") {
            self.https_proxy = https_proxy;
        }
        if let Some(timeout) = lookup("REPAIR_TIMEOUT_SECS").and_then(|v| v.trim().parse().ok()) {
            self.timeout_secs = timeout;
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}
