use std::env;

pub const ENV_ENABLED: &str = "OBM_ENABLED";
pub const ENV_API_VERSION: &str = "OBM_API_VERSION";
pub const ENV_BASE_URL: &str = "OBM_BASE_URL";

pub const DEFAULT_API_VERSION: &str = "v1";
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid boolean for {key}: {value}")]
    InvalidBool { key: String, value: String },
    #[error("{0} must not be empty")]
    Empty(String),
}

/// Static settings for the training backend client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// When false, model listing short-circuits without touching the network.
    pub enabled: bool,
    /// Leading path segment of every route, e.g. `v1`.
    pub api_version: String,
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(enabled: bool, api_version: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            enabled,
            api_version: api_version.into(),
            base_url: base_url.into(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Loads the configuration from `OBM_ENABLED`, `OBM_API_VERSION` and
    /// `OBM_BASE_URL`, falling back to [`ClientConfig::default`] for unset keys.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) but reads keys through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_ENABLED) {
            config.enabled = parse_bool(ENV_ENABLED, &value)?;
        }
        if let Some(value) = lookup(ENV_API_VERSION) {
            config.api_version = non_empty(ENV_API_VERSION, value)?;
        }
        if let Some(value) = lookup(ENV_BASE_URL) {
            config.base_url = non_empty(ENV_BASE_URL, value)?;
        }

        log::debug!("Loaded client config: {:?}", config);
        Ok(config)
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

fn non_empty(key: &str, value: String) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Empty(key.to_string()));
    }
    Ok(trimmed.to_string())
}
