use std::time::Duration;

use crate::error::{Result, StudioError};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "imagen-3.0-generate-002";
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// Environment variables consulted by [`StudioConfig::from_env`].
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_API_KEY_FALLBACK: &str = "API_KEY";
pub const ENV_MODEL: &str = "IMAGEN_MODEL";
pub const ENV_ENDPOINT: &str = "IMAGEN_ENDPOINT";

/// Configuration for the Imagen client.
///
/// Use [`StudioConfig::builder()`] for ergonomic construction, or
/// [`StudioConfig::from_env()`] to pick up the API key and overrides from
/// the environment.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// API key sent as `x-goog-api-key`. Required to build a client.
    pub api_key: Option<String>,

    /// Base URL of the Generative Language API.
    pub endpoint: String,

    /// Imagen model name.
    pub model: String,

    /// MIME type requested for generated images.
    pub output_mime_type: String,

    /// Per-request timeout. `None` waits until the service answers.
    pub timeout: Option<Duration>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            output_mime_type: DEFAULT_MIME_TYPE.to_string(),
            timeout: Some(Duration::from_secs(120)),
        }
    }
}

impl StudioConfig {
    /// Start building a config with the builder pattern.
    pub fn builder() -> StudioConfigBuilder {
        StudioConfigBuilder::default()
    }

    /// Defaults overlaid with values from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from an arbitrary lookup. Blank values
    /// are ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        config.api_key = get(ENV_API_KEY).or_else(|| get(ENV_API_KEY_FALLBACK));
        if let Some(model) = get(ENV_MODEL) {
            config.model = model;
        }
        if let Some(endpoint) = get(ENV_ENDPOINT) {
            config.endpoint = endpoint;
        }
        config
    }

    /// The API key, or a configuration error naming where to set it.
    pub fn require_api_key(&self) -> Result<&str> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                StudioError::Config(format!(
                    "no API key configured; set {} or pass --api-key",
                    ENV_API_KEY
                ))
            })
    }
}

/// Builder for [`StudioConfig`].
#[derive(Default)]
pub struct StudioConfigBuilder {
    config: StudioConfig,
}

impl StudioConfigBuilder {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = Some(key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the MIME type requested for output images (`image/jpeg` or `image/png`).
    pub fn with_output_mime_type(mut self, mime: impl Into<String>) -> Self {
        self.config.output_mime_type = mime.into();
        self
    }

    /// Set the per-request timeout. `None` disables it.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the final [`StudioConfig`].
    pub fn build(self) -> StudioConfig {
        self.config
    }
}
