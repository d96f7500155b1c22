//! Configuration management for boxauth
//!
//! This module handles loading, parsing, validating and reading the
//! client settings used by [`TokenAuthority`](crate::auth::TokenAuthority):
//! the OAuth2 client credentials and the API host that endpoint URLs are
//! built from. Configuration is read-only once loaded.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SdkError};

/// Client configuration shared by every token operation
///
/// # Examples
///
/// ```
/// use boxauth::config::SdkConfig;
///
/// let config = SdkConfig::new("client-id", "client-secret");
/// let url = config.endpoint("oauth2/token").unwrap();
/// assert_eq!(url.as_str(), "https://api.box.com/oauth2/token");
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct SdkConfig {
    /// OAuth2 client identifier
    #[serde(default)]
    pub client_id: String,

    /// OAuth2 client secret
    #[serde(default)]
    pub client_secret: String,

    /// Base URL that API endpoint paths are joined onto
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Browser-facing authorization endpoint
    #[serde(default = "default_oauth2_authorize_url")]
    pub oauth2_authorize_url: String,

    /// Redirect URI registered for the application, if any
    #[serde(default)]
    pub callback_url: Option<String>,

    /// Per-request timeout applied by the HTTP transport (seconds)
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

fn default_api_base_url() -> String {
    "https://api.box.com/".to_string()
}

fn default_oauth2_authorize_url() -> String {
    "https://account.box.com/api/oauth2/authorize".to_string()
}

fn default_request_timeout_seconds() -> u64 {
    60
}

impl Default for SdkConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            api_base_url: default_api_base_url(),
            oauth2_authorize_url: default_oauth2_authorize_url(),
            callback_url: None,
            request_timeout_seconds: default_request_timeout_seconds(),
        }
    }
}

impl fmt::Debug for SdkConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SdkConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("oauth2_authorize_url", &self.oauth2_authorize_url)
            .field("callback_url", &self.callback_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .finish()
    }
}

impl SdkConfig {
    /// Creates a configuration with the given credentials and default hosts.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Self::default()
        }
    }

    /// Replaces the API base URL (useful for tests and local mocks).
    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    /// Sets the redirect URI used when building authorization URLs.
    pub fn with_callback_url(mut self, callback_url: impl Into<String>) -> Self {
        self.callback_url = Some(callback_url.into());
        self
    }

    /// Load configuration from file with environment overrides
    ///
    /// A missing file is not an error: defaults are used and the
    /// environment is expected to supply the credentials.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] if the file exists but cannot be read
    /// or parsed.
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SdkError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SdkError::Config(format!("Failed to parse config: {}", e)))
    }

    fn apply_env_vars(&mut self) {
        if let Ok(client_id) = std::env::var("BOX_CLIENT_ID") {
            self.client_id = client_id;
        }

        if let Ok(client_secret) = std::env::var("BOX_CLIENT_SECRET") {
            self.client_secret = client_secret;
        }

        if let Ok(api_base_url) = std::env::var("BOX_API_BASE_URL") {
            self.api_base_url = api_base_url;
        }

        if let Ok(authorize_url) = std::env::var("BOX_OAUTH2_AUTHORIZE_URL") {
            self.oauth2_authorize_url = authorize_url;
        }

        if let Ok(callback_url) = std::env::var("BOX_CALLBACK_URL") {
            self.callback_url = Some(callback_url);
        }

        if let Ok(timeout) = std::env::var("BOX_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid BOX_REQUEST_TIMEOUT_SECONDS: {}", timeout);
            }
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] if credentials are missing, a URL is
    /// not an absolute http(s) URL, or the timeout is out of range.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(SdkError::Config("client_id cannot be empty".to_string()));
        }

        if self.client_secret.trim().is_empty() {
            return Err(SdkError::Config("client_secret cannot be empty".to_string()));
        }

        parse_http_url("api_base_url", &self.api_base_url)?;
        parse_http_url("oauth2_authorize_url", &self.oauth2_authorize_url)?;
        if let Some(ref callback_url) = self.callback_url {
            parse_http_url("callback_url", callback_url)?;
        }

        if self.request_timeout_seconds == 0 {
            return Err(SdkError::Config(
                "request_timeout_seconds must be greater than 0".to_string(),
            ));
        }

        if self.request_timeout_seconds > 600 {
            return Err(SdkError::Config(
                "request_timeout_seconds must be less than or equal to 600".to_string(),
            ));
        }

        Ok(())
    }

    /// Builds the absolute URL of an API endpoint from its relative path.
    ///
    /// A base URL without a trailing slash is treated as a directory, so
    /// `https://host/api` + `oauth2/token` gives `https://host/api/oauth2/token`.
    ///
    /// # Errors
    ///
    /// Returns [`SdkError::Config`] if the base URL or the joined URL is
    /// invalid.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let mut base = parse_http_url("api_base_url", &self.api_base_url)?;
        if !base.path().ends_with('/') {
            let dir = format!("{}/", base.path());
            base.set_path(&dir);
        }
        base.join(path.trim_start_matches('/'))
            .map_err(|e| SdkError::Config(format!("Invalid endpoint path {path:?}: {e}")))
    }
}

fn parse_http_url(field: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value)
        .map_err(|e| SdkError::Config(format!("{field} is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SdkError::Config(format!(
            "{field} must use http or https, got {other}"
        ))),
    }
}
