//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`OidcConfig`](tourdesk_platform_access::OidcConfig) for identity
//! provider configuration and
//! [`SignInPolicy`](tourdesk_platform_access::SignInPolicy) for admission
//! rules.

use serde::Deserialize;
use std::time::Duration;
use tourdesk_platform_access::{OidcConfig, SignInPolicy};

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// External user API configuration.
    #[serde(default)]
    pub api: ApiConfig,

    /// Session configuration.
    pub session: SessionConfig,

    /// OIDC authentication configuration.
    pub oidc: OidcConfig,

    /// Sign-in admission policy.
    #[serde(default)]
    pub access: SignInPolicy,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// External user API configuration.
#[derive(Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the external API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Key sent in the `X-API-Key` header.
    #[serde(default)]
    pub api_key: String,

    /// Path of the user-status (sign-in check) endpoint.
    #[serde(default = "default_auth_check_path")]
    pub auth_check_path: String,

    /// Path of the current-user profile endpoint.
    #[serde(default = "default_profile_path")]
    pub profile_path: String,

    /// Request timeout in seconds. Bounds how long a slow API can hold up a
    /// navigation.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Provider name reported to the user-status endpoint.
    #[serde(default = "default_provider")]
    pub provider: String,
}

fn default_base_url() -> String {
    "http://localhost:4000".to_string()
}

fn default_auth_check_path() -> String {
    "/api/internal/users/auth".to_string()
}

fn default_profile_path() -> String {
    "/api/internal/users/me".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

fn default_provider() -> String {
    "google".to_string()
}

impl ApiConfig {
    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: String::new(),
            auth_check_path: default_auth_check_path(),
            profile_path: default_profile_path(),
            timeout_seconds: default_timeout_seconds(),
            provider: default_provider(),
        }
    }
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("auth_check_path", &self.auth_check_path)
            .field("profile_path", &self.profile_path)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("provider", &self.provider)
            .finish()
    }
}

/// Session-related configuration.
#[derive(Clone, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret used to sign session tokens.
    pub signing_secret: String,

    /// Session token lifetime in minutes. Renewed on every request.
    #[serde(default = "default_session_duration_minutes")]
    pub duration_minutes: i64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,

    /// Seconds before the pending-notice page signs the user out.
    #[serde(default = "default_pending_sign_out_seconds")]
    pub pending_sign_out_seconds: u64,
}

fn default_session_duration_minutes() -> i64 {
    60 * 24 * 30
}

fn default_secure_cookies() -> bool {
    true
}

fn default_pending_sign_out_seconds() -> u64 {
    10
}

impl SessionConfig {
    /// Creates a session configuration with defaults for optional fields.
    #[must_use]
    pub fn new(signing_secret: impl Into<String>) -> Self {
        Self {
            signing_secret: signing_secret.into(),
            duration_minutes: default_session_duration_minutes(),
            secure_cookies: default_secure_cookies(),
            pending_sign_out_seconds: default_pending_sign_out_seconds(),
        }
    }

    /// Returns the token lifetime.
    #[must_use]
    pub fn lifetime(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.duration_minutes)
    }
}

impl std::fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionConfig")
            .field("signing_secret", &"[REDACTED]")
            .field("duration_minutes", &self.duration_minutes)
            .field("secure_cookies", &self.secure_cookies)
            .field("pending_sign_out_seconds", &self.pending_sign_out_seconds)
            .finish()
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// Nested fields use `__` as separator, e.g. `SESSION__SIGNING_SECRET`,
    /// `API__BASE_URL`, `ACCESS__ALLOWED_DOMAINS`.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
