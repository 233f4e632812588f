// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Reads the completion credential, HTTP binding, and persona overrides at startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! Environment-based configuration management
//!
//! [`ServerConfig::from_env`] is called once at startup and the result is shared
//! read-only for the lifetime of the process. A missing completion credential is
//! not a startup failure: each chat request reports it instead.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::constants::{defaults, env_keys};

/// Environment type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed service
    Production,
    /// Test runs
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Settings for the hosted completion service
#[derive(Clone)]
pub struct CompletionConfig {
    /// Credential; `None` when unset or blank
    pub api_key: Option<String>,
    /// Base URL of the Messages API
    pub base_url: String,
    /// `anthropic-version` header value
    pub api_version: String,
    /// Model identifier
    pub model: String,
    /// Output token ceiling
    pub max_tokens: u32,
    /// Whole-request timeout
    pub timeout_secs: u64,
    /// Connect timeout
    pub connect_timeout_secs: u64,
}

impl CompletionConfig {
    /// Whether a usable credential is configured
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Request timeout as a [`Duration`]
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Connect timeout as a [`Duration`]
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::ANTHROPIC_BASE_URL.to_owned(),
            api_version: defaults::ANTHROPIC_API_VERSION.to_owned(),
            model: defaults::COMPLETION_MODEL.to_owned(),
            max_tokens: defaults::COMPLETION_MAX_TOKENS,
            timeout_secs: defaults::COMPLETION_TIMEOUT_SECS,
            connect_timeout_secs: defaults::COMPLETION_CONNECT_TIMEOUT_SECS,
        }
    }
}

// Never print the credential itself
impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .field("connect_timeout_secs", &self.connect_timeout_secs)
            .finish()
    }
}

/// HTTP listener settings
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Allowed CORS origins; `["*"]` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Request body ceiling in bytes
    pub max_request_body_bytes: usize,
}

impl HttpConfig {
    /// Socket address to bind
    ///
    /// # Errors
    ///
    /// Returns an error if host and port do not form a valid socket address
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid bind address {}:{}", self.host, self.port))
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: defaults::HTTP_HOST.to_owned(),
            port: defaults::HTTP_PORT,
            cors_allowed_origins: parse_origins(defaults::CORS_ALLOWED_ORIGINS),
            max_request_body_bytes: defaults::MAX_REQUEST_BODY_BYTES,
        }
    }
}

/// Main server configuration
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
    /// Deployment environment
    pub environment: Environment,
    /// HTTP listener settings
    pub http: HttpConfig,
    /// Completion service settings
    pub completion: CompletionConfig,
    /// Optional directory of persona markdown overrides
    pub persona_dir: Option<PathBuf>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or validation fails
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        if let Err(e) = dotenvy::dotenv() {
            warn!("No .env file found or failed to load: {}", e);
        }

        let config = Self {
            environment: Environment::from_str_or_default(&env_var_or(
                env_keys::ENVIRONMENT,
                "development",
            )),
            http: HttpConfig {
                host: env_var_or(env_keys::HTTP_HOST, defaults::HTTP_HOST),
                port: parse_env(env_keys::HTTP_PORT, defaults::HTTP_PORT)?,
                cors_allowed_origins: parse_origins(&env_var_or(
                    env_keys::CORS_ALLOWED_ORIGINS,
                    defaults::CORS_ALLOWED_ORIGINS,
                )),
                max_request_body_bytes: parse_env(
                    env_keys::MAX_REQUEST_BODY_BYTES,
                    defaults::MAX_REQUEST_BODY_BYTES,
                )?,
            },
            completion: CompletionConfig {
                api_key: non_blank_env(env_keys::ANTHROPIC_API_KEY),
                base_url: env_var_or(env_keys::ANTHROPIC_BASE_URL, defaults::ANTHROPIC_BASE_URL),
                api_version: env_var_or(
                    env_keys::ANTHROPIC_API_VERSION,
                    defaults::ANTHROPIC_API_VERSION,
                ),
                model: env_var_or(env_keys::COMPLETION_MODEL, defaults::COMPLETION_MODEL),
                max_tokens: parse_env(
                    env_keys::COMPLETION_MAX_TOKENS,
                    defaults::COMPLETION_MAX_TOKENS,
                )?,
                timeout_secs: parse_env(
                    env_keys::COMPLETION_TIMEOUT_SECS,
                    defaults::COMPLETION_TIMEOUT_SECS,
                )?,
                connect_timeout_secs: parse_env(
                    env_keys::COMPLETION_CONNECT_TIMEOUT_SECS,
                    defaults::COMPLETION_CONNECT_TIMEOUT_SECS,
                )?,
            },
            persona_dir: non_blank_env(env_keys::PERSONA_DIR).map(PathBuf::from),
        };

        config.validate()?;
        info!("Configuration loaded successfully");
        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error for zero timeouts, a zero token ceiling, a zero body limit,
    /// or an empty model identifier
    pub fn validate(&self) -> Result<()> {
        if self.completion.max_tokens == 0 {
            return Err(anyhow::anyhow!(
                "{} must be greater than zero",
                env_keys::COMPLETION_MAX_TOKENS
            ));
        }
        if self.completion.timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "{} must be greater than zero",
                env_keys::COMPLETION_TIMEOUT_SECS
            ));
        }
        if self.completion.connect_timeout_secs == 0 {
            return Err(anyhow::anyhow!(
                "{} must be greater than zero",
                env_keys::COMPLETION_CONNECT_TIMEOUT_SECS
            ));
        }
        if self.completion.model.trim().is_empty() {
            return Err(anyhow::anyhow!(
                "{} must not be empty",
                env_keys::COMPLETION_MODEL
            ));
        }
        if self.http.max_request_body_bytes == 0 {
            return Err(anyhow::anyhow!(
                "{} must be greater than zero",
                env_keys::MAX_REQUEST_BODY_BYTES
            ));
        }

        if !self.completion.has_api_key() {
            warn!(
                "{} is not set; chat requests will fail until it is configured",
                env_keys::ANTHROPIC_API_KEY
            );
        }

        Ok(())
    }

    /// Get a summary of the configuration for logging (without secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Persona Relay Configuration:\n\
             - Environment: {}\n\
             - HTTP: {}:{}\n\
             - Completion API: {}\n\
             - API Version: {}\n\
             - Model: {}\n\
             - Max Tokens: {}\n\
             - Timeout: {}s (connect {}s)\n\
             - API Key: {}\n\
             - Persona Directory: {}\n\
             - CORS Origins: {}\n\
             - Max Body: {} bytes",
            self.environment,
            self.http.host,
            self.http.port,
            self.completion.base_url,
            self.completion.api_version,
            self.completion.model,
            self.completion.max_tokens,
            self.completion.timeout_secs,
            self.completion.connect_timeout_secs,
            if self.completion.has_api_key() {
                "Configured"
            } else {
                "Missing"
            },
            self.persona_dir
                .as_ref()
                .map_or_else(|| "built-in only".to_owned(), |p| p.display().to_string()),
            self.http.cors_allowed_origins.join(", "),
            self.http.max_request_body_bytes,
        )
    }
}

/// Get environment variable or default value
fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Environment variable with surrounding whitespace removed, `None` when unset or blank
fn non_blank_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse a numeric environment variable, falling back to `default` when unset
fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key} value: {raw}")),
        Err(_) => Ok(default),
    }
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
