// ABOUTME: Tests for environment-driven server configuration
// ABOUTME: Covers defaults, overrides, blank credentials, and invalid numeric values
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;
use std::path::PathBuf;

use persona_relay::config::{Environment, ServerConfig};
use serial_test::serial;

const CONFIG_KEYS: &[&str] = &[
    "ANTHROPIC_API_KEY",
    "ANTHROPIC_BASE_URL",
    "ANTHROPIC_API_VERSION",
    "COMPLETION_MODEL",
    "COMPLETION_MAX_TOKENS",
    "COMPLETION_TIMEOUT_SECS",
    "COMPLETION_CONNECT_TIMEOUT_SECS",
    "HTTP_HOST",
    "HTTP_PORT",
    "PERSONA_DIR",
    "CORS_ALLOWED_ORIGINS",
    "MAX_REQUEST_BODY_BYTES",
    "ENVIRONMENT",
];

fn clear_config_env() {
    for key in CONFIG_KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_config_env();

    let config = ServerConfig::from_env().unwrap();

    assert_eq!(config.environment, Environment::Development);
    assert_eq!(config.http.host, "127.0.0.1");
    assert_eq!(config.http.port, 3000);
    assert_eq!(config.http.cors_allowed_origins, vec!["*"]);
    assert_eq!(config.http.max_request_body_bytes, 65_536);
    assert!(config.completion.api_key.is_none());
    assert_eq!(config.completion.base_url, "https://api.anthropic.com");
    assert_eq!(config.completion.api_version, "2023-06-01");
    assert_eq!(config.completion.model, "claude-3-opus-20240229");
    assert_eq!(config.completion.max_tokens, 1000);
    assert!(config.persona_dir.is_none());
    assert!(config.summary().contains("API Key: Missing"));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_config_env();
    env::set_var("ANTHROPIC_API_KEY", "  sk-ant-from-env  ");
    env::set_var("COMPLETION_MODEL", "claude-3-5-sonnet-latest");
    env::set_var("COMPLETION_MAX_TOKENS", "512");
    env::set_var("COMPLETION_TIMEOUT_SECS", "30");
    env::set_var("HTTP_HOST", "0.0.0.0");
    env::set_var("HTTP_PORT", "8088");
    env::set_var("PERSONA_DIR", "/etc/persona-relay/personas");
    env::set_var(
        "CORS_ALLOWED_ORIGINS",
        "https://yili.example.com, http://localhost:5173",
    );
    env::set_var("ENVIRONMENT", "production");

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    assert_eq!(config.environment, Environment::Production);
    assert_eq!(config.completion.api_key.as_deref(), Some("sk-ant-from-env"));
    assert_eq!(config.completion.model, "claude-3-5-sonnet-latest");
    assert_eq!(config.completion.max_tokens, 512);
    assert_eq!(config.completion.timeout_secs, 30);
    assert_eq!(
        config.http.bind_addr().unwrap().to_string(),
        "0.0.0.0:8088"
    );
    assert_eq!(
        config.persona_dir,
        Some(PathBuf::from("/etc/persona-relay/personas"))
    );
    assert_eq!(
        config.http.cors_allowed_origins,
        vec!["https://yili.example.com", "http://localhost:5173"]
    );

    let summary = config.summary();
    assert!(summary.contains("API Key: Configured"));
    assert!(!summary.contains("sk-ant-from-env"));
}

#[test]
#[serial]
fn test_blank_credential_counts_as_missing() {
    clear_config_env();
    env::set_var("ANTHROPIC_API_KEY", "   ");

    let config = ServerConfig::from_env().unwrap();
    clear_config_env();

    assert!(!config.completion.has_api_key());
}

#[test]
#[serial]
fn test_invalid_numbers_are_rejected() {
    clear_config_env();

    env::set_var("HTTP_PORT", "not-a-port");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("HTTP_PORT");

    env::set_var("COMPLETION_MAX_TOKENS", "0");
    assert!(ServerConfig::from_env().is_err());
    env::remove_var("COMPLETION_MAX_TOKENS");

    env::set_var("MAX_REQUEST_BODY_BYTES", "-1");
    assert!(ServerConfig::from_env().is_err());
    clear_config_env();
}

#[test]
fn test_invalid_bind_address() {
    let mut config = ServerConfig::default();
    config.http.host = "not a host".to_owned();
    assert!(config.http.bind_addr().is_err());
}
