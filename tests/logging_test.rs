// ABOUTME: Tests for logging configuration read from the environment
// ABOUTME: Covers output format selection, production detail flags, and filter construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use std::env;

use persona_relay::logging::{LogFormat, LoggingConfig};
use serial_test::serial;

const LOGGING_KEYS: &[&str] = &[
    "RUST_LOG",
    "LOG_FORMAT",
    "ENVIRONMENT",
    "LOG_INCLUDE_LOCATION",
    "LOG_INCLUDE_SPANS",
    "SERVICE_NAME",
    "SERVICE_VERSION",
];

fn clear_logging_env() {
    for key in LOGGING_KEYS {
        env::remove_var(key);
    }
}

#[test]
fn test_log_format_parsing() {
    assert_eq!(LogFormat::from_str_or_default("json"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("JSON"), LogFormat::Json);
    assert_eq!(LogFormat::from_str_or_default("compact"), LogFormat::Compact);
    assert_eq!(LogFormat::from_str_or_default("fancy"), LogFormat::Pretty);
}

#[test]
#[serial]
fn test_development_defaults() {
    clear_logging_env();

    let config = LoggingConfig::from_env();

    assert_eq!(config.level, "info");
    assert_eq!(config.format, LogFormat::Pretty);
    assert!(!config.include_location);
    assert!(!config.include_spans);
    assert_eq!(config.service_name, "persona_relay");
    assert_eq!(config.environment, "development");
}

#[test]
#[serial]
fn test_production_enables_detail() {
    clear_logging_env();
    env::set_var("ENVIRONMENT", "production");
    env::set_var("LOG_FORMAT", "json");
    env::set_var("RUST_LOG", "debug");

    let config = LoggingConfig::from_env();
    clear_logging_env();

    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.level, "debug");
    assert!(config.include_location);
    assert!(config.include_spans);
}

#[test]
#[serial]
fn test_filter_keeps_configured_level() {
    clear_logging_env();
    env::set_var("RUST_LOG", "warn");

    let config = LoggingConfig::from_env();
    clear_logging_env();

    let filter = config.env_filter().to_string();
    assert!(filter.contains("persona_relay=warn"));
    assert!(filter.contains("reqwest=warn"));
}
