// ABOUTME: Configuration module root for the persona relay
// ABOUTME: Re-exports the environment-driven server configuration
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

/// Environment-based server configuration
pub mod environment;

pub use environment::{CompletionConfig, Environment, HttpConfig, ServerConfig};
