// ABOUTME: Main library entry point for the persona relay
// ABOUTME: Stateless persona chat endpoints that forward single messages to a hosted LLM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

#![deny(unsafe_code)]

//! # Persona Relay
//!
//! An HTTP service exposing persona chat endpoints for a personal website. Each
//! endpoint takes one user message, wraps it in a fixed persona instruction,
//! sends it to the Anthropic Messages API, and returns the reply text as JSON.
//!
//! ## Features
//!
//! - **Built-in personas**: `twin` (a first-person digital twin) and `insight`
//!   (a writing reflection assistant that accepts a context summary)
//! - **Persona files**: additional or replacement personas as markdown with YAML frontmatter
//! - **Stable error contract**: every failure is `{ "error": ..., "details"?: ... }`
//! - **Stateless**: no sessions, history, or storage between requests
//!
//! ## Architecture
//!
//! - **Config**: environment-driven [`config::ServerConfig`]
//! - **LLM**: the [`llm::LlmProvider`] trait and the hosted [`llm::AnthropicProvider`]
//! - **Persona**: [`persona::PersonaRegistry`] of immutable [`persona::PersonaProfile`]s
//! - **Adapter**: [`adapter::PersonaCompletionAdapter`], the one code path every persona shares
//! - **Routes / Server**: axum routers and the tower-http middleware stack
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use persona_relay::config::ServerConfig;
//! use persona_relay::resources::ServerResources;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = Arc::new(ServerResources::from_config(config)?);
//!     persona_relay::server::serve(resources).await
//! }
//! ```

/// Persona completion adapter shared by all persona endpoints
pub mod adapter;

/// Environment-driven configuration
pub mod config;

/// Application constants grouped by domain
pub mod constants;

/// Unified error handling
pub mod errors;

/// Completion service contract and the hosted client
pub mod llm;

/// Structured logging setup
pub mod logging;

/// CORS, request ids, and the panic boundary
pub mod middleware;

/// Persona profiles, parser, and registry
pub mod persona;

/// Shared state for request handlers
pub mod resources;

/// HTTP route handlers
pub mod routes;

/// Router assembly and server lifecycle
pub mod server;
