// ABOUTME: Shared server resources handed to every route as axum state
// ABOUTME: Bundles configuration, the persona registry, and the completion adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use std::sync::Arc;

use tracing::info;

use crate::adapter::PersonaCompletionAdapter;
use crate::config::ServerConfig;
use crate::errors::AppResult;
use crate::llm::{AnthropicProvider, LlmProvider};
use crate::persona::PersonaRegistry;

/// Read-only state shared by all request handlers
///
/// Built once at startup and wrapped in an `Arc`; nothing in it changes while
/// the server runs.
pub struct ServerResources {
    /// Startup configuration
    pub config: ServerConfig,
    /// Personas addressable by slug
    pub personas: PersonaRegistry,
    /// Completion adapter shared by every persona
    pub adapter: PersonaCompletionAdapter,
}

impl ServerResources {
    /// Assemble resources around an existing provider
    #[must_use]
    pub fn new(
        config: ServerConfig,
        personas: PersonaRegistry,
        provider: Arc<dyn LlmProvider>,
    ) -> Self {
        let adapter = PersonaCompletionAdapter::new(provider, &config.completion);
        Self {
            config,
            personas,
            adapter,
        }
    }

    /// Build the hosted provider and persona registry described by `config`
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or a persona file is invalid
    pub fn from_config(config: ServerConfig) -> AppResult<Self> {
        let personas = match &config.persona_dir {
            Some(dir) => PersonaRegistry::load_dir(dir)?,
            None => PersonaRegistry::builtin()?,
        };
        info!(
            "Personas available: {}",
            personas
                .list()
                .iter()
                .map(|p| p.slug.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let provider: Arc<dyn LlmProvider> = Arc::new(AnthropicProvider::new(&config.completion)?);
        Ok(Self::new(config, personas, provider))
    }
}
