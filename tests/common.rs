// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides a scripted mock LLM provider and server resource builders
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors
#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
//! Shared test utilities for `persona_relay`

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use persona_relay::{
    config::ServerConfig,
    errors::{AppError, AppResult, ErrorCode},
    llm::{ChatRequest, ChatResponse, ContentSegment, LlmProvider},
    persona::PersonaRegistry,
    resources::ServerResources,
    server::build_router,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        let _ = tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .try_init();
    });
}

/// What the mock provider answers with
#[derive(Clone)]
pub enum MockReply {
    /// Successful completion with these segments
    Segments(Vec<ContentSegment>),
    /// Failed completion
    Failure(ErrorCode, String),
    /// Panic inside the provider call
    Panic,
}

/// In-process `LlmProvider` that records calls and returns a scripted reply
pub struct MockProvider {
    reply: MockReply,
    calls: AtomicUsize,
    last_request: Mutex<Option<ChatRequest>>,
}

impl MockProvider {
    /// Provider that answers every call with `reply`
    pub fn new(reply: MockReply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    /// Provider replying with one text segment
    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(MockReply::Segments(vec![ContentSegment::text(text)]))
    }

    /// Provider failing with an external service error
    pub fn failing(message: &str) -> Arc<Self> {
        Self::new(MockReply::Failure(
            ErrorCode::ExternalServiceError,
            message.to_owned(),
        ))
    }

    /// Number of completion calls made
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most recent request sent to the provider
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.last_request.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn display_name(&self) -> &'static str {
        "Mock Provider"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());

        match &self.reply {
            MockReply::Segments(content) => Ok(ChatResponse {
                id: Some("msg_mock".to_owned()),
                model: request.model.clone().unwrap_or_default(),
                content: content.clone(),
                stop_reason: Some("end_turn".to_owned()),
                usage: None,
            }),
            MockReply::Failure(code, message) => Err(AppError::new(*code, message.clone())),
            MockReply::Panic => panic!("mock provider exploded"),
        }
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}

/// Configuration with a credential present and defaults elsewhere
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.completion.api_key = Some("sk-ant-test".to_owned());
    config
}

/// Shared resources around `provider` using the built-in personas
pub fn create_test_resources(
    config: ServerConfig,
    provider: Arc<MockProvider>,
) -> Arc<ServerResources> {
    init_test_logging();
    let personas = PersonaRegistry::builtin().expect("built-in personas parse");
    Arc::new(ServerResources::new(config, personas, provider))
}

/// Full application router (with middleware) around `provider`
pub fn create_test_router(provider: Arc<MockProvider>) -> axum::Router {
    build_router(create_test_resources(test_config(), provider))
}
