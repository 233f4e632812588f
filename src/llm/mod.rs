// ABOUTME: Completion service abstraction for the hosted LLM behind the persona endpoints
// ABOUTME: Defines the provider contract plus request, response, and content segment types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # LLM Provider Interface
//!
//! The persona adapter talks to the completion service only through the
//! [`LlmProvider`] trait, so tests can substitute an in-process provider and the
//! hosted client stays swappable.
//!
//! ## Key Concepts
//!
//! - **`LlmProvider`**: async trait performing one non-streaming completion
//! - **`ChatRequest`**: system instruction, user turns, model, and token ceiling
//! - **`ChatResponse`**: ordered list of typed [`ContentSegment`]s
//!
//! ## Example: Using a Provider
//!
//! ```rust,no_run
//! use persona_relay::llm::{ChatMessage, ChatRequest, LlmProvider};
//!
//! async fn example(provider: &dyn LlmProvider) {
//!     let request = ChatRequest::new(vec![ChatMessage::user("What are you working on?")])
//!         .with_system("You are a thoughtful writing companion.")
//!         .with_max_tokens(1000);
//!     let response = provider.complete(&request).await;
//! }
//! ```

mod anthropic;

pub use anthropic::AnthropicProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppResult;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System instruction sent alongside the conversation
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific)
    pub model: Option<String>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            system: None,
            messages,
            model: None,
            max_tokens: None,
        }
    }

    /// Set the system instruction
    #[must_use]
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set the maximum tokens
    #[must_use]
    pub const fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// One piece of generated content, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentSegment {
    /// Plain generated text
    Text {
        /// Generated text
        text: String,
    },
    /// The model asked to invoke a tool
    ToolUse {
        /// Tool invocation id
        id: String,
        /// Tool name
        name: String,
        /// Tool arguments
        #[serde(default)]
        input: serde_json::Value,
    },
    /// Any segment type this crate does not model
    #[serde(other)]
    Unknown,
}

impl ContentSegment {
    /// Convenience constructor for a text segment
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Response from a chat completion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Provider message id
    pub id: Option<String>,
    /// Model used for generation
    pub model: String,
    /// Generated content, in the order the provider returned it
    pub content: Vec<ContentSegment>,
    /// Why generation stopped (`end_turn`, `max_tokens`, `tool_use`, ...)
    pub stop_reason: Option<String>,
    /// Token usage statistics
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    /// Tokens in the prompt
    pub input_tokens: u32,
    /// Tokens generated
    pub output_tokens: u32,
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion
///
/// Implementations must be shareable across request tasks; the server holds a
/// single instance behind an `Arc`.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "anthropic")
    fn name(&self) -> &'static str;

    /// Human-readable display name for the provider
    fn display_name(&self) -> &'static str;

    /// Default model to use if not specified in request
    fn default_model(&self) -> &str;

    /// Perform a chat completion (non-streaming)
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse>;

    /// Check if the provider is usable
    async fn health_check(&self) -> AppResult<bool>;
}
