// ABOUTME: Anthropic Messages API provider implementation
// ABOUTME: Sends one system instruction plus user turn and decodes the typed content segments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # Anthropic Provider
//!
//! Implementation of the `LlmProvider` trait for the hosted Messages API.
//!
//! ## Configuration
//!
//! The credential, base URL, API version, default model, and timeouts all come
//! from [`CompletionConfig`]. A provider built without a credential still
//! constructs; [`LlmProvider::complete`] then fails with `ConfigMissing`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, instrument};

use super::{ChatMessage, ChatRequest, ChatResponse, ContentSegment, LlmProvider, TokenUsage};
use crate::config::CompletionConfig;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Service label used in error messages
const SERVICE: &str = "Anthropic";

/// Messages endpoint path
const MESSAGES_PATH: &str = "v1/messages";

/// Characters of an unparseable error body kept in the error message
const ERROR_BODY_PREVIEW_CHARS: usize = 200;

// ============================================================================
// API Request/Response Types
// ============================================================================

/// Messages API request body
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    messages: Vec<ApiMessage<'a>>,
}

/// Message structure for the Messages API
#[derive(Debug, Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> From<&'a ChatMessage> for ApiMessage<'a> {
    fn from(msg: &'a ChatMessage) -> Self {
        Self {
            role: msg.role.as_str(),
            content: &msg.content,
        }
    }
}

/// Messages API response body
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    content: Vec<Value>,
    #[serde(default)]
    stop_reason: Option<String>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// Usage statistics in the response
#[derive(Debug, Deserialize)]
struct ApiUsage {
    input_tokens: u32,
    output_tokens: u32,
}

/// Decode one content block, degrading to `Unknown` when its fields do not match its type
fn decode_segment(raw: Value) -> ContentSegment {
    serde_json::from_value(raw).unwrap_or_else(|e| {
        debug!("Unrecognized content block from {}: {}", SERVICE, e);
        ContentSegment::Unknown
    })
}

/// Messages API error envelope
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail structure
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

// ============================================================================
// Provider Implementation
// ============================================================================

/// Client for the hosted Messages API
///
/// Holds one pooled `reqwest::Client`; clone-free sharing happens through the
/// `Arc<dyn LlmProvider>` the server keeps.
pub struct AnthropicProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    api_version: String,
    default_model: String,
}

impl AnthropicProvider {
    /// Create a provider from completion settings
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the HTTP client cannot be built
    pub fn new(config: &CompletionConfig) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| {
                AppError::new(
                    ErrorCode::ConfigInvalid,
                    format!("Failed to build HTTP client: {e}"),
                )
                .with_source(e)
            })?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_version: config.api_version.clone(),
            default_model: config.model.clone(),
        })
    }

    /// Build the API URL for a given endpoint
    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{endpoint}", self.base_url)
    }

    /// Parse error response from the Messages API
    fn parse_error_response(status: StatusCode, body: &str) -> AppError {
        let message = serde_json::from_str::<ApiErrorResponse>(body).map_or_else(
            |_| {
                format!(
                    "API error ({status}): {}",
                    body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect::<String>()
                )
            },
            |parsed| {
                let error_type = parsed.error.error_type.as_deref().unwrap_or("unknown");
                format!("{error_type} - {}", parsed.error.message)
            },
        );

        match status.as_u16() {
            401 | 403 => AppError::new(
                ErrorCode::ExternalAuthFailed,
                format!("{SERVICE} authentication failed: {message}"),
            ),
            429 => AppError::new(
                ErrorCode::ExternalRateLimited,
                format!("{SERVICE} rate limit exceeded: {message}"),
            ),
            _ => AppError::external_service(SERVICE, message),
        }
    }
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    fn display_name(&self) -> &'static str {
        service_names::ANTHROPIC_DISPLAY_NAME
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    #[instrument(skip(self, request), fields(model = %request.model.as_deref().unwrap_or(&self.default_model)))]
    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            AppError::config_missing(format!("{SERVICE} API key not configured"))
        })?;
        let model = request.model.as_deref().unwrap_or(&self.default_model);

        debug!("Sending messages request to {}", SERVICE);

        let body = MessagesRequest {
            model,
            max_tokens: request
                .max_tokens
                .unwrap_or(crate::constants::defaults::COMPLETION_MAX_TOKENS),
            system: request.system.as_deref(),
            messages: request.messages.iter().map(ApiMessage::from).collect(),
        };

        let response = self
            .client
            .post(self.api_url(MESSAGES_PATH))
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.api_version)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Failed to send request to {} API: {}", SERVICE, e);
                AppError::new(
                    ErrorCode::ExternalServiceUnavailable,
                    format!("{SERVICE}: Failed to connect: {e}"),
                )
                .with_source(e)
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            error!("Failed to read {} API response: {}", SERVICE, e);
            AppError::new(
                ErrorCode::ExternalServiceUnavailable,
                format!("{SERVICE}: Failed to read response: {e}"),
            )
            .with_source(e)
        })?;

        if !status.is_success() {
            return Err(Self::parse_error_response(status, &text));
        }

        let parsed: MessagesResponse = serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse {} API response: {}", SERVICE, e);
            AppError::external_service(SERVICE, format!("Failed to parse response: {e}"))
        })?;

        debug!(
            "Received response from {}: {} segments, stop_reason: {:?}",
            SERVICE,
            parsed.content.len(),
            parsed.stop_reason
        );

        Ok(ChatResponse {
            id: parsed.id,
            model: parsed.model.unwrap_or_else(|| model.to_owned()),
            content: parsed.content.into_iter().map(decode_segment).collect(),
            stop_reason: parsed.stop_reason,
            usage: parsed.usage.map(|u| TokenUsage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        })
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self.api_key.is_some())
    }
}
