// ABOUTME: Persona completion adapter shared by every persona chat endpoint
// ABOUTME: Validates the message, builds the persona prompt, calls the provider, normalizes the reply
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # Persona Completion Adapter
//!
//! One parameterized adapter serves every persona. A request moves through a
//! fixed sequence: message validation, credential check, prompt construction,
//! a single downstream call, and normalization of the first content segment.
//! Each request is independent; nothing is remembered between calls.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument};

use crate::config::CompletionConfig;
use crate::constants::{error_messages, prompt, reply_placeholders};
use crate::errors::{AppError, AppResult, ErrorCode};
use crate::llm::{ChatMessage, ChatRequest, ContentSegment, LlmProvider};
use crate::persona::PersonaProfile;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Lenient view of the writer's recent-activity summary
///
/// The request carries the summary as free-form JSON. Only the three known
/// keys are read, and only when they hold arrays; anything else is skipped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSummary {
    /// Frequent keywords, most prominent first
    pub top_keywords: Option<Vec<Value>>,
    /// Emotional trend values
    pub emotional_trends: Option<Vec<Value>>,
    /// Clarity trend values
    pub clarity_trends: Option<Vec<Value>>,
}

impl ContextSummary {
    /// Read the known array fields out of an arbitrary JSON value
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let array = |key: &str| value.get(key).and_then(Value::as_array).cloned();
        Self {
            top_keywords: array("topKeywords"),
            emotional_trends: array("emotionalTrends"),
            clarity_trends: array("clarityTrends"),
        }
    }
}

/// Body of a persona chat request
///
/// Unknown fields are ignored. `context` is kept as raw JSON and interpreted
/// only by personas that accept it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The user's message
    #[serde(default)]
    pub message: Option<String>,
    /// Context summary, consulted only by personas that accept it
    #[serde(default)]
    pub context: Option<Value>,
}

impl CompletionRequest {
    /// Request with only a message
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            context: None,
        }
    }

    /// Attach a context summary
    #[must_use]
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = Some(context);
        self
    }

    /// The message if present and not blank
    ///
    /// # Errors
    ///
    /// Returns `MissingRequiredField` when the message is absent, empty, or whitespace-only
    pub fn validated_message(&self) -> AppResult<&str> {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
            .ok_or_else(|| AppError::missing_field(error_messages::MESSAGE_REQUIRED))
    }
}

/// Successful persona reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Text of the first content segment, or a fixed placeholder
    pub response: String,
}

// ============================================================================
// Adapter
// ============================================================================

/// Adapter from persona chat requests to the completion provider
pub struct PersonaCompletionAdapter {
    provider: Arc<dyn LlmProvider>,
    model: String,
    max_tokens: u32,
    credential_configured: bool,
}

impl PersonaCompletionAdapter {
    /// Create an adapter over `provider` using the model, token ceiling, and
    /// credential presence from `config`
    #[must_use]
    pub fn new(provider: Arc<dyn LlmProvider>, config: &CompletionConfig) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            credential_configured: config.has_api_key(),
        }
    }

    /// Provider behind this adapter
    #[must_use]
    pub fn provider(&self) -> &dyn LlmProvider {
        self.provider.as_ref()
    }

    /// Whether a completion credential is configured
    #[must_use]
    pub const fn credential_configured(&self) -> bool {
        self.credential_configured
    }

    /// Produce a persona reply for one request
    ///
    /// # Errors
    ///
    /// - `MissingRequiredField` ("Message is required") for a blank message, before any call
    /// - `ConfigMissing` ("API key not configured") without a credential, before any call
    /// - `ExternalServiceError` ("Error calling AI service") when the provider call fails,
    ///   with the provider's message as details
    #[instrument(skip_all, fields(persona = %persona.slug))]
    pub async fn complete(
        &self,
        request: &CompletionRequest,
        persona: &PersonaProfile,
    ) -> AppResult<CompletionResponse> {
        let message = request.validated_message()?;

        if !self.credential_configured {
            error!("Completion API key is not set in the environment");
            return Err(AppError::config_missing(
                error_messages::API_KEY_NOT_CONFIGURED,
            ));
        }

        let system = build_system_prompt(persona, request.context.as_ref());
        let chat_request = ChatRequest::new(vec![ChatMessage::user(message)])
            .with_system(system)
            .with_model(self.model.as_str())
            .with_max_tokens(self.max_tokens);

        let preview = message_preview(message);
        info!(
            model = %self.model,
            message_preview = %preview,
            "Calling {} for {} with message: {}...",
            self.provider.display_name(),
            persona.title,
            preview
        );

        let reply = self.provider.complete(&chat_request).await.map_err(|e| {
            error!(code = ?e.code, "Error in completion call: {}", e.message);
            AppError::new(ErrorCode::ExternalServiceError, error_messages::AI_SERVICE_ERROR)
                .with_details(e.message.clone())
                .with_source(e)
        })?;

        info!(
            segments = reply.content.len(),
            stop_reason = reply.stop_reason.as_deref().unwrap_or(""),
            "Received response from {} for {}",
            self.provider.display_name(),
            persona.title
        );

        Ok(CompletionResponse {
            response: normalize_content(&reply.content),
        })
    }
}

// ============================================================================
// Prompt Construction
// ============================================================================

/// Assemble the system instruction for `persona`
///
/// The context block is appended only when the persona accepts context and the
/// request carried a non-empty one (`null`, `false`, `0` and `""` count as
/// absent). Each trend line appears only for a present, non-empty array. The
/// result is trimmed.
#[must_use]
pub fn build_system_prompt(persona: &PersonaProfile, context: Option<&Value>) -> String {
    let mut system = persona.instructions.clone();

    if let Some(context) = context.filter(|c| persona.accepts_context && context_supplied(c)) {
        let summary = ContextSummary::from_value(context);

        system.push_str("\n\n");
        system.push_str(persona.context_heading());

        push_context_line(&mut system, prompt::TOP_KEYWORDS_LABEL, summary.top_keywords.as_deref());
        push_context_line(
            &mut system,
            prompt::EMOTIONAL_TRENDS_LABEL,
            summary.emotional_trends.as_deref(),
        );
        push_context_line(
            &mut system,
            prompt::CLARITY_TRENDS_LABEL,
            summary.clarity_trends.as_deref(),
        );

        system.push_str("\n\n");
        system.push_str(persona.context_closing());
    }

    system.trim().to_owned()
}

/// Whether a context value counts as supplied
fn context_supplied(context: &Value) -> bool {
    match context {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Append `"\n- <label>: a, b, c"` when `values` is present and non-empty
fn push_context_line(system: &mut String, label: &str, values: Option<&[Value]>) {
    let Some(values) = values.filter(|values| !values.is_empty()) else {
        return;
    };
    let joined = values.iter().map(render_value).collect::<Vec<_>>().join(", ");
    system.push_str(&format!("\n- {label}: {joined}"));
}

/// Text of one context element: strings as-is, numbers in shortest form,
/// `null` as empty, nested arrays comma-joined
fn render_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(n) => render_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(render_value).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_owned(),
    }
}

/// Largest integer every `f64` represents exactly
const MAX_EXACT_INTEGER: u64 = 1 << 53;

/// Shortest round-trip decimal text of a number
///
/// Plain notation between `1e-7` and `1e21`, exponent notation (`1e+21`,
/// `1.5e-7`) outside it. Integral values carry no fractional part.
fn render_number(number: &serde_json::Number) -> String {
    if let Some(n) = number.as_u64().filter(|n| *n <= MAX_EXACT_INTEGER) {
        return n.to_string();
    }
    if let Some(n) = number.as_i64().filter(|n| n.unsigned_abs() <= MAX_EXACT_INTEGER) {
        return n.to_string();
    }
    number.as_f64().map_or_else(|| number.to_string(), render_f64)
}

/// Shortest decimal text of a finite `f64`
fn render_f64(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    let sign = if value < 0.0 { "-" } else { "" };

    // `{:e}` yields the shortest round-trip digits, e.g. `1.2345e2`
    let scientific = format!("{:e}", value.abs());
    let (mantissa, exponent) = scientific.split_once('e').unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let exponent: i32 = exponent.parse().unwrap_or(0);

    // Position of the decimal point relative to the start of `digits`
    let point = exponent + 1;
    let len = i32::try_from(digits.len()).unwrap_or(i32::MAX);

    let body = if len <= point && point <= 21 {
        let zeros = usize::try_from(point - len).unwrap_or(0);
        format!("{digits}{}", "0".repeat(zeros))
    } else if 0 < point && point <= 21 {
        let split = usize::try_from(point).unwrap_or(0);
        format!("{}.{}", &digits[..split], &digits[split..])
    } else if -6 < point && point <= 0 {
        let zeros = usize::try_from(-point).unwrap_or(0);
        format!("0.{}{digits}", "0".repeat(zeros))
    } else {
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{exp_sign}{}", exponent.abs())
        } else {
            format!("{lead}.{rest}e{exp_sign}{}", exponent.abs())
        }
    };

    format!("{sign}{body}")
}

/// First characters of the message for diagnostic logs
fn message_preview(message: &str) -> String {
    message.chars().take(prompt::LOG_PREVIEW_CHARS).collect()
}

// ============================================================================
// Reply Normalization
// ============================================================================

/// Reduce the provider's segments to reply text using only the first segment
#[must_use]
pub fn normalize_content(content: &[ContentSegment]) -> String {
    match content.first() {
        None => String::new(),
        Some(ContentSegment::Text { text }) => text.clone(),
        Some(ContentSegment::ToolUse { .. }) => reply_placeholders::TOOL_USE.to_owned(),
        Some(ContentSegment::Unknown) => reply_placeholders::UNSUPPORTED.to_owned(),
    }
}
