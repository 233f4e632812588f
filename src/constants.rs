// ABOUTME: Application constants grouped by domain: environment keys, defaults, labels
// ABOUTME: Single home for the fixed strings the HTTP contract and persona prompts rely on
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! Constants module
//!
//! Constants are grouped into small domain modules rather than kept loose at the crate root.

/// Environment variable names read at startup
pub mod env_keys {
    /// Completion service credential
    pub const ANTHROPIC_API_KEY: &str = "ANTHROPIC_API_KEY";
    /// Completion service base URL
    pub const ANTHROPIC_BASE_URL: &str = "ANTHROPIC_BASE_URL";
    /// Value of the `anthropic-version` header
    pub const ANTHROPIC_API_VERSION: &str = "ANTHROPIC_API_VERSION";
    /// Model identifier sent with every completion
    pub const COMPLETION_MODEL: &str = "COMPLETION_MODEL";
    /// Output token ceiling sent with every completion
    pub const COMPLETION_MAX_TOKENS: &str = "COMPLETION_MAX_TOKENS";
    /// Whole-request timeout for the completion call
    pub const COMPLETION_TIMEOUT_SECS: &str = "COMPLETION_TIMEOUT_SECS";
    /// Connect timeout for the completion call
    pub const COMPLETION_CONNECT_TIMEOUT_SECS: &str = "COMPLETION_CONNECT_TIMEOUT_SECS";
    /// Bind host
    pub const HTTP_HOST: &str = "HTTP_HOST";
    /// Bind port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Optional directory of persona markdown files
    pub const PERSONA_DIR: &str = "PERSONA_DIR";
    /// Comma-separated list of allowed CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Request body ceiling in bytes
    pub const MAX_REQUEST_BODY_BYTES: &str = "MAX_REQUEST_BODY_BYTES";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
}

/// Default configuration values
pub mod defaults {
    /// Hosted Messages API
    pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
    /// Messages API version header value
    pub const ANTHROPIC_API_VERSION: &str = "2023-06-01";
    /// Model used for persona completions
    pub const COMPLETION_MODEL: &str = "claude-3-opus-20240229";
    /// Output token ceiling
    pub const COMPLETION_MAX_TOKENS: u32 = 1000;
    /// Request timeout in seconds
    pub const COMPLETION_TIMEOUT_SECS: u64 = 60;
    /// Connect timeout in seconds
    pub const COMPLETION_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Bind host
    pub const HTTP_HOST: &str = "127.0.0.1";
    /// Bind port
    pub const HTTP_PORT: u16 = 3000;
    /// Allow every origin
    pub const CORS_ALLOWED_ORIGINS: &str = "*";
    /// 64 KiB
    pub const MAX_REQUEST_BODY_BYTES: usize = 65_536;
}

/// Service identity used in logs and health responses
pub mod service_names {
    /// Service name for structured logging
    pub const PERSONA_RELAY: &str = "persona_relay";
    /// Display name of the completion provider
    pub const ANTHROPIC_DISPLAY_NAME: &str = "Anthropic Claude";
}

/// Error labels returned in the `error` field of failure responses
pub mod error_messages {
    /// Message absent, empty, or whitespace-only
    pub const MESSAGE_REQUIRED: &str = "Message is required";
    /// No completion credential configured
    pub const API_KEY_NOT_CONFIGURED: &str = "API key not configured";
    /// Completion service call failed
    pub const AI_SERVICE_ERROR: &str = "Error calling AI service";
    /// Outer failure boundary
    pub const REQUEST_PROCESSING_FAILED: &str = "Failed to process your request";
    /// Unknown persona slug
    pub const PERSONA: &str = "Persona";
}

/// Placeholder replies for first segments that carry no text
pub mod reply_placeholders {
    /// First segment was a tool invocation
    pub const TOOL_USE: &str = "Tool use response received";
    /// First segment had an unrecognized type
    pub const UNSUPPORTED: &str = "Received response in an unsupported format";
}

/// Context block wording and limits
pub mod prompt {
    /// Heading used when a persona does not define its own
    pub const DEFAULT_CONTEXT_HEADING: &str = "Context about recent writing:";
    /// Closing instruction used when a persona does not define its own
    pub const DEFAULT_CONTEXT_CLOSING: &str =
        "Use this information to personalize your analysis.";
    /// Label for the keyword line
    pub const TOP_KEYWORDS_LABEL: &str = "Top Keywords";
    /// Label for the emotional trend line
    pub const EMOTIONAL_TRENDS_LABEL: &str = "Emotional Trends";
    /// Label for the clarity trend line
    pub const CLARITY_TRENDS_LABEL: &str = "Clarity Trends";
    /// Characters of the user message included in diagnostic logs
    pub const LOG_PREVIEW_CHARS: usize = 50;
}
