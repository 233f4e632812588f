// ABOUTME: Unified error type with error codes, HTTP status mapping, and JSON error bodies
// ABOUTME: Renders every failure as a single `{ error, details? }` object for API callers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # Unified Error Handling System
//!
//! Every fallible operation in the relay returns [`AppResult`]. Handlers hand the
//! error straight to axum, which renders it through [`IntoResponse`] as an
//! [`ErrorResponse`] with the status code chosen by [`ErrorCode::http_status`].

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error};

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Validation (3000-3999)
    /// A required request field is absent or blank
    #[serde(rename = "MISSING_REQUIRED_FIELD")]
    MissingRequiredField = 3001,
    /// Data could not be parsed in the expected format
    #[serde(rename = "INVALID_FORMAT")]
    InvalidFormat = 3002,

    // Resource Management (4000-4999)
    /// Requested resource does not exist
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,

    // External Services (5000-5999)
    /// Completion service returned an error
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalServiceError = 5000,
    /// Completion service could not be reached
    #[serde(rename = "EXTERNAL_SERVICE_UNAVAILABLE")]
    ExternalServiceUnavailable = 5001,
    /// Completion service rejected the credential
    #[serde(rename = "EXTERNAL_AUTH_FAILED")]
    ExternalAuthFailed = 5002,
    /// Completion service rate limited the request
    #[serde(rename = "EXTERNAL_RATE_LIMITED")]
    ExternalRateLimited = 5003,

    // Configuration (6000-6999)
    /// Required configuration value is not set
    #[serde(rename = "CONFIG_MISSING")]
    ConfigMissing = 6001,
    /// Configuration value is present but unusable
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected failure while handling a request
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// Reading persona files from disk failed
    #[serde(rename = "STORAGE_ERROR")]
    StorageError = 9002,
    /// Data serialization/deserialization failed
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    ///
    /// Callers only distinguish client errors from server errors, so every
    /// configuration, upstream, and internal failure maps to 500.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            // 400 Bad Request
            Self::MissingRequiredField | Self::InvalidFormat => 400,

            // 404 Not Found
            Self::ResourceNotFound => 404,

            // 500 Internal Server Error
            Self::ExternalServiceError
            | Self::ExternalServiceUnavailable
            | Self::ExternalAuthFailed
            | Self::ExternalRateLimited
            | Self::ConfigMissing
            | Self::ConfigInvalid
            | Self::InternalError
            | Self::StorageError
            | Self::SerializationError => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "A required field is missing from the request",
            Self::InvalidFormat => "The data format is invalid",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::ExternalServiceError => "An external service encountered an error",
            Self::ExternalServiceUnavailable => "An external service is currently unavailable",
            Self::ExternalAuthFailed => "Authentication with external service failed",
            Self::ExternalRateLimited => "External service rate limit exceeded",
            Self::ConfigMissing => "Required configuration is missing",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal server error occurred",
            Self::StorageError => "Storage operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether this code represents a caller mistake rather than a server fault
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        self.http_status() < 500
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message, returned to callers as `error`
    pub message: String,
    /// Best-effort detail text, returned to callers as `details`
    pub details: Option<String>,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
            source: None,
        }
    }

    /// Attach detail text exposed to the caller
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error response format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error label
    pub error: String,
    /// Underlying failure message, when one is available
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: error.message,
            details: error.details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if self.code.is_client_error() {
            debug!(code = ?self.code, message = %self.message, "Request rejected");
        } else {
            error!(
                code = ?self.code,
                message = %self.message,
                details = self.details.as_deref().unwrap_or(""),
                "Request failed"
            );
        }

        (status, Json(ErrorResponse::from(self))).into_response()
    }
}

/// Convenience functions for creating common errors
impl AppError {
    /// Required field missing or blank
    pub fn missing_field(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::MissingRequiredField, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Required configuration value missing
    pub fn config_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigMissing, message)
    }

    /// External service error
    pub fn external_service(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ExternalServiceError,
            format!("{}: {}", service.into(), message.into()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::MissingRequiredField.http_status(), 400);
        assert_eq!(ErrorCode::ResourceNotFound.http_status(), 404);
        assert_eq!(ErrorCode::ConfigMissing.http_status(), 500);
        assert_eq!(ErrorCode::ExternalRateLimited.http_status(), 500);
        assert_eq!(ErrorCode::InternalError.http_status(), 500);
    }

    #[test]
    fn test_error_response_omits_absent_details() {
        let response = ErrorResponse::from(AppError::missing_field("Message is required"));
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json, serde_json::json!({ "error": "Message is required" }));
    }

    #[test]
    fn test_error_response_carries_details() {
        let error = AppError::new(ErrorCode::ExternalServiceError, "Error calling AI service")
            .with_details("connection refused");
        let json = serde_json::to_value(ErrorResponse::from(error)).unwrap();

        assert_eq!(json["error"], "Error calling AI service");
        assert_eq!(json["details"], "connection refused");
    }
}
