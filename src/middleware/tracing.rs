// ABOUTME: Request tracing middleware for correlation and structured logging
// ABOUTME: Generates request ids, opens one span per request, and renders handler panics as JSON
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use std::any::Any;

use axum::{
    body::Body,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::{error, Span};
use uuid::Uuid;

use crate::constants::error_messages;
use crate::errors::ErrorResponse;

/// Header carrying the request correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generates `req_<uuid>` ids for requests that arrive without one
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestIdUuid;

impl MakeRequestId for MakeRequestIdUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&format!("req_{}", Uuid::new_v4().simple()))
            .ok()
            .map(RequestId::new)
    }
}

/// Span for one HTTP request, tagged with its correlation id
pub fn make_request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Render a handler panic as the generic failure body
#[allow(clippy::needless_pass_by_value)] // signature fixed by CatchPanicLayer
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic payload");
    error!("Request handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error_messages::REQUEST_PROCESSING_FAILED.to_owned(),
            details: None,
        }),
    )
        .into_response()
}
