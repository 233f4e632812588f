// ABOUTME: Persona chat route handlers
// ABOUTME: POST /api/chat/:persona relays one message through the persona completion adapter
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! Persona chat routes
//!
//! `POST /api/chat/twin` and `POST /api/chat/insight` are the two built-in
//! personas; any persona loaded from the persona directory is served the same way.
//! Requests are stateless: each one is a single message and a single reply.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    routing::post,
    Json, Router,
};
use tracing::error;

use crate::{
    adapter::{CompletionRequest, CompletionResponse},
    constants::error_messages,
    errors::{AppError, AppResult, ErrorCode},
    resources::ServerResources,
};

/// Persona chat routes implementation
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create all persona chat routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat/:persona", post(Self::persona_chat))
            .with_state(resources)
    }

    /// Relay one message to the named persona
    ///
    /// The body is read as raw bytes so that unreadable or malformed bodies land
    /// on the generic failure response instead of axum's plain-text rejections.
    async fn persona_chat(
        State(resources): State<Arc<ServerResources>>,
        Path(slug): Path<String>,
        body: Result<Bytes, BytesRejection>,
    ) -> AppResult<Json<CompletionResponse>> {
        let persona = resources
            .personas
            .get(&slug)
            .ok_or_else(|| AppError::not_found(error_messages::PERSONA))?;

        let request = Self::parse_body(body)?;
        let reply = resources.adapter.complete(&request, persona).await?;

        Ok(Json(reply))
    }

    /// Decode the request body, mapping every failure to the generic 500
    fn parse_body(body: Result<Bytes, BytesRejection>) -> AppResult<CompletionRequest> {
        let bytes = body.map_err(|rejection| {
            error!("Failed to read request body: {}", rejection);
            AppError::new(
                ErrorCode::InternalError,
                error_messages::REQUEST_PROCESSING_FAILED,
            )
        })?;

        serde_json::from_slice(&bytes).map_err(|e| {
            error!("Failed to parse request body: {}", e);
            AppError::new(
                ErrorCode::SerializationError,
                error_messages::REQUEST_PROCESSING_FAILED,
            )
            .with_source(e)
        })
    }
}
