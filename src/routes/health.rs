// ABOUTME: Health check route handlers for service monitoring and status endpoints
// ABOUTME: Liveness never touches the provider; readiness reports whether a credential is configured
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! Health check routes for service monitoring

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::resources::ServerResources;

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({
                "status": "healthy",
                "timestamp": chrono::Utc::now().to_rfc3339()
            }))
        }

        async fn ready_handler(
            State(resources): State<Arc<ServerResources>>,
        ) -> Json<serde_json::Value> {
            let provider = resources.adapter.provider();
            let credential_configured = resources.adapter.credential_configured()
                && provider.health_check().await.unwrap_or(false);

            Json(serde_json::json!({
                "status": "ready",
                "timestamp": chrono::Utc::now().to_rfc3339(),
                "provider": provider.name(),
                "model": provider.default_model(),
                "credential_configured": credential_configured,
                "personas": resources.personas.len()
            }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .route("/ready", get(ready_handler))
            .with_state(resources)
    }
}
