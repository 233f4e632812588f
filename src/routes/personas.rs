// ABOUTME: Persona listing route
// ABOUTME: GET /api/personas returns the slugs, titles, and context support of loaded personas
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use std::sync::Arc;

use axum::{extract::State, routing::get, Json, Router};

use crate::{persona::PersonaProfile, resources::ServerResources};

/// Persona listing routes implementation
pub struct PersonaRoutes;

impl PersonaRoutes {
    /// Create persona listing routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/personas", get(Self::list_personas))
            .with_state(resources)
    }

    /// List loaded personas ordered by slug; instruction text is not exposed
    async fn list_personas(
        State(resources): State<Arc<ServerResources>>,
    ) -> Json<Vec<PersonaProfile>> {
        Json(resources.personas.list().into_iter().cloned().collect())
    }
}
