// ABOUTME: Route module organization for the persona relay HTTP API
// ABOUTME: Groups persona chat, persona listing, and health endpoints
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

/// Persona chat endpoints
pub mod chat;
/// Health and readiness endpoints
pub mod health;
/// Persona listing endpoint
pub mod personas;

pub use chat::ChatRoutes;
pub use health::HealthRoutes;
pub use personas::PersonaRoutes;
