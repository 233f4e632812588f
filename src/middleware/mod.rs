// ABOUTME: HTTP middleware for the persona relay router
// ABOUTME: CORS, request ids, request spans, and the panic-to-JSON failure boundary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

/// CORS configuration from allowed origins
pub mod cors;
/// Request id generation and request spans
pub mod tracing;

pub use cors::setup_cors;
pub use self::tracing::{handle_panic, make_request_span, MakeRequestIdUuid, REQUEST_ID_HEADER};
