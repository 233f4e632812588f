// ABOUTME: CORS middleware configuration for the persona chat endpoints
// ABOUTME: Lets the browser chat widget call the API from the configured origins
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::REQUEST_ID_HEADER;
use crate::config::HttpConfig;

/// Configure CORS settings for the HTTP API
///
/// `["*"]` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. Unparseable origins are skipped, and if none survive
/// any origin is allowed.
///
/// # Examples
///
/// ```bash
/// # Allow all origins (development)
/// export CORS_ALLOWED_ORIGINS="*"
///
/// # Allow specific origins (production)
/// export CORS_ALLOWED_ORIGINS="https://yili.example.com,https://www.yili.example.com"
/// ```
#[must_use]
pub fn setup_cors(config: &HttpConfig) -> CorsLayer {
    let origins = &config.cors_allowed_origins;
    let allow_origin = if origins.is_empty() || origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        if parsed.is_empty() {
            AllowOrigin::any()
        } else {
            AllowOrigin::list(parsed)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_headers([
            HeaderName::from_static("content-type"),
            HeaderName::from_static("accept"),
            HeaderName::from_static("origin"),
            HeaderName::from_static("x-requested-with"),
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
}
