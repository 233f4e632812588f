// ABOUTME: HTTP server assembly: router, tower-http middleware stack, listener, graceful shutdown
// ABOUTME: Serves the persona chat API until Ctrl-C or SIGTERM
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::DefaultBodyLimit, http::HeaderName, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{
    middleware::{handle_panic, make_request_span, setup_cors, MakeRequestIdUuid, REQUEST_ID_HEADER},
    resources::ServerResources,
    routes::{ChatRoutes, HealthRoutes, PersonaRoutes},
};

/// Build the complete application router with middleware
pub fn build_router(resources: Arc<ServerResources>) -> Router {
    let http = &resources.config.http;
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestIdUuid,
        ))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(setup_cors(http))
        .layer(CatchPanicLayer::custom(handle_panic));

    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(&resources)))
        .merge(PersonaRoutes::routes(Arc::clone(&resources)))
        .merge(ChatRoutes::routes(Arc::clone(&resources)))
        .layer(DefaultBodyLimit::max(http.max_request_body_bytes))
        .layer(middleware)
}

/// Bind the configured address and serve until a shutdown signal arrives
///
/// # Errors
///
/// Returns an error if the address is invalid, binding fails, or the server errors
pub async fn serve(resources: Arc<ServerResources>) -> Result<()> {
    let addr = resources.config.http.bind_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    serve_with_listener(listener, resources, shutdown_signal()).await
}

/// Serve on an already-bound listener until `shutdown` completes
///
/// # Errors
///
/// Returns an error if the server fails
pub async fn serve_with_listener<F>(
    listener: TcpListener,
    resources: Arc<ServerResources>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(resources);

    info!("Persona relay listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")?;

    info!("Persona relay stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on Unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received, draining connections");
}
