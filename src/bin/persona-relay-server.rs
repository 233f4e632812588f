// ABOUTME: Server binary for the persona relay HTTP API
// ABOUTME: Loads configuration and personas, initializes logging, and serves until shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # Persona Relay Server Binary
//!
//! Starts the persona chat API. Configuration comes from the environment (and a
//! `.env` file when present); a few flags override it.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use persona_relay::{config::ServerConfig, logging, resources::ServerResources, server};
use tracing::{error, info};

/// Command-line overrides for the environment configuration
#[derive(Parser)]
#[command(name = "persona-relay-server")]
#[command(about = "Persona Relay - persona chat endpoints over a hosted LLM API")]
pub struct Args {
    /// Override HTTP bind host
    #[arg(long)]
    host: Option<String>,

    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Directory of persona markdown files to load on top of the built-ins
    #[arg(long)]
    persona_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(host) = args.host {
        config.http.host = host;
    }
    if let Some(http_port) = args.http_port {
        config.http.port = http_port;
    }
    if let Some(persona_dir) = args.persona_dir {
        config.persona_dir = Some(persona_dir);
    }

    info!("Starting Persona Relay");
    info!("{}", config.summary());

    let resources = Arc::new(ServerResources::from_config(config)?);

    info!("Endpoints:");
    for persona in resources.personas.list() {
        info!("  POST /api/chat/{}  ({})", persona.slug, persona.title);
    }
    info!("  GET  /api/personas");
    info!("  GET  /health, /ready");

    if let Err(e) = server::serve(resources).await {
        error!("Persona relay failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
