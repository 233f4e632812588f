// ABOUTME: Persona profiles and the registry the chat routes resolve slugs against
// ABOUTME: Ships the twin and insight personas built in, with optional overrides from a directory
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

//! # Personas
//!
//! A persona is pure data: a fixed instruction block plus a flag saying whether a
//! context summary may be appended to it. The adapter's control flow never
//! changes per persona.
//!
//! ## File Format
//!
//! ```markdown
//! ---
//! name: insight
//! title: AI Insight
//! accepts_context: true
//! context_heading: "Context about Yi's recent writing:"
//! ---
//!
//! ## Purpose
//! One-line description (optional).
//!
//! ## Instructions
//! System instruction for the model.
//! ```

/// Persona markdown file parser with frontmatter and section extraction
pub mod parser;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

pub use parser::{
    parse_frontmatter, parse_persona_content, parse_persona_file, parse_sections,
    PersonaFrontmatter, PersonaSections,
};

use crate::constants::prompt;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Built-in twin persona definition
const TWIN_PERSONA: &str = include_str!("prompts/twin.md");

/// Built-in insight persona definition
const INSIGHT_PERSONA: &str = include_str!("prompts/insight.md");

/// Slug of the built-in twin persona
pub const TWIN: &str = "twin";

/// Slug of the built-in insight persona
pub const INSIGHT: &str = "insight";

/// Immutable persona definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonaProfile {
    /// Route segment identifying the persona
    pub slug: String,
    /// Display name
    pub title: String,
    /// Short description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Instruction block sent as the system prompt
    #[serde(skip)]
    pub instructions: String,
    /// Whether a context summary is folded into the instruction
    pub accepts_context: bool,
    /// Context block heading, when overriding the default
    #[serde(skip)]
    pub context_heading: Option<String>,
    /// Context block closing sentence, when overriding the default
    #[serde(skip)]
    pub context_closing: Option<String>,
}

impl PersonaProfile {
    /// Heading line that introduces the context block
    #[must_use]
    pub fn context_heading(&self) -> &str {
        self.context_heading
            .as_deref()
            .unwrap_or(prompt::DEFAULT_CONTEXT_HEADING)
    }

    /// Sentence that closes the context block
    #[must_use]
    pub fn context_closing(&self) -> &str {
        self.context_closing
            .as_deref()
            .unwrap_or(prompt::DEFAULT_CONTEXT_CLOSING)
    }
}

/// Lookup table of personas keyed by slug
#[derive(Debug, Clone, Default)]
pub struct PersonaRegistry {
    personas: BTreeMap<String, PersonaProfile>,
}

impl PersonaRegistry {
    /// Registry containing only the built-in personas
    ///
    /// # Errors
    ///
    /// Returns an error if a built-in definition fails to parse
    pub fn builtin() -> AppResult<Self> {
        let mut registry = Self::default();
        for content in [TWIN_PERSONA, INSIGHT_PERSONA] {
            registry.insert(parse_persona_content(content)?);
        }
        Ok(registry)
    }

    /// Built-in personas overlaid with every `*.md` file in `dir`
    ///
    /// A file whose slug matches a built-in replaces it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be read or any persona file is invalid
    pub fn load_dir(dir: &Path) -> AppResult<Self> {
        let mut registry = Self::builtin()?;

        let entries = fs::read_dir(dir).map_err(|e| {
            AppError::new(
                ErrorCode::StorageError,
                format!("Failed to read persona directory {}: {e}", dir.display()),
            )
        })?;

        let mut paths = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| {
                AppError::new(
                    ErrorCode::StorageError,
                    format!("Failed to read persona directory {}: {e}", dir.display()),
                )
            })?;
            let path = entry.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in paths {
            let profile = parse_persona_file(&path)?;
            if registry.personas.contains_key(&profile.slug) {
                warn!(persona = %profile.slug, path = %path.display(), "Overriding persona");
            } else {
                info!(persona = %profile.slug, path = %path.display(), "Loaded persona");
            }
            registry.insert(profile);
        }

        Ok(registry)
    }

    /// Add or replace a persona
    pub fn insert(&mut self, profile: PersonaProfile) {
        self.personas.insert(profile.slug.clone(), profile);
    }

    /// Persona by slug
    #[must_use]
    pub fn get(&self, slug: &str) -> Option<&PersonaProfile> {
        self.personas.get(slug)
    }

    /// All personas ordered by slug
    #[must_use]
    pub fn list(&self) -> Vec<&PersonaProfile> {
        self.personas.values().collect()
    }

    /// Number of personas
    #[must_use]
    pub fn len(&self) -> usize {
        self.personas.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}
