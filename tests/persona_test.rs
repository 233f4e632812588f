// ABOUTME: Integration tests for persona loading and the persona listing route
// ABOUTME: Covers the built-in personas, directory overrides, and invalid persona files
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::fs;

use axum::http::StatusCode;
use common::{create_test_router, MockProvider};
use helpers::axum_test::AxumTestRequest;
use persona_relay::{
    errors::ErrorCode,
    persona::{PersonaRegistry, INSIGHT, TWIN},
};
use serde_json::Value;
use tempfile::TempDir;

const CUSTOM_PERSONA: &str = r#"---
name: mentor
title: Writing Mentor
accepts_context: true
---

## Purpose

Gives structural feedback on drafts.

## Instructions

You are a patient writing mentor.
"#;

const TWIN_OVERRIDE: &str = r"---
name: twin
title: Quiet Twin
---

## Instructions

You answer in one sentence.
";

// ============================================================================
// Built-in Personas
// ============================================================================

#[test]
fn test_builtin_personas() {
    let registry = PersonaRegistry::builtin().unwrap();
    assert_eq!(registry.len(), 2);

    let twin = registry.get(TWIN).unwrap();
    assert!(!twin.accepts_context);
    assert!(twin.instructions.starts_with("You are the AI twin of Yi Li"));
    assert_eq!(twin.instructions, twin.instructions.trim());

    let insight = registry.get(INSIGHT).unwrap();
    assert!(insight.accepts_context);
    assert_eq!(insight.context_heading(), "Context about Yi's recent writing:");
    assert_eq!(
        insight.context_closing(),
        "Use this information to personalize your analysis."
    );

    assert!(registry.get("unknown").is_none());
}

#[test]
fn test_list_is_ordered_by_slug() {
    let registry = PersonaRegistry::builtin().unwrap();
    let slugs: Vec<&str> = registry.list().iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, vec![INSIGHT, TWIN]);
}

// ============================================================================
// Directory Overrides
// ============================================================================

#[test]
fn test_load_dir_adds_and_overrides() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("mentor.md"), CUSTOM_PERSONA).unwrap();
    fs::write(dir.path().join("twin.md"), TWIN_OVERRIDE).unwrap();
    fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

    let registry = PersonaRegistry::load_dir(dir.path()).unwrap();
    assert_eq!(registry.len(), 3);

    let mentor = registry.get("mentor").unwrap();
    assert_eq!(mentor.title, "Writing Mentor");
    assert_eq!(
        mentor.description.as_deref(),
        Some("Gives structural feedback on drafts.")
    );
    assert!(mentor.accepts_context);
    assert_eq!(mentor.context_heading(), "Context about recent writing:");

    let twin = registry.get(TWIN).unwrap();
    assert_eq!(twin.title, "Quiet Twin");
    assert_eq!(twin.instructions, "You answer in one sentence.");
    assert!(!twin.accepts_context);

    assert!(registry.get(INSIGHT).unwrap().accepts_context);
}

#[test]
fn test_load_dir_rejects_name_mismatch() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("coach.md"), CUSTOM_PERSONA).unwrap();

    let err = PersonaRegistry::load_dir(dir.path()).unwrap_err();
    assert_eq!(err.code, ErrorCode::InvalidFormat);
    assert!(err.message.contains("does not match filename"));
}

#[test]
fn test_load_dir_rejects_missing_instructions() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("empty.md"),
        "---\nname: empty\ntitle: Empty\n---\n\n## Purpose\n\nNothing here.\n",
    )
    .unwrap();

    let err = PersonaRegistry::load_dir(dir.path()).unwrap_err();
    assert_eq!(err.code, ErrorCode::MissingRequiredField);
}

#[test]
fn test_load_dir_missing_directory() {
    let dir = TempDir::new().unwrap();
    let err = PersonaRegistry::load_dir(&dir.path().join("absent")).unwrap_err();
    assert_eq!(err.code, ErrorCode::StorageError);
}

// ============================================================================
// Listing Route
// ============================================================================

#[tokio::test]
async fn test_persona_listing_hides_instructions() {
    let router = create_test_router(MockProvider::replying("unused"));

    let response = AxumTestRequest::get("/api/personas").send(router).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    let personas = body.as_array().unwrap();
    assert_eq!(personas.len(), 2);

    assert_eq!(personas[0]["slug"], INSIGHT);
    assert_eq!(personas[0]["accepts_context"], true);
    assert_eq!(personas[1]["slug"], TWIN);
    assert_eq!(personas[1]["accepts_context"], false);

    for persona in personas {
        assert!(persona.get("instructions").is_none());
        assert!(persona.get("context_heading").is_none());
        assert!(persona["title"].is_string());
    }
}
