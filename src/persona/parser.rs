// ABOUTME: Parser for persona markdown files with YAML frontmatter
// ABOUTME: Turns a persona definition file into an immutable PersonaProfile
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Persona Relay Contributors

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::PersonaProfile;
use crate::errors::{AppError, AppResult, ErrorCode};

/// YAML frontmatter parsed from a persona markdown file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaFrontmatter {
    /// Unique slug (matches filename and the route segment)
    pub name: String,

    /// Display name
    pub title: String,

    /// Whether a context summary is folded into the instruction
    #[serde(default)]
    pub accepts_context: bool,

    /// Line introducing the context block
    #[serde(default)]
    pub context_heading: Option<String>,

    /// Sentence closing the context block
    #[serde(default)]
    pub context_closing: Option<String>,
}

/// Markdown sections parsed from a persona file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonaSections {
    /// Short description (Optional)
    pub purpose: Option<String>,

    /// System instruction text (Required)
    pub instructions: String,
}

/// Parse YAML frontmatter from markdown content
///
/// # Errors
/// Returns error if frontmatter delimiters are missing or YAML is invalid
pub fn parse_frontmatter(content: &str) -> AppResult<PersonaFrontmatter> {
    let (yaml_content, _) = split_frontmatter(content)?;

    serde_yaml::from_str(yaml_content).map_err(|e| {
        AppError::new(
            ErrorCode::InvalidFormat,
            format!("Invalid YAML frontmatter: {e}"),
        )
    })
}

/// Split content into the YAML block and the markdown body
fn split_frontmatter(content: &str) -> AppResult<(&str, &str)> {
    let after_first = content.trim().strip_prefix("---").ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidFormat,
            "Persona file must start with YAML frontmatter (---)",
        )
    })?;

    let end_pos = after_first.find("\n---").ok_or_else(|| {
        AppError::new(
            ErrorCode::InvalidFormat,
            "Persona file missing closing frontmatter delimiter (---)",
        )
    })?;

    let (yaml, rest) = after_first.split_at(end_pos);
    let body = rest.get(4..).unwrap_or_default();
    Ok((yaml.trim(), body.trim()))
}

/// Parse markdown sections from content (after frontmatter)
///
/// # Errors
/// Returns error if frontmatter is malformed or the Instructions section is missing
pub fn parse_sections(content: &str) -> AppResult<PersonaSections> {
    let (_, body) = split_frontmatter(content)?;

    let mut sections = PersonaSections::default();
    let mut current_section: Option<&str> = None;
    let mut current_content = String::new();

    for line in body.lines() {
        if let Some(header) = line.strip_prefix("## ") {
            if let Some(section_name) = current_section {
                save_section(&mut sections, section_name, &current_content);
            }
            current_section = Some(header.trim());
            current_content.clear();
        } else if current_section.is_some() {
            if !current_content.is_empty() {
                current_content.push('\n');
            }
            current_content.push_str(line);
        }
    }

    if let Some(section_name) = current_section {
        save_section(&mut sections, section_name, &current_content);
    }

    if sections.instructions.is_empty() {
        return Err(AppError::new(
            ErrorCode::MissingRequiredField,
            "Persona file missing required section: ## Instructions",
        ));
    }

    Ok(sections)
}

/// Save parsed content to the appropriate section field
fn save_section(sections: &mut PersonaSections, name: &str, content: &str) {
    let trimmed = content.trim();

    match name {
        "Purpose" => sections.purpose = Some(trimmed.to_owned()).filter(|s| !s.is_empty()),
        "Instructions" => trimmed.clone_into(&mut sections.instructions),
        _ => {
            // Unknown section - ignore silently for forward compatibility
        }
    }
}

/// Whether a slug is usable as a single URL path segment
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Parse a persona definition from markdown string content
///
/// # Errors
/// Returns error if the frontmatter or sections are invalid, or the name is not a valid slug
pub fn parse_persona_content(content: &str) -> AppResult<PersonaProfile> {
    let frontmatter = parse_frontmatter(content)?;
    let sections = parse_sections(content)?;

    if !is_valid_slug(&frontmatter.name) {
        return Err(AppError::new(
            ErrorCode::InvalidFormat,
            format!(
                "Persona name '{}' must use lowercase letters, digits, '-' or '_'",
                frontmatter.name
            ),
        ));
    }

    Ok(PersonaProfile {
        slug: frontmatter.name,
        title: frontmatter.title,
        description: sections.purpose,
        instructions: sections.instructions,
        accepts_context: frontmatter.accepts_context,
        context_heading: frontmatter.context_heading,
        context_closing: frontmatter.context_closing,
    })
}

/// Parse a complete persona markdown file
///
/// # Errors
/// Returns error if the file cannot be read, the content is invalid, or the
/// persona name does not match the file stem
pub fn parse_persona_file(path: &Path) -> AppResult<PersonaProfile> {
    let content = fs::read_to_string(path).map_err(|e| {
        AppError::new(
            ErrorCode::StorageError,
            format!("Failed to read persona file {}: {e}", path.display()),
        )
    })?;

    let profile = parse_persona_content(&content)?;

    let filename = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| AppError::new(ErrorCode::InvalidFormat, "Invalid persona filename"))?;

    if profile.slug != filename {
        return Err(AppError::new(
            ErrorCode::InvalidFormat,
            format!(
                "Persona name '{}' does not match filename '{}'",
                profile.slug, filename
            ),
        ));
    }

    Ok(profile)
}
