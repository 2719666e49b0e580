//! Instruction assembly for generation requests.
//!
//! Each instruction (system and user) comes from one of two places, in
//! precedence order: a named catalog template, or a literal template string
//! from configuration. Named templates compose recursively; anything they
//! extend, include, or import resolves through the same catalog.

use std::collections::HashMap;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::template::CatalogEngine;

/// Render the system instruction, or `None` when none is configured
pub fn render_system_instruction(
    generation: &GenerationConfig,
    engine: &CatalogEngine,
    vars: &HashMap<String, String>,
) -> Result<Option<String>> {
    render_instruction(
        generation.system_instruction_template.as_deref(),
        generation.system_instruction.as_deref(),
        engine,
        vars,
        "system-instruction",
    )
}

/// Render the user instruction, or `None` when none is configured
pub fn render_user_instruction(
    generation: &GenerationConfig,
    engine: &CatalogEngine,
    vars: &HashMap<String, String>,
) -> Result<Option<String>> {
    render_instruction(
        generation.user_instruction_template.as_deref(),
        generation.user_instruction.as_deref(),
        engine,
        vars,
        "user-instruction",
    )
}

fn render_instruction(
    template_name: Option<&str>,
    literal: Option<&str>,
    engine: &CatalogEngine,
    vars: &HashMap<String, String>,
    label: &str,
) -> Result<Option<String>> {
    if let Some(name) = template_name {
        tracing::debug!("rendering {} from named template '{}'", label, name);
        return engine.render(name, vars).map(Some);
    }

    match literal {
        Some(source) => {
            tracing::debug!("rendering {} from literal template string", label);
            engine.render_literal(source, vars, label).map(Some)
        }
        None => {
            tracing::debug!("no {} configured, skipping", label);
            Ok(None)
        }
    }
}
