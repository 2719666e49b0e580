// promptgen: tier-aware prompt template catalog and generation CLI
// Copyright (c) 2025 Promptgen Core Team

//! # Promptgen Library
//!
//! A prompt-generation toolkit built around a tiered template catalog:
//! templates are discovered under ranked root directories (project > user >
//! builtin), indexed once per invocation, and resolved by logical name under
//! strict ambiguity rules: a name either maps to exactly one file or fails
//! with a precise, actionable error.

#![warn(
    missing_docs,
    rust_2018_idioms,
    unused_qualifications,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

// Core modules
pub mod ai;
pub mod config;
pub mod error;
pub mod template;

// Re-exports for convenience
pub use crate::ai::{GeminiProvider, GenerationRequest, LlmProvider};
pub use crate::config::Config;
pub use crate::error::{Error, Result};
pub use crate::template::{
    resolve, CatalogEngine, CatalogLoader, SourceLoader, TemplateCatalog, TemplateRecord, Tier,
    TierRoots,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
