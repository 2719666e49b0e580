//! Generation glue: instruction assembly and LLM provider integration.
//!
//! This module consumes the template catalog: it renders the configured
//! instructions (named templates or literal strings) and ships them to a
//! provider. It contains no resolution logic of its own.

pub mod prompt;
pub mod providers;

pub use providers::{GeminiProvider, GenerationRequest, LlmProvider};
