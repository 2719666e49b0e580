//! LLM provider abstraction layer.
//!
//! Defines the `LlmProvider` trait implemented by each backing API. The trait
//! is async-first and providers fail with actionable error messages rather
//! than panicking; availability (is an API key configured?) is checked
//! separately from generation so the CLI can diagnose setup problems early.

use anyhow::Result;
use async_trait::async_trait;
use std::time::Duration;

// Provider implementations
pub mod gemini;

// Re-export for convenience
pub use gemini::GeminiProvider;

/// A fully assembled generation request
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Rendered system instruction, if one is configured
    pub system_instruction: Option<String>,
    /// Rendered user prompt
    pub user_prompt: String,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum number of tokens to generate
    pub max_output_tokens: Option<u32>,
    /// Response MIME type requested from the API
    pub response_mime_type: Option<String>,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            system_instruction: None,
            user_prompt: String::new(),
            temperature: None,
            max_output_tokens: None,
            response_mime_type: None,
            timeout: Some(Duration::from_secs(60)),
        }
    }
}

/// Unified interface for LLM providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Provider name for logging and diagnostics
    fn name(&self) -> &str;

    /// Whether the provider is usable (credentials configured)
    fn is_available(&self) -> bool;

    /// Execute a generation request and return the response text
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}
