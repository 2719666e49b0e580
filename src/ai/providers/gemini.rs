//! Google Gemini provider implementation.
//!
//! Calls the Generative Language API `generateContent` endpoint. Requires an
//! API key from https://aistudio.google.com/ in `GEMINI_API_KEY` (or
//! `GOOGLE_API_KEY`).

use super::{GenerationRequest, LlmProvider};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default REST endpoint for the Generative Language API
const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Gemini provider for Google generative models
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    endpoint: String,
    api_key: String,
    model: String,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(api_key: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key,
            model,
            client,
        }
    }

    /// Create a provider with the API key taken from `GEMINI_API_KEY` or
    /// `GOOGLE_API_KEY`
    pub fn from_env(model: String) -> Self {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .unwrap_or_default();
        Self::new(api_key, model)
    }

    /// Get the current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    fn is_api_key_valid(&self) -> bool {
        !self.api_key.is_empty() && !self.api_key.starts_with("${")
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    fn is_available(&self) -> bool {
        self.is_api_key_valid()
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        info!("Generating with Gemini model: {}", self.model);
        debug!("Prompt length: {} chars", request.user_prompt.len());

        if !self.is_api_key_valid() {
            anyhow::bail!(
                "No Gemini API key configured. Set GEMINI_API_KEY (get a key from https://aistudio.google.com/)"
            );
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerateRequest {
            contents: Vec<Content>,
            #[serde(skip_serializing_if = "Option::is_none")]
            system_instruction: Option<Content>,
            generation_config: GenerationConfig,
        }

        #[derive(Serialize)]
        struct Content {
            #[serde(skip_serializing_if = "Option::is_none")]
            role: Option<&'static str>,
            parts: Vec<Part>,
        }

        #[derive(Serialize)]
        struct Part {
            text: String,
        }

        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerationConfig {
            #[serde(skip_serializing_if = "Option::is_none")]
            temperature: Option<f32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            max_output_tokens: Option<u32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            response_mime_type: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
            #[serde(default)]
            usage_metadata: Option<UsageMetadata>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Candidate {
            content: Option<ResponseContent>,
            finish_reason: Option<String>,
        }

        #[derive(Deserialize)]
        struct ResponseContent {
            #[serde(default)]
            parts: Vec<ResponsePart>,
        }

        #[derive(Deserialize)]
        struct ResponsePart {
            #[serde(default)]
            text: String,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct UsageMetadata {
            #[serde(default)]
            prompt_token_count: u32,
            #[serde(default)]
            candidates_token_count: u32,
            #[serde(default)]
            total_token_count: u32,
        }

        let api_request = GenerateRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: request.user_prompt.clone(),
                }],
            }],
            system_instruction: request.system_instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part { text: text.clone() }],
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_output_tokens,
                response_mime_type: request.response_mime_type.clone(),
            },
        };

        let timeout = request.timeout.unwrap_or(Duration::from_secs(60));

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.endpoint, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&api_request)
            .timeout(timeout)
            .send()
            .await
            .context("Failed to connect to the Gemini API. Check your internet connection.")?;

        let status = response.status();

        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);

            warn!("Gemini rate limit hit, retry after {} seconds", retry_after);
            anyhow::bail!(
                "Gemini rate limit exceeded. Please wait {} seconds and try again.",
                retry_after
            );
        }

        if status.as_u16() == 401 || status.as_u16() == 403 {
            anyhow::bail!(
                "Gemini authentication failed. Check your API key at https://aistudio.google.com/"
            );
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error {}: {}", status, error_text);
        }

        let response_data: GenerateResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        if let Some(usage) = &response_data.usage_metadata {
            info!(
                "Token usage - Input: {}, Output: {}, Total: {}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        let Some(candidate) = response_data.candidates.into_iter().next() else {
            anyhow::bail!("Gemini returned no candidates");
        };

        if let Some(reason) = &candidate.finish_reason {
            if reason == "MAX_TOKENS" {
                warn!("Response was truncated by the max-output-tokens limit");
            }
        }

        let text = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            anyhow::bail!("Gemini returned no text content");
        }

        info!("Generation completed, {} chars", text.len());

        Ok(text)
    }
}
