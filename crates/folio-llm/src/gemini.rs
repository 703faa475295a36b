//! Gemini Provider Implementation
//!
//! Provides integration with Google's Gemini `generateContent` REST API.
//!
//! # Features
//!
//! - Async HTTP communication with the Gemini API
//! - Per-tier model selection (pro / flash)
//! - Thinking-level and output-budget passthrough
//! - Retry logic with exponential backoff
//! - Timeout handling
//!
//! # Examples
//!
//! ```no_run
//! use folio_llm::{GeminiConfig, GeminiOracle};
//!
//! let config = GeminiConfig::new("my-api-key");
//! let oracle = GeminiOracle::new(config).expect("client");
//! ```

use crate::LlmError;
use async_trait::async_trait;
use folio_domain::traits::{GenerateOptions, ModelTier, Oracle, OracleResponse};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Gemini API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

/// Default model for the pro tier
pub const DEFAULT_PRO_MODEL: &str = "gemini-3-pro-preview";

/// Default model for the flash tier
pub const DEFAULT_FLASH_MODEL: &str = "gemini-3-flash-preview";

/// Default timeout for a single HTTP request
///
/// Three attempts plus backoff fit inside the importer's default 300s
/// per-call budget.
pub const DEFAULT_TIMEOUT_SECS: u64 = 90;

/// Default number of attempts per call
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Connection settings for [`GeminiOracle`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; never serialized
    #[serde(skip)]
    pub api_key: String,

    /// API base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Model id used for [`ModelTier::Pro`]
    #[serde(default = "default_pro_model")]
    pub pro_model: String,

    /// Model id used for [`ModelTier::Flash`]
    #[serde(default = "default_flash_model")]
    pub flash_model: String,

    /// HTTP timeout per request (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per call, including the first one
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_pro_model() -> String {
    DEFAULT_PRO_MODEL.to_string()
}

fn default_flash_model() -> String {
    DEFAULT_FLASH_MODEL.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

impl GeminiConfig {
    /// Default settings with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Longest a single `generate` call can take: every attempt timing out,
    /// plus the backoff sleeps between attempts
    pub fn worst_case_duration(&self) -> Duration {
        let attempts = self.max_retries.max(1);
        let backoff: u64 = (0..attempts - 1).map(|k| 2u64.pow(k)).sum();
        Duration::from_secs(self.timeout_secs * u64::from(attempts) + backoff)
    }

    /// Model id for a tier
    pub fn model_for(&self, tier: ModelTier) -> &str {
        match tier {
            ModelTier::Pro => &self.pro_model,
            ModelTier::Flash => &self.flash_model,
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            pro_model: default_pro_model(),
            flash_model: default_flash_model(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

/// Gemini API oracle
///
/// Construct once at process start and share it (by reference or `Arc`)
/// with every pipeline run.
pub struct GeminiOracle {
    config: GeminiConfig,
    client: reqwest::Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    system_instruction: Content<'a>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'static str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_level: &'static str,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    total_token_count: u64,
}

impl GenerateContentResponse {
    fn into_oracle_response(self) -> OracleResponse {
        let text = self
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .unwrap_or_default();

        OracleResponse {
            text,
            tokens_used: self.usage_metadata.map(|u| u.total_token_count).unwrap_or(0),
        }
    }
}

impl GeminiOracle {
    /// Create a new Gemini oracle
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Authentication`] if the API key is empty and
    /// [`LlmError::Other`] if the HTTP client cannot be built.
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Authentication("API key is not configured".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Connection settings in use
    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    fn url_for(&self, tier: ModelTier) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            self.config.model_for(tier)
        )
    }

    fn build_request<'a>(
        prompt: &'a str,
        system: &'a str,
        options: &GenerateOptions,
    ) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: prompt }],
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part { text: system }],
            },
            generation_config: GenerationConfig {
                temperature: options.temperature,
                max_output_tokens: options.max_output_tokens,
                thinking_config: ThinkingConfig {
                    thinking_level: options.thinking.as_str(),
                },
            },
        }
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    type Error = LlmError;

    /// Generate text using the Gemini API
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - The API key is rejected (not retried)
    /// - The model is not available (not retried)
    /// - Network communication fails after all retries
    /// - The response envelope cannot be decoded
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        options: &GenerateOptions,
    ) -> Result<OracleResponse, Self::Error> {
        let url = self.url_for(options.model);
        let body = Self::build_request(prompt, system, options);

        // Retry logic with exponential backoff
        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.config.max_retries.max(1) {
            debug!(
                "Gemini request (model: {}, attempt {})",
                self.config.model_for(options.model),
                attempts + 1
            );

            match self
                .client
                .post(&url)
                .query(&[("key", self.config.api_key.as_str())])
                .json(&body)
                .send()
                .await
            {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return response
                            .json::<GenerateContentResponse>()
                            .await
                            .map(GenerateContentResponse::into_oracle_response)
                            .map_err(|e| {
                                LlmError::InvalidResponse(format!("Failed to parse response: {}", e))
                            });
                    }

                    match status {
                        reqwest::StatusCode::NOT_FOUND => {
                            return Err(LlmError::ModelNotAvailable(
                                self.config.model_for(options.model).to_string(),
                            ));
                        }
                        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                            return Err(LlmError::Authentication(format!("HTTP {}", status)));
                        }
                        reqwest::StatusCode::TOO_MANY_REQUESTS => {
                            last_error = Some(LlmError::RateLimitExceeded);
                        }
                        _ => {
                            let error_text = response
                                .text()
                                .await
                                .unwrap_or_else(|_| "Unknown error".to_string());
                            last_error = Some(LlmError::Communication(format!(
                                "HTTP {}: {}",
                                status, error_text
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(LlmError::Communication(format!("Request failed: {}", e)));
                }
            }

            attempts += 1;
            if attempts < self.config.max_retries {
                // Exponential backoff: 1s, 2s, 4s, etc.
                let delay = Duration::from_secs(2u64.pow(attempts - 1));
                warn!("Gemini call failed, retrying in {:?}", delay);
                tokio::time::sleep(delay).await;
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("Max retries exceeded".to_string())))
    }
}
