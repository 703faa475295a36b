//! Trait definitions for external interactions
//!
//! These traits define the boundaries between the pipeline and infrastructure.
//! Infrastructure implementations live in other crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Model tier requested from the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelTier {
    /// Slower, more capable model
    Pro,

    /// Faster, cheaper model
    Flash,
}

impl ModelTier {
    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelTier::Pro => "pro",
            ModelTier::Flash => "flash",
        }
    }
}

/// How much internal reasoning the oracle may spend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    /// Minimal reasoning, fastest
    Low,

    /// Full reasoning
    High,
}

impl ThinkingLevel {
    /// Get the level name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ThinkingLevel::Low => "low",
            ThinkingLevel::High => "high",
        }
    }
}

/// Generation options passed with every oracle call
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerateOptions {
    /// Model tier
    pub model: ModelTier,

    /// Thinking effort
    pub thinking: ThinkingLevel,

    /// Sampling temperature
    pub temperature: f32,

    /// Upper bound on generated tokens
    pub max_output_tokens: u32,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            model: ModelTier::Pro,
            thinking: ThinkingLevel::High,
            temperature: 0.7,
            max_output_tokens: 8192,
        }
    }
}

/// Raw oracle output
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OracleResponse {
    /// Generated text; usually, but not always, contains one JSON object
    pub text: String,

    /// Total tokens billed for the call
    pub tokens_used: u64,
}

/// Trait for the structured-extraction oracle
///
/// Implemented by the infrastructure layer (folio-llm). An `Err` means the
/// call itself failed (network, auth, rate limit); a response that does not
/// contain the requested JSON is still an `Ok`.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Error type for transport failures
    type Error: std::fmt::Display + Send;

    /// Generate a completion for `prompt` under the `system` instruction
    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        options: &GenerateOptions,
    ) -> Result<OracleResponse, Self::Error>;
}
