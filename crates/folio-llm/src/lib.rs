//! Folio LLM Provider Layer
//!
//! Oracle implementations for the book-import pipeline.
//!
//! # Architecture
//!
//! This crate provides implementations of the `Oracle` trait from `folio-domain`.
//! The pipeline only ever sees the trait, so the provider is chosen (and
//! constructed) by the caller.
//!
//! # Providers
//!
//! - `MockOracle`: Deterministic, scriptable oracle for testing
//! - `GeminiOracle`: Google Gemini `generateContent` REST API
//!
//! # Examples
//!
//! ```
//! use folio_llm::MockOracle;
//! use folio_domain::{GenerateOptions, Oracle};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let oracle = MockOracle::new("Hello from LLM!");
//! let result = oracle
//!     .generate("test prompt", "system", &GenerateOptions::default())
//!     .await
//!     .unwrap();
//! assert_eq!(result.text, "Hello from LLM!");
//! # }
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use folio_domain::traits::{GenerateOptions, Oracle, OracleResponse};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;

pub use gemini::{GeminiConfig, GeminiOracle};

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response envelope from the provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// API key missing or rejected
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

#[derive(Debug, Clone)]
enum MockReply {
    Text(String),
    Error,
}

/// Mock oracle for deterministic testing
///
/// Returns pre-configured responses without making any network calls.
/// Rules match when the prompt *contains* the registered needle; the first
/// matching rule (in insertion order) wins, otherwise the default response
/// is returned.
///
/// # Examples
///
/// ```
/// use folio_llm::MockOracle;
///
/// let mut oracle = MockOracle::new(r#"{"chapters": []}"#);
/// oracle.add_response("writing style", r#"{"tone": "dark"}"#);
/// oracle.add_error("part 3 of");
/// assert_eq!(oracle.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockOracle {
    default_response: String,
    rules: Arc<Mutex<Vec<(String, MockReply)>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
    latency: Option<Duration>,
    tokens_per_call: u64,
}

impl MockOracle {
    /// Create a new MockOracle with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            rules: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(AtomicUsize::new(0)),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
            latency: None,
            tokens_per_call: 0,
        }
    }

    /// Respond with `response` to any prompt containing `needle`
    pub fn add_response(&mut self, needle: impl Into<String>, response: impl Into<String>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((needle.into(), MockReply::Text(response.into())));
    }

    /// Fail with a transport error for any prompt containing `needle`
    pub fn add_error(&mut self, needle: impl Into<String>) {
        self.rules
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((needle.into(), MockReply::Error));
    }

    /// Delay every call by `latency` (lets concurrent calls overlap)
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Report this many tokens for every call
    pub fn with_tokens_per_call(mut self, tokens: u64) -> Self {
        self.tokens_per_call = tokens;
        self
    }

    /// Get the number of times generate was called
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    /// Highest number of calls that were in flight at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// All prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reset the call count and the recorded prompts
    pub fn reset(&self) {
        self.call_count.store(0, Ordering::SeqCst);
        self.peak_in_flight.store(0, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn reply_for(&self, prompt: &str) -> MockReply {
        let rules = self.rules.lock().unwrap_or_else(PoisonError::into_inner);
        rules
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, reply)| reply.clone())
            .unwrap_or_else(|| MockReply::Text(self.default_response.clone()))
    }
}

impl Default for MockOracle {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl Oracle for MockOracle {
    type Error = LlmError;

    async fn generate(
        &self,
        prompt: &str,
        _system: &str,
        _options: &GenerateOptions,
    ) -> Result<OracleResponse, Self::Error> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(prompt.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.reply_for(prompt) {
            MockReply::Text(text) => Ok(OracleResponse {
                text,
                tokens_used: self.tokens_per_call,
            }),
            MockReply::Error => Err(LlmError::Other("Mock error".to_string())),
        }
    }
}
