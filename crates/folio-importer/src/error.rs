//! Error types for the Importer

use thiserror::Error;

/// Errors that abort a pipeline run
///
/// Content-shape problems in oracle responses are never reported here; they
/// are recovered with fallbacks. Only transport failures and bad input are.
#[derive(Error, Debug)]
pub enum ImporterError {
    /// Oracle call failed (network, auth, rate limit)
    #[error("Oracle error: {0}")]
    Oracle(String),

    /// Oracle call exceeded the configured timeout
    #[error("Oracle call timed out")]
    Timeout,

    /// Text is empty or whitespace-only
    #[error("Input text is empty")]
    EmptyInput,

    /// Text has too little content to import
    #[error("Text too short: {0} chars (min: {1})")]
    TextTooShort(usize, usize),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error
    #[error("JSON parse error: {0}")]
    JsonParse(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ImporterError {
    fn from(e: serde_json::Error) -> Self {
        ImporterError::JsonParse(e.to_string())
    }
}
