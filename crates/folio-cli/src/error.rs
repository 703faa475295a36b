//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pipeline error
    #[error("{0}")]
    Importer(#[from] folio_importer::ImporterError),

    /// Oracle client could not be constructed
    #[error("{0}")]
    Oracle(#[from] folio_llm::LlmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// No API key was given
    #[error("No API key. Set GEMINI_API_KEY or pass --api-key.")]
    MissingApiKey,

    /// Operation not permitted
    #[error("Operation not permitted: {0}")]
    NotPermitted(String),
}
