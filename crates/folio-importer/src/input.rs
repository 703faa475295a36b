//! Input preparation applied before the pipeline runs

use crate::config::ImporterConfig;
use crate::error::ImporterError;
use tracing::warn;

/// Text ready to hand to the analyzer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manuscript {
    /// The (possibly truncated) text
    pub text: String,

    /// Whether the text was cut at the configured ceiling
    pub truncated: bool,

    /// Character count before truncation
    pub original_chars: usize,
}

/// Strip a byte-order mark, reject texts that are too short, and truncate
/// texts over `max_text_chars` at a character boundary.
pub fn prepare_manuscript(raw: &str, config: &ImporterConfig) -> Result<Manuscript, ImporterError> {
    let text = raw.strip_prefix('\u{feff}').unwrap_or(raw);

    let trimmed_chars = text.trim().chars().count();
    if trimmed_chars == 0 {
        return Err(ImporterError::EmptyInput);
    }
    if trimmed_chars < config.min_text_chars {
        return Err(ImporterError::TextTooShort(trimmed_chars, config.min_text_chars));
    }

    let original_chars = text.chars().count();
    if original_chars <= config.max_text_chars {
        return Ok(Manuscript {
            text: text.to_string(),
            truncated: false,
            original_chars,
        });
    }

    let cut = text
        .char_indices()
        .nth(config.max_text_chars)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len());

    warn!(
        "Text of {} chars exceeds limit of {}, truncating",
        original_chars, config.max_text_chars
    );

    Ok(Manuscript {
        text: text[..cut].to_string(),
        truncated: true,
        original_chars,
    })
}
