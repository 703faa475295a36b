//! Configuration for the Importer

use crate::error::ImporterError;
use folio_domain::{GenerateOptions, ModelTier, StyleProfile, ThinkingLevel};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Chunk sizing and boundary search window (all sizes in characters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Preferred chunk size
    pub target_chars: usize,

    /// No cut is accepted closer than this to the chunk start
    pub min_chars: usize,

    /// How far before the target offset to look for a break
    pub look_back_chars: usize,

    /// How far past the target offset to look for a break
    pub look_ahead_chars: usize,

    /// Characters per token used for token estimates
    pub chars_per_token: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            target_chars: 30_000,
            min_chars: 10_000,
            look_back_chars: 5_000,
            look_ahead_chars: 7_000,
            chars_per_token: 4,
        }
    }
}

impl ChunkingConfig {
    /// Validate the chunking parameters
    pub fn validate(&self) -> Result<(), String> {
        if self.target_chars == 0 {
            return Err("chunking.target_chars must be greater than 0".to_string());
        }
        if self.min_chars == 0 {
            return Err("chunking.min_chars must be greater than 0".to_string());
        }
        if self.min_chars > self.target_chars {
            return Err("chunking.min_chars cannot exceed chunking.target_chars".to_string());
        }
        if self.chars_per_token == 0 {
            return Err("chunking.chars_per_token must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Language of the manuscript and the fixed labels used by fallbacks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Locale {
    /// Language the oracle should write titles and descriptions in
    pub language: String,

    /// Label for a fallback chapter; rendered as "<label> <n>"
    pub part_label: String,

    /// Summary of a fallback chapter
    pub fallback_summary: String,

    /// Tone of the neutral style profile
    pub neutral_tone: String,

    /// Dialogue style of the neutral style profile
    pub neutral_dialogue_style: String,
}

impl Default for Locale {
    fn default() -> Self {
        Self {
            language: "Bulgarian".to_string(),
            part_label: "Част".to_string(),
            fallback_summary: "Автоматично разделена част".to_string(),
            neutral_tone: "Неутрален".to_string(),
            neutral_dialogue_style: "Стандартен диалог".to_string(),
        }
    }
}

impl Locale {
    /// Style profile used when style analysis yields nothing usable
    pub fn neutral_style(&self) -> StyleProfile {
        StyleProfile::neutral(&self.neutral_tone, &self.neutral_dialogue_style)
    }

    /// Title of the fallback chapter for the chunk at `index`
    pub fn part_title(&self, index: usize) -> String {
        format!("{} {}", self.part_label, index + 1)
    }
}

/// Configuration for the Importer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    /// Chunk sizing
    pub chunking: ChunkingConfig,

    /// Chunk extractions running at the same time
    pub max_parallel_chunks: usize,

    /// Texts up to this many characters take the single direct call
    pub direct_threshold_chars: usize,

    /// Size of each of the three style samples (characters)
    pub style_sample_chars: usize,

    /// Minimum trimmed length accepted by input preparation (characters)
    pub min_text_chars: usize,

    /// Input preparation truncates to this many characters
    pub max_text_chars: usize,

    /// Maximum time for a single oracle call (seconds)
    ///
    /// Covers the whole `generate` call, including any retries the oracle
    /// makes internally.
    pub oracle_timeout_secs: u64,

    /// Options for per-chunk extraction calls
    pub chunk_generation: GenerateOptions,

    /// Options for the style call
    pub style_generation: GenerateOptions,

    /// Options for the direct whole-text call
    pub direct_generation: GenerateOptions,

    /// Language and fallback labels
    pub locale: Locale,
}

impl ImporterConfig {
    /// Get the oracle timeout as a Duration
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        self.chunking.validate()?;
        if self.max_parallel_chunks == 0 {
            return Err("max_parallel_chunks must be greater than 0".to_string());
        }
        if self.style_sample_chars == 0 {
            return Err("style_sample_chars must be greater than 0".to_string());
        }
        if self.max_text_chars == 0 {
            return Err("max_text_chars must be greater than 0".to_string());
        }
        if self.max_text_chars < self.min_text_chars {
            return Err("max_text_chars cannot be less than min_text_chars".to_string());
        }
        if self.oracle_timeout_secs == 0 {
            return Err("oracle_timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

fn chunk_generation() -> GenerateOptions {
    GenerateOptions {
        model: ModelTier::Flash,
        thinking: ThinkingLevel::Low,
        temperature: 0.2,
        max_output_tokens: 16_384,
    }
}

fn style_generation() -> GenerateOptions {
    GenerateOptions {
        model: ModelTier::Flash,
        thinking: ThinkingLevel::Low,
        temperature: 0.2,
        max_output_tokens: 1_024,
    }
}

fn direct_generation() -> GenerateOptions {
    GenerateOptions {
        model: ModelTier::Pro,
        thinking: ThinkingLevel::High,
        temperature: 0.3,
        max_output_tokens: 32_768,
    }
}

impl Default for ImporterConfig {
    /// Default configuration with balanced settings
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            max_parallel_chunks: 5,
            direct_threshold_chars: 160_000,
            style_sample_chars: 8_000,
            min_text_chars: 100,
            max_text_chars: 800_000,
            oracle_timeout_secs: 300,
            chunk_generation: chunk_generation(),
            style_generation: style_generation(),
            direct_generation: direct_generation(),
            locale: Locale::default(),
        }
    }
}

impl ImporterConfig {
    /// Aggressive preset: smaller chunks, more parallelism, shorter timeouts
    pub fn aggressive() -> Self {
        Self {
            chunking: ChunkingConfig {
                target_chars: 20_000,
                min_chars: 7_000,
                look_back_chars: 3_500,
                look_ahead_chars: 5_000,
                chars_per_token: 4,
            },
            max_parallel_chunks: 8,
            direct_threshold_chars: 100_000,
            oracle_timeout_secs: 120,
            ..Self::default()
        }
    }

    /// Lenient preset: larger chunks, less parallelism, longer timeouts
    pub fn lenient() -> Self {
        Self {
            chunking: ChunkingConfig {
                target_chars: 40_000,
                min_chars: 15_000,
                look_back_chars: 7_000,
                look_ahead_chars: 9_000,
                chars_per_token: 4,
            },
            max_parallel_chunks: 3,
            direct_threshold_chars: 200_000,
            oracle_timeout_secs: 600,
            ..Self::default()
        }
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }

    /// Load and validate configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ImporterError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml(&contents).map_err(ImporterError::Config)?;
        config.validate().map_err(ImporterError::Config)?;
        Ok(config)
    }
}
