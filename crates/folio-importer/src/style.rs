//! Style fingerprint sampled from across the manuscript

use crate::config::ImporterConfig;
use crate::error::ImporterError;
use crate::extractor::call_oracle;
use crate::parser::parse_style_response;
use crate::prompt::PromptBuilder;
use folio_domain::{Oracle, StyleProfile};
use std::sync::Arc;
use tracing::{debug, warn};

/// Separator placed between samples
pub const SAMPLE_SEPARATOR: &str = "\n\n---\n\n";

/// Start, middle and end windows of `sample_chars` characters, joined by
/// [`SAMPLE_SEPARATOR`]. A text no longer than one window is returned whole.
pub fn style_sample(text: &str, sample_chars: usize) -> String {
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let n = bounds.len() - 1;

    if n <= sample_chars {
        return text.to_string();
    }

    let slice = |from: usize, to: usize| &text[bounds[from]..bounds[to]];
    let mid_start = (n / 2).saturating_sub(sample_chars / 2);
    let mid_end = (mid_start + sample_chars).min(n);

    [
        slice(0, sample_chars),
        slice(mid_start, mid_end),
        slice(n - sample_chars, n),
    ]
    .join(SAMPLE_SEPARATOR)
}

/// Asks the oracle for one style profile per manuscript
pub struct StyleSampler<O: Oracle> {
    oracle: Arc<O>,
    config: Arc<ImporterConfig>,
    prompts: PromptBuilder,
}

impl<O: Oracle> StyleSampler<O> {
    /// Create a new style sampler
    pub fn new(oracle: Arc<O>, config: Arc<ImporterConfig>) -> Self {
        let prompts = PromptBuilder::new(config.locale.language.clone());
        Self {
            oracle,
            config,
            prompts,
        }
    }

    /// Analyze the style of `text` with exactly one oracle call
    ///
    /// Unusable responses yield the locale's neutral profile.
    pub async fn analyze(&self, text: &str) -> Result<StyleProfile, ImporterError> {
        self.analyze_with_usage(text).await.map(|(style, _)| style)
    }

    /// Like [`analyze`](Self::analyze), also returning the tokens spent
    pub(crate) async fn analyze_with_usage(
        &self,
        text: &str,
    ) -> Result<(StyleProfile, u64), ImporterError> {
        let sample = style_sample(text, self.config.style_sample_chars);
        debug!("Style sample: {} chars", sample.chars().count());

        let response = call_oracle(
            self.oracle.as_ref(),
            &self.prompts.style(&sample),
            &self.prompts.style_system(),
            &self.config.style_generation,
            self.config.oracle_timeout(),
        )
        .await?;

        let neutral = self.config.locale.neutral_style();
        let style = match parse_style_response(&response.text) {
            Ok(style) => style.complete(&neutral),
            Err(e) => {
                warn!("Style analysis unusable ({}), using neutral profile", e);
                neutral
            }
        };
        Ok((style, response.tokens_used))
    }
}
