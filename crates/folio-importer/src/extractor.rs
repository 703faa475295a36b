//! Per-chunk structured extraction

use crate::config::{ImporterConfig, Locale};
use crate::error::ImporterError;
use crate::parser::parse_book_response;
use crate::prompt::{ChunkPosition, PromptBuilder};
use folio_domain::{ChapterDraft, Chunk, ChunkExtraction, GenerateOptions, Oracle, OracleResponse};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Call the oracle under a timeout, mapping transport failures
pub(crate) async fn call_oracle<O: Oracle + ?Sized>(
    oracle: &O,
    prompt: &str,
    system: &str,
    options: &GenerateOptions,
    limit: Duration,
) -> Result<OracleResponse, ImporterError> {
    debug!("Prompt length: {} chars", prompt.len());

    let response = timeout(limit, oracle.generate(prompt, system, options))
        .await
        .map_err(|_| ImporterError::Timeout)?
        .map_err(|e| ImporterError::Oracle(e.to_string()))?;

    debug!(
        "Oracle response length: {} chars, {} tokens",
        response.text.len(),
        response.tokens_used
    );
    Ok(response)
}

/// Single chapter holding the chunk's text verbatim
pub(crate) fn fallback_chapter(chunk_index: usize, content: &str, locale: &Locale) -> ChapterDraft {
    ChapterDraft {
        chapter_number: Some(chunk_index as i64 + 1),
        title: locale.part_title(chunk_index),
        content: content.to_string(),
        summary: locale.fallback_summary.clone(),
    }
}

/// Extracts chapters, characters and locations from one chunk
pub struct ChunkExtractor<O: Oracle> {
    oracle: Arc<O>,
    config: Arc<ImporterConfig>,
    prompts: PromptBuilder,
}

impl<O: Oracle> ChunkExtractor<O> {
    /// Create a new chunk extractor
    pub fn new(oracle: Arc<O>, config: Arc<ImporterConfig>) -> Self {
        let prompts = PromptBuilder::new(config.locale.language.clone());
        Self {
            oracle,
            config,
            prompts,
        }
    }

    /// Extract drafts from `chunk`
    ///
    /// An unusable response never fails: the chunk's content comes back as a
    /// single verbatim chapter with `fell_back` set. Only transport failures
    /// and timeouts are errors.
    pub async fn extract(
        &self,
        chunk: &Chunk,
        is_first: bool,
        total_chunks: usize,
    ) -> Result<ChunkExtraction, ImporterError> {
        let position = ChunkPosition::of(chunk.index, is_first, total_chunks);
        let prompt = self.prompts.chunk(chunk, position, total_chunks);

        let response = call_oracle(
            self.oracle.as_ref(),
            &prompt,
            &self.prompts.chunk_system(),
            &self.config.chunk_generation,
            self.config.oracle_timeout(),
        )
        .await?;

        let mut extraction = ChunkExtraction::empty(chunk.index);
        extraction.tokens_used = response.tokens_used;

        match parse_book_response(&response.text) {
            Ok(parsed) => {
                extraction.chapters = parsed.chapters;
                extraction.characters = parsed.characters;
                extraction.locations = parsed.locations;

                if extraction.chapters.is_empty() {
                    warn!(
                        "Chunk {}: response had no chapters, keeping text as one chapter",
                        chunk.index
                    );
                    extraction
                        .chapters
                        .push(fallback_chapter(chunk.index, &chunk.content, &self.config.locale));
                }
            }
            Err(e) => {
                warn!("Chunk {}: {}, falling back to verbatim content", chunk.index, e);
                extraction
                    .chapters
                    .push(fallback_chapter(chunk.index, &chunk.content, &self.config.locale));
                extraction.fell_back = true;
            }
        }

        debug!(
            "Chunk {}: {} chapters, {} characters, {} locations",
            chunk.index,
            extraction.chapters.len(),
            extraction.characters.len(),
            extraction.locations.len()
        );
        Ok(extraction)
    }
}
