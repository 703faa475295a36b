//! Pipeline orchestration: direct call for short texts, chunked fan-out
//! and merge for long ones

use crate::chunking::TextChunker;
use crate::config::ImporterConfig;
use crate::error::ImporterError;
use crate::extractor::{call_oracle, fallback_chapter, ChunkExtractor};
use crate::merger::merge;
use crate::parser::parse_book_response;
use crate::prompt::PromptBuilder;
use crate::scheduler::BatchScheduler;
use crate::style::StyleSampler;
use folio_domain::{ChunkExtraction, MergedBookResult, Oracle, ProgressEvent, ProgressSink};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Which path a run took
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// One oracle call over the whole text
    Direct,
    /// Chunk, extract in batches, merge, then sample style
    Chunked,
}

/// Run statistics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    /// Path taken
    pub mode: AnalysisMode,
    /// Chunks produced (0 on the direct path)
    pub chunk_count: usize,
    /// Extractions that fell back to verbatim content
    pub fallback_chunks: usize,
    /// Tokens reported by the oracle across all calls
    pub tokens_used: u64,
    /// Wall-clock duration of the run
    pub elapsed_ms: u64,
}

/// A book result together with how it was produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    /// The merged book
    pub book: MergedBookResult,
    /// Run statistics
    pub metadata: AnalysisMetadata,
}

/// Turns a manuscript into a [`MergedBookResult`]
pub struct BookAnalyzer<O: Oracle> {
    oracle: Arc<O>,
    config: Arc<ImporterConfig>,
    chunker: TextChunker,
    extractor: ChunkExtractor<O>,
    style: StyleSampler<O>,
    prompts: PromptBuilder,
}

impl<O: Oracle> BookAnalyzer<O> {
    /// Create a new analyzer; fails if `config` is invalid
    pub fn new(oracle: O, config: ImporterConfig) -> Result<Self, ImporterError> {
        config.validate().map_err(ImporterError::Config)?;

        let oracle = Arc::new(oracle);
        let config = Arc::new(config);
        Ok(Self {
            chunker: TextChunker::new(config.chunking.clone()),
            extractor: ChunkExtractor::new(oracle.clone(), config.clone()),
            style: StyleSampler::new(oracle.clone(), config.clone()),
            prompts: PromptBuilder::new(config.locale.language.clone()),
            oracle,
            config,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ImporterConfig {
        &self.config
    }

    /// Whether `text` is longer than the direct-call threshold
    pub fn needs_chunking(&self, text: &str) -> bool {
        text.chars().count() > self.config.direct_threshold_chars
    }

    /// Analyze `text`, returning only the book
    pub async fn analyze(
        &self,
        text: &str,
        progress: &dyn ProgressSink,
    ) -> Result<MergedBookResult, ImporterError> {
        self.analyze_detailed(text, progress).await.map(|report| report.book)
    }

    /// Analyze `text`, returning the book and run statistics
    ///
    /// Oracle transport failures abort the whole run. Unusable responses are
    /// replaced by fallbacks and counted in `fallback_chunks`.
    pub async fn analyze_detailed(
        &self,
        text: &str,
        progress: &dyn ProgressSink,
    ) -> Result<AnalysisReport, ImporterError> {
        let started = Instant::now();
        if text.trim().is_empty() {
            return Err(ImporterError::EmptyInput);
        }

        let total_chars = text.chars().count();
        progress.report(ProgressEvent::Started { total_chars });

        let (book, mut metadata) = if self.needs_chunking(text) {
            info!("Analyzing {} chars in chunks", total_chars);
            self.analyze_chunked(text, progress).await?
        } else {
            info!("Analyzing {} chars in one pass", total_chars);
            self.analyze_direct(text, progress).await?
        };

        metadata.elapsed_ms = started.elapsed().as_millis() as u64;
        progress.report(ProgressEvent::Completed {
            elapsed_ms: metadata.elapsed_ms,
        });

        info!(
            "Analysis complete: {} chapters, {} characters, {} locations, {} fallbacks, {} tokens in {}ms",
            book.chapters.len(),
            book.characters.len(),
            book.locations.len(),
            metadata.fallback_chunks,
            metadata.tokens_used,
            metadata.elapsed_ms
        );

        Ok(AnalysisReport { book, metadata })
    }

    async fn analyze_direct(
        &self,
        text: &str,
        progress: &dyn ProgressSink,
    ) -> Result<(MergedBookResult, AnalysisMetadata), ImporterError> {
        progress.report(ProgressEvent::DirectExtraction);

        let response = call_oracle(
            self.oracle.as_ref(),
            &self.prompts.direct(text),
            &self.prompts.direct_system(),
            &self.config.direct_generation,
            self.config.oracle_timeout(),
        )
        .await?;

        let locale = &self.config.locale;
        let neutral = locale.neutral_style();
        let mut extraction = ChunkExtraction::empty(0);
        extraction.tokens_used = response.tokens_used;

        let style_analysis = match parse_book_response(&response.text) {
            Ok(parsed) => {
                extraction.chapters = parsed.chapters;
                extraction.characters = parsed.characters;
                extraction.locations = parsed.locations;
                if extraction.chapters.is_empty() {
                    warn!("Direct analysis returned no chapters, keeping text as one chapter");
                    extraction.chapters.push(fallback_chapter(0, text.trim(), locale));
                }
                parsed
                    .style
                    .map(|style| style.complete(&neutral))
                    .unwrap_or(neutral)
            }
            Err(e) => {
                warn!("Direct analysis unusable ({}), falling back to verbatim text", e);
                extraction.chapters.push(fallback_chapter(0, text.trim(), locale));
                extraction.fell_back = true;
                neutral
            }
        };

        progress.report(ProgressEvent::Merging);
        let parts = merge(std::slice::from_ref(&extraction));

        let metadata = AnalysisMetadata {
            mode: AnalysisMode::Direct,
            chunk_count: 0,
            fallback_chunks: usize::from(extraction.fell_back),
            tokens_used: extraction.tokens_used,
            elapsed_ms: 0,
        };
        let book = MergedBookResult {
            chapters: parts.chapters,
            characters: parts.characters,
            locations: parts.locations,
            style_analysis,
        };
        Ok((book, metadata))
    }

    async fn analyze_chunked(
        &self,
        text: &str,
        progress: &dyn ProgressSink,
    ) -> Result<(MergedBookResult, AnalysisMetadata), ImporterError> {
        progress.report(ProgressEvent::Chunking);
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            return Err(ImporterError::EmptyInput);
        }
        info!("Split into {} chunks", chunks.len());
        progress.report(ProgressEvent::Chunked {
            chunks: chunks.len(),
        });

        let results = BatchScheduler::new(&self.extractor, self.config.max_parallel_chunks)
            .run_all(&chunks, progress)
            .await?;

        progress.report(ProgressEvent::Merging);
        let parts = merge(&results);

        progress.report(ProgressEvent::AnalyzingStyle);
        let (style_analysis, style_tokens) = self.style.analyze_with_usage(text).await?;

        let metadata = AnalysisMetadata {
            mode: AnalysisMode::Chunked,
            chunk_count: chunks.len(),
            fallback_chunks: results.iter().filter(|r| r.fell_back).count(),
            tokens_used: results.iter().map(|r| r.tokens_used).sum::<u64>() + style_tokens,
            elapsed_ms: 0,
        };
        let book = MergedBookResult {
            chapters: parts.chapters,
            characters: parts.characters,
            locations: parts.locations,
            style_analysis,
        };
        Ok((book, metadata))
    }
}
