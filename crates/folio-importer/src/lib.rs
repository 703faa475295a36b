//! Folio Importer
//!
//! Turns a whole manuscript into a structured book: chapters, characters,
//! locations and a style profile.
//!
//! # Architecture
//!
//! ```text
//!                   ┌─ short ─→ one direct oracle call ───────────────┐
//! Text → Analyzer ──┤                                                 ├→ MergedBookResult
//!                   └─ long ──→ Chunker → BatchScheduler → Merger ────┤
//!                                           (ChunkExtractor)          │
//!                              StyleSampler (start/middle/end) ───────┘
//! ```
//!
//! # Key Features
//!
//! - **Boundary-aware chunking**: cuts at chapter headings, then blank lines,
//!   then line breaks, then spaces
//! - **Bounded fan-out**: chunk extractions run in fixed-size concurrent batches
//! - **No text loss**: unusable oracle responses fall back to the chunk's text
//!   as a single chapter
//! - **Deterministic merge**: chapters renumbered in chunk order; characters
//!   and locations deduplicated by normalized name
//!
//! # Example Usage
//!
//! ```no_run
//! use folio_domain::ProgressEvent;
//! use folio_importer::{BookAnalyzer, ImporterConfig};
//! use folio_llm::MockOracle;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let oracle = MockOracle::new(r#"{"chapters": []}"#);
//! let analyzer = BookAnalyzer::new(oracle, ImporterConfig::default())?;
//!
//! let book = analyzer
//!     .analyze("Глава 1\n\nИмало едно време...", &|event: ProgressEvent| {
//!         println!("{}", event)
//!     })
//!     .await?;
//!
//! println!("Chapters: {}", book.chapters.len());
//! println!("Characters: {}", book.characters.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod analyzer;
mod chunking;
mod config;
mod error;
mod extractor;
mod input;
mod merger;
mod parser;
mod prompt;
mod scheduler;
mod style;


pub use analyzer::{AnalysisMetadata, AnalysisMode, AnalysisReport, BookAnalyzer};
pub use chunking::{BreakKind, TextChunker};
pub use config::{ChunkingConfig, ImporterConfig, Locale};
pub use error::ImporterError;
pub use extractor::ChunkExtractor;
pub use input::{prepare_manuscript, Manuscript};
pub use merger::{merge, MergedParts};
pub use parser::{parse_book_response, parse_style_response, ParsedBook, StylePayload};
pub use prompt::{ChunkPosition, PromptBuilder};
pub use scheduler::BatchScheduler;
pub use style::{style_sample, StyleSampler, SAMPLE_SEPARATOR};
