//! Folio Domain Layer
//!
//! This crate contains the data model for the book-import pipeline and the
//! trait interfaces the pipeline depends upon. It carries no infrastructure:
//! the oracle implementations live in `folio-llm`, the pipeline itself in
//! `folio-importer`.
//!
//! ## Key Concepts
//!
//! - **Chunk**: A bounded-size slice of the manuscript cut at a natural boundary
//! - **Drafts**: Per-chunk chapters, characters and locations as returned by the oracle
//! - **Merged book**: The deduplicated, renumbered, book-level result
//! - **Style profile**: One style fingerprint per manuscript
//! - **Oracle**: The opaque structured-extraction service (an LLM)
//!
//! ## Architecture
//!
//! Only `serde` (the model is handed downstream as JSON) and `async-trait`
//! (the oracle seam) are pulled in. Everything else is pure data.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod book;
pub mod chunk;
pub mod draft;
pub mod progress;
pub mod style;
pub mod traits;

// Re-exports for convenience
pub use book::{normalize_name, Chapter, MergedBookResult, MergedCharacter, MergedLocation};
pub use chunk::Chunk;
pub use draft::{ChapterDraft, CharacterDraft, ChunkExtraction, LocationDraft};
pub use progress::{ProgressEvent, ProgressSink};
pub use style::StyleProfile;
pub use traits::{GenerateOptions, ModelTier, Oracle, OracleResponse, ThinkingLevel};
