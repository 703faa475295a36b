//! Draft module - per-chunk extraction results
//!
//! Drafts are what the oracle says about one chunk. None of their identities
//! are trusted globally: chapter numbers are renumbered and entity names are
//! deduplicated when the drafts are merged into a book.

use serde::{Deserialize, Serialize};

/// A chapter as extracted from a single chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDraft {
    /// Chunk-local chapter number; provisional, replaced on merge
    pub chapter_number: Option<i64>,

    /// Chapter title (found in the text or generated)
    pub title: String,

    /// Chapter text
    pub content: String,

    /// Short summary
    pub summary: String,
}

/// A character as extracted from a single chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterDraft {
    /// Character name as written in the text
    pub name: String,

    /// Short description
    pub description: String,

    /// Character traits
    pub traits: Vec<String>,
}

/// A location as extracted from a single chunk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDraft {
    /// Location name as written in the text
    pub name: String,

    /// Short description
    pub description: String,

    /// Location kind (city, village, building, nature, other)
    #[serde(rename = "type")]
    pub kind: String,
}

/// Everything extracted from one chunk
///
/// `chunk_index` always equals the index of the chunk it was extracted
/// from; it is the ordering key used by the merger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkExtraction {
    /// Index of the originating chunk
    pub chunk_index: usize,

    /// Chapters found in the chunk, in text order
    pub chapters: Vec<ChapterDraft>,

    /// Characters mentioned in the chunk
    pub characters: Vec<CharacterDraft>,

    /// Locations mentioned in the chunk
    pub locations: Vec<LocationDraft>,

    /// Whether the oracle response was unusable and the verbatim fallback was used
    #[serde(default)]
    pub fell_back: bool,

    /// Tokens reported by the oracle for this extraction
    #[serde(default)]
    pub tokens_used: u64,
}

impl ChunkExtraction {
    /// Create an empty extraction for the given chunk
    pub fn empty(chunk_index: usize) -> Self {
        Self {
            chunk_index,
            chapters: Vec::new(),
            characters: Vec::new(),
            locations: Vec::new(),
            fell_back: false,
            tokens_used: 0,
        }
    }
}
