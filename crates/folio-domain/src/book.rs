//! Book module - the merged, book-level import result

use crate::style::StyleProfile;
use serde::{Deserialize, Serialize};

/// A chapter of the merged book
///
/// `chapter_number` is 1-based and equals the chapter's position + 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    /// Sequential chapter number, starting at 1
    pub chapter_number: u32,

    /// Chapter title
    pub title: String,

    /// Chapter text
    pub content: String,

    /// Short summary
    pub summary: String,
}

/// A character after deduplication across chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedCharacter {
    /// Name as first seen
    pub name: String,

    /// Longest description seen
    pub description: String,

    /// Union of all traits seen, in first-seen order
    pub traits: Vec<String>,
}

/// A location after deduplication across chunks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedLocation {
    /// Name as first seen
    pub name: String,

    /// Longest description seen
    pub description: String,

    /// Kind reported alongside the longest description
    #[serde(rename = "type")]
    pub kind: String,
}

/// The final artifact of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedBookResult {
    /// Chapters numbered 1..=N with no gaps
    pub chapters: Vec<Chapter>,

    /// Characters, unique by normalized name
    pub characters: Vec<MergedCharacter>,

    /// Locations, unique by normalized name
    pub locations: Vec<MergedLocation>,

    /// Style fingerprint of the whole manuscript
    pub style_analysis: StyleProfile,
}

impl MergedBookResult {
    /// Check the numbering invariant: `chapters[i].chapter_number == i + 1`
    pub fn is_sequentially_numbered(&self) -> bool {
        self.chapters
            .iter()
            .enumerate()
            .all(|(i, c)| c.chapter_number as usize == i + 1)
    }
}

/// Identity key for characters and locations: trimmed, lowercased name
///
/// # Examples
///
/// ```
/// use folio_domain::normalize_name;
///
/// assert_eq!(normalize_name("  Иван "), "иван");
/// assert_eq!(normalize_name("Ivan"), normalize_name("IVAN"));
/// ```
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
