//! Chunk module - bounded slices of a manuscript

use serde::{Deserialize, Serialize};

/// A contiguous slice of the manuscript, cut at a natural boundary
///
/// Offsets are byte offsets into the original text, so
/// `&text[chunk.start_offset..chunk.end_offset]` is always a valid slice.
/// `content` is that slice with surrounding whitespace trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// 0-based position in the chunk sequence
    pub index: usize,

    /// Trimmed text of the chunk
    pub content: String,

    /// Byte offset where this chunk starts (inclusive)
    pub start_offset: usize,

    /// Byte offset where this chunk ends (exclusive)
    pub end_offset: usize,

    /// Approximate token count of `content`
    pub estimated_token_count: usize,
}

impl Chunk {
    /// Number of characters (not bytes) in the chunk content
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_len_counts_characters() {
        let chunk = Chunk {
            index: 0,
            content: "Глава".to_string(),
            start_offset: 0,
            end_offset: 10,
            estimated_token_count: 2,
        };
        assert_eq!(chunk.char_len(), 5);
    }

    #[test]
    fn test_serializes_camel_case() {
        let chunk = Chunk {
            index: 3,
            content: "text".to_string(),
            start_offset: 4,
            end_offset: 8,
            estimated_token_count: 1,
        };
        let json = serde_json::to_string(&chunk).unwrap();
        assert!(json.contains("\"startOffset\":4"));
        assert!(json.contains("\"estimatedTokenCount\":1"));
    }
}
