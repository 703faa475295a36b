//! Text chunking at natural boundaries for large manuscripts
//!
//! A cut is searched for inside a window around the target size. Break kinds
//! are tried in a fixed priority order and the first kind with a candidate in
//! the window wins. All sizes are counted in characters; chunk offsets are
//! byte offsets into the source text.

use crate::config::ChunkingConfig;
use folio_domain::Chunk;
use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Heading and separator patterns, highest priority first
const HEADING_PATTERNS: &[&str] = &[
    r"\n[ \t]*(?i:глава|част)[ \t]+[\dIVXLCDM]+[^\n]*",
    r"\n[ \t]*(?i:chapter|part)[ \t]+[\dIVXLCDM]+[^\n]*",
    r"\n[ \t]*[\dIVXLCDM]+[ \t]*[.)][^\n]*",
    r"\n={3,}\n",
    r"\n-{3,}\n",
    r"\n\*{3,}\n",
];

static HEADINGS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    HEADING_PATTERNS
        .iter()
        .filter_map(|pattern| Regex::new(pattern).ok())
        .collect()
});

/// Kind of boundary a chunk was cut at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakKind {
    /// Chapter/part heading or separator line
    Heading,
    /// Blank line
    Paragraph,
    /// Single line break
    Line,
    /// Space between words
    Word,
    /// No boundary in the window; cut at the target offset
    Forced,
}

impl BreakKind {
    /// Searched kinds in priority order
    const SEARCH_ORDER: [BreakKind; 4] = [
        BreakKind::Heading,
        BreakKind::Paragraph,
        BreakKind::Line,
        BreakKind::Word,
    ];

    /// Short name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            BreakKind::Heading => "heading",
            BreakKind::Paragraph => "paragraph",
            BreakKind::Line => "line",
            BreakKind::Word => "word",
            BreakKind::Forced => "forced",
        }
    }

    fn literal(&self) -> Option<&'static str> {
        match self {
            BreakKind::Paragraph => Some("\n\n"),
            BreakKind::Line => Some("\n"),
            BreakKind::Word => Some(" "),
            BreakKind::Heading | BreakKind::Forced => None,
        }
    }
}

/// Character-indexed view over a text
struct CharMap<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` at the end
    bounds: Vec<usize>,
}

impl<'a> CharMap<'a> {
    fn new(text: &'a str) -> Self {
        let mut bounds: Vec<usize> = text.char_indices().map(|(byte, _)| byte).collect();
        bounds.push(text.len());
        Self { text, bounds }
    }

    fn len(&self) -> usize {
        self.bounds.len() - 1
    }

    fn byte(&self, char_idx: usize) -> usize {
        self.bounds[char_idx]
    }

    fn char_at_byte(&self, byte: usize) -> usize {
        match self.bounds.binary_search(&byte) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    fn slice(&self, from: usize, to: usize) -> &'a str {
        &self.text[self.byte(from)..self.byte(to)]
    }

    fn skip_whitespace(&self, mut pos: usize) -> usize {
        let n = self.len();
        while pos < n && self.slice(pos, pos + 1).chars().all(char::is_whitespace) {
            pos += 1;
        }
        pos
    }
}

/// Splits manuscripts into ordered, bounded-size chunks
#[derive(Debug, Clone)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    /// Chunking parameters in use
    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Chunk the given text
    ///
    /// Whitespace runs at cut points belong to no chunk. Empty or
    /// whitespace-only text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        let map = CharMap::new(text);
        let n = map.len();
        let content_end = map.char_at_byte(text.trim_end().len());
        let mut chunks = Vec::new();
        let mut pos = map.skip_whitespace(0);

        while pos < n {
            let target = pos + self.config.target_chars;
            let end = if target >= content_end {
                n
            } else {
                match self.find_break(&map, pos, target, content_end) {
                    Some((end, kind)) => {
                        debug!(
                            "Chunk {} cut at char {} ({} break)",
                            chunks.len(),
                            end,
                            kind.as_str()
                        );
                        end
                    }
                    None => {
                        debug!(
                            "Chunk {} takes the remaining {} chars",
                            chunks.len(),
                            content_end - pos
                        );
                        n
                    }
                }
            };

            let content = map.slice(pos, end).trim();
            if !content.is_empty() {
                let char_count = content.chars().count();
                chunks.push(Chunk {
                    index: chunks.len(),
                    content: content.to_string(),
                    start_offset: map.byte(pos),
                    end_offset: map.byte(end),
                    estimated_token_count: char_count.div_ceil(self.config.chars_per_token.max(1)),
                });
            }

            pos = map.skip_whitespace(end);
        }

        debug!("Split {} chars into {} chunks", n, chunks.len());
        chunks
    }

    /// Pick the cut point for the chunk starting at `pos`
    ///
    /// A cut is only accepted if at least `min_chars` of content follow it.
    /// `None` means no cut leaves that much, so the rest is one chunk.
    fn find_break(
        &self,
        map: &CharMap<'_>,
        pos: usize,
        target: usize,
        content_end: usize,
    ) -> Option<(usize, BreakKind)> {
        let min = self.config.min_chars.max(1);
        let lo = (pos + min)
            .max(target.saturating_sub(self.config.look_back_chars))
            .min(target);
        let hi = (target + self.config.look_ahead_chars).min(map.len());
        let leaves_enough = |cut: usize| content_end.saturating_sub(map.skip_whitespace(cut)) >= min;

        for kind in BreakKind::SEARCH_ORDER {
            let found = match kind.literal() {
                Some(needle) => find_literal(map, needle, lo, target, hi, &leaves_enough),
                None => find_heading(map, lo, target, hi, &leaves_enough),
            };
            if let Some(cut) = found {
                return Some((cut, kind));
            }
        }

        if !leaves_enough(target) {
            return None;
        }
        warn!(
            "No natural boundary between chars {} and {}, cutting mid-word at {}",
            lo, hi, target
        );
        Some((target, BreakKind::Forced))
    }
}

impl Default for TextChunker {
    fn default() -> Self {
        Self::new(ChunkingConfig::default())
    }
}

/// The heading match nearest the target, from the first pattern that has one
fn find_heading(
    map: &CharMap<'_>,
    lo: usize,
    target: usize,
    hi: usize,
    accept: &dyn Fn(usize) -> bool,
) -> Option<usize> {
    let window = map.slice(lo, hi);
    let base = map.byte(lo);

    HEADINGS.iter().find_map(|pattern| {
        pattern
            .find_iter(window)
            .map(|m| map.char_at_byte(base + m.start()))
            .filter(|&cut| cut >= lo && cut < hi && accept(cut))
            .min_by_key(|&cut| cut.abs_diff(target))
    })
}

/// Last accepted occurrence in `[lo, target]`, otherwise the first in `(target, hi)`
fn find_literal(
    map: &CharMap<'_>,
    needle: &str,
    lo: usize,
    target: usize,
    hi: usize,
    accept: &dyn Fn(usize) -> bool,
) -> Option<usize> {
    let lo_byte = map.byte(lo);
    let before = map
        .slice(lo, target)
        .rmatch_indices(needle)
        .map(|(at, _)| map.char_at_byte(lo_byte + at))
        .find(|&cut| accept(cut));
    if before.is_some() {
        return before;
    }

    let target_byte = map.byte(target);
    map.slice(target, hi)
        .match_indices(needle)
        .map(|(at, _)| map.char_at_byte(target_byte + at))
        .find(|&cut| accept(cut))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(target: usize, min: usize, back: usize, ahead: usize) -> TextChunker {
        TextChunker::new(ChunkingConfig {
            target_chars: target,
            min_chars: min,
            look_back_chars: back,
            look_ahead_chars: ahead,
            chars_per_token: 4,
        })
    }

    fn non_whitespace(text: &str) -> String {
        text.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn test_heading_patterns_compile() {
        assert_eq!(HEADINGS.len(), HEADING_PATTERNS.len());
    }

    #[test]
    fn test_short_text_is_single_chunk() {
        let text = "  Кратък текст за проба.  ";
        let chunks = TextChunker::default().chunk(text);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[0].content, "Кратък текст за проба.");
        assert_eq!(chunks[0].start_offset, 2);
        assert_eq!(chunks[0].end_offset, text.len());
    }

    #[test]
    fn test_empty_and_whitespace_text() {
        let chunker = TextChunker::default();
        assert!(chunker.chunk("").is_empty());
        assert!(chunker.chunk(" \n\n\t  ").is_empty());
    }

    #[test]
    fn test_text_exactly_target_size_is_single_chunk() {
        let text = "a".repeat(100);
        let chunks = chunker(100, 40, 20, 10).chunk(&text);
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_prefers_heading_over_paragraph() {
        let mut text = "слово ".repeat(14);
        text.push_str("\n\nабзац ");
        text.push_str(&"слово ".repeat(2));
        text.push_str("\nГлава 2\n");
        text.push_str(&"слово ".repeat(20));

        let chunks = chunker(100, 40, 40, 20).chunk(&text);
        assert!(chunks.len() >= 2);
        assert!(chunks[1].content.starts_with("Глава 2"));
    }

    #[test]
    fn test_paragraph_break_before_line_break() {
        let text = format!("{}\n\n{}\n{}", "a".repeat(60), "b".repeat(30), "c".repeat(60));
        let chunks = chunker(100, 40, 50, 10).chunk(&text);

        assert_eq!(chunks[0].content, "a".repeat(60));
        assert!(chunks[1].content.starts_with('b'));
    }

    #[test]
    fn test_word_break_when_no_newlines() {
        let text = "дума ".repeat(60);
        let chunks = chunker(100, 40, 20, 10).chunk(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(!chunk.content.starts_with(' '));
            assert!(chunk.content.split(' ').all(|w| w == "дума"));
        }
    }

    #[test]
    fn test_forced_cut_without_boundaries() {
        let text = "x".repeat(250);
        let chunks = chunker(100, 40, 20, 10).chunk(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].content.len(), 100);
        assert_eq!(chunks[2].content.len(), 50);
    }

    #[test]
    fn test_respects_minimum_size() {
        // A heading right after the start must not produce a tiny chunk
        let text = format!("ab\nГлава 1\n{}", "z ".repeat(200));
        let chunks = chunker(100, 40, 90, 10).chunk(&text);

        assert!(chunks[0].char_len() >= 40);
    }

    #[test]
    fn test_no_small_trailing_fragment() {
        let mut text = "дума ".repeat(5998);
        text.push_str("крај\n\n");
        text.push_str(&"x".repeat(58));

        let chunks = TextChunker::default().chunk(&text);

        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].content.ends_with(&"x".repeat(58)));
    }

    #[test]
    fn test_look_ahead_cut_keeps_minimum_tail() {
        // The only blank line sits where it would leave a 20-char tail
        let text = format!("{}\n\n{}", "a".repeat(130), "b".repeat(20));
        let chunks = chunker(100, 40, 20, 50).chunk(&text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks.last().unwrap().char_len() >= 40);
        assert_eq!(chunks[0].content, "a".repeat(100));
    }

    #[test]
    fn test_offsets_are_contiguous_bytes() {
        let text = "Ъгъл и бряг. ".repeat(50);
        let chunks = chunker(100, 40, 20, 10).chunk(&text);

        for pair in chunks.windows(2) {
            assert!(pair[0].end_offset <= pair[1].start_offset);
            let gap = &text[pair[0].end_offset..pair[1].start_offset];
            assert!(gap.chars().all(char::is_whitespace));
        }
        for chunk in &chunks {
            assert_eq!(text[chunk.start_offset..chunk.end_offset].trim(), chunk.content);
        }
    }

    #[test]
    fn test_token_estimate_rounds_up() {
        let chunks = TextChunker::default().chunk("abcde");
        assert_eq!(chunks[0].estimated_token_count, 2);
    }

    #[test]
    fn test_preserves_all_non_whitespace() {
        let text = "Едно.\n\nДве три.\nЧетири пет шест.\n***\nСедем ".repeat(30);
        let chunks = chunker(120, 50, 40, 20).chunk(&text);
        let joined: String = chunks
            .iter()
            .map(|c| c.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");

        assert_eq!(non_whitespace(&joined), non_whitespace(&text));
    }
}
