//! Deterministic merge of per-chunk extractions
//!
//! Chapters are concatenated in chunk order and renumbered from 1.
//! Characters and locations are keyed by [`normalize_name`]; the first
//! occurrence fixes the displayed name and the output position.

use folio_domain::{
    normalize_name, Chapter, CharacterDraft, ChunkExtraction, LocationDraft, MergedCharacter,
    MergedLocation,
};
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Book-level result before style analysis is attached
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedParts {
    /// Chapters numbered 1..=N
    pub chapters: Vec<Chapter>,
    /// One entry per normalized character name
    pub characters: Vec<MergedCharacter>,
    /// One entry per normalized location name
    pub locations: Vec<MergedLocation>,
}

/// Merge extractions into one result
///
/// Input order does not matter: extractions are sorted by chunk index first.
pub fn merge(results: &[ChunkExtraction]) -> MergedParts {
    let mut sorted: Vec<&ChunkExtraction> = results.iter().collect();
    sorted.sort_by_key(|r| r.chunk_index);

    let chapters: Vec<Chapter> = sorted
        .iter()
        .flat_map(|r| r.chapters.iter())
        .zip(1u32..)
        .map(|(draft, number)| Chapter {
            chapter_number: number,
            title: draft.title.clone(),
            content: draft.content.clone(),
            summary: draft.summary.clone(),
        })
        .collect();

    let mut characters = CharacterIndex::default();
    let mut locations = LocationIndex::default();
    for result in &sorted {
        for draft in &result.characters {
            characters.add(draft);
        }
        for draft in &result.locations {
            locations.add(draft);
        }
    }

    let merged = MergedParts {
        chapters,
        characters: characters.into_vec(),
        locations: locations.into_vec(),
    };

    debug!(
        "Merged {} extractions into {} chapters, {} characters, {} locations",
        results.len(),
        merged.chapters.len(),
        merged.characters.len(),
        merged.locations.len()
    );
    merged
}

#[derive(Default)]
struct CharacterIndex {
    entries: IndexMap<String, MergedCharacter>,
}

impl CharacterIndex {
    fn add(&mut self, draft: &CharacterDraft) {
        let key = normalize_name(&draft.name);
        if key.is_empty() {
            warn!("Skipping character with blank name");
            return;
        }

        match self.entries.get_mut(&key) {
            Some(existing) => {
                for t in &draft.traits {
                    if !existing.traits.contains(t) {
                        existing.traits.push(t.clone());
                    }
                }
                if draft.description.chars().count() > existing.description.chars().count() {
                    existing.description = draft.description.clone();
                }
            }
            None => {
                let mut traits: Vec<String> = Vec::with_capacity(draft.traits.len());
                for t in &draft.traits {
                    if !traits.contains(t) {
                        traits.push(t.clone());
                    }
                }
                self.entries.insert(
                    key,
                    MergedCharacter {
                        name: draft.name.trim().to_string(),
                        description: draft.description.clone(),
                        traits,
                    },
                );
            }
        }
    }

    fn into_vec(self) -> Vec<MergedCharacter> {
        self.entries.into_values().collect()
    }
}

#[derive(Default)]
struct LocationIndex {
    entries: IndexMap<String, MergedLocation>,
}

impl LocationIndex {
    fn add(&mut self, draft: &LocationDraft) {
        let key = normalize_name(&draft.name);
        if key.is_empty() {
            warn!("Skipping location with blank name");
            return;
        }

        match self.entries.get_mut(&key) {
            Some(existing) => {
                if draft.description.chars().count() > existing.description.chars().count() {
                    existing.description = draft.description.clone();
                    existing.kind = draft.kind.clone();
                }
            }
            None => {
                self.entries.insert(
                    key,
                    MergedLocation {
                        name: draft.name.trim().to_string(),
                        description: draft.description.clone(),
                        kind: draft.kind.clone(),
                    },
                );
            }
        }
    }

    fn into_vec(self) -> Vec<MergedLocation> {
        self.entries.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::ChapterDraft;

    fn chapter(number: i64, title: &str) -> ChapterDraft {
        ChapterDraft {
            chapter_number: Some(number),
            title: title.to_string(),
            content: format!("{} content", title),
            summary: String::new(),
        }
    }

    fn character(name: &str, description: &str, traits: &[&str]) -> CharacterDraft {
        CharacterDraft {
            name: name.to_string(),
            description: description.to_string(),
            traits: traits.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn location(name: &str, description: &str, kind: &str) -> LocationDraft {
        LocationDraft {
            name: name.to_string(),
            description: description.to_string(),
            kind: kind.to_string(),
        }
    }

    fn extraction(index: usize, chapters: Vec<ChapterDraft>) -> ChunkExtraction {
        ChunkExtraction {
            chapters,
            ..ChunkExtraction::empty(index)
        }
    }

    #[test]
    fn test_chapters_renumbered_in_chunk_order() {
        let results = vec![
            extraction(1, vec![chapter(1, "C"), chapter(1, "D")]),
            extraction(0, vec![chapter(5, "A"), chapter(5, "B")]),
            extraction(2, vec![chapter(9, "E")]),
        ];

        let merged = merge(&results);
        let titles: Vec<_> = merged.chapters.iter().map(|c| c.title.as_str()).collect();
        let numbers: Vec<_> = merged.chapters.iter().map(|c| c.chapter_number).collect();

        assert_eq!(titles, vec!["A", "B", "C", "D", "E"]);
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_empty_input() {
        let merged = merge(&[]);
        assert_eq!(merged, MergedParts::default());
    }

    #[test]
    fn test_character_merge_by_normalized_name() {
        let mut first = ChunkExtraction::empty(0);
        first.characters.push(character("Иван", "Кратко.", &["смел", "тих"]));
        let mut second = ChunkExtraction::empty(1);
        second
            .characters
            .push(character(" иван ", "Много по-дълго описание на героя.", &["тих", "упорит"]));

        let merged = merge(&[second, first]);

        assert_eq!(merged.characters.len(), 1);
        let ivan = &merged.characters[0];
        assert_eq!(ivan.name, "Иван");
        assert_eq!(ivan.description, "Много по-дълго описание на героя.");
        assert_eq!(ivan.traits, vec!["смел", "тих", "упорит"]);
    }

    #[test]
    fn test_equal_length_description_keeps_first() {
        let mut first = ChunkExtraction::empty(0);
        first.characters.push(character("Мара", "aaaa", &[]));
        first.locations.push(location("Река", "bbbb", "nature"));
        let mut second = ChunkExtraction::empty(1);
        second.characters.push(character("МАРА", "cccc", &[]));
        second.locations.push(location("река", "dddd", "other"));

        let merged = merge(&[first, second]);

        assert_eq!(merged.characters[0].description, "aaaa");
        assert_eq!(merged.locations[0].description, "bbbb");
        assert_eq!(merged.locations[0].kind, "nature");
    }

    #[test]
    fn test_location_longer_description_wins_with_its_type() {
        let mut first = ChunkExtraction::empty(0);
        first.locations.push(location("Софія", "град", "other"));
        let mut second = ChunkExtraction::empty(1);
        second.locations.push(location("софія", "столицата, голям град", "city"));

        let merged = merge(&[first, second]);

        assert_eq!(merged.locations.len(), 1);
        assert_eq!(merged.locations[0].name, "Софія");
        assert_eq!(merged.locations[0].kind, "city");
        assert_eq!(merged.locations[0].description, "столицата, голям град");
    }

    #[test]
    fn test_first_insertion_order_preserved() {
        let mut first = ChunkExtraction::empty(0);
        first.characters.push(character("Зорница", "", &[]));
        first.characters.push(character("Асен", "", &[]));
        let mut second = ChunkExtraction::empty(1);
        second.characters.push(character("Борис", "", &[]));
        second.characters.push(character("зорница", "", &[]));

        let merged = merge(&[second, first]);
        let names: Vec<_> = merged.characters.iter().map(|c| c.name.as_str()).collect();

        assert_eq!(names, vec!["Зорница", "Асен", "Борис"]);
    }

    #[test]
    fn test_duplicate_traits_in_one_draft_collapse() {
        let mut only = ChunkExtraction::empty(0);
        only.characters.push(character("Петко", "", &["хитър", "хитър"]));

        let merged = merge(&[only]);
        assert_eq!(merged.characters[0].traits, vec!["хитър"]);
    }

    #[test]
    fn test_blank_names_are_skipped() {
        let mut only = ChunkExtraction::empty(0);
        only.characters.push(character("   ", "безименен", &["тих"]));
        only.characters.push(character("Петко", "", &[]));
        only.locations.push(location("", "някъде", "other"));

        let merged = merge(&[only]);

        assert_eq!(merged.characters.len(), 1);
        assert_eq!(merged.characters[0].name, "Петко");
        assert!(merged.characters[0].traits.is_empty());
        assert!(merged.locations.is_empty());
    }
}
