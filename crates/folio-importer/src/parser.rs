//! Parse oracle output into drafts
//!
//! Responses are untrusted text that should contain one JSON object, possibly
//! wrapped in commentary or a markdown code block. Malformed entries inside an
//! otherwise valid object are skipped; an unusable response is an error the
//! caller turns into a fallback value.

use crate::error::ImporterError;
use folio_domain::{ChapterDraft, CharacterDraft, LocationDraft, StyleProfile};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::warn;

/// Drafts found in one response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedBook {
    /// Chapter drafts in response order
    pub chapters: Vec<ChapterDraft>,
    /// Character drafts in response order
    pub characters: Vec<CharacterDraft>,
    /// Location drafts in response order
    pub locations: Vec<LocationDraft>,
    /// Style block, present only when the response carried one
    pub style: Option<StylePayload>,
}

/// Style attributes as returned, any of which may be missing
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StylePayload {
    #[serde(deserialize_with = "lenient")]
    tone: Option<String>,
    #[serde(alias = "pointOfView", deserialize_with = "lenient")]
    pov: Option<String>,
    #[serde(deserialize_with = "lenient")]
    tense: Option<String>,
    #[serde(deserialize_with = "lenient")]
    description_density: Option<String>,
    #[serde(deserialize_with = "lenient")]
    dialogue_style: Option<String>,
}

impl StylePayload {
    /// Whether no attribute was usable
    pub fn is_empty(&self) -> bool {
        [
            &self.tone,
            &self.pov,
            &self.tense,
            &self.description_density,
            &self.dialogue_style,
        ]
        .iter()
        .all(|field| field.as_deref().is_none_or(|s| s.trim().is_empty()))
    }

    /// Fill missing attributes from `neutral`
    pub fn complete(self, neutral: &StyleProfile) -> StyleProfile {
        fn pick(value: Option<String>, default: &str) -> String {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| default.to_string())
        }

        StyleProfile {
            tone: pick(self.tone, &neutral.tone),
            point_of_view: pick(self.pov, &neutral.point_of_view),
            tense: pick(self.tense, &neutral.tense),
            description_density: pick(self.description_density, &neutral.description_density),
            dialogue_style: pick(self.dialogue_style, &neutral.dialogue_style),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ChapterPayload {
    #[serde(deserialize_with = "chapter_number")]
    chapter_number: Option<i64>,
    #[serde(deserialize_with = "lenient")]
    title: String,
    #[serde(deserialize_with = "lenient")]
    content: String,
    #[serde(deserialize_with = "lenient")]
    summary: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CharacterPayload {
    #[serde(deserialize_with = "lenient")]
    name: String,
    #[serde(deserialize_with = "lenient")]
    description: String,
    #[serde(deserialize_with = "lenient")]
    traits: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LocationPayload {
    #[serde(deserialize_with = "lenient")]
    name: String,
    #[serde(deserialize_with = "lenient")]
    description: String,
    #[serde(rename = "type", deserialize_with = "lenient")]
    kind: String,
}

/// Treat `null` like a missing field
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Accept `3`, `3.0` or `"3"`; anything else is no number
fn chapter_number<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

/// Parse a chunk or whole-book response
pub fn parse_book_response(response: &str) -> Result<ParsedBook, ImporterError> {
    let object = parse_object(response)?;

    let chapters = entries::<ChapterPayload>(&object, "chapters")
        .map(|c| ChapterDraft {
            chapter_number: c.chapter_number,
            title: c.title.trim().to_string(),
            content: c.content,
            summary: c.summary.trim().to_string(),
        })
        .collect();

    let characters = entries::<CharacterPayload>(&object, "characters")
        .filter(|c| named("character", &c.name))
        .map(|c| CharacterDraft {
            name: c.name,
            description: c.description.trim().to_string(),
            traits: c
                .traits
                .into_iter()
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect(),
        })
        .collect();

    let locations = entries::<LocationPayload>(&object, "locations")
        .filter(|l| named("location", &l.name))
        .map(|l| LocationDraft {
            name: l.name,
            description: l.description.trim().to_string(),
            kind: if l.kind.trim().is_empty() {
                "other".to_string()
            } else {
                l.kind.trim().to_string()
            },
        })
        .collect();

    let style = object
        .get("styleAnalysis")
        .and_then(|v| serde_json::from_value::<StylePayload>(v.clone()).ok())
        .filter(|s| !s.is_empty());

    Ok(ParsedBook {
        chapters,
        characters,
        locations,
        style,
    })
}

/// Parse a style response
pub fn parse_style_response(response: &str) -> Result<StylePayload, ImporterError> {
    let object = parse_object(response)?;
    let style: StylePayload = serde_json::from_value(Value::Object(object))?;
    if style.is_empty() {
        return Err(ImporterError::JsonParse("No style attributes in response".to_string()));
    }
    Ok(style)
}

fn named(what: &str, name: &str) -> bool {
    if name.trim().is_empty() {
        warn!("Skipping {} with blank name", what);
        return false;
    }
    true
}

/// Deserialize each element of `object[key]`, skipping malformed ones
fn entries<'a, T>(object: &'a Map<String, Value>, key: &'a str) -> impl Iterator<Item = T> + 'a
where
    T: DeserializeOwned + 'a,
{
    object
        .get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .enumerate()
        .filter_map(move |(idx, item)| match T::deserialize(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping malformed {} entry {}: {}", key, idx, e);
                None
            }
        })
}

fn parse_object(response: &str) -> Result<Map<String, Value>, ImporterError> {
    let mut last_error = ImporterError::JsonParse("No JSON object in response".to_string());

    for candidate in json_candidates(response) {
        match serde_json::from_str::<Value>(candidate) {
            Ok(Value::Object(object)) => return Ok(object),
            Ok(_) => last_error = ImporterError::JsonParse("Expected JSON object".to_string()),
            Err(e) => last_error = e.into(),
        }
    }

    Err(last_error)
}

/// Candidate object texts: the balanced object at each `{` in turn, then
/// the span from the first `{` to the last `}`
fn json_candidates(response: &str) -> Vec<&str> {
    let Some(first) = response.find('{') else {
        return Vec::new();
    };

    let mut candidates: Vec<&str> = response
        .match_indices('{')
        .filter_map(|(start, _)| {
            balanced_end(&response[start..]).map(|end| &response[start..start + end])
        })
        .collect();
    if let Some(last) = response.rfind('}') {
        if last > first {
            let greedy = &response[first..=last];
            if !candidates.contains(&greedy) {
                candidates.push(greedy);
            }
        }
    }
    candidates
}

/// Byte length of the object opening at `text[0]`, aware of string literals
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (idx, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(idx + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn neutral() -> StyleProfile {
        StyleProfile::neutral("Неутрален", "Стандартен диалог")
    }

    #[test]
    fn test_parse_valid_response() {
        let response = r#"{
            "chapters": [
                {"chapterNumber": 1, "title": "Начало", "content": "Текст.", "summary": "Кратко"}
            ],
            "characters": [
                {"name": "Иван", "description": "Овчар", "traits": ["смел", "тих"]}
            ],
            "locations": [
                {"name": "Селото", "description": "Малко село", "type": "village"}
            ]
        }"#;

        let parsed = parse_book_response(response).unwrap();
        assert_eq!(parsed.chapters.len(), 1);
        assert_eq!(parsed.chapters[0].chapter_number, Some(1));
        assert_eq!(parsed.chapters[0].title, "Начало");
        assert_eq!(parsed.characters[0].traits, vec!["смел", "тих"]);
        assert_eq!(parsed.locations[0].kind, "village");
        assert!(parsed.style.is_none());
    }

    #[test]
    fn test_parse_with_commentary_around_json() {
        let response = "Here is the analysis:\n```json\n{\"chapters\": [], \"characters\": [{\"name\": \"Мара\"}]}\n```\nLet me know {if} you need more.";

        let parsed = parse_book_response(response).unwrap();
        assert_eq!(parsed.characters.len(), 1);
        assert_eq!(parsed.characters[0].name, "Мара");
    }

    #[test]
    fn test_braces_inside_strings() {
        let response = r#"{"chapters": [{"title": "A } tricky { title", "content": "x"}]} trailing }"#;

        let parsed = parse_book_response(response).unwrap();
        assert_eq!(parsed.chapters[0].title, "A } tricky { title");
    }

    #[test]
    fn test_no_json_is_error() {
        assert!(parse_book_response("I could not read this text.").is_err());
        assert!(parse_book_response("{ not json at all }").is_err());
        assert!(parse_book_response("").is_err());
    }

    #[test]
    fn test_no_object_is_error() {
        assert!(parse_book_response("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_missing_and_null_fields_default() {
        let response = r#"{"chapters": null, "characters": [{"name": "Петър", "traits": null}]}"#;

        let parsed = parse_book_response(response).unwrap();
        assert!(parsed.chapters.is_empty());
        assert!(parsed.locations.is_empty());
        assert!(parsed.characters[0].traits.is_empty());
        assert_eq!(parsed.characters[0].description, "");
    }

    #[test]
    fn test_chapter_number_variants() {
        let response = r#"{"chapters": [
            {"chapterNumber": "7", "content": "a"},
            {"chapterNumber": 2.0, "content": "b"},
            {"chapterNumber": "седми", "content": "c"}
        ]}"#;

        let parsed = parse_book_response(response).unwrap();
        let numbers: Vec<_> = parsed.chapters.iter().map(|c| c.chapter_number).collect();
        assert_eq!(numbers, vec![Some(7), Some(2), None]);
    }

    #[test]
    fn test_skips_malformed_and_blank_entries() {
        let response = r#"{
            "characters": [
                {"name": "  "},
                "just a string",
                {"name": "Гена", "traits": [" ", "упорита"]}
            ],
            "locations": [{"name": "", "type": "city"}, {"name": "Река"}]
        }"#;

        let parsed = parse_book_response(response).unwrap();
        assert_eq!(parsed.characters.len(), 1);
        assert_eq!(parsed.characters[0].traits, vec!["упорита"]);
        assert_eq!(parsed.locations.len(), 1);
        assert_eq!(parsed.locations[0].kind, "other");
    }

    #[test]
    fn test_book_response_with_style() {
        let response = r#"{"chapters": [], "styleAnalysis": {"tone": "мрачен", "pov": "first"}}"#;

        let parsed = parse_book_response(response).unwrap();
        let style = parsed.style.unwrap().complete(&neutral());
        assert_eq!(style.tone, "мрачен");
        assert_eq!(style.point_of_view, "first");
        assert_eq!(style.tense, "past");
    }

    #[test]
    fn test_parse_style_response() {
        let response = r#"Sure! {"tone": "ироничен", "pointOfView": "third-limited", "tense": "present",
            "descriptionDensity": "rich", "dialogueStyle": "остър"}"#;

        let style = parse_style_response(response).unwrap().complete(&neutral());
        assert_eq!(style.tone, "ироничен");
        assert_eq!(style.point_of_view, "third-limited");
        assert_eq!(style.tense, "present");
        assert_eq!(style.description_density, "rich");
        assert_eq!(style.dialogue_style, "остър");
    }

    #[test]
    fn test_style_response_without_attributes_is_error() {
        assert!(parse_style_response(r#"{"mood": "dark"}"#).is_err());
        assert!(parse_style_response("no json").is_err());
    }

    #[test]
    fn test_json_candidates() {
        assert!(json_candidates("no braces").is_empty());
        assert_eq!(json_candidates(r#"x {"a": 1} y"#), vec![r#"{"a": 1}"#]);
        assert_eq!(
            json_candidates(r#"{"a": {"b": 1}} and {"c": 2}"#),
            vec![
                r#"{"a": {"b": 1}}"#,
                r#"{"b": 1}"#,
                r#"{"c": 2}"#,
                r#"{"a": {"b": 1}} and {"c": 2}"#
            ]
        );
    }

    #[test]
    fn test_brace_in_commentary_before_object() {
        let response = r#"Note: I used {placeholders} where unsure.
{"chapters": [{"title": "Начало", "content": "Имало едно време."}], "characters": [{"name": "Иван"}]}"#;

        let parsed = parse_book_response(response).unwrap();
        assert_eq!(parsed.chapters.len(), 1);
        assert_eq!(parsed.chapters[0].title, "Начало");
        assert_eq!(parsed.characters[0].name, "Иван");
    }
}
