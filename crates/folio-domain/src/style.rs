//! Style module - the manuscript's style fingerprint

use serde::{Deserialize, Serialize};

/// Writing style of a manuscript
///
/// Exactly one profile is produced per pipeline run, independent of how the
/// text was chunked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleProfile {
    /// Emotional tone, free text
    pub tone: String,

    /// Narrative point of view (first, third-limited, third-omniscient)
    #[serde(rename = "pov", alias = "pointOfView")]
    pub point_of_view: String,

    /// Narrative tense (past, present)
    pub tense: String,

    /// Description density (sparse, moderate, rich)
    pub description_density: String,

    /// Dialogue style, free text
    pub dialogue_style: String,
}

impl StyleProfile {
    /// Neutral profile used when style analysis yields nothing usable
    ///
    /// `tone` and `dialogue_style` are free text in the manuscript's
    /// language, so they are supplied by the caller.
    pub fn neutral(tone: impl Into<String>, dialogue_style: impl Into<String>) -> Self {
        Self {
            tone: tone.into(),
            point_of_view: "third-omniscient".to_string(),
            tense: "past".to_string(),
            description_density: "moderate".to_string(),
            dialogue_style: dialogue_style.into(),
        }
    }
}
