//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use folio_domain::{Chunk, ProgressEvent, StyleProfile};
use folio_importer::{AnalysisMode, AnalysisReport};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
    Table,
};

/// Longest cell preview before truncation
const PREVIEW_CHARS: usize = 60;

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format an analysis report.
    pub fn format_report(&self, report: &AnalysisReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            OutputFormat::Table => Ok(self.format_report_table(report)),
            OutputFormat::Quiet => Ok(format!(
                "{} chapters, {} characters, {} locations",
                report.book.chapters.len(),
                report.book.characters.len(),
                report.book.locations.len()
            )),
        }
    }

    fn format_report_table(&self, report: &AnalysisReport) -> String {
        let book = &report.book;
        let meta = &report.metadata;
        let mut sections = Vec::new();

        let mode = match meta.mode {
            AnalysisMode::Direct => "direct",
            AnalysisMode::Chunked => "chunked",
        };
        let mut builder = Builder::default();
        builder.push_record(["Mode", "Chunks", "Fallbacks", "Tokens", "Time"]);
        builder.push_record([
            mode.to_string(),
            meta.chunk_count.to_string(),
            meta.fallback_chunks.to_string(),
            meta.tokens_used.to_string(),
            format!("{:.1}s", meta.elapsed_ms as f64 / 1000.0),
        ]);
        sections.push(render(builder));

        if book.chapters.is_empty() {
            sections.push(self.colorize("No chapters found.", "yellow"));
        } else {
            let mut builder = Builder::default();
            builder.push_record(["#", "Title", "Chars", "Summary"]);
            for chapter in &book.chapters {
                builder.push_record([
                    chapter.chapter_number.to_string(),
                    chapter.title.clone(),
                    chapter.content.chars().count().to_string(),
                    preview(&chapter.summary),
                ]);
            }
            sections.push(render(builder));
        }

        if !book.characters.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Character", "Traits", "Description"]);
            for character in &book.characters {
                builder.push_record([
                    character.name.clone(),
                    character.traits.join(", "),
                    preview(&character.description),
                ]);
            }
            sections.push(render(builder));
        }

        if !book.locations.is_empty() {
            let mut builder = Builder::default();
            builder.push_record(["Location", "Type", "Description"]);
            for location in &book.locations {
                builder.push_record([
                    location.name.clone(),
                    location.kind.clone(),
                    preview(&location.description),
                ]);
            }
            sections.push(render(builder));
        }

        sections.push(style_table(&book.style_analysis));
        sections.join("\n\n")
    }

    /// Format a chunk listing.
    pub fn format_chunks(&self, chunks: &[Chunk]) -> Result<String> {
        match self.format {
            OutputFormat::Json => Ok(serde_json::to_string_pretty(chunks)?),
            OutputFormat::Quiet => Ok(chunks.len().to_string()),
            OutputFormat::Table => {
                if chunks.is_empty() {
                    return Ok(self.colorize("No chunks.", "yellow"));
                }
                let mut builder = Builder::default();
                builder.push_record(["#", "Bytes", "Chars", "Tokens", "Starts with"]);
                for chunk in chunks {
                    builder.push_record([
                        (chunk.index + 1).to_string(),
                        format!("{}..{}", chunk.start_offset, chunk.end_offset),
                        chunk.char_len().to_string(),
                        chunk.estimated_token_count.to_string(),
                        preview(&chunk.content),
                    ]);
                }
                Ok(render(builder))
            }
        }
    }

    /// Format a progress line, or `None` for events without a percentage.
    pub fn progress(&self, event: &ProgressEvent) -> Option<String> {
        let percent = event.percent()?;
        Some(self.colorize(&format!("[{:>3}%] {}", percent, event), "cyan"))
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            _ => text.to_string(),
        }
    }
}

fn style_table(style: &StyleProfile) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Style", ""]);
    builder.push_record(["Tone", style.tone.as_str()]);
    builder.push_record(["Point of view", style.point_of_view.as_str()]);
    builder.push_record(["Tense", style.tense.as_str()]);
    builder.push_record(["Description", style.description_density.as_str()]);
    builder.push_record(["Dialogue", style.dialogue_style.as_str()]);
    render(builder)
}

fn render(builder: Builder) -> String {
    let mut table: Table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));
    table.to_string()
}

/// First line of `text`, cut to a fixed number of characters.
fn preview(text: &str) -> String {
    let line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("").trim();
    if line.chars().count() <= PREVIEW_CHARS {
        return line.to_string();
    }
    let cut: String = line.chars().take(PREVIEW_CHARS).collect();
    format!("{}…", cut)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_domain::{Chapter, MergedBookResult, MergedCharacter, MergedLocation};
    use folio_importer::AnalysisMetadata;

    fn report() -> AnalysisReport {
        AnalysisReport {
            book: MergedBookResult {
                chapters: vec![Chapter {
                    chapter_number: 1,
                    title: "Начало".to_string(),
                    content: "Имало едно време.".to_string(),
                    summary: "Героят тръгва.".to_string(),
                }],
                characters: vec![MergedCharacter {
                    name: "Иван".to_string(),
                    description: "Млад овчар".to_string(),
                    traits: vec!["смел".to_string(), "тих".to_string()],
                }],
                locations: vec![MergedLocation {
                    name: "Селото".to_string(),
                    description: "Малко село".to_string(),
                    kind: "village".to_string(),
                }],
                style_analysis: StyleProfile::neutral("Неутрален", "Стандартен"),
            },
            metadata: AnalysisMetadata {
                mode: AnalysisMode::Chunked,
                chunk_count: 3,
                fallback_chunks: 1,
                tokens_used: 1200,
                elapsed_ms: 2500,
            },
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("\"styleAnalysis\""));
        assert!(output.contains("\"chapterNumber\": 1"));
        assert!(output.contains("\"mode\": \"chunked\""));
    }

    #[test]
    fn test_quiet_format() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter.format_report(&report()).unwrap();
        assert_eq!(output, "1 chapters, 1 characters, 1 locations");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_report(&report()).unwrap();
        assert!(output.contains("Начало"));
        assert!(output.contains("смел, тих"));
        assert!(output.contains("village"));
        assert!(output.contains("third-omniscient"));
        assert!(output.contains("2.5s"));
    }

    #[test]
    fn test_empty_chunks() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_chunks(&[]).unwrap();
        assert!(output.contains("No chunks"));
    }

    #[test]
    fn test_progress_skips_chunk_events() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let line = formatter.progress(&ProgressEvent::Merging).unwrap();
        assert_eq!(line, "[ 85%] Merging analysis results...");
        assert!(formatter
            .progress(&ProgressEvent::ChunkStarted {
                chunk: 1,
                total_chunks: 2
            })
            .is_none());
    }

    #[test]
    fn test_preview_truncates_by_chars() {
        let long = "ж".repeat(100);
        let out = preview(&long);
        assert_eq!(out.chars().count(), PREVIEW_CHARS + 1);
        assert!(out.ends_with('…'));
        assert_eq!(preview("\n\n  кратко  \nоще"), "кратко");
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }
}
