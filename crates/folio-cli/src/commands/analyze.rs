//! Analyze command implementation.

use super::read_text;
use crate::cli::AnalyzeArgs;
use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::{Oracle, ProgressEvent};
use folio_importer::{prepare_manuscript, AnalysisReport, BookAnalyzer, ImporterConfig};
use folio_llm::{GeminiConfig, GeminiOracle};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Execute the analyze command.
pub async fn execute_analyze(
    args: AnalyzeArgs,
    config: &Config,
    formatter: &Formatter,
) -> Result<()> {
    let importer = args
        .preset
        .map(ImporterConfig::from)
        .unwrap_or_else(|| config.importer.clone());

    if let Some(warning) = config.timeout_warning(&importer) {
        eprintln!("{}", formatter.warning(&warning));
    }

    let text = read_text(&args.file)?;
    let manuscript = prepare_manuscript(&text, &importer)?;
    if manuscript.truncated {
        eprintln!(
            "{}",
            formatter.warning(&format!(
                "Manuscript truncated from {} to {} characters",
                manuscript.original_chars, importer.max_text_chars
            ))
        );
    }

    let api_key = args
        .api_key
        .filter(|key| !key.trim().is_empty())
        .ok_or(CliError::MissingApiKey)?;
    let oracle = GeminiOracle::new(GeminiConfig {
        api_key,
        ..config.oracle.clone()
    })?;

    let report = run_analysis(oracle, importer, &manuscript.text, formatter).await?;

    if let Some(out) = &args.out {
        write_book(&report, out)?;
        eprintln!(
            "{}",
            formatter.success(&format!("Book written to {}", out.display()))
        );
    }

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}

/// Run the pipeline, streaming progress lines to stderr in table mode.
pub(crate) async fn run_analysis<O: Oracle>(
    oracle: O,
    importer: ImporterConfig,
    text: &str,
    formatter: &Formatter,
) -> Result<AnalysisReport> {
    let analyzer = BookAnalyzer::new(oracle, importer)?;
    let show_progress = formatter.format() == OutputFormat::Table;

    let sink = |event: ProgressEvent| {
        debug!(?event, "progress");
        if show_progress {
            if let Some(line) = formatter.progress(&event) {
                eprintln!("{}", line);
            }
        }
    };

    Ok(analyzer.analyze_detailed(text, &sink).await?)
}

fn write_book(report: &AnalysisReport, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(&report.book)?;
    fs::write(path, json)?;
    Ok(())
}
