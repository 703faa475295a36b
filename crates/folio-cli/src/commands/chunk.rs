//! Chunk command implementation.

use super::read_text;
use crate::cli::ChunkArgs;
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use folio_domain::Chunk;
use folio_importer::{prepare_manuscript, TextChunker};

/// Execute the chunk command.
pub async fn execute_chunk(args: ChunkArgs, config: &Config, formatter: &Formatter) -> Result<()> {
    let text = read_text(&args.file)?;
    let chunks = chunk_text(&text, args.target_chars, config)?;

    println!("{}", formatter.format_chunks(&chunks)?);
    Ok(())
}

/// Prepare and chunk `text` without calling the model.
pub(crate) fn chunk_text(
    text: &str,
    target_chars: Option<usize>,
    config: &Config,
) -> Result<Vec<Chunk>> {
    let mut chunking = config.importer.chunking.clone();
    if let Some(target) = target_chars {
        chunking.target_chars = target;
        chunking.min_chars = chunking.min_chars.min(target);
    }
    chunking.validate().map_err(CliError::Config)?;

    let manuscript = prepare_manuscript(text, &config.importer)?;
    Ok(TextChunker::new(chunking).chunk(&manuscript.text))
}
