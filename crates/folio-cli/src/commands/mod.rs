//! Command implementations.

pub mod analyze;
pub mod chunk;
pub mod config;

pub use self::analyze::execute_analyze;
pub use self::chunk::execute_chunk;
pub use self::config::execute_config;

use crate::error::Result;
use std::fs;
use std::path::Path;

/// Read a manuscript file as UTF-8.
pub(crate) fn read_text(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}
