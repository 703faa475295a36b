//! CLI command definitions and argument parsing.

use clap::{Parser, Subcommand};
use folio_importer::ImporterConfig;
use std::path::PathBuf;

/// Folio - Import a manuscript as chapters, characters, locations and style.
#[derive(Debug, Parser)]
#[command(name = "folio")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (counts only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Analyze a plain-text manuscript
    Analyze(AnalyzeArgs),

    /// Split a manuscript into chunks without calling the model
    Chunk(ChunkArgs),

    /// Show or initialize the configuration file
    Config(ConfigArgs),
}

/// Arguments for the analyze command.
#[derive(Debug, Parser)]
pub struct AnalyzeArgs {
    /// Plain-text manuscript (UTF-8)
    pub file: PathBuf,

    /// Also write the book as JSON to this path
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Use a preset instead of the configured importer settings
    #[arg(long, value_enum)]
    pub preset: Option<PresetArg>,
}

/// Arguments for the chunk command.
#[derive(Debug, Parser)]
pub struct ChunkArgs {
    /// Plain-text manuscript (UTF-8)
    pub file: PathBuf,

    /// Override the target chunk size (characters)
    #[arg(short, long)]
    pub target_chars: Option<usize>,
}

/// Arguments for config management.
#[derive(Debug, Parser)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Importer preset argument.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum PresetArg {
    /// Balanced settings
    Default,
    /// Smaller chunks, more parallelism
    Aggressive,
    /// Larger chunks, less parallelism
    Lenient,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}

impl From<PresetArg> for ImporterConfig {
    fn from(preset: PresetArg) -> Self {
        match preset {
            PresetArg::Default => ImporterConfig::default(),
            PresetArg::Aggressive => ImporterConfig::aggressive(),
            PresetArg::Lenient => ImporterConfig::lenient(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_command() {
        let cli = Cli::try_parse_from([
            "folio",
            "analyze",
            "book.txt",
            "--out",
            "book.json",
            "--api-key",
            "k",
        ])
        .unwrap();
        match cli.command {
            Command::Analyze(args) => {
                assert_eq!(args.file, PathBuf::from("book.txt"));
                assert_eq!(args.out, Some(PathBuf::from("book.json")));
                assert_eq!(args.api_key.as_deref(), Some("k"));
            }
            _ => panic!("Expected Analyze command"),
        }
    }

    #[test]
    fn test_global_format_after_subcommand() {
        let cli = Cli::try_parse_from(["folio", "chunk", "book.txt", "--format", "json"]).unwrap();
        assert!(matches!(cli.format, Some(CliFormat::Json)));
        assert!(matches!(cli.command, Command::Chunk(_)));
    }

    #[test]
    fn test_config_init() {
        let cli = Cli::try_parse_from(["folio", "config", "init", "--force"]).unwrap();
        match cli.command {
            Command::Config(ConfigArgs {
                action: ConfigAction::Init { force },
            }) => assert!(force),
            _ => panic!("Expected Config Init command"),
        }
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["folio"]).is_err());
    }

    #[test]
    fn test_preset_conversion() {
        let config: ImporterConfig = PresetArg::Aggressive.into();
        assert_eq!(config, ImporterConfig::aggressive());
    }
}
