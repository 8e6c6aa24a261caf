//! CLI argument definitions using clap derive

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::cli::commands::{
    completions::CompletionsArgs, config::ConfigCommands, entry::EntryCommands,
    export::ExportArgs, import::ImportArgs, init::InitArgs, paste::PasteArgs,
    summary::SummaryArgs,
};

#[derive(Parser)]
#[command(name = "rma")]
#[command(author, version, about = "RMA Report Toolkit")]
#[command(long_about = "Record product-return (RMA) cases and export them as a formatted spreadsheet report with defect statistics.")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOpts,
}

#[derive(clap::Args, Clone, Debug)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Print the recomputed summary after every change
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Session root (default: auto-detect by finding .rma/)
    #[arg(long, global = true, env = "RMA_SESSION")]
    pub session: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new RMA session
    Init(InitArgs),

    /// Record management (add, list, update, delete)
    #[command(subcommand, alias = "e")]
    Entry(EntryCommands),

    /// Show defective-piece and defect-reason counts
    Summary(SummaryArgs),

    /// Export the records and summary to an xlsx report
    Export(ExportArgs),

    /// Append records from an existing xlsx report
    Import(ImportArgs),

    /// Append records from tab or space separated text
    Paste(PasteArgs),

    /// View and modify configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Automatically detect based on context (yaml for show, tsv for list)
    #[default]
    Auto,
    /// YAML format (full fidelity)
    Yaml,
    /// Tab-separated values (for piping)
    Tsv,
    /// JSON format (for programming)
    Json,
    /// CSV format (for spreadsheets)
    Csv,
    /// Markdown tables
    Md,
    /// Just IDs, one per line
    Id,
}

impl OutputFormat {
    /// Resolve `Auto` to a concrete format
    pub fn or(self, fallback: OutputFormat) -> OutputFormat {
        if self == OutputFormat::Auto {
            fallback
        } else {
            self
        }
    }

    /// Parse a format name from configuration (case-insensitive)
    pub fn from_name(name: &str) -> Option<OutputFormat> {
        <OutputFormat as ValueEnum>::from_str(name.trim(), true).ok()
    }
}
