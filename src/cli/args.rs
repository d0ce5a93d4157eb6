//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum, ValueHint};

/// Weighted taxonomy trees: browse, search, score and convert
#[derive(Parser, Debug)]
#[command(name = "taxotree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Project directory holding .taxotree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw the hierarchy with aggregated scores
    Tree {
        #[command(flatten)]
        source: SourceArgs,
        /// Start drawing at this item id
        #[arg(long)]
        id: Option<i64>,
    },

    /// Print counts and the overall weighted score
    Summary {
        #[command(flatten)]
        source: SourceArgs,
    },

    /// List item names per level
    Levels {
        #[command(flatten)]
        source: SourceArgs,
        /// Only this level (0 = root), with aggregated scores
        #[arg(short, long)]
        level: Option<usize>,
    },

    /// Find items by name fragment or id
    Search {
        #[command(flatten)]
        source: SourceArgs,
        /// Case-insensitive name fragments
        #[arg(short, long, num_args = 1.., required_unless_present = "id", conflicts_with = "id")]
        name: Vec<String>,
        /// Exact item ids
        #[arg(short, long, num_args = 1..)]
        id: Vec<i64>,
    },

    /// Show siblings of items (children of their parents)
    Similar {
        #[command(flatten)]
        source: SourceArgs,
        /// Item ids
        #[arg(short, long, num_args = 1.., required = true)]
        id: Vec<i64>,
    },

    /// Convert to flat records or a nested projection
    Export {
        #[command(flatten)]
        source: SourceArgs,
        /// Output kind
        #[arg(short, long, value_enum)]
        to: ExportKind,
        /// Output file
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Remove subtrees and write the remaining records
    Remove {
        #[command(flatten)]
        source: SourceArgs,
        /// Ids of subtree roots to remove
        #[arg(short, long, num_args = 1.., required = true)]
        id: Vec<i64>,
        /// Output file (format from extension)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Taxonomy source file shared by all tree commands.
#[derive(clap::Args, Debug, Clone)]
pub struct SourceArgs {
    /// Taxonomy file (.csv or .json)
    #[arg(value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Override format detection (csv, json)
    #[arg(short, long)]
    pub format: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    /// Flat records as CSV
    Csv,
    /// Flat records as JSON
    Json,
    /// Nested JSON projection
    Nested,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Print a commented config template
    Template,
    /// Show config file locations
    Path,
}
