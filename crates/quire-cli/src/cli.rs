use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "quire")]
#[command(about = "Browse a Quire notebook the way the notes panel shows it")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Notebook file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub notebook: Option<PathBuf>,

    /// Preference file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub prefs: Option<PathBuf>,

    /// Panel configuration file (JSON)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the notes of a tag
    #[command(alias = "ls")]
    List {
        /// Tag title; the default smart tag when omitted
        #[arg(long)]
        tag: Option<String>,
        /// Only notes whose title or body contain every word
        #[arg(long)]
        filter: Option<String>,
        /// Viewport height in pixels, used to size a page
        #[arg(long, value_name = "PX")]
        viewport_height: Option<u32>,
        /// Number of pages to show
        #[arg(long, default_value = "1", value_name = "N")]
        pages: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tags with their note counts
    Tags {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show or edit stored preferences
    Prefs {
        #[command(subcommand)]
        command: PrefsCommands,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
        /// Optional output path (stdout when omitted)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum PrefsCommands {
    /// Print every stored preference
    List,
    /// Print one preference
    Get {
        /// Preference key, e.g. sortBy
        key: String,
    },
    /// Store a preference
    Set {
        /// Preference key, e.g. sortBy
        key: String,
        /// JSON value; anything that is not valid JSON is stored as a string
        value: String,
    },
}
