//! Quire CLI - inspect a notebook through the same panel logic the app uses
//!
//! Lists the notes of a tag filtered, sorted and paginated like the notes
//! panel, prints tag counts and edits stored preferences.

mod cli;
mod commands;
mod error;
mod notebook;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::common::ResolvedPaths;
use crate::commands::completions::run_completions;
use crate::commands::list::{run_list, ListArgs};
use crate::commands::prefs::run_prefs;
use crate::commands::tags::run_tags;
use crate::error::CliError;

fn main() {
    if let Err(error) = run() {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("quire=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli {
        command,
        notebook,
        prefs,
        config,
    } = Cli::parse();

    if let Commands::Completions { shell, output } = &command {
        return run_completions(*shell, output.as_deref());
    }
    let paths = ResolvedPaths::resolve(notebook, prefs, config)?;

    match command {
        Commands::List {
            tag,
            filter,
            viewport_height,
            pages,
            json,
        } => {
            let args = ListArgs {
                tag,
                filter,
                viewport_height,
                pages,
                json,
            };
            run_list(&args, &paths)?;
        }
        Commands::Tags { json } => run_tags(json, &paths)?,
        Commands::Prefs { command } => run_prefs(&command, &paths)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
