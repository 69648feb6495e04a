use std::io::{self, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::error::CliError;

/// Render the completion script for `shell`.
pub fn completion_script(shell: Shell) -> Vec<u8> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    let mut buffer = Vec::new();
    generate(shell, &mut command, name, &mut buffer);
    buffer
}

pub fn run_completions(shell: Shell, output_path: Option<&Path>) -> Result<(), CliError> {
    let script = completion_script(shell);
    match output_path {
        Some(path) => {
            std::fs::write(path, &script)?;
            println!("{}", path.display());
        }
        None => io::stdout().write_all(&script)?,
    }
    Ok(())
}
