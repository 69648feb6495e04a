use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] quire_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Tag not found: {0}")]
    TagNotFound(String),
    #[error("Page count must be at least 1")]
    InvalidPageCount,
    #[error("Notebook is invalid: {0}")]
    InvalidNotebook(String),
    #[error("Configuration error: {0}")]
    Config(String),
}
