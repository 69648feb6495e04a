//! Error types for quire-core

use thiserror::Error;

use crate::models::{NoteId, TagId};
use crate::strings;

/// Result type alias using quire-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in quire-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Note is no longer known to the model engine
    #[error("Invalid note: {0}")]
    InvalidNote(NoteId),

    /// Note is marked for deletion and waiting for sync
    #[error("Note is pending deletion: {0}")]
    DeletedNote(NoteId),

    /// Placeholder notes are discarded, never deleted
    #[error("Cannot delete a placeholder note")]
    PlaceholderDeletion,

    /// Locked notes must be unlocked first
    #[error("Cannot delete a locked note")]
    LockedDeletion,

    /// Editor operation without a loaded note
    #[error("No note is open in the editor")]
    NoActiveNote,

    /// Tag not found
    #[error("Tag not found: {0}")]
    TagNotFound(TagId),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Message to present to the user for editor-facing failures.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidNote(_) => strings::STRING_INVALID_NOTE.to_string(),
            Self::DeletedNote(_) => strings::STRING_DELETED_NOTE.to_string(),
            Self::PlaceholderDeletion => strings::STRING_DELETE_PLACEHOLDER_ATTEMPT.to_string(),
            Self::LockedDeletion => strings::STRING_DELETE_LOCKED_ATTEMPT.to_string(),
            other => other.to_string(),
        }
    }
}
