//! Note model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a note, using UUID v7 (time-sortable)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NoteId(Uuid);

impl NoteId {
    /// Create a new unique note ID using UUID v7
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }

    /// First 13 characters of the ID, enough to tell notes apart in a list
    #[must_use]
    pub fn short(&self) -> String {
        self.as_str().chars().take(13).collect()
    }
}

impl Default for NoteId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NoteId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// A note as delivered by the model engine.
///
/// The list panels only read notes; every mutation goes back through the
/// engine so that dirty tracking stays in one place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,
    /// Title shown in the list and editor header
    #[serde(default)]
    pub title: String,
    /// Body text
    #[serde(default)]
    pub text: String,
    /// Plain-text preview derived from the body on save
    #[serde(default)]
    pub preview_plain: Option<String>,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last local modification timestamp (Unix ms)
    pub client_updated_at: i64,
    #[serde(default)]
    pub pinned: bool,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub protected: bool,
    #[serde(default)]
    pub trashed: bool,
    /// Marked for deletion, waiting for the next sync to confirm it
    #[serde(default)]
    pub deleted: bool,
    /// Client-side placeholder that has not been edited or persisted yet
    #[serde(default)]
    pub dummy: bool,
    #[serde(default)]
    pub hide_preview: bool,
    /// The note could not be decrypted with the available keys
    #[serde(default)]
    pub error_decrypting: bool,
    /// Set when this note is a conflicted copy of another note
    #[serde(default)]
    pub conflict_of: Option<NoteId>,
}

impl Note {
    /// Create a new note with the given title and body
    #[must_use]
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        let now = chrono::Utc::now().timestamp_millis();
        Self {
            id: NoteId::new(),
            title: title.into(),
            text: text.into(),
            preview_plain: None,
            created_at: now,
            client_updated_at: now,
            pinned: false,
            archived: false,
            locked: false,
            protected: false,
            trashed: false,
            deleted: false,
            dummy: false,
            hide_preview: false,
            error_decrypting: false,
            conflict_of: None,
        }
    }

    /// Create an empty placeholder note with the given title
    #[must_use]
    pub fn placeholder(title: impl Into<String>) -> Self {
        Self {
            dummy: true,
            ..Self::new(title, "")
        }
    }

    /// True when the note has an unresolved conflict marker
    #[must_use]
    pub const fn is_conflicted(&self) -> bool {
        self.conflict_of.is_some()
    }

    /// Build the plain preview: at most `limit` characters of the body,
    /// followed by an ellipsis when the body was truncated.
    #[must_use]
    pub fn plain_preview(&self, limit: usize) -> String {
        let mut preview: String = self.text.chars().take(limit).collect();
        if self.text.chars().count() > limit {
            preview.push_str(crate::strings::ELLIPSES);
        }
        preview
    }
}
