//! Tag model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// A unique identifier for a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TagId(Uuid);

impl TagId {
    /// Create a new unique tag ID
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Get the string representation of this ID
    #[must_use]
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for TagId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TagId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Virtual tags whose membership is computed rather than stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartTagKind {
    /// Every note
    AllNotes,
    /// Archived notes
    Archived,
    /// Trashed notes
    Trash,
}

impl SmartTagKind {
    /// Default display title
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::AllNotes => "All notes",
            Self::Archived => "Archived",
            Self::Trash => "Trash",
        }
    }
}

/// Classification of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "type", content = "smart")]
pub enum TagKind {
    /// User-created tag, membership stored as relationships
    #[default]
    Ordinary,
    /// Computed view
    Smart(SmartTagKind),
}

/// A tag-like container of notes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Unique identifier
    pub id: TagId,
    /// Display title
    pub title: String,
    /// Ordinary or smart
    #[serde(default)]
    pub kind: TagKind,
    /// Set when this tag is a conflicted copy of another tag
    #[serde(default)]
    pub conflict_of: Option<TagId>,
    /// Marked for deletion, waiting for sync
    #[serde(default)]
    pub deleted: bool,
}

impl Tag {
    /// Create a new ordinary tag with the given title
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: TagId::new(),
            title: title.into(),
            kind: TagKind::Ordinary,
            conflict_of: None,
            deleted: false,
        }
    }

    /// Create a smart tag of the given kind
    #[must_use]
    pub fn smart(kind: SmartTagKind) -> Self {
        Self {
            id: TagId::new(),
            title: kind.title().to_string(),
            kind: TagKind::Smart(kind),
            conflict_of: None,
            deleted: false,
        }
    }

    #[must_use]
    pub const fn smart_kind(&self) -> Option<SmartTagKind> {
        match self.kind {
            TagKind::Smart(kind) => Some(kind),
            TagKind::Ordinary => None,
        }
    }

    #[must_use]
    pub const fn is_smart(&self) -> bool {
        matches!(self.kind, TagKind::Smart(_))
    }

    #[must_use]
    pub const fn is_all_notes(&self) -> bool {
        matches!(self.kind, TagKind::Smart(SmartTagKind::AllNotes))
    }

    #[must_use]
    pub const fn is_archive(&self) -> bool {
        matches!(self.kind, TagKind::Smart(SmartTagKind::Archived))
    }

    #[must_use]
    pub const fn is_trash(&self) -> bool {
        matches!(self.kind, TagKind::Smart(SmartTagKind::Trash))
    }

    /// Whether this view shows archived notes regardless of the
    /// show-archived preference.
    #[must_use]
    pub const fn reveals_archived(&self) -> bool {
        self.is_archive() || self.is_trash()
    }
}
