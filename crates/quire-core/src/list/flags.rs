//! Labels shown next to a note in the list.

use serde::Serialize;

use crate::models::{Note, Tag};

/// Visual weight of a flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagSeverity {
    Info,
    Warning,
    Success,
    Neutral,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NoteFlag {
    pub label: &'static str,
    pub severity: FlagSeverity,
}

impl NoteFlag {
    const fn new(label: &'static str, severity: FlagSeverity) -> Self {
        Self { label, severity }
    }
}

/// Flags for `note` in display order.
#[must_use]
pub fn note_flags(note: &Note) -> Vec<NoteFlag> {
    let checks = [
        (note.pinned, NoteFlag::new("Pinned", FlagSeverity::Info)),
        (note.archived, NoteFlag::new("Archived", FlagSeverity::Warning)),
        (note.protected, NoteFlag::new("Protected", FlagSeverity::Success)),
        (note.locked, NoteFlag::new("Locked", FlagSeverity::Neutral)),
        (note.trashed, NoteFlag::new("Deleted", FlagSeverity::Danger)),
        (
            note.is_conflicted(),
            NoteFlag::new("Conflicted Copy", FlagSeverity::Danger),
        ),
        (
            note.error_decrypting,
            NoteFlag::new("Missing Keys", FlagSeverity::Danger),
        ),
        (
            note.deleted,
            NoteFlag::new("Deletion Pending Sync", FlagSeverity::Danger),
        ),
    ];
    checks
        .into_iter()
        .filter_map(|(set, flag)| set.then_some(flag))
        .collect()
}

/// Whether the row for `note` lists its tags while `tag` is selected.
/// `tag_count` is the number of ordinary tags the note belongs to.
#[must_use]
pub fn should_show_tags_for_note(note: &Note, tag: &Tag, hide_tags: bool, tag_count: usize) -> bool {
    if hide_tags || note.protected {
        return false;
    }
    if tag.is_all_notes() {
        return tag_count > 0;
    }
    if tag.is_smart() {
        return true;
    }
    // Inside a tag, only notes with other tags besides it
    tag_count > 1
}
