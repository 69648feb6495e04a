//! Note list filtering (visibility + search text).

use crate::models::{Note, Tag};

/// Inputs that decide which notes of a tag are visible
#[derive(Debug, Clone, Copy)]
pub struct FilterCriteria<'a> {
    pub tag: &'a Tag,
    pub text: &'a str,
    pub show_archived: bool,
    pub hide_pinned: bool,
}

/// Keep the visible notes, preserving their order.
#[must_use]
pub fn filter_notes(notes: &[Note], criteria: &FilterCriteria<'_>) -> Vec<Note> {
    let query = criteria.text.to_lowercase();
    notes
        .iter()
        .filter(|note| note_is_visible(note, criteria, &query))
        .cloned()
        .collect()
}

/// Visibility of a single note under `criteria`.
#[must_use]
pub fn is_note_visible(note: &Note, criteria: &FilterCriteria<'_>) -> bool {
    note_is_visible(note, criteria, &criteria.text.to_lowercase())
}

fn note_is_visible(note: &Note, criteria: &FilterCriteria<'_>, query: &str) -> bool {
    let tag = criteria.tag;
    if note.trashed && !tag.is_trash() {
        return false;
    }

    let can_show_archived = criteria.show_archived || (tag.is_smart() && tag.reveals_archived());
    if (note.archived && !can_show_archived) || (note.pinned && criteria.hide_pinned) {
        return false;
    }

    if query.is_empty() {
        return true;
    }

    // Single spaces separate words; every word must match the same field.
    let words: Vec<&str> = query.split(' ').collect();
    let title = note.title.to_lowercase();
    let text = note.text.to_lowercase();
    words.iter().all(|word| title.contains(word)) || words.iter().all(|word| text.contains(word))
}
