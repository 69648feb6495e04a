//! Note list ordering.
//!
//! Placeholders come first, then pinned notes, then the chosen sort key.
//! With `reverse` off, dates sort newest first and titles sort A to Z.
//! Notes without a title always sort after titled ones.

use std::cmp::Ordering;

use crate::models::Note;
use crate::preferences::SortKey;

/// Compare two notes for display.
#[must_use]
pub fn compare_notes(a: &Note, b: &Note, sort_by: SortKey, reverse: bool) -> Ordering {
    match (a.dummy, b.dummy) {
        (true, true) => return Ordering::Equal,
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        (false, false) => {}
    }
    match (a.pinned, b.pinned) {
        (true, false) => return Ordering::Less,
        (false, true) => return Ordering::Greater,
        _ => {}
    }
    compare_values(a, b, sort_by, reverse)
}

/// Stable in-place sort.
pub fn sort_notes(notes: &mut [Note], sort_by: SortKey, reverse: bool) {
    notes.sort_by(|a, b| compare_notes(a, b, sort_by, reverse));
}

fn compare_values(a: &Note, b: &Note, sort_by: SortKey, reverse: bool) -> Ordering {
    let ordering = match sort_by {
        SortKey::CreatedAt => b.created_at.cmp(&a.created_at),
        SortKey::ClientUpdatedAt => b.client_updated_at.cmp(&a.client_updated_at),
        SortKey::Title => {
            let a_title = a.title.to_lowercase();
            let b_title = b.title.to_lowercase();
            match (a_title.is_empty(), b_title.is_empty()) {
                (true, true) => return Ordering::Equal,
                (true, false) => return Ordering::Greater,
                (false, true) => return Ordering::Less,
                (false, false) => a_title.cmp(&b_title),
            }
        }
    };
    if reverse {
        ordering.reverse()
    } else {
        ordering
    }
}
