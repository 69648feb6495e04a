//! User-facing messages shown by the panels.

pub const STRING_SESSION_EXPIRED: &str = "Your session has expired. New changes will not be pulled in. Please sign out and sign back in to refresh your session.";

pub const STRING_DELETE_TAG: &str =
    "Are you sure you want to delete this tag? Note: deleting a tag will not delete its notes.";

pub const STRING_DELETED_NOTE: &str = "The note you are attempting to edit has been deleted, and is awaiting sync. Changes you make will be disregarded.";
pub const STRING_INVALID_NOTE: &str = "The note you are attempting to save can not be found or has been deleted. Changes you make will not be synced. Please copy this note's text and start a new note.";
pub const STRING_ELLIPSES: &str = "...";
pub const STRING_GENERIC_SAVE_ERROR: &str = "There was an error saving your note. Please try again.";
pub const STRING_DELETE_PLACEHOLDER_ATTEMPT: &str = "This note is a placeholder and cannot be deleted. To remove from your list, simply navigate to a different note.";
pub const STRING_DELETE_LOCKED_ATTEMPT: &str =
    "This note is locked. If you'd like to delete it, unlock it, and try again.";

pub const ELLIPSES: &str = STRING_ELLIPSES;

pub fn sync_exception(data: &str) -> String {
    format!("There was an error while trying to save your items. Please contact support and share this message: {data}.")
}

/// Confirmation prompt for deleting a note. `title` is already quoted or
/// replaced with a generic phrase by the caller.
pub fn delete_note_prompt(title: &str, permanently: bool) -> String {
    if permanently {
        format!("Are you sure you want to permanently delete {title}?")
    } else {
        format!("Are you sure you want to move {title} to the trash?")
    }
}

pub fn empty_trash_prompt(count: usize) -> String {
    format!("Are you sure you want to permanently delete {count} note(s)?")
}
