//! Contract with the model/sync engine.
//!
//! The engine owns notes, tags and their relationships, tracks dirty items
//! and performs sync. Panels only query it and delegate mutations to it.

mod memory;

pub use memory::MemoryEngine;

use crate::models::{Note, NoteId, Tag, TagId};

/// Notifications the sync layer delivers to panels
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Items from local storage finished loading
    LocalDataLoaded,
    /// A sync round-trip finished. `saved` lists notes the server accepted.
    Completed { saved: Vec<NoteId> },
    /// A sync round-trip failed
    Error,
    /// A sync is in flight for longer than expected
    TakingTooLong,
}

/// Item store and sync engine used by the panels.
pub trait ModelEngine {
    /// Smart tags in display order. The first one is the default selection.
    fn smart_tags(&self) -> Vec<Tag>;

    /// Ordinary tags
    fn tags(&self) -> Vec<Tag>;

    fn find_tag(&self, id: TagId) -> Option<Tag>;

    /// Member notes of a tag, computed for smart tags and taken from stored
    /// relationships for ordinary tags.
    fn members_of(&self, tag: &Tag) -> Vec<Note>;

    /// Number of ordinary tags the note belongs to
    fn tag_count_for_note(&self, id: NoteId) -> usize;

    fn find_note(&self, id: NoteId) -> Option<Note>;

    fn add_note(&mut self, note: Note);

    /// Replace the stored copy of a note. Returns false for unknown notes.
    fn update_note(&mut self, note: Note) -> bool;

    fn set_note_dirty(&mut self, id: NoteId, update_client_modified: bool);

    fn set_note_to_be_deleted(&mut self, id: NoteId);

    /// Drop a note and its relationships without syncing the removal
    fn remove_note_locally(&mut self, id: NoteId);

    fn add_tag(&mut self, tag: Tag);

    fn update_tag(&mut self, tag: Tag) -> bool;

    fn set_tag_dirty(&mut self, id: TagId);

    fn set_tag_to_be_deleted(&mut self, id: TagId);

    fn remove_tag_locally(&mut self, id: TagId);

    fn relate_note_to_tag(&mut self, tag: TagId, note: NoteId);

    fn trashed_notes(&self) -> Vec<Note>;

    /// Mark every trashed note for deletion
    fn empty_trash(&mut self);

    fn is_note_dirty(&self, id: NoteId) -> bool;

    fn initial_data_loaded(&self) -> bool;

    fn is_offline(&self) -> bool;

    /// Request a sync. The result arrives later as a [`SyncEvent`].
    fn sync(&mut self);
}

/// Actions that may require the user to pass a privilege challenge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrivilegedAction {
    ViewProtectedNotes,
    DeleteNote,
}

/// Decides whether an action needs elevated privilege. Presenting the
/// challenge is left to the host.
pub trait PrivilegeGate {
    fn action_requires_privilege(&self, action: PrivilegedAction) -> bool;
}

/// Gate that never asks for privilege
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPrivileges;

impl PrivilegeGate for NoPrivileges {
    fn action_requires_privilege(&self, _action: PrivilegedAction) -> bool {
        false
    }
}

/// Gate that requires privilege for a fixed set of actions
#[derive(Debug, Clone, Default)]
pub struct StaticPrivileges {
    pub protected: Vec<PrivilegedAction>,
}

impl PrivilegeGate for StaticPrivileges {
    fn action_requires_privilege(&self, action: PrivilegedAction) -> bool {
        self.protected.contains(&action)
    }
}
