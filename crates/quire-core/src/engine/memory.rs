//! In-memory model engine used by the CLI and tests.

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Note, NoteId, SmartTagKind, Tag, TagId};

use super::{ModelEngine, SyncEvent};

/// Keeps notes, tags and relationships in insertion order and records sync
/// requests instead of talking to a server.
#[derive(Debug, Clone)]
pub struct MemoryEngine {
    smart_tags: Vec<Tag>,
    tags: Vec<Tag>,
    notes: Vec<Note>,
    relationships: BTreeMap<TagId, Vec<NoteId>>,
    dirty_notes: BTreeSet<NoteId>,
    dirty_tags: BTreeSet<TagId>,
    initial_data_loaded: bool,
    offline: bool,
    sync_requests: usize,
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryEngine {
    /// Engine holding only the three smart tags
    #[must_use]
    pub fn new() -> Self {
        Self {
            smart_tags: vec![
                Tag::smart(SmartTagKind::AllNotes),
                Tag::smart(SmartTagKind::Archived),
                Tag::smart(SmartTagKind::Trash),
            ],
            tags: Vec::new(),
            notes: Vec::new(),
            relationships: BTreeMap::new(),
            dirty_notes: BTreeSet::new(),
            dirty_tags: BTreeSet::new(),
            initial_data_loaded: false,
            offline: false,
            sync_requests: 0,
        }
    }

    /// Mark local data as loaded and return the matching sync event.
    pub fn finish_local_load(&mut self) -> SyncEvent {
        self.initial_data_loaded = true;
        SyncEvent::LocalDataLoaded
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    /// Number of `sync` calls received so far
    pub const fn sync_requests(&self) -> usize {
        self.sync_requests
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn is_tag_dirty(&self, id: TagId) -> bool {
        self.dirty_tags.contains(&id)
    }

    pub fn find_tag_by_title(&self, title: &str) -> Option<Tag> {
        self.smart_tags
            .iter()
            .chain(self.tags.iter())
            .find(|tag| !tag.deleted && tag.title.eq_ignore_ascii_case(title))
            .cloned()
    }

    /// Finish an in-flight sync.
    ///
    /// Offline engines report an error and keep their dirty state. Otherwise
    /// dirty items are considered saved and items marked for deletion are
    /// purged.
    pub fn complete_sync(&mut self) -> SyncEvent {
        if self.offline {
            tracing::debug!("Sync failed: engine is offline");
            return SyncEvent::Error;
        }

        let saved: Vec<NoteId> = self
            .notes
            .iter()
            .filter(|note| self.dirty_notes.contains(&note.id) && !note.deleted)
            .map(|note| note.id)
            .collect();
        self.dirty_notes.clear();
        self.dirty_tags.clear();

        let purged_notes: Vec<NoteId> = self
            .notes
            .iter()
            .filter(|note| note.deleted)
            .map(|note| note.id)
            .collect();
        for id in purged_notes {
            self.remove_note_locally(id);
        }
        let purged_tags: Vec<TagId> = self
            .tags
            .iter()
            .filter(|tag| tag.deleted)
            .map(|tag| tag.id)
            .collect();
        for id in purged_tags {
            self.remove_tag_locally(id);
        }

        tracing::debug!("Sync completed: {} note(s) saved", saved.len());
        SyncEvent::Completed { saved }
    }

    fn note_mut(&mut self, id: NoteId) -> Option<&mut Note> {
        self.notes.iter_mut().find(|note| note.id == id)
    }

    fn tag_mut(&mut self, id: TagId) -> Option<&mut Tag> {
        self.tags.iter_mut().find(|tag| tag.id == id)
    }

    fn detach_note(&mut self, id: NoteId) {
        for members in self.relationships.values_mut() {
            members.retain(|member| *member != id);
        }
    }
}

impl ModelEngine for MemoryEngine {
    fn smart_tags(&self) -> Vec<Tag> {
        self.smart_tags.clone()
    }

    fn tags(&self) -> Vec<Tag> {
        self.tags.iter().filter(|tag| !tag.deleted).cloned().collect()
    }

    fn find_tag(&self, id: TagId) -> Option<Tag> {
        self.smart_tags
            .iter()
            .chain(self.tags.iter())
            .find(|tag| tag.id == id)
            .cloned()
    }

    fn members_of(&self, tag: &Tag) -> Vec<Note> {
        let live = self.notes.iter().filter(|note| !note.deleted);
        match tag.smart_kind() {
            Some(SmartTagKind::AllNotes) => live.cloned().collect(),
            Some(SmartTagKind::Archived) => live
                .filter(|note| note.archived && !note.trashed)
                .cloned()
                .collect(),
            Some(SmartTagKind::Trash) => live.filter(|note| note.trashed).cloned().collect(),
            None => self
                .relationships
                .get(&tag.id)
                .map(|members| {
                    members
                        .iter()
                        .filter_map(|id| self.notes.iter().find(|note| note.id == *id))
                        .filter(|note| !note.deleted)
                        .cloned()
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    fn tag_count_for_note(&self, id: NoteId) -> usize {
        self.tags
            .iter()
            .filter(|tag| !tag.deleted)
            .filter(|tag| {
                self.relationships
                    .get(&tag.id)
                    .is_some_and(|members| members.contains(&id))
            })
            .count()
    }

    fn find_note(&self, id: NoteId) -> Option<Note> {
        self.notes.iter().find(|note| note.id == id).cloned()
    }

    fn add_note(&mut self, note: Note) {
        if let Some(existing) = self.note_mut(note.id) {
            *existing = note;
        } else {
            self.notes.push(note);
        }
    }

    fn update_note(&mut self, note: Note) -> bool {
        match self.note_mut(note.id) {
            Some(existing) => {
                *existing = note;
                true
            }
            None => false,
        }
    }

    fn set_note_dirty(&mut self, id: NoteId, update_client_modified: bool) {
        let Some(note) = self.note_mut(id) else {
            tracing::warn!("Cannot mark unknown note {} dirty", id);
            return;
        };
        if update_client_modified {
            note.client_updated_at = chrono::Utc::now().timestamp_millis();
        }
        self.dirty_notes.insert(id);
    }

    fn set_note_to_be_deleted(&mut self, id: NoteId) {
        let Some(note) = self.note_mut(id) else {
            return;
        };
        note.deleted = true;
        self.dirty_notes.insert(id);
        self.detach_note(id);
    }

    fn remove_note_locally(&mut self, id: NoteId) {
        self.notes.retain(|note| note.id != id);
        self.dirty_notes.remove(&id);
        self.detach_note(id);
    }

    fn add_tag(&mut self, tag: Tag) {
        if tag.is_smart() {
            self.smart_tags.push(tag);
        } else if let Some(existing) = self.tag_mut(tag.id) {
            *existing = tag;
        } else {
            self.tags.push(tag);
        }
    }

    fn update_tag(&mut self, tag: Tag) -> bool {
        match self.tag_mut(tag.id) {
            Some(existing) => {
                *existing = tag;
                true
            }
            None => false,
        }
    }

    fn set_tag_dirty(&mut self, id: TagId) {
        if self.find_tag(id).is_some() {
            self.dirty_tags.insert(id);
        }
    }

    fn set_tag_to_be_deleted(&mut self, id: TagId) {
        if let Some(tag) = self.tag_mut(id) {
            tag.deleted = true;
            self.dirty_tags.insert(id);
        }
    }

    fn remove_tag_locally(&mut self, id: TagId) {
        self.tags.retain(|tag| tag.id != id);
        self.relationships.remove(&id);
        self.dirty_tags.remove(&id);
    }

    fn relate_note_to_tag(&mut self, tag: TagId, note: NoteId) {
        let members = self.relationships.entry(tag).or_default();
        if !members.contains(&note) {
            members.push(note);
        }
    }

    fn trashed_notes(&self) -> Vec<Note> {
        self.notes
            .iter()
            .filter(|note| note.trashed && !note.deleted)
            .cloned()
            .collect()
    }

    fn empty_trash(&mut self) {
        let trashed: Vec<NoteId> = self.trashed_notes().iter().map(|note| note.id).collect();
        for id in trashed {
            self.set_note_to_be_deleted(id);
        }
    }

    fn is_note_dirty(&self, id: NoteId) -> bool {
        self.dirty_notes.contains(&id)
    }

    fn initial_data_loaded(&self) -> bool {
        self.initial_data_loaded
    }

    fn is_offline(&self) -> bool {
        self.offline
    }

    fn sync(&mut self) {
        self.sync_requests += 1;
        tracing::debug!("Sync requested ({} pending)", self.dirty_notes.len());
    }
}
