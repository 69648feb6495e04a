//! Notes panel view model.
//!
//! [`NoteListViewModel`] turns the members of the selected tag into the
//! filtered, sorted and paginated list the notes panel renders, and keeps a
//! note selected: it picks a default when the tag changes, advances when the
//! selected note disappears and creates a placeholder note when a tag is
//! empty.
//!
//! Selections made here are applied locally before they are broadcast through
//! [`AppState`](crate::state::AppState), so the echoed `NoteChanged` is a
//! no-op. A `NoteChanged` raised by another panel is applied when it arrives.

mod filter;
mod flags;
mod pagination;
mod sort;

pub use filter::{filter_notes, is_note_visible, FilterCriteria};
pub use flags::{note_flags, should_show_tags_for_note, FlagSeverity, NoteFlag};
pub use pagination::{page_size_for, Pagination};
pub use sort::{compare_notes, sort_notes};

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::Serialize;
use serde_json::json;

use crate::config::PanelConfig;
use crate::engine::{PrivilegedAction, SyncEvent};
use crate::models::{Note, NoteId, Tag};
use crate::preferences::{ListOptions, PrefKey, SortKey};
use crate::services::Services;
use crate::state::{AppEvent, PanelName, SubscriptionId};
use crate::timer::TimerKey;

/// Result of a user-initiated selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    Selected,
    /// The note was already selected. The selection is broadcast again.
    Unchanged,
    /// No such note in the visible list
    Missing,
    /// The host must present a privilege challenge, then call
    /// [`NoteListViewModel::select_note_privileged`].
    PrivilegeRequired,
}

/// Boolean display options of the notes panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListToggle {
    ShowArchived,
    HidePinned,
    HideNotePreview,
    HideDate,
    HideTags,
}

impl ListToggle {
    pub const fn pref_key(self) -> PrefKey {
        match self {
            Self::ShowArchived => PrefKey::ShowArchived,
            Self::HidePinned => PrefKey::HidePinned,
            Self::HideNotePreview => PrefKey::HideNotePreview,
            Self::HideDate => PrefKey::HideDate,
            Self::HideTags => PrefKey::HideTags,
        }
    }
}

/// A rendered row of the note list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NoteRow {
    pub note: Note,
    pub flags: Vec<NoteFlag>,
    pub show_tags: bool,
    pub selected: bool,
    pub preview: Option<String>,
}

struct ListState {
    tag: Option<Tag>,
    /// Visible notes of the tag, sorted
    notes: Vec<Note>,
    /// Member count before filtering
    member_count: usize,
    selected: Option<Note>,
    selected_index: usize,
    filter_text: String,
    search_submitted: bool,
    options: ListOptions,
    options_loaded: bool,
    pagination: Pagination,
    viewport_height: Option<u32>,
    scroll_position: (f64, f64),
    show_menu: bool,
    panel_title: Option<String>,
    panel_width: Option<f64>,
    placeholder_after_sync: bool,
}

impl ListState {
    fn selected_position(&self) -> Option<usize> {
        let selected = self.selected.as_ref()?;
        self.notes.iter().position(|note| note.id == selected.id)
    }
}

pub struct NoteListViewModel {
    services: Services,
    config: PanelConfig,
    state: RefCell<ListState>,
    subscription: Cell<Option<SubscriptionId>>,
    weak_self: Weak<Self>,
}

impl NoteListViewModel {
    /// Create the view model and subscribe it to app state events.
    pub fn attach(services: Services, config: PanelConfig) -> Rc<Self> {
        let page_size = page_size_for(None, config.min_note_cell_height, config.default_page_size);
        let view_model = Rc::new_cyclic(|weak| Self {
            services,
            config,
            state: RefCell::new(ListState {
                tag: None,
                notes: Vec::new(),
                member_count: 0,
                selected: None,
                selected_index: 0,
                filter_text: String::new(),
                search_submitted: false,
                options: ListOptions::default(),
                options_loaded: false,
                pagination: Pagination::new(page_size),
                viewport_height: None,
                scroll_position: (0.0, 0.0),
                show_menu: false,
                panel_title: None,
                panel_width: None,
                placeholder_after_sync: false,
            }),
            subscription: Cell::new(None),
            weak_self: weak.clone(),
        });

        let weak = Rc::downgrade(&view_model);
        let id = view_model.services.app_state.add_observer(move |event| {
            if let Some(view_model) = weak.upgrade() {
                view_model.handle_app_event(event);
            }
        });
        view_model.subscription.set(Some(id));
        view_model.load_preferences();
        view_model.reset_pagination(false);
        view_model
    }

    fn handle_app_event(&self, event: &AppEvent) {
        match event {
            AppEvent::TagChanged { previous_tag } => {
                if let Some(tag) = self.services.app_state.selected_tag() {
                    self.handle_tag_change(tag, previous_tag.as_ref());
                }
            }
            AppEvent::NoteChanged { .. } => {
                self.handle_note_selection(self.services.app_state.selected_note());
            }
            AppEvent::PreferencesChanged => {
                self.load_preferences();
                self.reload_notes();
            }
            AppEvent::EditorFocused => self.state.borrow_mut().show_menu = false,
            _ => {}
        }
    }

    fn handle_tag_change(&self, tag: Tag, previous_tag: Option<&Tag>) {
        tracing::debug!(
            tag = %tag.title,
            previous = ?previous_tag.map(|previous| previous.title.as_str()),
            "Notes panel switching tag"
        );
        self.discard_placeholder();

        {
            let mut state = self.state.borrow_mut();
            state.tag = Some(tag.clone());
            state.scroll_position = (0.0, 0.0);
            state.show_menu = false;
            state.filter_text.clear();
            state.search_submitted = false;
        }
        self.reset_pagination(false);
        self.reload_notes();

        let (has_notes, stale_selection) = {
            let state = self.state.borrow();
            let stale = state
                .selected
                .as_ref()
                .is_some_and(|selected| !state.notes.iter().any(|note| note.id == selected.id));
            (!state.notes.is_empty(), stale)
        };
        if has_notes {
            self.select_first_note();
        } else if self.services.engine.borrow().initial_data_loaded() {
            if !tag.is_smart() || tag.is_all_notes() {
                self.create_new_note();
            } else if stale_selection {
                self.select(None);
            }
        }
    }

    fn handle_note_selection(&self, incoming: Option<Note>) {
        let current = self.state.borrow().selected.as_ref().map(|note| note.id);
        if incoming.as_ref().map(|note| note.id) == current {
            return;
        }
        let cleared = incoming.is_none();
        self.apply_selection(incoming);
        if cleared {
            self.reload_notes();
            self.select_next_or_create_new();
        }
    }

    /// Recompute the visible list from the engine.
    pub fn reload_notes(&self) {
        let Some(stored_tag) = self.state.borrow().tag.clone() else {
            return;
        };
        let (tag, members) = {
            let engine = self.services.engine.borrow();
            let tag = engine.find_tag(stored_tag.id).unwrap_or(stored_tag);
            let members = engine.members_of(&tag);
            (tag, members)
        };

        let mut state = self.state.borrow_mut();
        let mut notes = {
            let criteria = FilterCriteria {
                tag: &tag,
                text: &state.filter_text,
                show_archived: state.options.show_archived,
                hide_pinned: state.options.hide_pinned,
            };
            filter_notes(&members, &criteria)
        };
        sort_notes(&mut notes, state.options.sort_by, state.options.sort_reverse);

        if let Some(selected_id) = state.selected.as_ref().map(|note| note.id) {
            if let Some(fresh) = notes.iter().find(|note| note.id == selected_id) {
                state.selected = Some(fresh.clone());
            }
        }
        state.panel_title = if state.filter_text.is_empty() {
            Some(tag.title.clone())
        } else {
            Some(format!("{} search results", notes.len()))
        };
        tracing::debug!(
            "Reloaded notes panel: {} of {} note(s) visible",
            notes.len(),
            members.len()
        );
        state.member_count = members.len();
        state.notes = notes;
        state.tag = Some(tag);
    }

    /// Reload after the engine delivered changed items, then keep a valid
    /// note selected.
    pub fn handle_items_changed(&self) {
        self.reload_notes();
        let selected = self.state.borrow().selected.clone();
        let Some(selected) = selected else {
            self.select_first_note();
            return;
        };

        let discarded = self
            .services
            .engine
            .borrow()
            .find_note(selected.id)
            .map_or(true, |note| note.deleted || note.trashed);
        let included = self
            .state
            .borrow()
            .notes
            .iter()
            .any(|note| note.id == selected.id);
        if discarded || !included {
            self.select_next_or_create_new();
        }
    }

    pub fn handle_sync_event(&self, event: &SyncEvent) {
        match event {
            SyncEvent::LocalDataLoaded => {
                self.reload_notes();
                if self.state.borrow().notes.is_empty() {
                    self.create_new_note();
                }
            }
            SyncEvent::Completed { .. } => {
                let create = {
                    let mut state = self.state.borrow_mut();
                    let create = state.placeholder_after_sync && state.notes.is_empty();
                    if create {
                        state.placeholder_after_sync = false;
                    }
                    create
                };
                if create {
                    self.create_new_note();
                }
            }
            SyncEvent::Error | SyncEvent::TakingTooLong => {}
        }
    }

    /// The user signed in. A placeholder is discarded so that downloaded
    /// notes can take its place; if the next completed sync leaves the list
    /// empty a new one is created.
    pub fn handle_sign_in(&self) {
        if self.discard_placeholder() {
            self.reload_notes();
            self.state.borrow_mut().placeholder_after_sync = true;
        }
    }

    /// Select a note by id, or clear the selection with `None`.
    pub fn select_note(&self, id: Option<NoteId>) -> SelectOutcome {
        self.select_checked(id, true)
    }

    /// Complete a selection after the privilege challenge succeeded.
    pub fn select_note_privileged(&self, id: NoteId) -> SelectOutcome {
        self.select_checked(Some(id), false)
    }

    fn select_checked(&self, id: Option<NoteId>, check_privilege: bool) -> SelectOutcome {
        let Some(id) = id else {
            let had_selection = self.state.borrow().selected.is_some();
            self.select(None);
            return if had_selection {
                SelectOutcome::Selected
            } else {
                SelectOutcome::Unchanged
            };
        };

        let (note, already_selected) = {
            let state = self.state.borrow();
            (
                state.notes.iter().find(|note| note.id == id).cloned(),
                state.selected.as_ref().is_some_and(|note| note.id == id),
            )
        };
        let Some(note) = note else {
            return SelectOutcome::Missing;
        };
        if check_privilege
            && note.protected
            && self
                .services
                .privileges
                .action_requires_privilege(PrivilegedAction::ViewProtectedNotes)
        {
            return SelectOutcome::PrivilegeRequired;
        }

        self.select(Some(note));
        if already_selected {
            SelectOutcome::Unchanged
        } else {
            SelectOutcome::Selected
        }
    }

    pub fn select_next_note(&self) -> SelectOutcome {
        let next = {
            let state = self.state.borrow();
            let next_index = state.selected_position().map_or(0, |index| index + 1);
            state.notes.get(next_index).map(|note| note.id)
        };
        match next {
            Some(id) => self.select_note(Some(id)),
            None => SelectOutcome::Missing,
        }
    }

    /// Returns `Missing` when the selection is already at the top.
    pub fn select_previous_note(&self) -> SelectOutcome {
        let previous = {
            let state = self.state.borrow();
            state.selected_position()
                .and_then(|index| index.checked_sub(1))
                .and_then(|index| state.notes.get(index))
                .map(|note| note.id)
        };
        match previous {
            Some(id) => self.select_note(Some(id)),
            None => SelectOutcome::Missing,
        }
    }

    fn select_first_note(&self) {
        let first = first_unprotected(&self.state.borrow().notes, 0);
        if let Some(note) = first {
            self.select(Some(note));
        }
    }

    fn select_next_or_create_new(&self) {
        let (candidate, tag) = {
            let state = self.state.borrow();
            let start = state
                .selected_index
                .min(state.notes.len().saturating_sub(1));
            (first_unprotected(&state.notes, start), state.tag.clone())
        };
        if let Some(note) = candidate {
            self.select(Some(note));
        } else if tag.as_ref().map_or(true, |tag| !tag.is_smart()) {
            self.create_new_note();
        } else {
            self.select(None);
        }
    }

    /// Create a placeholder note in the current tag and select it. Returns
    /// `None` when a placeholder is already selected.
    pub fn create_new_note(&self) -> Option<Note> {
        let (tag, count) = {
            let state = self.state.borrow();
            if state.selected.as_ref().is_some_and(|note| note.dummy) {
                return None;
            }
            (state.tag.clone(), state.member_count)
        };

        let note = Note::placeholder(format!("Note {}", count + 1));
        {
            let mut engine = self.services.engine.borrow_mut();
            engine.add_note(note.clone());
            engine.set_note_dirty(note.id, false);
            if let Some(tag) = tag.as_ref().filter(|tag| !tag.is_smart()) {
                engine.relate_note_to_tag(tag.id, note.id);
                engine.set_tag_dirty(tag.id);
            }
        }
        tracing::debug!("Created placeholder note {}", note.id);

        self.reload_notes();
        self.select(Some(note.clone()));
        Some(note)
    }

    /// Apply a selection locally, then broadcast it.
    fn select(&self, note: Option<Note>) {
        let was_empty = self.state.borrow().selected.is_none();
        if note.is_none() && was_empty {
            return;
        }
        let note = self.apply_selection(note);
        self.services.app_state.set_selected_note(note);
    }

    fn apply_selection(&self, note: Option<Note>) -> Option<Note> {
        let note = note.map(|note| self.clear_conflict(note));

        let previous = {
            let mut state = self.state.borrow_mut();
            let previous = std::mem::replace(&mut state.selected, note.clone());
            if let Some(note) = &note {
                state.selected_index = state
                    .notes
                    .iter()
                    .position(|candidate| candidate.id == note.id)
                    .unwrap_or(0);
                if let Some(listed) = state.notes.iter_mut().find(|c| c.id == note.id) {
                    *listed = note.clone();
                }
            }
            previous
        };

        let new_id = note.as_ref().map(|note| note.id);
        if let Some(previous) = previous.filter(|previous| previous.dummy && Some(previous.id) != new_id)
        {
            self.schedule_placeholder_cleanup(previous.id);
        }
        if let Some(note) = &note {
            if note.dummy {
                self.services
                    .scheduler
                    .cancel_key(TimerKey::PlaceholderCleanup(note.id));
            }
            tracing::debug!("Notes panel selected {}", note.id);
        }
        note
    }

    fn clear_conflict(&self, mut note: Note) -> Note {
        if !note.is_conflicted() {
            return note;
        }
        note.conflict_of = None;
        let mut engine = self.services.engine.borrow_mut();
        if let Some(mut stored) = engine.find_note(note.id) {
            stored.conflict_of = None;
            engine.update_note(stored);
            engine.set_note_dirty(note.id, false);
            engine.sync();
        }
        note
    }

    fn schedule_placeholder_cleanup(&self, id: NoteId) {
        let weak = self.weak_self.clone();
        self.services.scheduler.schedule(
            TimerKey::PlaceholderCleanup(id),
            self.config.placeholder_cleanup_delay(),
            move || {
                if let Some(view_model) = weak.upgrade() {
                    view_model.remove_abandoned_placeholder(id);
                }
            },
        );
    }

    fn remove_abandoned_placeholder(&self, id: NoteId) {
        let selected = self.state.borrow().selected.as_ref().map(|note| note.id);
        if selected == Some(id) {
            return;
        }
        let removed = {
            let mut engine = self.services.engine.borrow_mut();
            match engine.find_note(id) {
                Some(note) if note.dummy => {
                    engine.remove_note_locally(id);
                    true
                }
                _ => false,
            }
        };
        if removed {
            tracing::debug!("Removed abandoned placeholder note {}", id);
            self.reload_notes();
        }
    }

    /// Drop a selected placeholder right away and clear the selection.
    fn discard_placeholder(&self) -> bool {
        let placeholder = self
            .state
            .borrow()
            .selected
            .as_ref()
            .filter(|note| note.dummy)
            .map(|note| note.id);
        let Some(id) = placeholder else {
            return false;
        };

        self.services
            .scheduler
            .cancel_key(TimerKey::PlaceholderCleanup(id));
        self.services.engine.borrow_mut().remove_note_locally(id);
        {
            let mut state = self.state.borrow_mut();
            state.selected = None;
            state.notes.retain(|note| note.id != id);
        }
        tracing::debug!("Discarded placeholder note {}", id);
        self.services.app_state.set_selected_note(None);
        true
    }

    /// Read display options from the preference store.
    pub fn load_preferences(&self) {
        let (options, width) = {
            let preferences = self.services.preferences.borrow();
            (
                ListOptions::load(&*preferences),
                preferences.number_value(PrefKey::NotesPanelWidth),
            )
        };

        let sort_changed = {
            let mut state = self.state.borrow_mut();
            let previous = state.options_loaded.then_some(state.options.sort_by);
            state.options = options;
            state.options_loaded = true;
            if width.is_some() {
                state.panel_width = width;
            }
            previous.is_some_and(|previous| previous != options.sort_by)
        };
        if sort_changed {
            self.reload_notes();
            self.select_first_note();
        }
        if width.is_some_and(|width| width <= 0.0) {
            self.services.app_state.panel_did_resize(PanelName::Notes, true);
        }
    }

    pub fn set_sort_by(&self, sort_by: SortKey) {
        self.state.borrow_mut().options.sort_by = sort_by;
        self.reload_notes();
        self.store_preference(PrefKey::SortBy, json!(sort_by.as_pref()));
    }

    pub fn toggle_reverse_sort(&self) {
        let reverse = {
            let mut state = self.state.borrow_mut();
            state.show_menu = false;
            state.options.sort_reverse = !state.options.sort_reverse;
            state.options.sort_reverse
        };
        self.reload_notes();
        self.store_preference(PrefKey::SortReverse, json!(reverse));
    }

    /// Flip a display option and persist it. Returns the new value.
    pub fn toggle_option(&self, toggle: ListToggle) -> bool {
        let value = {
            let mut state = self.state.borrow_mut();
            let options = &mut state.options;
            let slot = match toggle {
                ListToggle::ShowArchived => &mut options.show_archived,
                ListToggle::HidePinned => &mut options.hide_pinned,
                ListToggle::HideNotePreview => &mut options.hide_note_preview,
                ListToggle::HideDate => &mut options.hide_date,
                ListToggle::HideTags => &mut options.hide_tags,
            };
            *slot = !*slot;
            *slot
        };
        self.store_preference(toggle.pref_key(), json!(value));
        self.reload_notes();
        value
    }

    pub fn on_panel_resize(&self, width: f64, collapsed: bool) {
        self.store_preference(PrefKey::NotesPanelWidth, json!(width));
        self.state.borrow_mut().panel_width = Some(width);
        self.services
            .app_state
            .panel_did_resize(PanelName::Notes, collapsed);
    }

    fn store_preference(&self, key: PrefKey, value: serde_json::Value) {
        let mut preferences = self.services.preferences.borrow_mut();
        preferences.set_value(key, value);
        preferences.sync();
    }

    pub fn set_filter_text(&self, text: impl Into<String>) {
        self.state.borrow_mut().filter_text = text.into();
        self.filter_text_changed();
    }

    pub fn clear_filter_text(&self) {
        self.state.borrow_mut().filter_text.clear();
        self.on_filter_enter();
        self.filter_text_changed();
        self.reset_pagination(false);
    }

    /// The user submitted the search.
    pub fn on_filter_enter(&self) {
        self.state.borrow_mut().search_submitted = true;
    }

    fn filter_text_changed(&self) {
        self.state.borrow_mut().search_submitted = false;
        self.reload_notes();
        let still_visible = {
            let state = self.state.borrow();
            state.selected_position().is_some()
        };
        if !still_visible {
            self.select_first_note();
        }
    }

    pub fn is_filtering(&self) -> bool {
        !self.state.borrow().filter_text.is_empty()
    }

    pub fn filter_text(&self) -> String {
        self.state.borrow().filter_text.clone()
    }

    pub fn search_submitted(&self) -> bool {
        self.state.borrow().search_submitted
    }

    /// Show one more page of notes.
    pub fn paginate(&self) {
        self.state.borrow_mut().pagination.paginate();
        self.reload_notes();
    }

    pub fn reset_pagination(&self, keep_current_if_larger: bool) {
        let mut state = self.state.borrow_mut();
        let page_size = page_size_for(
            state.viewport_height,
            self.config.min_note_cell_height,
            self.config.default_page_size,
        );
        state.pagination.reset(page_size, keep_current_if_larger);
    }

    /// The window was resized.
    pub fn set_viewport_height(&self, height: Option<u32>) {
        self.state.borrow_mut().viewport_height = height;
        self.reset_pagination(true);
    }

    pub fn pagination(&self) -> Pagination {
        self.state.borrow().pagination
    }

    pub fn scroll_position(&self) -> (f64, f64) {
        self.state.borrow().scroll_position
    }

    pub fn set_scroll_position(&self, x: f64, y: f64) {
        self.state.borrow_mut().scroll_position = (x, y);
    }

    pub fn show_menu(&self) -> bool {
        self.state.borrow().show_menu
    }

    pub fn set_show_menu(&self, show: bool) {
        self.state.borrow_mut().show_menu = show;
    }

    pub fn panel_width(&self) -> Option<f64> {
        self.state.borrow().panel_width
    }

    pub fn options(&self) -> ListOptions {
        self.state.borrow().options
    }

    pub fn tag(&self) -> Option<Tag> {
        self.state.borrow().tag.clone()
    }

    /// Visible notes in display order, ignoring pagination
    pub fn notes(&self) -> Vec<Note> {
        self.state.borrow().notes.clone()
    }

    pub fn selected_note(&self) -> Option<Note> {
        self.state.borrow().selected.clone()
    }

    pub fn panel_title(&self) -> Option<String> {
        self.state.borrow().panel_title.clone()
    }

    pub fn options_subtitle(&self) -> String {
        let options = self.state.borrow().options;
        let mut subtitle = format!(" {}", options.sort_by.label());
        if options.show_archived {
            subtitle.push_str(" | + Archived");
        }
        if options.hide_pinned {
            subtitle.push_str(" | \u{2013} Pinned");
        }
        if options.sort_reverse {
            subtitle.push_str(" | Reversed");
        }
        subtitle
    }

    /// Rows inside the pagination window.
    pub fn rendered_notes(&self) -> Vec<NoteRow> {
        let state = self.state.borrow();
        let Some(tag) = state.tag.as_ref() else {
            return Vec::new();
        };
        let engine = self.services.engine.borrow();
        let selected = state.selected.as_ref().map(|note| note.id);
        let options = state.options;

        state
            .pagination
            .window(&state.notes)
            .iter()
            .map(|note| NoteRow {
                note: note.clone(),
                flags: note_flags(note),
                show_tags: should_show_tags_for_note(
                    note,
                    tag,
                    options.hide_tags,
                    engine.tag_count_for_note(note.id),
                ),
                selected: selected == Some(note.id),
                preview: self.preview_for(note, options),
            })
            .collect()
    }

    fn preview_for(&self, note: &Note, options: ListOptions) -> Option<String> {
        if options.hide_note_preview || note.hide_preview || note.protected {
            return None;
        }
        let preview = note
            .preview_plain
            .clone()
            .unwrap_or_else(|| note.plain_preview(self.config.note_preview_char_limit));
        (!preview.is_empty()).then_some(preview)
    }
}

impl Drop for NoteListViewModel {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.services.app_state.remove_observer(id);
        }
    }
}

/// First unprotected note at or after `start`. Earlier notes are never
/// considered.
fn first_unprotected(notes: &[Note], start: usize) -> Option<Note> {
    notes
        .get(start..)?
        .iter()
        .find(|note| !note.protected)
        .cloned()
}

#[cfg(test)]
mod tests;
