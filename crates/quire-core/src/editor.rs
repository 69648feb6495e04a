//! Editor panel session.
//!
//! [`EditorSession`] holds the note currently open in the editor. Edits are
//! written back to the engine, marked dirty and synced after a debounce.
//! A status line reports save progress and honors a minimum on-screen
//! duration so quick successive messages do not flicker.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::PanelConfig;
use crate::engine::{PrivilegedAction, SyncEvent};
use crate::error::{Error, Result};
use crate::models::Note;
use crate::preferences::EditorPreferences;
use crate::services::Services;
use crate::state::{AppEvent, SubscriptionId};
use crate::strings;
use crate::timer::TimerKey;

const STATUS_SAVING: &str = "Saving...";
const STATUS_ALL_SAVED: &str = "All changes saved";
const STATUS_SYNC_UNREACHABLE: &str = "Sync Unreachable";
const STATUS_SAVED_OFFLINE: &str = "Changes saved offline";
const STATUS_OFFLINE_SAVING_ISSUE: &str = "Offline Saving Issue";
const STATUS_CHANGES_NOT_SAVED: &str = "Changes not saved";

/// Flags for [`EditorSession::save_note`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveOptions {
    /// Sync after the short delay instead of the debounce delay
    pub bypass_debouncer: bool,
    /// Touch the client-side modification date
    pub update_client_modified: bool,
    /// Keep the stored preview as it is
    pub dont_update_previews: bool,
}

impl SaveOptions {
    /// Options used by the metadata toggles
    pub const fn immediate() -> Self {
        Self {
            bypass_debouncer: true,
            update_client_modified: false,
            dont_update_previews: true,
        }
    }
}

/// Message on the editor status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteStatus {
    pub message: String,
    pub desc: Option<String>,
    /// Logical time the status became visible
    pub shown_at_ms: u64,
}

impl NoteStatus {
    pub fn new(message: impl Into<String>, desc: Option<&str>) -> Self {
        Self {
            message: message.into(),
            desc: desc.map(ToString::to_string),
            shown_at_ms: 0,
        }
    }
}

/// Next step after a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteRequest {
    /// Present a privilege challenge, then call
    /// [`EditorSession::delete_note_privileged`].
    PrivilegeRequired,
    /// Ask the user to confirm with this prompt, then call
    /// [`EditorSession::confirm_delete`].
    ConfirmationRequired(String),
}

#[derive(Default)]
struct EditorState {
    note: Option<Note>,
    status: Option<NoteStatus>,
    save_error: bool,
    sync_taking_too_long: bool,
    show_menu: bool,
    preferences: EditorPreferences,
    alert: Option<String>,
    did_show_error_alert: bool,
}

pub struct EditorSession {
    services: Services,
    config: PanelConfig,
    state: RefCell<EditorState>,
    subscription: Cell<Option<SubscriptionId>>,
    weak_self: Weak<Self>,
}

impl EditorSession {
    /// Create the session and subscribe it to app state events.
    pub fn attach(services: Services, config: PanelConfig) -> Rc<Self> {
        let session = Rc::new_cyclic(|weak| Self {
            services,
            config,
            state: RefCell::new(EditorState::default()),
            subscription: Cell::new(None),
            weak_self: weak.clone(),
        });

        let weak = Rc::downgrade(&session);
        let id = session.services.app_state.add_observer(move |event| {
            if let Some(session) = weak.upgrade() {
                session.handle_app_event(event);
            }
        });
        session.subscription.set(Some(id));
        session.load_preferences();
        session
    }

    fn handle_app_event(&self, event: &AppEvent) {
        match event {
            AppEvent::NoteChanged { .. } => {
                self.set_note(self.services.app_state.selected_note());
            }
            AppEvent::PreferencesChanged => self.load_preferences(),
            _ => {}
        }
    }

    /// Open `note`, resetting status and menus. Abandoned placeholders are
    /// cleaned up by the notes panel, not here.
    fn set_note(&self, note: Option<Note>) {
        let note = note.map(|note| {
            self.services
                .engine
                .borrow()
                .find_note(note.id)
                .unwrap_or(note)
        });
        self.services.scheduler.cancel_key(TimerKey::Status);

        let mut state = self.state.borrow_mut();
        if let Some(note) = &note {
            tracing::debug!("Editor opened note {}", note.id);
        }
        state.note = note;
        state.status = None;
        state.show_menu = false;
    }

    pub fn load_preferences(&self) {
        let preferences = EditorPreferences::load(&*self.services.preferences.borrow());
        self.state.borrow_mut().preferences = preferences;
    }

    /// Replace the body and save.
    pub fn content_changed(&self, text: impl Into<String>) -> Result<()> {
        self.edit_note(|note| note.text = text.into())?;
        self.save_note(SaveOptions {
            update_client_modified: true,
            ..SaveOptions::default()
        })
    }

    /// Replace the title and save without touching the preview.
    pub fn title_changed(&self, title: impl Into<String>) -> Result<()> {
        self.edit_note(|note| note.title = title.into())?;
        self.save_note(SaveOptions {
            update_client_modified: true,
            dont_update_previews: true,
            ..SaveOptions::default()
        })
    }

    fn edit_note<T>(&self, edit: impl FnOnce(&mut Note) -> T) -> Result<T> {
        let mut state = self.state.borrow_mut();
        let note = state.note.as_mut().ok_or(Error::NoActiveNote)?;
        Ok(edit(note))
    }

    /// Write the open note to the engine, mark it dirty and schedule a sync.
    pub fn save_note(&self, options: SaveOptions) -> Result<()> {
        let mut note = self.state.borrow().note.clone().ok_or(Error::NoActiveNote)?;
        note.dummy = false;

        let (stored, offline) = {
            let mut engine = self.services.engine.borrow_mut();
            match engine.find_note(note.id) {
                None => return Err(Error::InvalidNote(note.id)),
                Some(stored) if stored.deleted || note.deleted => {
                    return Err(Error::DeletedNote(note.id));
                }
                Some(_) => {}
            }

            if !options.dont_update_previews {
                note.preview_plain = Some(note.plain_preview(self.config.note_preview_char_limit));
            }
            engine.update_note(note.clone());
            engine.set_note_dirty(note.id, options.update_client_modified);
            (engine.find_note(note.id).unwrap_or(note), engine.is_offline())
        };
        tracing::debug!("Saving note {}", stored.id);
        self.state.borrow_mut().note = Some(stored);
        self.show_saving_status();

        let weak = self.weak_self.clone();
        self.services.scheduler.schedule(
            TimerKey::Save,
            self.config
                .save_delay(options.bypass_debouncer || offline),
            move || {
                if let Some(session) = weak.upgrade() {
                    session.services.engine.borrow_mut().sync();
                }
            },
        );
        Ok(())
    }

    fn show_saving_status(&self) {
        self.set_status(NoteStatus::new(STATUS_SAVING, None), false);
    }

    pub fn show_all_changes_saved(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.save_error = false;
            state.sync_taking_too_long = false;
        }
        let mut message = STATUS_ALL_SAVED.to_string();
        if self.services.engine.borrow().is_offline() {
            message.push_str(" (offline)");
        }
        self.set_status(NoteStatus::new(message, None), true);
    }

    /// Show an error status, defaulting to the unreachable-sync message.
    pub fn show_error_status(&self, error: Option<NoteStatus>) {
        let error = error.unwrap_or_else(|| {
            NoteStatus::new(STATUS_SYNC_UNREACHABLE, Some(STATUS_SAVED_OFFLINE))
        });
        {
            let mut state = self.state.borrow_mut();
            state.save_error = true;
            state.sync_taking_too_long = false;
        }
        self.set_status(error, true);
    }

    /// Local storage rejected a write.
    pub fn handle_local_storage_error(&self) {
        self.show_error_status(Some(NoteStatus::new(
            STATUS_OFFLINE_SAVING_ISSUE,
            Some(STATUS_CHANGES_NOT_SAVED),
        )));
    }

    /// Show `status` once the current one has been visible for the minimum
    /// duration. Without `wait` it replaces the current status right away.
    fn set_status(&self, status: NoteStatus, wait: bool) {
        let scheduler = &self.services.scheduler;
        let now = scheduler.now_ms();
        let wait_ms = match &self.state.borrow().status {
            Some(current) if wait => {
                let visible_for = now.saturating_sub(current.shown_at_ms);
                self.config
                    .minimum_status_duration_ms
                    .saturating_sub(visible_for)
            }
            _ => 0,
        };

        scheduler.cancel_key(TimerKey::Status);
        if wait_ms == 0 {
            self.apply_status(status);
            return;
        }
        let weak = self.weak_self.clone();
        scheduler.schedule(TimerKey::Status, Duration::from_millis(wait_ms), move || {
            if let Some(session) = weak.upgrade() {
                session.apply_status(status);
            }
        });
    }

    fn apply_status(&self, mut status: NoteStatus) {
        status.shown_at_ms = self.services.scheduler.now_ms();
        self.state.borrow_mut().status = Some(status);
    }

    pub fn handle_sync_event(&self, event: &SyncEvent) {
        let Some(id) = self.state.borrow().note.as_ref().map(|note| note.id) else {
            return;
        };
        match event {
            SyncEvent::TakingTooLong => self.state.borrow_mut().sync_taking_too_long = true,
            SyncEvent::Completed { saved } => {
                self.state.borrow_mut().sync_taking_too_long = false;
                // still dirty means another sync is on its way
                if self.services.engine.borrow().is_note_dirty(id) {
                    return;
                }
                let in_error = self.state.borrow().save_error;
                if in_error || saved.contains(&id) {
                    self.show_all_changes_saved();
                }
            }
            SyncEvent::Error => {
                // errors from syncs started elsewhere are not ours to show
                if !self.services.engine.borrow().is_note_dirty(id) {
                    return;
                }
                self.show_error_status(None);
                let mut state = self.state.borrow_mut();
                if !state.did_show_error_alert {
                    state.did_show_error_alert = true;
                    state.alert = Some(strings::STRING_GENERIC_SAVE_ERROR.to_string());
                }
            }
            SyncEvent::LocalDataLoaded => {}
        }
    }

    /// Ask to delete the open note, moving it to the trash unless
    /// `permanently` is set.
    pub fn delete_note(&self, permanently: bool) -> Result<DeleteRequest> {
        self.request_delete(permanently, true)
    }

    /// Continue a delete request after the privilege challenge succeeded.
    pub fn delete_note_privileged(&self, permanently: bool) -> Result<DeleteRequest> {
        self.request_delete(permanently, false)
    }

    fn request_delete(&self, permanently: bool, check_privilege: bool) -> Result<DeleteRequest> {
        let note = self.state.borrow().note.clone().ok_or(Error::NoActiveNote)?;
        if note.dummy {
            return Err(Error::PlaceholderDeletion);
        }
        if check_privilege
            && self
                .services
                .privileges
                .action_requires_privilege(PrivilegedAction::DeleteNote)
        {
            return Ok(DeleteRequest::PrivilegeRequired);
        }
        if note.locked {
            return Err(Error::LockedDeletion);
        }
        let title = if note.title.is_empty() {
            "this note".to_string()
        } else {
            format!("'{}'", note.title)
        };
        Ok(DeleteRequest::ConfirmationRequired(strings::delete_note_prompt(
            &title,
            permanently,
        )))
    }

    /// The user confirmed the delete prompt.
    pub fn confirm_delete(&self, permanently: bool) -> Result<()> {
        let note = self.state.borrow().note.clone().ok_or(Error::NoActiveNote)?;
        if permanently {
            self.perform_note_deletion(&note);
        } else {
            self.edit_note(|note| note.trashed = true)?;
            self.save_note(SaveOptions::immediate())?;
        }
        self.state.borrow_mut().show_menu = false;
        self.services.app_state.set_selected_note(None);
        Ok(())
    }

    fn perform_note_deletion(&self, note: &Note) {
        {
            let mut state = self.state.borrow_mut();
            if state.note.as_ref().is_some_and(|open| open.id == note.id) {
                state.note = None;
            }
        }
        let mut engine = self.services.engine.borrow_mut();
        engine.set_note_to_be_deleted(note.id);
        if note.dummy {
            engine.remove_note_locally(note.id);
            return;
        }
        tracing::info!("Deleting note {}", note.id);
        engine.sync();
    }

    /// Move the open note out of the trash.
    pub fn restore_trashed_note(&self) -> Result<()> {
        self.edit_note(|note| note.trashed = false)?;
        self.save_note(SaveOptions::immediate())?;
        self.services.app_state.set_selected_note(None);
        Ok(())
    }

    pub fn toggle_pin(&self) -> Result<bool> {
        self.toggle(|note| &mut note.pinned)
    }

    pub fn toggle_lock(&self) -> Result<bool> {
        self.toggle(|note| &mut note.locked)
    }

    pub fn toggle_archive(&self) -> Result<bool> {
        self.toggle(|note| &mut note.archived)
    }

    pub fn toggle_protect(&self) -> Result<bool> {
        let protected = self.toggle(|note| &mut note.protected)?;
        if protected
            && !self
                .services
                .privileges
                .action_requires_privilege(PrivilegedAction::ViewProtectedNotes)
        {
            tracing::info!("Note protected but no privileges are configured for viewing it");
        }
        Ok(protected)
    }

    pub fn toggle_preview(&self) -> Result<bool> {
        self.toggle(|note| &mut note.hide_preview)
    }

    fn toggle(&self, flag: impl FnOnce(&mut Note) -> &mut bool) -> Result<bool> {
        let value = self.edit_note(|note| {
            let slot = flag(note);
            *slot = !*slot;
            *slot
        })?;
        self.save_note(SaveOptions::immediate())?;
        Ok(value)
    }

    pub fn trash_count(&self) -> usize {
        self.services.engine.borrow().trashed_notes().len()
    }

    pub fn empty_trash_prompt(&self) -> String {
        strings::empty_trash_prompt(self.trash_count())
    }

    /// The user confirmed emptying the trash.
    pub fn empty_trash(&self) {
        let mut engine = self.services.engine.borrow_mut();
        engine.empty_trash();
        engine.sync();
    }

    pub fn on_content_focus(&self) {
        self.services.app_state.editor_did_focus();
    }

    pub fn note(&self) -> Option<Note> {
        self.state.borrow().note.clone()
    }

    pub fn status(&self) -> Option<NoteStatus> {
        self.state.borrow().status.clone()
    }

    pub fn save_error(&self) -> bool {
        self.state.borrow().save_error
    }

    pub fn sync_taking_too_long(&self) -> bool {
        self.state.borrow().sync_taking_too_long
    }

    pub fn preferences(&self) -> EditorPreferences {
        self.state.borrow().preferences
    }

    pub fn show_menu(&self) -> bool {
        self.state.borrow().show_menu
    }

    pub fn set_show_menu(&self, show: bool) {
        self.state.borrow_mut().show_menu = show;
    }

    /// Pending alert for the host to present. Each alert is returned once.
    pub fn take_alert(&self) -> Option<String> {
        self.state.borrow_mut().alert.take()
    }
}

impl Drop for EditorSession {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.services.app_state.remove_observer(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ModelEngine;
    use crate::list::NoteListViewModel;
    use crate::models::SmartTagKind;
    use crate::preferences::{PrefKey, PreferenceStore};
    use crate::testing::{note_at, Fixture};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn open(fixture: &Fixture, note: Note) -> Rc<EditorSession> {
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        fixture.add_note(note.clone());
        fixture.services.app_state.set_selected_note(Some(note));
        editor
    }

    fn status_message(editor: &EditorSession) -> Option<String> {
        editor.status().map(|status| status.message)
    }

    #[test]
    fn opens_the_selected_note() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));
        assert_eq!(editor.note().map(|note| note.title), Some("a".to_string()));

        fixture.services.app_state.set_selected_note(None);
        assert!(editor.note().is_none());
    }

    #[test]
    fn save_marks_dirty_and_syncs_after_debounce() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("new body").unwrap();
        let id = editor.note().unwrap().id;

        assert!(fixture.engine.borrow().is_note_dirty(id));
        assert_eq!(
            fixture.engine.borrow().find_note(id).unwrap().text,
            "new body"
        );
        assert_eq!(status_message(&editor).as_deref(), Some("Saving..."));

        fixture.advance(349);
        assert_eq!(fixture.engine.borrow().sync_requests(), 0);
        fixture.advance(1);
        assert_eq!(fixture.engine.borrow().sync_requests(), 1);
    }

    #[test]
    fn repeated_saves_are_debounced_into_one_sync() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("one").unwrap();
        fixture.advance(200);
        editor.content_changed("two").unwrap();
        fixture.advance(200);
        assert_eq!(fixture.engine.borrow().sync_requests(), 0);
        fixture.advance(150);
        assert_eq!(fixture.engine.borrow().sync_requests(), 1);
    }

    #[test]
    fn bypass_or_offline_uses_short_delay() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor
            .save_note(SaveOptions {
                bypass_debouncer: true,
                ..SaveOptions::default()
            })
            .unwrap();
        fixture.advance(100);
        assert_eq!(fixture.engine.borrow().sync_requests(), 1);

        fixture.engine.borrow_mut().set_offline(true);
        editor.save_note(SaveOptions::default()).unwrap();
        fixture.advance(100);
        assert_eq!(fixture.engine.borrow().sync_requests(), 2);
    }

    #[test]
    fn save_refreshes_preview_unless_told_not_to() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("x".repeat(100)).unwrap();
        let preview = editor.note().unwrap().preview_plain.unwrap();
        assert_eq!(preview, format!("{}...", "x".repeat(80)));

        editor.title_changed("renamed").unwrap();
        let note = editor.note().unwrap();
        assert_eq!(note.title, "renamed");
        assert_eq!(note.preview_plain, Some(preview));
    }

    #[test]
    fn saving_a_placeholder_makes_it_a_real_note() {
        let fixture = Fixture::new();
        let editor = open(&fixture, Note::placeholder("Note 1"));

        editor.content_changed("hello").unwrap();
        let id = editor.note().unwrap().id;
        assert!(!fixture.engine.borrow().find_note(id).unwrap().dummy);
    }

    #[test]
    fn save_rejects_missing_and_deleted_notes() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));
        let id = editor.note().unwrap().id;

        fixture.engine.borrow_mut().set_note_to_be_deleted(id);
        let error = editor.save_note(SaveOptions::default()).unwrap_err();
        assert!(matches!(error, Error::DeletedNote(_)));

        fixture.engine.borrow_mut().remove_note_locally(id);
        let error = editor.save_note(SaveOptions::default()).unwrap_err();
        assert!(matches!(error, Error::InvalidNote(_)));
        assert_eq!(error.user_message(), strings::STRING_INVALID_NOTE);
    }

    #[test]
    fn save_without_open_note_fails() {
        let fixture = Fixture::new();
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        assert!(matches!(
            editor.save_note(SaveOptions::default()),
            Err(Error::NoActiveNote)
        ));
    }

    #[test]
    fn status_stays_visible_for_minimum_duration() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("body").unwrap();
        editor.show_all_changes_saved();
        assert_eq!(status_message(&editor).as_deref(), Some("Saving..."));

        fixture.advance(399);
        assert_eq!(status_message(&editor).as_deref(), Some("Saving..."));
        fixture.advance(1);
        assert_eq!(status_message(&editor).as_deref(), Some("All changes saved"));
    }

    #[test]
    fn old_status_is_replaced_immediately() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("body").unwrap();
        fixture.advance(500);
        editor.show_all_changes_saved();
        assert_eq!(status_message(&editor).as_deref(), Some("All changes saved"));
    }

    #[test]
    fn local_storage_error_reports_unsaved_changes() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.handle_local_storage_error();
        let status = editor.status().unwrap();
        assert_eq!(status.message, "Offline Saving Issue");
        assert_eq!(status.desc.as_deref(), Some("Changes not saved"));
        assert!(editor.save_error());
    }

    #[test]
    fn local_storage_error_waits_for_saving_status() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("body").unwrap();
        editor.handle_local_storage_error();
        assert_eq!(status_message(&editor).as_deref(), Some("Saving..."));

        fixture.advance(400);
        assert_eq!(
            status_message(&editor).as_deref(),
            Some("Offline Saving Issue")
        );
    }

    #[test]
    fn completed_sync_reports_saved_note() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.content_changed("body").unwrap();
        let event = fixture.engine.borrow_mut().complete_sync();
        editor.handle_sync_event(&event);
        fixture.advance(400);

        assert_eq!(status_message(&editor).as_deref(), Some("All changes saved"));
    }

    #[test]
    fn completed_sync_ignores_unrelated_notes() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.handle_sync_event(&SyncEvent::Completed { saved: Vec::new() });
        fixture.advance(400);
        assert!(editor.status().is_none());
    }

    #[test]
    fn sync_error_shown_only_for_dirty_note() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.handle_sync_event(&SyncEvent::Error);
        assert!(!editor.save_error());

        fixture.engine.borrow_mut().set_offline(true);
        editor.content_changed("body").unwrap();
        let event = fixture.engine.borrow_mut().complete_sync();
        assert_eq!(event, SyncEvent::Error);
        editor.handle_sync_event(&event);
        fixture.advance(400);

        let status = editor.status().unwrap();
        assert_eq!(status.message, "Sync Unreachable");
        assert_eq!(status.desc.as_deref(), Some("Changes saved offline"));
        assert!(editor.save_error());
        assert_eq!(
            editor.take_alert().as_deref(),
            Some(strings::STRING_GENERIC_SAVE_ERROR)
        );
        assert!(editor.take_alert().is_none());
    }

    #[test]
    fn recovering_from_error_marks_offline_save() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));
        fixture.engine.borrow_mut().set_offline(true);

        editor.content_changed("body").unwrap();
        let failed = fixture.engine.borrow_mut().complete_sync();
        editor.handle_sync_event(&failed);
        fixture.advance(400);

        fixture.engine.borrow_mut().set_offline(false);
        let completed = fixture.engine.borrow_mut().complete_sync();
        fixture.engine.borrow_mut().set_offline(true);
        editor.handle_sync_event(&completed);
        fixture.advance(400);

        assert!(!editor.save_error());
        assert_eq!(
            status_message(&editor).as_deref(),
            Some("All changes saved (offline)")
        );
    }

    #[test]
    fn taking_too_long_flag_clears_on_completion() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));

        editor.handle_sync_event(&SyncEvent::TakingTooLong);
        assert!(editor.sync_taking_too_long());
        editor.handle_sync_event(&SyncEvent::Completed { saved: Vec::new() });
        assert!(!editor.sync_taking_too_long());
    }

    #[test]
    fn delete_guards() {
        let fixture = Fixture::new();
        let editor = open(&fixture, Note::placeholder("Note 1"));
        assert!(matches!(
            editor.delete_note(false),
            Err(Error::PlaceholderDeletion)
        ));

        let locked = Note {
            locked: true,
            ..note_at("secret", 1)
        };
        fixture.add_note(locked.clone());
        fixture.services.app_state.set_selected_note(Some(locked));
        assert!(matches!(editor.delete_note(true), Err(Error::LockedDeletion)));
    }

    #[test]
    fn delete_prompt_quotes_title() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("Groceries", 1));
        assert_eq!(
            editor.delete_note(false).unwrap(),
            DeleteRequest::ConfirmationRequired(
                "Are you sure you want to move 'Groceries' to the trash?".to_string()
            )
        );

        let untitled = note_at("", 2);
        fixture.add_note(untitled.clone());
        fixture.services.app_state.set_selected_note(Some(untitled));
        assert_eq!(
            editor.delete_note(true).unwrap(),
            DeleteRequest::ConfirmationRequired(
                "Are you sure you want to permanently delete this note?".to_string()
            )
        );
    }

    #[test]
    fn delete_can_require_privilege() {
        let fixture = Fixture::with_protected_actions(vec![PrivilegedAction::DeleteNote]);
        let editor = open(&fixture, note_at("a", 1));

        assert_eq!(
            editor.delete_note(false).unwrap(),
            DeleteRequest::PrivilegeRequired
        );
        assert!(matches!(
            editor.delete_note_privileged(false).unwrap(),
            DeleteRequest::ConfirmationRequired(_)
        ));
    }

    #[test]
    fn trashing_moves_selection_to_next_note() {
        let fixture = Fixture::new();
        let list = NoteListViewModel::attach(fixture.services.clone(), fixture.config.clone());
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        let first = fixture.add_note(note_at("a", 3));
        fixture.add_note(note_at("b", 2));
        fixture.add_note(note_at("c", 1));
        fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
        assert_eq!(editor.note().map(|note| note.title), Some("a".to_string()));

        editor.confirm_delete(false).unwrap();

        assert!(fixture.engine.borrow().find_note(first.id).unwrap().trashed);
        assert_eq!(editor.note().map(|note| note.title), Some("b".to_string()));
        assert_eq!(list.selected_note().map(|note| note.title), Some("b".to_string()));
        assert_eq!(editor.trash_count(), 1);
    }

    #[test]
    fn permanent_delete_syncs_immediately() {
        let fixture = Fixture::new();
        let _list = NoteListViewModel::attach(fixture.services.clone(), fixture.config.clone());
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        let first = fixture.add_note(note_at("a", 2));
        fixture.add_note(note_at("b", 1));
        fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

        editor.confirm_delete(true).unwrap();

        let engine = fixture.engine.borrow();
        assert!(engine.find_note(first.id).unwrap().deleted);
        assert_eq!(engine.sync_requests(), 1);
        drop(engine);
        assert_eq!(fixture.selected_title().as_deref(), Some("b"));
    }

    #[test]
    fn restore_clears_trashed_flag() {
        let fixture = Fixture::new();
        let trashed = Note {
            trashed: true,
            ..note_at("old", 1)
        };
        let editor = open(&fixture, trashed.clone());

        editor.restore_trashed_note().unwrap();

        assert!(!fixture.engine.borrow().find_note(trashed.id).unwrap().trashed);
        assert!(fixture.services.app_state.selected_note().is_none());
    }

    #[test]
    fn toggles_save_without_debounce() {
        let fixture = Fixture::new();
        let editor = open(&fixture, note_at("a", 1));
        let id = editor.note().unwrap().id;

        assert!(editor.toggle_pin().unwrap());
        assert!(editor.toggle_archive().unwrap());
        assert!(!editor.toggle_pin().unwrap());

        let stored = fixture.engine.borrow().find_note(id).unwrap();
        assert!(!stored.pinned);
        assert!(stored.archived);
        fixture.advance(100);
        assert_eq!(fixture.engine.borrow().sync_requests(), 1);
    }

    #[test]
    fn empty_trash_marks_notes_and_syncs() {
        let fixture = Fixture::new();
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        for title in ["x", "y"] {
            fixture.add_note(Note {
                trashed: true,
                ..note_at(title, 1)
            });
        }

        assert_eq!(
            editor.empty_trash_prompt(),
            "Are you sure you want to permanently delete 2 note(s)?"
        );
        editor.empty_trash();
        assert_eq!(editor.trash_count(), 0);
        assert_eq!(fixture.engine.borrow().sync_requests(), 1);
    }

    #[test]
    fn preferences_reload_on_change() {
        let fixture = Fixture::new();
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        assert!(!editor.preferences().monospace);

        fixture
            .preferences
            .borrow_mut()
            .set_value(PrefKey::EditorMonospace, json!(true));
        fixture.services.app_state.set_user_preferences();

        assert!(editor.preferences().monospace);
    }

    #[test]
    fn content_focus_is_broadcast() {
        let fixture = Fixture::new();
        let editor = EditorSession::attach(fixture.services.clone(), fixture.config.clone());
        let events = fixture.record_events();

        editor.on_content_focus();

        assert_eq!(*events.borrow(), vec![AppEvent::EditorFocused]);
    }
}
