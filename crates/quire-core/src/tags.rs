//! Tags panel.
//!
//! Lists smart and ordinary tags with their note counts, drives tag
//! selection through [`AppState`](crate::state::AppState) and handles
//! creating, renaming and deleting tags.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;
use serde_json::json;

use crate::engine::{ModelEngine, SyncEvent};
use crate::error::{Error, Result};
use crate::models::{Tag, TagId};
use crate::preferences::PrefKey;
use crate::services::Services;
use crate::state::{AppEvent, PanelName, SubscriptionId};
use crate::strings;

/// A tag with the number of notes it shows by default
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: Tag,
    pub count: usize,
}

#[derive(Default)]
struct TagsState {
    selected: Option<TagId>,
    counts: Vec<TagCount>,
    editing: Option<TagId>,
    editing_original_title: Option<String>,
    new_tag: Option<TagId>,
    panel_width: Option<f64>,
}

pub struct TagsPanel {
    services: Services,
    state: RefCell<TagsState>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl TagsPanel {
    pub fn attach(services: Services) -> Rc<Self> {
        let panel = Rc::new(Self {
            services,
            state: RefCell::new(TagsState::default()),
            subscription: Cell::new(None),
        });

        let weak = Rc::downgrade(&panel);
        let id = panel.services.app_state.add_observer(move |event| {
            if let Some(panel) = weak.upgrade() {
                if matches!(event, AppEvent::PreferencesChanged) {
                    panel.load_preferences();
                }
            }
        });
        panel.subscription.set(Some(id));
        panel.load_preferences();
        panel.reload_note_counts();
        panel
    }

    pub fn smart_tags(&self) -> Vec<Tag> {
        self.services.engine.borrow().smart_tags()
    }

    pub fn tags(&self) -> Vec<Tag> {
        self.services.engine.borrow().tags()
    }

    /// Select the first smart tag.
    pub fn select_default_tag(&self) {
        let default = self.smart_tags().into_iter().next();
        match default {
            Some(tag) => self.select_tag(&tag),
            None => tracing::warn!("No smart tags available to select"),
        }
    }

    /// Select `tag`, clearing a conflict marker first.
    pub fn select_tag(&self, tag: &Tag) {
        let mut tag = tag.clone();
        if tag.conflict_of.take().is_some() {
            let mut engine = self.services.engine.borrow_mut();
            engine.update_tag(tag.clone());
            engine.set_tag_dirty(tag.id);
            engine.sync();
        }
        self.state.borrow_mut().selected = Some(tag.id);
        tracing::debug!(tag = %tag.title, "Tags panel selected tag");
        self.services.app_state.set_selected_tag(tag);
    }

    pub fn selected_tag_id(&self) -> Option<TagId> {
        self.state.borrow().selected
    }

    /// Recount visible notes per tag, smart tags first.
    pub fn reload_note_counts(&self) {
        let counts = {
            let engine = self.services.engine.borrow();
            engine
                .smart_tags()
                .into_iter()
                .chain(engine.tags())
                .map(|tag| TagCount {
                    count: count_notes(&*engine, &tag),
                    tag,
                })
                .collect()
        };
        self.state.borrow_mut().counts = counts;
    }

    pub fn note_counts(&self) -> Vec<TagCount> {
        self.state.borrow().counts.clone()
    }

    pub fn note_count(&self, id: TagId) -> Option<usize> {
        self.state
            .borrow()
            .counts
            .iter()
            .find(|entry| entry.tag.id == id)
            .map(|entry| entry.count)
    }

    /// Tags changed in the engine. A deleted selection reverts to the
    /// default tag.
    pub fn handle_items_changed(&self) {
        self.reload_note_counts();
        let Some(selected) = self.selected_tag_id() else {
            return;
        };
        let gone = self
            .services
            .engine
            .borrow()
            .find_tag(selected)
            .map_or(true, |tag| tag.deleted);
        if gone {
            tracing::debug!("Selected tag {} was deleted", selected);
            self.select_default_tag();
        }
    }

    pub fn handle_sync_event(&self, event: &SyncEvent) {
        if matches!(event, SyncEvent::LocalDataLoaded | SyncEvent::Completed { .. }) {
            self.reload_note_counts();
        }
    }

    /// Start editing a new untitled tag. Returns `None` while another tag
    /// is being edited.
    pub fn create_tag(&self) -> Option<Tag> {
        if self.state.borrow().editing.is_some() {
            return None;
        }
        let tag = Tag::new("");
        self.services.engine.borrow_mut().add_tag(tag.clone());
        let mut state = self.state.borrow_mut();
        state.editing = Some(tag.id);
        state.new_tag = Some(tag.id);
        state.selected = Some(tag.id);
        Some(tag)
    }

    pub fn begin_rename(&self, id: TagId) -> Result<()> {
        let tag = self
            .services
            .engine
            .borrow()
            .find_tag(id)
            .ok_or(Error::TagNotFound(id))?;
        let mut state = self.state.borrow_mut();
        state.editing_original_title = Some(tag.title);
        state.editing = Some(id);
        Ok(())
    }

    pub fn editing_tag(&self) -> Option<TagId> {
        self.state.borrow().editing
    }

    /// Finish editing. An empty title restores the original title of a
    /// renamed tag and drops a new tag.
    pub fn save_tag(&self, id: TagId, title: &str) -> Result<()> {
        let (original, is_new) = {
            let mut state = self.state.borrow_mut();
            state.editing = None;
            let is_new = state.new_tag == Some(id);
            (state.editing_original_title.take(), is_new)
        };
        let mut tag = self
            .services
            .engine
            .borrow()
            .find_tag(id)
            .ok_or(Error::TagNotFound(id))?;

        let title = title.trim();
        if title.is_empty() {
            if is_new {
                self.services.engine.borrow_mut().remove_tag_locally(id);
                let fallback = self.services.app_state.selected_tag().map(|tag| tag.id);
                let mut state = self.state.borrow_mut();
                state.new_tag = None;
                if state.selected == Some(id) {
                    state.selected = fallback;
                }
            } else if let Some(original) = original {
                tag.title = original;
                self.services.engine.borrow_mut().update_tag(tag);
            }
            return Ok(());
        }

        tag.title = title.to_string();
        {
            let mut engine = self.services.engine.borrow_mut();
            engine.update_tag(tag.clone());
            engine.set_tag_dirty(id);
            engine.sync();
        }
        self.state.borrow_mut().new_tag = None;
        self.reload_note_counts();
        self.select_tag(&tag);
        Ok(())
    }

    pub const fn delete_tag_prompt() -> &'static str {
        strings::STRING_DELETE_TAG
    }

    /// The user confirmed deleting the tag. Its notes are kept.
    pub fn delete_tag(&self, id: TagId) -> Result<()> {
        {
            let mut engine = self.services.engine.borrow_mut();
            if engine.find_tag(id).is_none() {
                return Err(Error::TagNotFound(id));
            }
            engine.set_tag_to_be_deleted(id);
            engine.sync();
        }
        tracing::info!("Deleted tag {}", id);
        self.reload_note_counts();
        self.select_default_tag();
        Ok(())
    }

    pub fn load_preferences(&self) {
        let width = self
            .services
            .preferences
            .borrow()
            .number_value(PrefKey::TagsPanelWidth);
        let Some(width) = width else {
            return;
        };
        self.state.borrow_mut().panel_width = Some(width);
        if width <= 0.0 {
            self.services.app_state.panel_did_resize(PanelName::Tags, true);
        }
    }

    pub fn on_panel_resize(&self, width: f64, collapsed: bool) {
        {
            let mut preferences = self.services.preferences.borrow_mut();
            preferences.set_value(PrefKey::TagsPanelWidth, json!(width));
            preferences.sync();
        }
        self.state.borrow_mut().panel_width = Some(width);
        self.services
            .app_state
            .panel_did_resize(PanelName::Tags, collapsed);
    }

    pub fn panel_width(&self) -> Option<f64> {
        self.state.borrow().panel_width
    }
}

impl Drop for TagsPanel {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.services.app_state.remove_observer(id);
        }
    }
}

/// Members of `tag` that are not placeholders, archived or trashed
fn count_notes(engine: &dyn ModelEngine, tag: &Tag) -> usize {
    engine
        .members_of(tag)
        .iter()
        .filter(|note| !note.dummy && !note.archived && !note.trashed)
        .count()
}
