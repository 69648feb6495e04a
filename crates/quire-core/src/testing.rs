//! Fixtures shared by the panel tests.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::config::PanelConfig;
use crate::engine::{MemoryEngine, ModelEngine, PrivilegedAction, StaticPrivileges};
use crate::models::{Note, SmartTagKind, Tag};
use crate::preferences::MemoryPreferenceStore;
use crate::services::{InMemoryServices, Services};
use crate::state::AppEvent;

/// Note with fixed timestamps so sort order is deterministic
pub fn note_at(title: &str, created_at: i64) -> Note {
    Note {
        created_at,
        client_updated_at: created_at,
        ..Note::new(title, format!("{title} body"))
    }
}

pub struct Fixture {
    pub services: Services,
    pub engine: Rc<RefCell<MemoryEngine>>,
    pub preferences: Rc<RefCell<MemoryPreferenceStore>>,
    pub config: PanelConfig,
}

impl Fixture {
    /// Engine with local data already loaded and no privilege checks
    pub fn new() -> Self {
        Self::with_protected_actions(Vec::new())
    }

    /// Engine that has not finished loading local data yet
    pub fn unloaded() -> Self {
        Self::build(MemoryEngine::new(), Vec::new())
    }

    pub fn with_protected_actions(protected: Vec<PrivilegedAction>) -> Self {
        let mut engine = MemoryEngine::new();
        engine.finish_local_load();
        Self::build(engine, protected)
    }

    fn build(engine: MemoryEngine, protected: Vec<PrivilegedAction>) -> Self {
        let config = PanelConfig::default();
        let in_memory = InMemoryServices::with_privileges(
            engine,
            MemoryPreferenceStore::new(),
            &config,
            Rc::new(StaticPrivileges { protected }),
        );
        Self {
            services: in_memory.services,
            engine: in_memory.engine,
            preferences: in_memory.preferences,
            config,
        }
    }

    pub fn add_note(&self, note: Note) -> Note {
        self.engine.borrow_mut().add_note(note.clone());
        note
    }

    pub fn add_tag(&self, title: &str) -> Tag {
        let tag = Tag::new(title);
        self.engine.borrow_mut().add_tag(tag.clone());
        tag
    }

    pub fn add_tagged_note(&self, tag: &Tag, note: Note) -> Note {
        let mut engine = self.engine.borrow_mut();
        engine.add_note(note.clone());
        engine.relate_note_to_tag(tag.id, note.id);
        note
    }

    pub fn smart_tag(&self, kind: SmartTagKind) -> Tag {
        self.engine
            .borrow()
            .smart_tags()
            .into_iter()
            .find(|tag| tag.smart_kind() == Some(kind))
            .expect("memory engine always has the smart tags")
    }

    pub fn select_tag(&self, tag: &Tag) {
        self.services.app_state.set_selected_tag(tag.clone());
    }

    pub fn advance(&self, millis: u64) -> usize {
        self.services.scheduler.advance(Duration::from_millis(millis))
    }

    pub fn record_events(&self) -> Rc<RefCell<Vec<AppEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        self.services
            .app_state
            .add_observer(move |event| sink.borrow_mut().push(event.clone()));
        events
    }

    pub fn selected_title(&self) -> Option<String> {
        self.services
            .app_state
            .selected_note()
            .map(|note| note.title)
    }
}
