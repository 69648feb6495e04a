//! Shared handles passed to every panel.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PanelConfig;
use crate::engine::{MemoryEngine, ModelEngine, NoPrivileges, PrivilegeGate};
use crate::preferences::{MemoryPreferenceStore, PreferenceStore};
use crate::state::AppState;
use crate::timer::Scheduler;

/// Collaborators of the panels. Cloning shares the same handles.
#[derive(Clone)]
pub struct Services {
    pub app_state: Rc<AppState>,
    pub engine: Rc<RefCell<dyn ModelEngine>>,
    pub preferences: Rc<RefCell<dyn PreferenceStore>>,
    pub privileges: Rc<dyn PrivilegeGate>,
    pub scheduler: Rc<Scheduler>,
}

impl Services {
    pub fn new(
        app_state: Rc<AppState>,
        engine: Rc<RefCell<dyn ModelEngine>>,
        preferences: Rc<RefCell<dyn PreferenceStore>>,
        privileges: Rc<dyn PrivilegeGate>,
    ) -> Self {
        Self {
            app_state,
            engine,
            preferences,
            privileges,
            scheduler: Rc::new(Scheduler::new()),
        }
    }
}

/// Services backed by the in-memory engine and preference store, keeping
/// typed handles to both for callers that need engine-specific methods.
#[derive(Clone)]
pub struct InMemoryServices {
    pub services: Services,
    pub engine: Rc<RefCell<MemoryEngine>>,
    pub preferences: Rc<RefCell<MemoryPreferenceStore>>,
}

impl InMemoryServices {
    pub fn new(engine: MemoryEngine, preferences: MemoryPreferenceStore, config: &PanelConfig) -> Self {
        Self::with_privileges(engine, preferences, config, Rc::new(NoPrivileges))
    }

    pub fn with_privileges(
        engine: MemoryEngine,
        preferences: MemoryPreferenceStore,
        config: &PanelConfig,
        privileges: Rc<dyn PrivilegeGate>,
    ) -> Self {
        let engine = Rc::new(RefCell::new(engine));
        let preferences = Rc::new(RefCell::new(preferences));
        let app_state = Rc::new(AppState::with_cascade_limit(config.max_event_cascade));
        let services = Services::new(
            app_state,
            Rc::clone(&engine) as Rc<RefCell<dyn ModelEngine>>,
            Rc::clone(&preferences) as Rc<RefCell<dyn PreferenceStore>>,
            privileges,
        );
        Self {
            services,
            engine,
            preferences,
        }
    }
}
