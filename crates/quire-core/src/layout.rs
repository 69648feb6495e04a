//! Root layout state.
//!
//! Tracks which side panels are collapsed and rate-limits the app-level
//! alerts raised by the sync layer.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::services::Services;
use crate::state::{AppEvent, PanelName, SubscriptionId};
use crate::strings;

/// Minimum gap between two session-expired alerts
const SESSION_ALERT_INTERVAL_MS: u64 = 30_000;

#[derive(Default)]
struct LayoutState {
    notes_collapsed: bool,
    tags_collapsed: bool,
    last_session_alert_ms: Option<u64>,
}

pub struct RootLayout {
    services: Services,
    state: RefCell<LayoutState>,
    subscription: Cell<Option<SubscriptionId>>,
}

impl RootLayout {
    pub fn attach(services: Services) -> Rc<Self> {
        let layout = Rc::new(Self {
            services,
            state: RefCell::new(LayoutState::default()),
            subscription: Cell::new(None),
        });

        let weak = Rc::downgrade(&layout);
        let id = layout.services.app_state.add_observer(move |event| {
            let Some(layout) = weak.upgrade() else {
                return;
            };
            if let AppEvent::PanelResized { panel, collapsed } = event {
                let mut state = layout.state.borrow_mut();
                match panel {
                    PanelName::Notes => state.notes_collapsed = *collapsed,
                    PanelName::Tags => state.tags_collapsed = *collapsed,
                    PanelName::Editor => {}
                }
            }
        });
        layout.subscription.set(Some(id));
        layout
    }

    pub fn notes_collapsed(&self) -> bool {
        self.state.borrow().notes_collapsed
    }

    pub fn tags_collapsed(&self) -> bool {
        self.state.borrow().tags_collapsed
    }

    /// CSS classes for the application root
    pub fn app_class(&self) -> String {
        let state = self.state.borrow();
        let mut classes = Vec::new();
        if state.notes_collapsed {
            classes.push("collapsed-notes");
        }
        if state.tags_collapsed {
            classes.push("collapsed-tags");
        }
        classes.join(" ")
    }

    /// Alert for an invalid sync session, shown at most once every thirty
    /// seconds.
    pub fn session_invalid_alert(&self) -> Option<&'static str> {
        let now = self.services.scheduler.now_ms();
        let mut state = self.state.borrow_mut();
        if state
            .last_session_alert_ms
            .is_some_and(|last| now.saturating_sub(last) <= SESSION_ALERT_INTERVAL_MS)
        {
            return None;
        }
        state.last_session_alert_ms = Some(now);
        Some(strings::STRING_SESSION_EXPIRED)
    }

    /// Alert for an unexpected failure while saving items.
    pub fn sync_exception_alert(&self, data: &str) -> String {
        tracing::error!("Sync exception: {}", data);
        strings::sync_exception(data)
    }
}

impl Drop for RootLayout {
    fn drop(&mut self) {
        if let Some(id) = self.subscription.take() {
            self.services.app_state.remove_observer(id);
        }
    }
}
