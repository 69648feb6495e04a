//! Application state hub shared by the panels.
//!
//! `AppState` owns the selected tag and selected note and broadcasts an
//! [`AppEvent`] whenever selection, preferences, panel layout or editor focus
//! change. It is single-threaded and shared as `Rc<AppState>`; panels receive
//! it through their constructors.
//!
//! Delivery is synchronous and in registration order. A change requested by
//! an observer while an event is being delivered is applied immediately, but
//! its event is queued and delivered after the current one, before the
//! outermost call returns. One outermost call delivers at most
//! `max_event_cascade` events; anything beyond that is dropped with a warning.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;

use crate::models::{Note, Tag};

const DEFAULT_MAX_EVENT_CASCADE: usize = 64;

/// Panels that report layout changes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PanelName {
    Notes,
    Tags,
    Editor,
}

/// Events broadcast by [`AppState`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AppEvent {
    TagChanged { previous_tag: Option<Tag> },
    NoteChanged { previous_note: Option<Note> },
    /// Preferences should be re-read from the preference store
    PreferencesChanged,
    PanelResized { panel: PanelName, collapsed: bool },
    EditorFocused,
    BeganBackupDownload,
    EndedBackupDownload { success: bool },
    DesktopExtensionsReady,
}

/// Handle returned by [`AppState::add_observer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Observer = Rc<RefCell<Box<dyn FnMut(&AppEvent)>>>;

#[derive(Default)]
struct Dispatch {
    active: bool,
    pending: VecDeque<AppEvent>,
}

pub struct AppState {
    selected_tag: RefCell<Option<Tag>>,
    selected_note: RefCell<Option<Note>>,
    observers: RefCell<BTreeMap<SubscriptionId, Observer>>,
    next_subscription: Cell<u64>,
    dispatch: RefCell<Dispatch>,
    max_event_cascade: usize,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_cascade_limit(DEFAULT_MAX_EVENT_CASCADE)
    }
}

impl AppState {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    #[must_use]
    pub fn with_cascade_limit(max_event_cascade: usize) -> Self {
        Self {
            selected_tag: RefCell::new(None),
            selected_note: RefCell::new(None),
            observers: RefCell::new(BTreeMap::new()),
            next_subscription: Cell::new(0),
            dispatch: RefCell::new(Dispatch::default()),
            max_event_cascade: max_event_cascade.max(1),
        }
    }

    /// Register an observer for every subsequent event. Past events are not
    /// replayed.
    pub fn add_observer(&self, observer: impl FnMut(&AppEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get());
        self.next_subscription.set(id.0 + 1);
        self.observers
            .borrow_mut()
            .insert(id, Rc::new(RefCell::new(Box::new(observer))));
        id
    }

    /// Returns false when the subscription was already removed.
    pub fn remove_observer(&self, id: SubscriptionId) -> bool {
        self.observers.borrow_mut().remove(&id).is_some()
    }

    pub fn observer_count(&self) -> usize {
        self.observers.borrow().len()
    }

    /// Select a tag. Selecting the tag that is already selected is a no-op.
    pub fn set_selected_tag(&self, tag: Tag) {
        let previous_tag = {
            let mut selected = self.selected_tag.borrow_mut();
            if selected.as_ref().is_some_and(|current| current.id == tag.id) {
                return;
            }
            selected.replace(tag)
        };
        self.notify(AppEvent::TagChanged { previous_tag });
    }

    /// Select a note, or clear the selection.
    ///
    /// Unlike tag selection this always emits, even when `note` is already
    /// selected, so the editor refreshes on every reselection.
    pub fn set_selected_note(&self, note: Option<Note>) {
        let previous_note = self.selected_note.replace(note);
        self.notify(AppEvent::NoteChanged { previous_note });
    }

    pub fn selected_tag(&self) -> Option<Tag> {
        self.selected_tag.borrow().clone()
    }

    pub fn selected_note(&self) -> Option<Note> {
        self.selected_note.borrow().clone()
    }

    /// Signal that preferences changed. Observers re-read the preference store.
    pub fn set_user_preferences(&self) {
        self.notify(AppEvent::PreferencesChanged);
    }

    pub fn panel_did_resize(&self, panel: PanelName, collapsed: bool) {
        self.notify(AppEvent::PanelResized { panel, collapsed });
    }

    pub fn editor_did_focus(&self) {
        self.notify(AppEvent::EditorFocused);
    }

    pub fn began_backup_download(&self) {
        self.notify(AppEvent::BeganBackupDownload);
    }

    pub fn ended_backup_download(&self, success: bool) {
        self.notify(AppEvent::EndedBackupDownload { success });
    }

    /// The desktop extension server is ready.
    pub fn desktop_extensions_ready(&self) {
        self.notify(AppEvent::DesktopExtensionsReady);
    }

    fn notify(&self, event: AppEvent) {
        {
            let mut dispatch = self.dispatch.borrow_mut();
            dispatch.pending.push_back(event);
            if dispatch.active {
                tracing::debug!("Queued app event raised during dispatch");
                return;
            }
            dispatch.active = true;
        }

        let mut delivered = 0usize;
        loop {
            let Some(event) = self.dispatch.borrow_mut().pending.pop_front() else {
                break;
            };
            if delivered == self.max_event_cascade {
                let dropped = {
                    let mut dispatch = self.dispatch.borrow_mut();
                    let dropped = dispatch.pending.len() + 1;
                    dispatch.pending.clear();
                    dropped
                };
                tracing::warn!(
                    "App event cascade exceeded {} events; dropped {} pending event(s)",
                    self.max_event_cascade,
                    dropped
                );
                break;
            }
            delivered += 1;
            self.deliver(&event);
        }

        self.dispatch.borrow_mut().active = false;
    }

    fn deliver(&self, event: &AppEvent) {
        tracing::debug!(?event, "Dispatching app event");
        let snapshot: Vec<(SubscriptionId, Observer)> = self
            .observers
            .borrow()
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect();

        for (id, observer) in snapshot {
            if !self.observers.borrow().contains_key(&id) {
                continue;
            }
            let result = catch_unwind(AssertUnwindSafe(|| {
                let mut callback = observer.borrow_mut();
                (*callback)(event);
            }));
            if result.is_err() {
                tracing::warn!(?id, "App state observer panicked; continuing delivery");
            }
        }
    }
}
