//! quire-core - Core library for Quire
//!
//! Panel logic for a synced notes app: the [`AppState`] event hub that keeps
//! the selected tag and note, the notes panel view model that filters, sorts,
//! paginates and selects notes, and the tags, editor and layout panels that
//! react to the same events. Storage and sync live behind [`ModelEngine`];
//! [`MemoryEngine`] is the bundled in-memory implementation.

pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod layout;
pub mod list;
pub mod models;
pub mod preferences;
pub mod services;
pub mod state;
pub mod strings;
pub mod tags;
pub mod timer;

#[cfg(test)]
mod testing;

pub use config::PanelConfig;
pub use editor::{DeleteRequest, EditorSession, NoteStatus, SaveOptions};
pub use engine::{MemoryEngine, ModelEngine, PrivilegeGate, PrivilegedAction, SyncEvent};
pub use error::{Error, Result};
pub use layout::RootLayout;
pub use list::{NoteListViewModel, NoteRow, SelectOutcome};
pub use models::{Note, NoteId, SmartTagKind, Tag, TagId, TagKind};
pub use preferences::{MemoryPreferenceStore, PrefKey, PreferenceStore, SortKey};
pub use services::{InMemoryServices, Services};
pub use state::{AppEvent, AppState, PanelName, SubscriptionId};
pub use tags::{TagCount, TagsPanel};
pub use timer::{Scheduler, TimerKey};
