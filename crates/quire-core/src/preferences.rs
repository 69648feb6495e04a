//! User preferences consumed by the panels.
//!
//! Values are stored as JSON under the key names the synced preference
//! item has always used, so a store can be shared with other clients.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// Named preference keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrefKey {
    SortBy,
    SortReverse,
    ShowArchived,
    HidePinned,
    HideNotePreview,
    HideDate,
    HideTags,
    NotesPanelWidth,
    TagsPanelWidth,
    EditorWidth,
    EditorLeft,
    EditorMonospace,
    EditorSpellcheck,
    EditorResizersEnabled,
}

impl PrefKey {
    pub const ALL: [Self; 14] = [
        Self::SortBy,
        Self::SortReverse,
        Self::ShowArchived,
        Self::HidePinned,
        Self::HideNotePreview,
        Self::HideDate,
        Self::HideTags,
        Self::NotesPanelWidth,
        Self::TagsPanelWidth,
        Self::EditorWidth,
        Self::EditorLeft,
        Self::EditorMonospace,
        Self::EditorSpellcheck,
        Self::EditorResizersEnabled,
    ];

    /// Stored key name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SortBy => "sortBy",
            Self::SortReverse => "sortReverse",
            Self::ShowArchived => "showArchived",
            Self::HidePinned => "hidePinned",
            Self::HideNotePreview => "hideNotePreview",
            Self::HideDate => "hideDate",
            Self::HideTags => "hideTags",
            Self::NotesPanelWidth => "notesPanelWidth",
            Self::TagsPanelWidth => "tagsPanelWidth",
            Self::EditorWidth => "editorWidth",
            Self::EditorLeft => "editorLeft",
            Self::EditorMonospace => "monospaceFont",
            Self::EditorSpellcheck => "spellcheck",
            Self::EditorResizersEnabled => "marginResizersEnabled",
        }
    }
}

impl fmt::Display for PrefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrefKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| Error::InvalidConfig(format!("unknown preference key: {s}")))
    }
}

/// Storage for user preferences.
pub trait PreferenceStore {
    /// Stored value, or `None` when the key was never set
    fn value(&self, key: PrefKey) -> Option<Value>;

    fn set_value(&mut self, key: PrefKey, value: Value);

    /// Persist pending changes
    fn sync(&mut self);

    fn bool_value(&self, key: PrefKey, default: bool) -> bool {
        self.value(key).and_then(|v| v.as_bool()).unwrap_or(default)
    }

    fn number_value(&self, key: PrefKey) -> Option<f64> {
        self.value(key).and_then(|v| v.as_f64())
    }

    fn string_value(&self, key: PrefKey) -> Option<String> {
        self.value(key).and_then(|v| v.as_str().map(ToString::to_string))
    }
}

/// Preference store kept in memory and optionally saved as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemoryPreferenceStore {
    values: BTreeMap<String, Value>,
    #[serde(skip)]
    sync_count: usize,
}

impl MemoryPreferenceStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from a JSON file. A missing file yields an empty store.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }

    /// Number of times `sync` was called
    pub const fn sync_count(&self) -> usize {
        self.sync_count
    }

    /// Stored entries in key order, including keys this crate does not know
    pub fn entries(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn value(&self, key: PrefKey) -> Option<Value> {
        self.values.get(key.as_str()).cloned()
    }

    fn set_value(&mut self, key: PrefKey, value: Value) {
        self.values.insert(key.as_str().to_string(), value);
    }

    fn sync(&mut self) {
        self.sync_count += 1;
    }
}

/// Note list ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    CreatedAt,
    ClientUpdatedAt,
    Title,
}

impl SortKey {
    /// Stored preference value
    #[must_use]
    pub const fn as_pref(self) -> &'static str {
        match self {
            Self::CreatedAt => "created_at",
            Self::ClientUpdatedAt => "client_updated_at",
            Self::Title => "title",
        }
    }

    /// Parse a stored value. The legacy `updated_at` key maps to the
    /// client-side modification date.
    #[must_use]
    pub fn from_pref(value: &str) -> Option<Self> {
        match value {
            "created_at" => Some(Self::CreatedAt),
            "client_updated_at" | "updated_at" => Some(Self::ClientUpdatedAt),
            "title" => Some(Self::Title),
            _ => None,
        }
    }

    /// Label shown in the options subtitle
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CreatedAt => "Date Added",
            Self::ClientUpdatedAt => "Date Modified",
            Self::Title => "Title",
        }
    }
}

/// Display options of the note list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListOptions {
    pub sort_by: SortKey,
    pub sort_reverse: bool,
    pub show_archived: bool,
    pub hide_pinned: bool,
    pub hide_note_preview: bool,
    pub hide_date: bool,
    pub hide_tags: bool,
}

impl ListOptions {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let sort_by = store
            .string_value(PrefKey::SortBy)
            .and_then(|value| SortKey::from_pref(&value))
            .unwrap_or_default();
        Self {
            sort_by,
            sort_reverse: store.bool_value(PrefKey::SortReverse, false),
            show_archived: store.bool_value(PrefKey::ShowArchived, false),
            hide_pinned: store.bool_value(PrefKey::HidePinned, false),
            hide_note_preview: store.bool_value(PrefKey::HideNotePreview, false),
            hide_date: store.bool_value(PrefKey::HideDate, false),
            hide_tags: store.bool_value(PrefKey::HideTags, false),
        }
    }
}

/// Editor display preferences
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditorPreferences {
    pub monospace: bool,
    pub spellcheck: bool,
    pub margin_resizers: bool,
    pub width: Option<f64>,
    pub left: Option<f64>,
}

impl EditorPreferences {
    pub fn load(store: &dyn PreferenceStore) -> Self {
        let margin_resizers = store.bool_value(PrefKey::EditorResizersEnabled, true);
        Self {
            monospace: store.bool_value(PrefKey::EditorMonospace, false),
            spellcheck: store.bool_value(PrefKey::EditorSpellcheck, true),
            margin_resizers,
            width: margin_resizers
                .then(|| store.number_value(PrefKey::EditorWidth))
                .flatten(),
            left: margin_resizers
                .then(|| store.number_value(PrefKey::EditorLeft))
                .flatten(),
        }
    }
}
