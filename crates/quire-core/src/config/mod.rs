//! Panel configuration.
//!
//! Tunables shared by the note list, editor and app state. Every field has a
//! default, so an empty JSON object is a valid configuration file.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

const DEFAULT_MIN_NOTE_CELL_HEIGHT: f64 = 51.0;
const DEFAULT_PAGE_SIZE: usize = 20;
const DEFAULT_PLACEHOLDER_CLEANUP_DELAY_MS: u64 = 250;
const DEFAULT_SAVE_DEBOUNCE_MS: u64 = 350;
const DEFAULT_SAVE_NO_DEBOUNCE_MS: u64 = 100;
const DEFAULT_MINIMUM_STATUS_DURATION_MS: u64 = 400;
const DEFAULT_NOTE_PREVIEW_CHAR_LIMIT: usize = 80;
const DEFAULT_MAX_EVENT_CASCADE: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PanelConfig {
    /// Height of a note cell showing only its title. Used to size a page.
    pub min_note_cell_height: f64,
    /// Page size when the viewport height is unknown.
    pub default_page_size: usize,
    /// Delay before an abandoned placeholder note is removed.
    pub placeholder_cleanup_delay_ms: u64,
    pub save_debounce_ms: u64,
    /// Save delay when debouncing is bypassed or the engine is offline.
    pub save_no_debounce_ms: u64,
    /// Minimum time a status message stays visible before being replaced.
    pub minimum_status_duration_ms: u64,
    pub note_preview_char_limit: usize,
    /// Upper bound on events delivered by one outermost app-state call.
    pub max_event_cascade: usize,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            min_note_cell_height: DEFAULT_MIN_NOTE_CELL_HEIGHT,
            default_page_size: DEFAULT_PAGE_SIZE,
            placeholder_cleanup_delay_ms: DEFAULT_PLACEHOLDER_CLEANUP_DELAY_MS,
            save_debounce_ms: DEFAULT_SAVE_DEBOUNCE_MS,
            save_no_debounce_ms: DEFAULT_SAVE_NO_DEBOUNCE_MS,
            minimum_status_duration_ms: DEFAULT_MINIMUM_STATUS_DURATION_MS,
            note_preview_char_limit: DEFAULT_NOTE_PREVIEW_CHAR_LIMIT,
            max_event_cascade: DEFAULT_MAX_EVENT_CASCADE,
        }
    }
}

impl PanelConfig {
    /// Parse and validate a configuration from a JSON payload.
    pub fn parse(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file, falling back to defaults when it does not exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min_note_cell_height.is_finite() || self.min_note_cell_height <= 0.0 {
            return Err(Error::InvalidConfig(
                "min_note_cell_height must be a positive number".to_string(),
            ));
        }
        if self.default_page_size == 0 {
            return Err(Error::InvalidConfig(
                "default_page_size must be at least 1".to_string(),
            ));
        }
        if self.max_event_cascade == 0 {
            return Err(Error::InvalidConfig(
                "max_event_cascade must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub const fn placeholder_cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.placeholder_cleanup_delay_ms)
    }

    pub const fn save_delay(&self, no_debounce: bool) -> Duration {
        if no_debounce {
            Duration::from_millis(self.save_no_debounce_ms)
        } else {
            Duration::from_millis(self.save_debounce_ms)
        }
    }
}
