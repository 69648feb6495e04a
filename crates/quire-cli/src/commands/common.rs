use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use quire_core::{InMemoryServices, MemoryPreferenceStore, PanelConfig};

use crate::error::CliError;
use crate::notebook::Notebook;

pub const NOTEBOOK_ENV: &str = "QUIRE_NOTEBOOK";
pub const PREFS_ENV: &str = "QUIRE_PREFS";
pub const CONFIG_ENV: &str = "QUIRE_CONFIG";

/// File locations after applying flags, environment and platform defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub notebook: PathBuf,
    pub prefs: PathBuf,
    pub config: PathBuf,
}

impl ResolvedPaths {
    pub fn resolve(
        notebook: Option<PathBuf>,
        prefs: Option<PathBuf>,
        config: Option<PathBuf>,
    ) -> Result<Self, CliError> {
        Ok(Self {
            notebook: resolve_path(notebook, env::var_os(NOTEBOOK_ENV), || {
                default_data_path("notebook.json")
            })?,
            prefs: resolve_path(prefs, env::var_os(PREFS_ENV), || {
                default_data_path("preferences.json")
            })?,
            config: resolve_path(config, env::var_os(CONFIG_ENV), default_config_path)?,
        })
    }
}

/// Pick the flag value, then the environment value, then the default.
pub fn resolve_path(
    flag: Option<PathBuf>,
    env_value: Option<OsString>,
    default: impl FnOnce() -> Result<PathBuf, CliError>,
) -> Result<PathBuf, CliError> {
    match flag.or_else(|| env_value.map(PathBuf::from)) {
        Some(path) => Ok(path),
        None => default(),
    }
}

pub fn default_data_path(file_name: &str) -> Result<PathBuf, CliError> {
    dirs::data_dir()
        .map(|dir| dir.join("quire").join(file_name))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI data directory".to_string()))
}

pub fn default_config_path() -> Result<PathBuf, CliError> {
    dirs::config_dir()
        .map(|dir| dir.join("quire").join("config.json"))
        .ok_or_else(|| CliError::Config("Failed to resolve CLI config directory".to_string()))
}

/// Engine, preferences and panel configuration loaded from disk
pub struct Session {
    pub services: InMemoryServices,
    pub config: PanelConfig,
}

pub fn open_session(paths: &ResolvedPaths) -> Result<Session, CliError> {
    let config = PanelConfig::load_from_path(&paths.config)?;
    let engine = Notebook::load(&paths.notebook)?.into_engine()?;
    let preferences = load_preferences(&paths.prefs)?;
    tracing::debug!(
        notebook = %paths.notebook.display(),
        prefs = %paths.prefs.display(),
        "Opened session"
    );
    Ok(Session {
        services: InMemoryServices::new(engine, preferences, &config),
        config,
    })
}

pub fn load_preferences(path: &Path) -> Result<MemoryPreferenceStore, CliError> {
    Ok(MemoryPreferenceStore::load_from_path(path)?)
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Shorten `text` to `max_chars`, ending with "..." when cut.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}
