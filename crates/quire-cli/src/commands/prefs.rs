use std::path::Path;

use quire_core::{MemoryPreferenceStore, PrefKey, PreferenceStore, SortKey};
use serde_json::Value;

use crate::cli::PrefsCommands;
use crate::commands::common::{load_preferences, ResolvedPaths};
use crate::error::CliError;

pub fn run_prefs(command: &PrefsCommands, paths: &ResolvedPaths) -> Result<(), CliError> {
    match command {
        PrefsCommands::List => {
            let store = load_preferences(&paths.prefs)?;
            for line in format_pref_lines(&store) {
                println!("{line}");
            }
        }
        PrefsCommands::Get { key } => {
            let store = load_preferences(&paths.prefs)?;
            let key: PrefKey = key.parse()?;
            match store.value(key) {
                Some(value) => println!("{value}"),
                None => println!("(unset)"),
            }
        }
        PrefsCommands::Set { key, value } => {
            let (key, value) = set_preference(&paths.prefs, key, value)?;
            println!("{key} = {value}");
        }
    }
    Ok(())
}

pub fn format_pref_lines(store: &MemoryPreferenceStore) -> Vec<String> {
    store
        .entries()
        .map(|(key, value)| format!("{key} = {value}"))
        .collect()
}

/// Parse, validate and persist one preference.
pub fn set_preference(path: &Path, key: &str, raw: &str) -> Result<(PrefKey, Value), CliError> {
    let key: PrefKey = key.parse()?;
    let value = parse_pref_value(raw);
    validate_pref_value(key, &value)?;

    let mut store = load_preferences(path)?;
    store.set_value(key, value.clone());
    store.sync();
    store.save_to_path(path)?;
    tracing::info!("Stored preference {}", key);
    Ok((key, value))
}

/// JSON when it parses, otherwise the raw text as a string.
pub fn parse_pref_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn validate_pref_value(key: PrefKey, value: &Value) -> Result<(), CliError> {
    let valid = match key {
        PrefKey::SortBy => value.as_str().and_then(SortKey::from_pref).is_some(),
        PrefKey::NotesPanelWidth
        | PrefKey::TagsPanelWidth
        | PrefKey::EditorWidth
        | PrefKey::EditorLeft => value.is_number() || value.is_null(),
        _ => value.is_boolean(),
    };
    if valid {
        Ok(())
    } else {
        Err(CliError::Config(format!("invalid value for {key}: {value}")))
    }
}
