pub mod common;
pub mod completions;
pub mod list;
pub mod prefs;
pub mod tags;
