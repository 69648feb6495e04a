//! Notebook file loaded into the in-memory engine.
//!
//! A notebook is a JSON object with optional `tags` and `notes` arrays.
//! Notes name their tags by title; tags that are not declared up front are
//! created on the fly.

use std::path::Path;

use quire_core::{MemoryEngine, ModelEngine, Note, Tag};
use serde::{Deserialize, Serialize};

use crate::error::CliError;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Notebook {
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub notes: Vec<NotebookNote>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotebookNote {
    #[serde(flatten)]
    pub note: Note,
    /// Titles of the tags this note belongs to
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Notebook {
    /// Read a notebook file. A missing file is an empty notebook.
    pub fn load(path: &Path) -> Result<Self, CliError> {
        if !path.exists() {
            tracing::debug!("Notebook {} not found; starting empty", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Build an engine holding every tag and note, with local data marked as
    /// loaded.
    pub fn into_engine(self) -> Result<MemoryEngine, CliError> {
        let mut engine = MemoryEngine::new();
        for tag in self.tags {
            if tag.is_smart() {
                return Err(CliError::InvalidNotebook(format!(
                    "tag '{}' cannot be declared as a smart tag",
                    tag.title
                )));
            }
            engine.add_tag(tag);
        }

        for entry in self.notes {
            let note_id = entry.note.id;
            engine.add_note(entry.note);
            for title in entry.tags {
                let tag = match engine.find_tag_by_title(&title) {
                    Some(tag) if tag.is_smart() => {
                        return Err(CliError::InvalidNotebook(format!(
                            "note {note_id} cannot be tagged with smart tag '{}'",
                            tag.title
                        )));
                    }
                    Some(tag) => tag,
                    None => {
                        let tag = Tag::new(title);
                        engine.add_tag(tag.clone());
                        tag
                    }
                };
                engine.relate_note_to_tag(tag.id, note_id);
            }
        }

        engine.finish_local_load();
        Ok(engine)
    }
}
