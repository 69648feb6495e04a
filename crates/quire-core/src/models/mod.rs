//! Data models for Quire

mod note;
mod tag;

pub use note::{Note, NoteId};
pub use tag::{SmartTagKind, Tag, TagId, TagKind};
