use quire_core::{TagCount, TagsPanel};
use serde::Serialize;

use crate::commands::common::{open_session, ResolvedPaths, Session};
use crate::error::CliError;

#[derive(Debug, Serialize)]
pub struct TagListItem {
    pub id: String,
    pub title: String,
    pub smart: bool,
    pub count: usize,
}

pub fn run_tags(as_json: bool, paths: &ResolvedPaths) -> Result<(), CliError> {
    let session = open_session(paths)?;
    let counts = tag_counts(&session);

    if as_json {
        let items = counts.iter().map(tag_to_list_item).collect::<Vec<TagListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        for line in format_tag_lines(&counts) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Smart tags first, then ordinary tags, with the counts the tags panel shows
pub fn tag_counts(session: &Session) -> Vec<TagCount> {
    TagsPanel::attach(session.services.services.clone()).note_counts()
}

pub fn format_tag_lines(counts: &[TagCount]) -> Vec<String> {
    counts
        .iter()
        .map(|entry| {
            let title = if entry.tag.is_smart() {
                format!("[{}]", entry.tag.title)
            } else {
                format!("#{}", entry.tag.title)
            };
            format!("{title:<24}  {}", entry.count)
        })
        .collect()
}

pub fn tag_to_list_item(entry: &TagCount) -> TagListItem {
    TagListItem {
        id: entry.tag.id.to_string(),
        title: entry.tag.title.clone(),
        smart: entry.tag.is_smart(),
        count: entry.count,
    }
}
