use chrono::Utc;
use quire_core::{ModelEngine, NoteListViewModel, NoteRow};
use serde::Serialize;

use crate::commands::common::{format_relative_time, open_session, truncate, ResolvedPaths, Session};
use crate::error::CliError;

/// Arguments of `quire list`
#[derive(Debug, Clone, Default)]
pub struct ListArgs {
    pub tag: Option<String>,
    pub filter: Option<String>,
    pub viewport_height: Option<u32>,
    pub pages: usize,
    pub json: bool,
}

/// What the notes panel shows after applying the arguments
#[derive(Debug)]
pub struct ListOutput {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<NoteRow>,
}

#[derive(Debug, Serialize)]
pub struct NoteListItem {
    pub id: String,
    pub title: String,
    pub preview: Option<String>,
    pub flags: Vec<&'static str>,
    pub selected: bool,
    pub show_tags: bool,
    pub created_at: i64,
    pub client_updated_at: i64,
    pub relative_time: String,
}

pub fn run_list(args: &ListArgs, paths: &ResolvedPaths) -> Result<(), CliError> {
    let session = open_session(paths)?;
    let output = list_notes(&session, args)?;

    if args.json {
        let now_ms = Utc::now().timestamp_millis();
        let items = output
            .rows
            .iter()
            .map(|row| note_to_list_item(row, now_ms))
            .collect::<Vec<NoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else {
        println!("{} ({})", output.title, output.subtitle.trim());
        for line in format_row_lines(&output.rows, Utc::now().timestamp_millis()) {
            println!("{line}");
        }
    }
    Ok(())
}

/// Drive a notes panel: select the tag, apply the filter and load the
/// requested number of pages.
pub fn list_notes(session: &Session, args: &ListArgs) -> Result<ListOutput, CliError> {
    if args.pages == 0 {
        return Err(CliError::InvalidPageCount);
    }
    let services = &session.services.services;
    let view_model = NoteListViewModel::attach(services.clone(), session.config.clone());
    view_model.set_viewport_height(args.viewport_height);

    let tag = {
        let engine = session.services.engine.borrow();
        match args.tag.as_deref() {
            Some(title) => engine
                .find_tag_by_title(title)
                .ok_or_else(|| CliError::TagNotFound(title.to_string()))?,
            None => engine
                .smart_tags()
                .into_iter()
                .next()
                .ok_or_else(|| CliError::InvalidNotebook("no smart tags".to_string()))?,
        }
    };
    services.app_state.set_selected_tag(tag);

    if let Some(filter) = args.filter.as_deref().filter(|text| !text.is_empty()) {
        view_model.set_filter_text(filter);
        view_model.on_filter_enter();
    }
    for _ in 1..args.pages {
        view_model.paginate();
    }

    Ok(ListOutput {
        title: view_model.panel_title().unwrap_or_default(),
        subtitle: view_model.options_subtitle(),
        rows: view_model.rendered_notes(),
    })
}

pub fn format_row_lines(rows: &[NoteRow], now_ms: i64) -> Vec<String> {
    rows.iter()
        .map(|row| {
            let marker = if row.selected { '>' } else { ' ' };
            let short_id = row.note.id.short();
            let title = if row.note.title.is_empty() {
                "(untitled)".to_string()
            } else {
                truncate(&row.note.title, 40)
            };
            let relative_time = format_relative_time(row.note.client_updated_at, now_ms);
            let flags = row
                .flags
                .iter()
                .map(|flag| flag.label)
                .collect::<Vec<_>>()
                .join(", ");

            if flags.is_empty() {
                format!("{marker} {short_id:<13}  {title:<40}  {relative_time}")
            } else {
                format!("{marker} {short_id:<13}  {title:<40}  {relative_time:<10}  [{flags}]")
            }
        })
        .collect()
}

pub fn note_to_list_item(row: &NoteRow, now_ms: i64) -> NoteListItem {
    NoteListItem {
        id: row.note.id.to_string(),
        title: row.note.title.clone(),
        preview: row.preview.clone(),
        flags: row.flags.iter().map(|flag| flag.label).collect(),
        selected: row.selected,
        show_tags: row.show_tags,
        created_at: row.note.created_at,
        client_updated_at: row.note.client_updated_at,
        relative_time: format_relative_time(row.note.client_updated_at, now_ms),
    }
}
