use std::rc::Rc;

use pretty_assertions::assert_eq;
use serde_json::json;

use super::*;
use crate::engine::{ModelEngine, PrivilegedAction};
use crate::models::SmartTagKind;
use crate::preferences::PreferenceStore;
use crate::testing::{note_at, Fixture};

fn attach(fixture: &Fixture) -> Rc<NoteListViewModel> {
    NoteListViewModel::attach(fixture.services.clone(), fixture.config.clone())
}

fn titles(view_model: &NoteListViewModel) -> Vec<String> {
    view_model.notes().into_iter().map(|note| note.title).collect()
}

fn with_text(title: &str, text: &str, created_at: i64) -> Note {
    Note {
        text: text.to_string(),
        ..note_at(title, created_at)
    }
}

#[test]
fn tag_change_selects_first_unprotected_note() {
    let fixture = Fixture::new();
    fixture.add_note(Note {
        protected: true,
        ..note_at("secret", 30)
    });
    fixture.add_note(note_at("middle", 20));
    fixture.add_note(note_at("oldest", 10));
    let view_model = attach(&fixture);

    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    assert_eq!(titles(&view_model), vec!["secret", "middle", "oldest"]);
    assert_eq!(fixture.selected_title().as_deref(), Some("middle"));
    assert_eq!(
        view_model.selected_note().map(|note| note.title).as_deref(),
        Some("middle")
    );
    assert_eq!(view_model.panel_title().as_deref(), Some("All notes"));
}

#[test]
fn empty_ordinary_tag_gets_placeholder() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    let view_model = attach(&fixture);

    fixture.select_tag(&work);

    let selected = view_model.selected_note().unwrap();
    assert!(selected.dummy);
    assert_eq!(selected.title, "Note 1");
    assert_eq!(titles(&view_model), vec!["Note 1"]);
    let engine = fixture.engine.borrow();
    assert!(engine.is_note_dirty(selected.id));
    assert!(engine.is_tag_dirty(work.id));
    assert_eq!(engine.members_of(&work).len(), 1);
}

#[test]
fn empty_tag_before_initial_load_stays_empty() {
    let fixture = Fixture::unloaded();
    let view_model = attach(&fixture);

    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    assert!(view_model.notes().is_empty());
    assert_eq!(view_model.selected_note(), None);

    let event = fixture.engine.borrow_mut().finish_local_load();
    view_model.handle_sync_event(&event);
    assert_eq!(fixture.selected_title().as_deref(), Some("Note 1"));
}

#[test]
fn empty_smart_tag_clears_stale_selection() {
    let fixture = Fixture::new();
    fixture.add_note(note_at("only", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    assert_eq!(fixture.selected_title().as_deref(), Some("only"));

    fixture.select_tag(&fixture.smart_tag(SmartTagKind::Archived));

    assert!(view_model.notes().is_empty());
    assert_eq!(view_model.selected_note(), None);
    assert_eq!(fixture.services.app_state.selected_note(), None);
}

#[test]
fn placeholder_title_counts_unfiltered_members() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    fixture.add_tagged_note(&work, note_at("first", 2));
    fixture.add_tagged_note(&work, note_at("second", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&work);

    view_model.set_filter_text("nothing matches this");
    assert!(view_model.notes().is_empty());

    let placeholder = view_model.create_new_note().unwrap();
    assert_eq!(placeholder.title, "Note 3");
}

#[test]
fn deleting_selected_note_selects_same_index() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    fixture.add_tagged_note(&work, note_at("a", 30));
    let b = fixture.add_tagged_note(&work, note_at("b", 20));
    let c = fixture.add_tagged_note(&work, note_at("c", 10));
    let view_model = attach(&fixture);
    fixture.select_tag(&work);
    assert_eq!(view_model.select_note(Some(b.id)), SelectOutcome::Selected);

    fixture.engine.borrow_mut().set_note_to_be_deleted(b.id);
    view_model.handle_items_changed();
    assert_eq!(fixture.selected_title().as_deref(), Some("c"));

    fixture.engine.borrow_mut().set_note_to_be_deleted(c.id);
    view_model.handle_items_changed();
    assert_eq!(fixture.selected_title().as_deref(), Some("a"));
}

#[test]
fn advance_never_moves_before_deleted_note() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    fixture.add_tagged_note(&work, note_at("a", 30));
    let x = fixture.add_tagged_note(&work, note_at("x", 20));
    fixture.add_tagged_note(
        &work,
        Note {
            protected: true,
            ..note_at("p", 10)
        },
    );
    let view_model = attach(&fixture);
    fixture.select_tag(&work);
    assert_eq!(view_model.select_note(Some(x.id)), SelectOutcome::Selected);

    fixture.engine.borrow_mut().set_note_to_be_deleted(x.id);
    view_model.handle_items_changed();

    let selected = view_model.selected_note().unwrap();
    assert!(selected.dummy);
    assert_eq!(selected.title, "Note 3");
    assert_eq!(fixture.selected_title().as_deref(), Some("Note 3"));
}

#[test]
fn trashed_selection_in_trash_view_is_rederived() {
    let fixture = Fixture::new();
    let first = fixture.add_note(Note {
        trashed: true,
        ..note_at("first", 2)
    });
    fixture.add_note(Note {
        trashed: true,
        ..note_at("second", 1)
    });
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::Trash));
    assert_eq!(fixture.selected_title().as_deref(), Some("first"));
    let events = fixture.record_events();

    view_model.handle_items_changed();

    assert_eq!(view_model.selected_note().map(|note| note.id), Some(first.id));
    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AppEvent::NoteChanged { previous_note: Some(previous) } if previous.id == first.id
    ));
}

#[test]
fn deleting_only_note_in_smart_tag_selects_nothing() {
    let fixture = Fixture::new();
    let filed = fixture.add_note(Note {
        archived: true,
        ..note_at("filed", 1)
    });
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::Archived));
    assert_eq!(fixture.selected_title().as_deref(), Some("filed"));

    fixture.engine.borrow_mut().set_note_to_be_deleted(filed.id);
    view_model.handle_items_changed();

    assert_eq!(view_model.selected_note(), None);
    assert_eq!(fixture.services.app_state.selected_note(), None);
    assert!(fixture.engine.borrow().find_note(filed.id).is_some());
}

#[test]
fn deleting_last_note_in_ordinary_tag_creates_placeholder() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    let only = fixture.add_tagged_note(&work, note_at("only", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&work);

    fixture.engine.borrow_mut().set_note_to_be_deleted(only.id);
    view_model.handle_items_changed();

    let selected = view_model.selected_note().unwrap();
    assert!(selected.dummy);
    assert_eq!(selected.title, "Note 1");
}

#[test]
fn selection_cleared_elsewhere_advances_to_next_note() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    let a = fixture.add_tagged_note(&work, note_at("a", 2));
    fixture.add_tagged_note(&work, note_at("b", 1));
    let _view_model = attach(&fixture);
    fixture.select_tag(&work);

    {
        let mut engine = fixture.engine.borrow_mut();
        let mut trashed = engine.find_note(a.id).unwrap();
        trashed.trashed = true;
        engine.update_note(trashed);
    }
    fixture.services.app_state.set_selected_note(None);

    assert_eq!(fixture.selected_title().as_deref(), Some("b"));
}

#[test]
fn abandoned_placeholder_removed_after_delay() {
    let fixture = Fixture::new();
    let keep = fixture.add_note(note_at("keep", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    let placeholder = view_model.create_new_note().unwrap();
    assert_eq!(placeholder.title, "Note 2");
    assert_eq!(titles(&view_model), vec!["Note 2", "keep"]);

    assert_eq!(view_model.select_note(Some(keep.id)), SelectOutcome::Selected);
    assert!(fixture.engine.borrow().find_note(placeholder.id).is_some());

    assert_eq!(fixture.advance(249), 0);
    assert!(fixture.engine.borrow().find_note(placeholder.id).is_some());
    assert_eq!(fixture.advance(1), 1);
    assert!(fixture.engine.borrow().find_note(placeholder.id).is_none());
    assert_eq!(titles(&view_model), vec!["keep"]);
}

#[test]
fn reselecting_placeholder_cancels_cleanup() {
    let fixture = Fixture::new();
    let keep = fixture.add_note(note_at("keep", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    let placeholder = view_model.create_new_note().unwrap();

    view_model.select_note(Some(keep.id));
    assert_eq!(
        view_model.select_note(Some(placeholder.id)),
        SelectOutcome::Selected
    );

    assert_eq!(fixture.advance(1_000), 0);
    assert!(fixture.engine.borrow().find_note(placeholder.id).is_some());
}

#[test]
fn only_one_live_placeholder() {
    let fixture = Fixture::new();
    fixture.add_note(note_at("keep", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    assert!(view_model.create_new_note().is_some());
    assert!(view_model.create_new_note().is_none());
    let placeholders = fixture
        .engine
        .borrow()
        .notes()
        .iter()
        .filter(|note| note.dummy)
        .count();
    assert_eq!(placeholders, 1);
}

#[test]
fn tag_change_discards_selected_placeholder() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    fixture.add_note(note_at("loose", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&work);
    let placeholder = view_model.selected_note().unwrap();
    assert!(placeholder.dummy);

    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    let engine = fixture.engine.borrow();
    assert!(engine.find_note(placeholder.id).is_none());
    assert!(engine.members_of(&work).is_empty());
    assert_eq!(fixture.selected_title().as_deref(), Some("loose"));
}

#[test]
fn selecting_conflicted_copy_clears_marker() {
    let fixture = Fixture::new();
    let original = fixture.add_note(note_at("original", 2));
    let copy = fixture.add_note(Note {
        conflict_of: Some(original.id),
        ..note_at("copy", 1)
    });
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    let syncs = fixture.engine.borrow().sync_requests();

    assert_eq!(view_model.select_note(Some(copy.id)), SelectOutcome::Selected);

    let engine = fixture.engine.borrow();
    assert!(engine.find_note(copy.id).unwrap().conflict_of.is_none());
    assert!(engine.is_note_dirty(copy.id));
    assert_eq!(engine.sync_requests(), syncs + 1);
    assert!(view_model
        .rendered_notes()
        .iter()
        .all(|row| row.flags.iter().all(|flag| flag.label != "Conflicted Copy")));
}

#[test]
fn protected_selection_requires_privilege() {
    let fixture = Fixture::with_protected_actions(vec![PrivilegedAction::ViewProtectedNotes]);
    fixture.add_note(note_at("open", 2));
    let secret = fixture.add_note(Note {
        protected: true,
        ..note_at("secret", 1)
    });
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    assert_eq!(
        view_model.select_note(Some(secret.id)),
        SelectOutcome::PrivilegeRequired
    );
    assert_eq!(fixture.selected_title().as_deref(), Some("open"));

    assert_eq!(
        view_model.select_note_privileged(secret.id),
        SelectOutcome::Selected
    );
    assert_eq!(fixture.selected_title().as_deref(), Some("secret"));
    assert_eq!(
        view_model.select_note(Some(NoteId::new())),
        SelectOutcome::Missing
    );
}

#[test]
fn own_selection_emits_single_note_changed() {
    let fixture = Fixture::new();
    let a = fixture.add_note(note_at("a", 2));
    let b = fixture.add_note(note_at("b", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    let events = fixture.record_events();

    view_model.select_note(Some(b.id));

    let events = events.borrow();
    assert_eq!(events.len(), 1);
    assert!(matches!(
        &events[0],
        AppEvent::NoteChanged { previous_note: Some(previous) } if previous.id == a.id
    ));
}

#[test]
fn reselecting_same_note_broadcasts_again() {
    let fixture = Fixture::new();
    let only = fixture.add_note(note_at("only", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    let events = fixture.record_events();

    assert_eq!(
        view_model.select_note(Some(only.id)),
        SelectOutcome::Unchanged
    );
    assert_eq!(view_model.select_note(Some(only.id)), SelectOutcome::Unchanged);
    assert_eq!(events.borrow().len(), 2);
}

#[test]
fn filter_text_updates_title_and_selection() {
    let fixture = Fixture::new();
    fixture.add_note(with_text("Groceries", "milk eggs", 30));
    let trip = fixture.add_note(with_text("Trip", "pack bags", 20));
    fixture.add_note(with_text("Recipes", "milk bread", 10));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    view_model.select_note(Some(trip.id));

    view_model.set_filter_text("milk");

    assert!(view_model.is_filtering());
    assert_eq!(titles(&view_model), vec!["Groceries", "Recipes"]);
    assert_eq!(view_model.panel_title().as_deref(), Some("2 search results"));
    assert_eq!(fixture.selected_title().as_deref(), Some("Groceries"));

    view_model.on_filter_enter();
    assert!(view_model.search_submitted());
    view_model.clear_filter_text();
    assert!(!view_model.is_filtering());
    assert!(!view_model.search_submitted());
    assert_eq!(view_model.panel_title().as_deref(), Some("All notes"));
    assert_eq!(titles(&view_model).len(), 3);
}

#[test]
fn pagination_window_follows_viewport() {
    let fixture = Fixture::new();
    for index in 0..5 {
        fixture.add_note(note_at(&format!("n{index}"), index));
    }
    let view_model = attach(&fixture);
    view_model.set_viewport_height(Some(102));
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    assert_eq!(view_model.rendered_notes().len(), 2);

    view_model.paginate();
    assert_eq!(view_model.rendered_notes().len(), 4);

    view_model.set_viewport_height(Some(153));
    assert_eq!(view_model.pagination().page_size(), 3);
    assert_eq!(view_model.rendered_notes().len(), 4);

    view_model.clear_filter_text();
    assert_eq!(view_model.rendered_notes().len(), 3);
}

#[test]
fn preferences_drive_sort_and_subtitle() {
    let fixture = Fixture::new();
    {
        let mut preferences = fixture.preferences.borrow_mut();
        preferences.set_value(PrefKey::SortBy, json!("title"));
        preferences.set_value(PrefKey::ShowArchived, json!(true));
    }
    fixture.add_note(note_at("b", 1));
    fixture.add_note(note_at("a", 2));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    assert_eq!(titles(&view_model), vec!["a", "b"]);
    assert_eq!(view_model.options_subtitle(), " Title | + Archived");

    view_model.toggle_reverse_sort();
    assert_eq!(titles(&view_model), vec!["b", "a"]);
    assert_eq!(
        view_model.options_subtitle(),
        " Title | + Archived | Reversed"
    );

    view_model.set_sort_by(SortKey::CreatedAt);
    assert_eq!(titles(&view_model), vec!["b", "a"]);

    let preferences = fixture.preferences.borrow();
    assert_eq!(preferences.value(PrefKey::SortReverse), Some(json!(true)));
    assert_eq!(preferences.value(PrefKey::SortBy), Some(json!("created_at")));
    assert_eq!(preferences.sync_count(), 2);
}

#[test]
fn changed_sort_preference_selects_first_note() {
    let fixture = Fixture::new();
    fixture.add_note(note_at("z", 2));
    fixture.add_note(note_at("a", 1));
    let _view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    assert_eq!(fixture.selected_title().as_deref(), Some("z"));

    fixture
        .preferences
        .borrow_mut()
        .set_value(PrefKey::SortBy, json!("title"));
    fixture.services.app_state.set_user_preferences();

    assert_eq!(fixture.selected_title().as_deref(), Some("a"));
}

#[test]
fn hide_pinned_toggle_persists_and_hides() {
    let fixture = Fixture::new();
    fixture.add_note(Note {
        pinned: true,
        ..note_at("pinned", 1)
    });
    fixture.add_note(note_at("plain", 2));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    assert_eq!(titles(&view_model), vec!["pinned", "plain"]);

    assert!(view_model.toggle_option(ListToggle::HidePinned));

    assert_eq!(titles(&view_model), vec!["plain"]);
    assert_eq!(
        fixture.preferences.borrow().value(PrefKey::HidePinned),
        Some(json!(true))
    );
    assert_eq!(view_model.options_subtitle(), " Date Added | \u{2013} Pinned");
}

#[test]
fn collapsed_width_preference_broadcasts_resize() {
    let fixture = Fixture::new();
    fixture
        .preferences
        .borrow_mut()
        .set_value(PrefKey::NotesPanelWidth, json!(0));
    let events = fixture.record_events();

    let view_model = attach(&fixture);

    assert_eq!(view_model.panel_width(), Some(0.0));
    assert_eq!(
        *events.borrow(),
        vec![AppEvent::PanelResized {
            panel: PanelName::Notes,
            collapsed: true
        }]
    );
}

#[test]
fn panel_resize_persists_width() {
    let fixture = Fixture::new();
    let view_model = attach(&fixture);
    let events = fixture.record_events();

    view_model.on_panel_resize(320.0, false);

    assert_eq!(
        fixture.preferences.borrow().number_value(PrefKey::NotesPanelWidth),
        Some(320.0)
    );
    assert_eq!(
        *events.borrow(),
        vec![AppEvent::PanelResized {
            panel: PanelName::Notes,
            collapsed: false
        }]
    );
}

#[test]
fn sign_in_discards_placeholder_until_sync_completes_empty() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    let view_model = attach(&fixture);
    fixture.select_tag(&work);
    let placeholder = view_model.selected_note().unwrap();

    view_model.handle_sign_in();
    assert_eq!(view_model.selected_note(), None);
    assert!(view_model.notes().is_empty());
    assert!(fixture.engine.borrow().find_note(placeholder.id).is_none());

    view_model.handle_sync_event(&SyncEvent::Completed { saved: Vec::new() });
    let recreated = view_model.selected_note().unwrap();
    assert!(recreated.dummy);
    assert_ne!(recreated.id, placeholder.id);

    // only a completed sync recreates it
    view_model.handle_sign_in();
    view_model.handle_sync_event(&SyncEvent::TakingTooLong);
    assert!(view_model.selected_note().is_none());
}

#[test]
fn rendered_rows_carry_flags_tags_and_selection() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    let home = fixture.add_tag("home");
    let pinned = fixture.add_tagged_note(
        &work,
        Note {
            pinned: true,
            ..note_at("pin", 1)
        },
    );
    fixture
        .engine
        .borrow_mut()
        .relate_note_to_tag(home.id, pinned.id);
    fixture.add_tagged_note(&work, note_at("plain", 2));
    let view_model = attach(&fixture);
    fixture.select_tag(&work);

    let rows = view_model.rendered_notes();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].selected);
    assert_eq!(rows[0].note.title, "pin");
    assert_eq!(
        rows[0].flags.iter().map(|flag| flag.label).collect::<Vec<_>>(),
        vec!["Pinned"]
    );
    assert!(rows[0].show_tags);
    assert!(!rows[1].selected);
    assert!(!rows[1].show_tags);
    assert_eq!(rows[1].preview.as_deref(), Some("plain body"));

    view_model.toggle_option(ListToggle::HideNotePreview);
    assert!(view_model.rendered_notes().iter().all(|row| row.preview.is_none()));
}

#[test]
fn keyboard_navigation_moves_through_list() {
    let fixture = Fixture::new();
    fixture.add_note(note_at("a", 3));
    fixture.add_note(note_at("b", 2));
    fixture.add_note(note_at("c", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));

    assert_eq!(view_model.select_previous_note(), SelectOutcome::Missing);
    assert_eq!(view_model.select_next_note(), SelectOutcome::Selected);
    assert_eq!(view_model.select_next_note(), SelectOutcome::Selected);
    assert_eq!(fixture.selected_title().as_deref(), Some("c"));
    assert_eq!(view_model.select_next_note(), SelectOutcome::Missing);
    assert_eq!(view_model.select_previous_note(), SelectOutcome::Selected);
    assert_eq!(fixture.selected_title().as_deref(), Some("b"));
}

#[test]
fn tag_change_resets_scroll_filter_and_menu() {
    let fixture = Fixture::new();
    let work = fixture.add_tag("work");
    fixture.add_tagged_note(&work, note_at("report", 1));
    let view_model = attach(&fixture);
    fixture.select_tag(&fixture.smart_tag(SmartTagKind::AllNotes));
    view_model.set_scroll_position(10.0, 40.0);
    view_model.set_filter_text("report");
    view_model.set_show_menu(true);

    fixture.select_tag(&work);

    assert_eq!(view_model.scroll_position(), (0.0, 0.0));
    assert_eq!(view_model.filter_text(), "");
    assert!(!view_model.show_menu());
    assert_eq!(view_model.panel_title().as_deref(), Some("work"));
}

#[test]
fn editor_focus_closes_menu() {
    let fixture = Fixture::new();
    let view_model = attach(&fixture);
    view_model.set_show_menu(true);

    fixture.services.app_state.editor_did_focus();

    assert!(!view_model.show_menu());
}

#[test]
fn dropping_view_model_unsubscribes() {
    let fixture = Fixture::new();
    let before = fixture.services.app_state.observer_count();
    let view_model = attach(&fixture);
    assert_eq!(fixture.services.app_state.observer_count(), before + 1);

    drop(view_model);

    assert_eq!(fixture.services.app_state.observer_count(), before);
}
