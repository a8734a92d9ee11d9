use std::sync::Arc;

use paperboard_core::source::MockSource;
use paperboard_core::{CatalogStore, Pager, Paper, PublicationStatus, ResearchField};

use super::*;
use crate::action::Action;
use crate::tui_event::BackendEvent;

/// Create a minimal App for testing (no backend, empty catalog).
fn test_app() -> App {
    let store = CatalogStore::new(Arc::new(MockSource::new()));
    let mut app = App::new(Session::new(store, Pager::default()), ConfigFile::default(), "hacker");
    app.visible_rows = 10;
    app
}

fn paper(id: &str, published: &str, conference: Option<&str>) -> Paper {
    Paper {
        id: id.into(),
        title: format!("Paper {id}"),
        authors: "A. Author".into(),
        published: published.into(),
        conference: conference.map(String::from),
        ..Default::default()
    }
}

fn many(month: &str, n: usize) -> Vec<Paper> {
    (0..n)
        .map(|i| paper(&format!("{month}-{i:03}"), &format!("{month}-{:02}", i % 28 + 1), None))
        .collect()
}

/// App with the index and one month already delivered by the backend.
fn loaded_app(n: usize) -> App {
    let mut app = test_app();
    app.handle_backend_event(BackendEvent::IndexLoaded(Ok(vec!["2024-01".into()])));
    app.handle_backend_event(BackendEvent::MonthLoaded {
        month: "2024-01".into(),
        result: Ok(many("2024-01", n)),
    });
    app
}

// ── Backend events ──────────────────────────────────────────────

#[test]
fn index_requests_every_month() {
    let mut app = test_app();
    assert!(app.is_loading());
    app.handle_backend_event(BackendEvent::IndexLoaded(Ok(vec![
        "2024-02".into(),
        "2024-01".into(),
    ])));
    assert!(app.index_loaded);
    assert_eq!(
        app.pending_months.iter().collect::<Vec<_>>(),
        vec!["2024-01", "2024-02"]
    );

    app.handle_backend_event(BackendEvent::MonthLoaded {
        month: "2024-02".into(),
        result: Ok(many("2024-02", 3)),
    });
    app.handle_backend_event(BackendEvent::MonthLoaded {
        month: "2024-01".into(),
        result: Err("HTTP 500".into()),
    });
    assert!(!app.is_loading());
    assert_eq!(app.session.results().len(), 3);
    assert_eq!(app.failed_months.len(), 1);
    assert!(app.status_message.as_deref().unwrap().contains("2024-01"));
}

#[test]
fn missing_index_shows_alert() {
    let mut app = test_app();
    app.handle_backend_event(BackendEvent::IndexLoaded(Err("not found".into())));
    assert!(app.alert.is_some());
    assert!(app.session.results().is_empty());
    app.update(Action::NavigateBack);
    assert!(app.alert.is_none());
}

#[test]
fn months_already_in_flight_are_not_requested_twice() {
    let mut app = test_app();
    app.request_months(vec!["2024-01".into()]);
    app.request_months(vec!["2024-01".into(), "2024-02".into()]);
    assert_eq!(app.pending_months.len(), 2);
}

// ── Incremental rendering ───────────────────────────────────────

#[test]
fn sentinel_loads_batches_as_the_cursor_approaches() {
    let mut app = loaded_app(45);
    assert_eq!(app.session.rendered().len(), 20);

    // last visible row is 9; sentinel at 20 is out of reach
    app.update(Action::Tick);
    assert_eq!(app.session.rendered().len(), 20);

    for _ in 0..10 {
        app.update(Action::MoveDown);
    }
    // cursor 10, rows 1..=10 visible, 10 + 3 < 20
    assert_eq!(app.session.rendered().len(), 20);

    for _ in 0..9 {
        app.update(Action::MoveDown);
    }
    // the sentinel at 20 came within lookahead on the way down
    assert_eq!(app.session.rendered().len(), 30);

    app.update(Action::GoBottom);
    app.update(Action::GoBottom);
    assert_eq!(app.session.rendered().len(), 45);
    assert!(app.session.pager().sentinel().is_none());
}

#[test]
fn tall_viewport_fills_itself() {
    let mut app = loaded_app(45);
    app.update(Action::Resize(120, 60));
    assert_eq!(app.session.rendered().len(), 45);
}

#[test]
fn filter_change_resets_cursor() {
    let mut app = loaded_app(45);
    app.update(Action::GoBottom);
    assert!(app.cursor > 0);
    app.update(Action::ToggleSort);
    assert_eq!(app.cursor, 0);
    assert_eq!(app.scroll_offset, 0);
    assert_eq!(app.session.rendered().len(), 20);
}

// ── Filters ─────────────────────────────────────────────────────

#[test]
fn status_cycles_through_all() {
    let mut app = test_app();
    app.update(Action::CycleStatus);
    assert_eq!(app.session.filter().status, Some(PublicationStatus::Published));
    app.update(Action::CycleStatus);
    assert_eq!(app.session.filter().status, Some(PublicationStatus::Preprint));
    app.update(Action::CycleStatus);
    assert_eq!(app.session.filter().status, None);
}

#[test]
fn task_cycle_needs_a_field() {
    let mut app = loaded_app(3);
    app.update(Action::CycleTask);
    assert!(app.session.filter().task.is_none());
    assert!(app.status_message.is_some());

    app.session.set_field(Some(ResearchField::AiOps));
    app.update(Action::CycleTask);
    assert_eq!(app.session.filter().task.as_deref(), Some("Log Statement Generation"));
    app.update(Action::CycleTask);
    assert_eq!(app.session.filter().task.as_deref(), Some("Log Parsing"));
    app.update(Action::CycleTask);
    assert!(app.session.filter().task.is_none());
}

#[test]
fn live_search_and_cancel_restores() {
    let mut app = loaded_app(5);
    app.update(Action::StartSearch);
    assert_eq!(app.input_mode, InputMode::Search);
    for ch in "001".chars() {
        app.update(Action::TextInput(ch));
    }
    assert_eq!(app.session.results().len(), 1);

    // q is text while searching
    app.update(Action::TextInput('q'));
    assert!(!app.confirm_quit);
    app.update(Action::TextInput('\x08'));
    assert_eq!(app.session.results().len(), 1);

    app.update(Action::TextCancel);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert_eq!(app.session.filter().search, "");
    assert_eq!(app.session.results().len(), 5);
}

#[test]
fn date_range_requests_missing_months() {
    let mut app = test_app();
    app.handle_backend_event(BackendEvent::IndexLoaded(Ok(vec![
        "2024-02".into(),
        "2024-01".into(),
    ])));
    app.pending_months.clear();

    app.update(Action::StartDateInput);
    for ch in "2024-02-01..2024-02-29".chars() {
        app.update(Action::TextInput(ch));
    }
    app.update(Action::TextConfirm);
    assert_eq!(app.input_mode, InputMode::Normal);
    assert!(app.alert.is_none());
    assert_eq!(app.pending_months.iter().collect::<Vec<_>>(), vec!["2024-02"]);
    assert_eq!(
        app.session.filter().date_range.as_ref().map(|r| r.to_string()).as_deref(),
        Some("2024-02-01..2024-02-29")
    );
}

#[test]
fn bad_date_range_alerts_and_keeps_filter() {
    let mut app = loaded_app(3);
    app.update(Action::StartDateInput);
    for ch in "2024-13-01..2024-02-01".chars() {
        app.update(Action::TextInput(ch));
    }
    app.update(Action::TextConfirm);
    assert!(app.alert.is_some());
    assert!(app.session.filter().date_range.is_none());
}

#[test]
fn unindexed_wide_range_alerts_without_fetching() {
    let mut app = test_app();
    app.update(Action::StartDateInput);
    for ch in "0001-01-01..9999-12-31".chars() {
        app.update(Action::TextInput(ch));
    }
    app.update(Action::TextConfirm);
    assert!(app.alert.is_some());
    assert!(app.pending_months.is_empty());
    assert!(app.session.filter().date_range.is_none());
}

#[test]
fn month_cycle_walks_the_index() {
    let mut app = loaded_app(4);
    app.handle_backend_event(BackendEvent::IndexLoaded(Ok(vec![
        "2024-02".into(),
        "2024-01".into(),
    ])));
    app.update(Action::CycleMonth);
    assert_eq!(app.session.month(), &MonthSelection::Month("2024-02".into()));
    assert!(app.session.results().is_empty());

    app.update(Action::CycleMonth);
    assert_eq!(app.session.month(), &MonthSelection::Month("2024-01".into()));
    assert_eq!(app.session.results().len(), 4);

    app.update(Action::CycleMonth);
    assert_eq!(app.session.month(), &MonthSelection::All);
}

// ── Selection & export ──────────────────────────────────────────

#[test]
fn space_toggles_cursor_paper() {
    let mut app = loaded_app(3);
    let id = app.cursor_paper().unwrap().id.clone();
    app.update(Action::ToggleSelect);
    assert!(app.session.selection().contains(&id));
    app.update(Action::ToggleSelect);
    assert!(app.session.selection().is_empty());
}

#[test]
fn export_with_empty_selection_alerts() {
    let mut app = loaded_app(3);
    app.update(Action::Export);
    assert!(!app.export_state.active);
    assert_eq!(app.alert.as_ref().unwrap().title, "Nothing selected");
}

#[test]
fn export_writes_selected_bibtex() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("refs.bib");

    let mut app = loaded_app(25);
    app.update(Action::SelectRendered);
    assert_eq!(app.session.selection().len(), 20);

    app.update(Action::Export);
    assert!(app.export_state.active);

    app.update(Action::EditExportPath);
    assert_eq!(app.input_mode, InputMode::ExportPath);
    for _ in 0..app.export_state.edit_buffer.chars().count() {
        app.update(Action::TextInput('\x08'));
    }
    for ch in out.to_string_lossy().chars() {
        app.update(Action::TextInput(ch));
    }
    app.update(Action::TextConfirm);
    assert_eq!(app.input_mode, InputMode::Normal);

    app.update(Action::DrillIn);
    assert!(!app.export_state.active);
    assert!(app.alert.is_none());

    let written = std::fs::read_to_string(&out).unwrap();
    assert_eq!(written.matches("@article{").count(), 20);
}

#[test]
fn clear_selection_empties_it() {
    let mut app = loaded_app(5);
    app.update(Action::SelectRendered);
    app.update(Action::ClearSelection);
    assert!(app.session.selection().is_empty());
}

// ── Overlays ────────────────────────────────────────────────────

#[test]
fn quit_needs_confirmation() {
    let mut app = test_app();
    assert!(!app.update(Action::Quit));
    assert!(app.confirm_quit);
    app.update(Action::NavigateBack);
    assert!(!app.confirm_quit);

    app.update(Action::Quit);
    assert!(app.update(Action::Quit));
    assert!(app.should_quit);
}

#[test]
fn help_swallows_other_keys() {
    let mut app = loaded_app(3);
    app.update(Action::ToggleHelp);
    assert!(app.show_help);
    app.update(Action::CycleStatus);
    assert!(app.session.filter().status.is_none());
    app.update(Action::ToggleHelp);
    assert!(!app.show_help);
}

#[test]
fn theme_cycles_between_presets() {
    let mut app = test_app();
    app.update(Action::CycleTheme);
    assert_eq!(app.theme_name, "modern");
    app.update(Action::CycleTheme);
    assert_eq!(app.theme_name, "hacker");
}
