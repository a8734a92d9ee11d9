mod backend;
mod update;
mod util;

use std::collections::BTreeSet;
use std::sync::Arc;

use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc;

use paperboard_core::config_file::ConfigFile;
use paperboard_core::store::MonthSelection;
use paperboard_core::{Paper, Session};

use crate::theme::Theme;
use crate::tui_event::BackendCommand;
use crate::view::alert::Alert;
use crate::view::export::ExportState;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    DateInput,
    ExportPath,
}

/// Header, facet bar, footer and the table's border and header row.
const CHROME_ROWS: usize = 11;

pub struct App {
    pub session: Session,
    pub config: ConfigFile,
    pub theme: Theme,
    pub theme_name: String,
    pub input_mode: InputMode,

    /// Live search text while in [`InputMode::Search`].
    pub search_buffer: String,
    /// Search text to restore when the search is cancelled.
    search_before: String,
    pub date_buffer: String,

    /// Index into the rendered records.
    pub cursor: usize,
    pub scroll_offset: usize,
    /// Table rows that fit on screen; set on every draw.
    pub visible_rows: usize,
    /// How close the sentinel row may get to the viewport before it counts as visible.
    pub lookahead_rows: usize,

    pub show_detail: bool,
    /// Set once the detail pane has been dropped for lack of width.
    detail_skipped: bool,
    pub show_help: bool,
    pub confirm_quit: bool,
    pub should_quit: bool,
    pub export_state: ExportState,
    pub alert: Option<Alert>,
    pub status_message: Option<String>,

    pub index_loaded: bool,
    /// Months requested from the backend and not answered yet.
    pub pending_months: BTreeSet<String>,
    pub failed_months: Vec<(String, String)>,

    pub tick: usize,
    pub backend_cmd_tx: Option<mpsc::UnboundedSender<BackendCommand>>,
}

impl App {
    pub fn new(session: Session, config: ConfigFile, theme_name: &str) -> Self {
        let export_path = config
            .export_path()
            .unwrap_or(paperboard_core::bibtex::DEFAULT_EXPORT_FILE)
            .to_string();
        let lookahead_rows = config.lookahead_rows();
        Self {
            session,
            config,
            theme: Theme::named(theme_name),
            theme_name: theme_name.to_string(),
            input_mode: InputMode::Normal,
            search_buffer: String::new(),
            search_before: String::new(),
            date_buffer: String::new(),
            cursor: 0,
            scroll_offset: 0,
            visible_rows: 0,
            lookahead_rows,
            show_detail: true,
            detail_skipped: false,
            show_help: false,
            confirm_quit: false,
            should_quit: false,
            export_state: ExportState::new(export_path),
            alert: None,
            status_message: None,
            index_loaded: false,
            pending_months: BTreeSet::new(),
            failed_months: Vec::new(),
            tick: 0,
            backend_cmd_tx: None,
        }
    }

    /// The record under the cursor.
    pub fn cursor_paper(&self) -> Option<Arc<Paper>> {
        self.session.rendered().get(self.cursor).cloned()
    }

    /// Still waiting for the index or a month shard.
    pub fn is_loading(&self) -> bool {
        !self.index_loaded || !self.pending_months.is_empty()
    }

    /// Ask the backend for months that are neither cached nor already in flight.
    pub fn request_months(&mut self, months: Vec<String>) {
        let fresh: Vec<String> = months
            .into_iter()
            .filter(|m| !self.session.store().is_cached(m))
            .filter(|m| self.pending_months.insert(m.clone()))
            .collect();
        if fresh.is_empty() {
            return;
        }
        tracing::debug!(months = ?fresh, "requesting months");
        if let Some(tx) = &self.backend_cmd_tx {
            let _ = tx.send(BackendCommand::FetchMonths(fresh));
        }
    }

    /// Start over at the top of a freshly computed result list.
    pub(crate) fn reset_cursor(&mut self) {
        self.cursor = 0;
        self.scroll_offset = 0;
        self.check_sentinel();
    }

    /// Keep the cursor inside the rendered records after they were replaced.
    pub(crate) fn clamp_cursor(&mut self) {
        let len = self.session.rendered().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
        self.ensure_cursor_visible();
        self.check_sentinel();
    }

    pub(crate) fn ensure_cursor_visible(&mut self) {
        let rows = self.visible_rows.max(1);
        if self.cursor < self.scroll_offset {
            self.scroll_offset = self.cursor;
        } else if self.cursor >= self.scroll_offset + rows {
            self.scroll_offset = self.cursor + 1 - rows;
        }
    }

    /// Render further batches while the sentinel row sits within
    /// `lookahead_rows` of the bottom of the viewport.
    pub(crate) fn check_sentinel(&mut self) {
        while let Some(sentinel) = self.session.pager().sentinel() {
            let last_visible = self.scroll_offset + self.visible_rows.saturating_sub(1);
            if last_visible + self.lookahead_rows < sentinel.position {
                break;
            }
            if self.session.on_visible(sentinel).is_none() {
                break;
            }
        }
    }

    pub(crate) fn set_alert(&mut self, title: &str, message: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.to_string(),
            message: message.into(),
        });
    }

    /// Month modes in cycle order: all, then each index month latest first.
    pub(crate) fn next_month_selection(&self) -> MonthSelection {
        let index = self.session.store().index();
        match self.session.month() {
            MonthSelection::All => index
                .first()
                .map_or(MonthSelection::All, |m| MonthSelection::Month(m.clone())),
            MonthSelection::Month(current) => index
                .iter()
                .position(|m| m == current)
                .and_then(|i| index.get(i + 1))
                .map_or(MonthSelection::All, |m| MonthSelection::Month(m.clone())),
        }
    }

    /// Render the current screen.
    pub fn view(&mut self, f: &mut ratatui::Frame) {
        let area = f.area();

        let chunks = Layout::vertical([
            Constraint::Length(1), // header
            Constraint::Length(5), // facet bar + query line
            Constraint::Min(5),    // results (+ detail)
            Constraint::Length(1), // footer
        ])
        .split(area);

        crate::view::browse::render_header(f, chunks[0], self);
        crate::view::browse::render_facets(f, chunks[1], self);

        let fits_detail = chunks[2].width >= 60;
        if self.show_detail && !fits_detail && !self.detail_skipped {
            tracing::warn!(width = chunks[2].width, "terminal too narrow, hiding detail pane");
        }
        self.detail_skipped = self.show_detail && !fits_detail;
        let table_area = if self.show_detail && fits_detail {
            let body = Layout::horizontal([Constraint::Percentage(55), Constraint::Percentage(45)])
                .split(chunks[2]);
            crate::view::detail::render_in(f, self, body[1]);
            body[0]
        } else {
            chunks[2]
        };
        self.set_table_area(table_area);
        crate::view::browse::render_table(f, table_area, self);
        crate::view::browse::render_footer(f, chunks[3], self);

        if self.export_state.active {
            crate::view::export::render(f, self);
        }

        if self.show_help {
            crate::view::help::render(f, &self.theme);
        }

        if let Some(alert) = &self.alert {
            crate::view::alert::render(f, alert, &self.theme);
        }

        if self.confirm_quit {
            crate::view::quit_confirm::render(f, &self.theme);
        }
    }

    fn set_table_area(&mut self, area: Rect) {
        // borders + header row
        self.visible_rows = (area.height as usize).saturating_sub(3).max(1);
        self.ensure_cursor_visible();
    }
}

#[cfg(test)]
mod tests;
