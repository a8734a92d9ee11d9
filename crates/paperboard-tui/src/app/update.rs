use std::path::Path;

use paperboard_core::bibtex::{self, write_bibtex};
use paperboard_core::config_file::{self, DisplayConfig, ExportConfig};
use paperboard_core::{Category, DateRange, PublicationStatus, ResearchField};

use super::util::{cycle, edit_text, now_hms, osc52_copy};
use super::{App, CHROME_ROWS, InputMode};
use crate::action::Action;
use crate::theme::{THEMES, Theme};

impl App {
    /// Process a user action and update state. Returns true if the app should quit.
    pub fn update(&mut self, action: Action) -> bool {
        match action {
            Action::Tick => {
                self.tick = self.tick.wrapping_add(1);
                self.check_sentinel();
                return false;
            }
            Action::Resize(_w, h) => {
                self.visible_rows = (h as usize).saturating_sub(CHROME_ROWS).max(1);
                self.ensure_cursor_visible();
                self.check_sentinel();
                return false;
            }
            _ => {}
        }

        // Quit confirmation modal: q confirms, Esc cancels
        if self.confirm_quit {
            match action {
                Action::Quit => {
                    self.should_quit = true;
                    return true;
                }
                Action::NavigateBack => self.confirm_quit = false,
                _ => {}
            }
            return false;
        }

        if self.alert.is_some() {
            match action {
                Action::NavigateBack | Action::DrillIn | Action::TextConfirm => self.alert = None,
                Action::Quit => self.confirm_quit = true,
                _ => {}
            }
            return false;
        }

        if self.export_state.active {
            self.update_export(action);
            return false;
        }

        if self.show_help {
            match action {
                Action::ToggleHelp | Action::NavigateBack => self.show_help = false,
                Action::Quit => self.confirm_quit = true,
                _ => {}
            }
            return false;
        }

        match self.input_mode {
            InputMode::Search => {
                self.update_search(action);
                return false;
            }
            InputMode::DateInput => {
                self.update_date_input(action);
                return false;
            }
            InputMode::Normal | InputMode::ExportPath => {}
        }

        match action {
            Action::Quit => self.confirm_quit = true,
            Action::MoveDown => self.move_cursor(1),
            Action::MoveUp => self.move_cursor(-1),
            Action::PageDown => self.move_cursor(self.visible_rows.max(1) as isize),
            Action::PageUp => self.move_cursor(-(self.visible_rows.max(1) as isize)),
            Action::GoTop => {
                self.cursor = 0;
                self.ensure_cursor_visible();
            }
            Action::GoBottom => {
                self.cursor = self.session.rendered().len().saturating_sub(1);
                self.ensure_cursor_visible();
                self.check_sentinel();
            }
            Action::DrillIn => self.show_detail = !self.show_detail,
            Action::NavigateBack => self.status_message = None,

            Action::CycleStatus => {
                let next = cycle(self.session.filter().status, PublicationStatus::all());
                self.session.set_status(next);
                self.reset_cursor();
            }
            Action::CycleCategory => {
                let next = cycle(self.session.filter().category, Category::all());
                self.session.set_category(next);
                self.reset_cursor();
            }
            Action::CycleField => {
                let next = cycle(self.session.filter().field, ResearchField::all());
                self.session.set_field(next);
                self.reset_cursor();
            }
            Action::CycleTask => self.cycle_task(),
            Action::ToggleSort => {
                let sort = self.session.filter().sort.toggled();
                self.session.set_sort(sort);
                self.reset_cursor();
            }
            Action::StartSearch => {
                self.search_before = self.session.filter().search.clone();
                self.search_buffer = self.search_before.clone();
                self.input_mode = InputMode::Search;
            }
            Action::StartDateInput => {
                self.date_buffer = self
                    .session
                    .filter()
                    .date_range
                    .as_ref()
                    .map(|r| r.to_string())
                    .unwrap_or_default();
                self.input_mode = InputMode::DateInput;
            }
            Action::CycleMonth => {
                let next = self.next_month_selection();
                let missing = self.session.select_month_deferred(next);
                self.request_months(missing);
                self.reset_cursor();
            }

            Action::ToggleSelect => {
                if let Some(paper) = self.cursor_paper() {
                    self.session.toggle(&paper.id);
                }
            }
            Action::SelectRendered => {
                let n = self.session.select_rendered();
                self.status_message = Some(format!("Selected {n} shown papers"));
            }
            Action::ClearSelection => {
                self.session.clear_selection();
                self.status_message = Some("Selection cleared".to_string());
            }
            Action::Export => {
                if self.session.selection().is_empty() {
                    self.set_alert(
                        "Nothing selected",
                        "Select at least one paper with Space before exporting.",
                    );
                } else {
                    self.export_state.active = true;
                }
            }
            Action::CopyBibtex => {
                if let Some(paper) = self.cursor_paper() {
                    osc52_copy(&bibtex::entry(&paper));
                    self.status_message = Some(format!("Copied BibTeX for {}", paper.id));
                }
            }

            Action::CycleTheme => self.cycle_theme(),
            Action::SaveConfig => self.save_config(),
            Action::ToggleHelp => self.show_help = true,
            _ => {}
        }
        false
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.session.rendered().len();
        if len == 0 {
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
        self.ensure_cursor_visible();
        self.check_sentinel();
    }

    /// Cycle through the tasks offered for the current field.
    fn cycle_task(&mut self) {
        let values: Vec<String> = self
            .session
            .facets()
            .task_values()
            .map(String::from)
            .collect();
        if values.is_empty() {
            self.status_message = Some("Pick a field (f) to filter by task".to_string());
            return;
        }
        let next = match &self.session.filter().task {
            None => values.first().cloned(),
            Some(current) => values
                .iter()
                .position(|t| t == current)
                .and_then(|i| values.get(i + 1))
                .cloned(),
        };
        self.session.set_task(next);
        self.reset_cursor();
    }

    fn update_search(&mut self, action: Action) {
        match action {
            Action::TextInput(ch) => {
                edit_text(&mut self.search_buffer, ch);
                self.session.set_search(self.search_buffer.clone());
                self.reset_cursor();
            }
            Action::TextConfirm => self.input_mode = InputMode::Normal,
            Action::TextCancel => {
                self.search_buffer = self.search_before.clone();
                self.session.set_search(self.search_before.clone());
                self.input_mode = InputMode::Normal;
                self.reset_cursor();
            }
            Action::Quit => {
                self.input_mode = InputMode::Normal;
                self.confirm_quit = true;
            }
            _ => {}
        }
    }

    fn update_date_input(&mut self, action: Action) {
        match action {
            Action::TextInput(ch) => edit_text(&mut self.date_buffer, ch),
            Action::TextCancel => self.input_mode = InputMode::Normal,
            Action::TextConfirm => {
                self.input_mode = InputMode::Normal;
                self.apply_date_buffer();
            }
            Action::Quit => {
                self.input_mode = InputMode::Normal;
                self.confirm_quit = true;
            }
            _ => {}
        }
    }

    /// An empty buffer clears the range; anything else must parse as
    /// `YYYY-MM-DD..YYYY-MM-DD`.
    fn apply_date_buffer(&mut self) {
        let text = self.date_buffer.trim().to_string();
        let range = if text.is_empty() {
            None
        } else {
            match DateRange::parse(&text) {
                Ok(r) => Some(r),
                Err(e) => {
                    self.set_alert("Invalid date range", format!("{e} (expected YYYY-MM-DD..YYYY-MM-DD)"));
                    return;
                }
            }
        };
        match self.session.set_date_range_deferred(range) {
            Ok(missing) => {
                self.request_months(missing);
                self.reset_cursor();
            }
            Err(e) => self.set_alert("Invalid date range", e.to_string()),
        }
    }

    fn update_export(&mut self, action: Action) {
        if self.export_state.editing_path {
            match action {
                Action::TextInput(ch) => edit_text(&mut self.export_state.edit_buffer, ch),
                Action::TextConfirm => {
                    let buf = self.export_state.edit_buffer.trim().to_string();
                    if !buf.is_empty() {
                        self.export_state.output_path = buf;
                    }
                    self.export_state.editing_path = false;
                    self.input_mode = InputMode::Normal;
                }
                Action::TextCancel => {
                    self.export_state.editing_path = false;
                    self.input_mode = InputMode::Normal;
                }
                Action::Quit => {
                    self.should_quit = true;
                }
                _ => {}
            }
            return;
        }

        match action {
            Action::Quit => self.confirm_quit = true,
            Action::NavigateBack => self.export_state.active = false,
            Action::EditExportPath => {
                self.export_state.edit_buffer = self.export_state.output_path.clone();
                self.export_state.editing_path = true;
                self.input_mode = InputMode::ExportPath;
            }
            Action::DrillIn => self.write_export(),
            Action::CopyBibtex => match self.session.export_bibtex() {
                Ok(content) => {
                    osc52_copy(&content);
                    self.export_state.active = false;
                    self.status_message = Some(format!(
                        "Copied BibTeX for {} papers",
                        self.session.selection().len()
                    ));
                }
                Err(e) => self.set_alert("Export failed", e.to_string()),
            },
            _ => {}
        }
    }

    fn write_export(&mut self) {
        let path = self.export_state.output_path.clone();
        let result = self
            .session
            .export_bibtex()
            .and_then(|content| write_bibtex(Path::new(&path), &content));
        match result {
            Ok(()) => {
                tracing::info!(path = %path, papers = self.session.selection().len(), "exported BibTeX");
                self.export_state.active = false;
                self.status_message = Some(format!(
                    "Exported {} papers to {} at {}",
                    self.session.selection().len(),
                    path,
                    now_hms()
                ));
            }
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "export failed");
                self.set_alert("Export failed", e.to_string());
            }
        }
    }

    fn cycle_theme(&mut self) {
        let idx = THEMES
            .iter()
            .position(|t| *t == self.theme_name)
            .map_or(0, |i| (i + 1) % THEMES.len());
        self.theme_name = THEMES[idx].to_string();
        self.theme = Theme::named(&self.theme_name);
    }

    /// Persist the theme and export path to the platform config file.
    fn save_config(&mut self) {
        self.config.display = Some(DisplayConfig {
            theme: Some(self.theme_name.clone()),
        });
        self.config.export = Some(ExportConfig {
            path: Some(self.export_state.output_path.clone()),
        });
        match config_file::save_config(&self.config) {
            Ok(path) => {
                self.status_message = Some(format!("Saved config to {}", path.display()));
            }
            Err(e) => self.set_alert("Could not save config", e),
        }
    }
}
