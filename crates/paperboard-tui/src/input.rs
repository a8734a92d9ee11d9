use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use crate::action::Action;
use crate::app::InputMode;

/// Map a crossterm terminal event to a TUI action, respecting input mode.
pub fn map_event(event: &Event, input_mode: &InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always quits regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Quit;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::Search | InputMode::DateInput | InputMode::ExportPath => {
                    map_key_text(key)
                }
            }
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        Event::Resize(w, h) => Action::Resize(*w, *h),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Enter => Action::DrillIn,
        KeyCode::Esc => Action::NavigateBack,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::SaveConfig,
        KeyCode::Char('s') => Action::CycleStatus,
        KeyCode::Char('c') => Action::CycleCategory,
        KeyCode::Char('f') => Action::CycleField,
        KeyCode::Char('t') => Action::CycleTask,
        KeyCode::Char('o') => Action::ToggleSort,
        KeyCode::Char('/') => Action::StartSearch,
        KeyCode::Char('d') => Action::StartDateInput,
        KeyCode::Char('m') => Action::CycleMonth,
        KeyCode::Char(' ') => Action::ToggleSelect,
        KeyCode::Char('A') => Action::SelectRendered,
        KeyCode::Char('C') => Action::ClearSelection,
        KeyCode::Char('e') => Action::Export,
        KeyCode::Char('p') => Action::EditExportPath,
        KeyCode::Char('y') => Action::CopyBibtex,
        KeyCode::Char('T') => Action::CycleTheme,
        KeyCode::Char('?') => Action::ToggleHelp,
        _ => Action::None,
    }
}

fn map_key_text(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::TextCancel,
        KeyCode::Enter => Action::TextConfirm,
        KeyCode::Char(c) => Action::TextInput(c),
        KeyCode::Backspace => Action::TextInput('\x08'), // sentinel for backspace
        _ => Action::None,
    }
}
