use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::app::App;
use crate::view::{centered_rect, truncate};

/// State of the BibTeX export modal.
#[derive(Debug, Clone)]
pub struct ExportState {
    pub active: bool,
    pub output_path: String,
    pub editing_path: bool,
    pub edit_buffer: String,
}

impl ExportState {
    pub fn new(output_path: String) -> Self {
        Self {
            active: false,
            output_path,
            editing_path: false,
            edit_buffer: String::new(),
        }
    }
}

/// Render the export modal as a centered popup.
pub fn render(f: &mut Frame, app: &App) {
    let theme = &app.theme;
    let state = &app.export_state;
    let popup = centered_rect(60, 10, f.area());

    let path_line = if state.editing_path {
        Line::from(vec![
            Span::styled("  Path: ", Style::default().fg(theme.dim)),
            Span::styled(
                truncate(&state.edit_buffer, 48),
                Style::default().fg(theme.text),
            ),
            Span::styled("\u{2588}", Style::default().fg(theme.active)),
        ])
    } else {
        Line::from(vec![
            Span::styled("  Path: ", Style::default().fg(theme.dim)),
            Span::styled(
                truncate(&state.output_path, 50),
                Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
            ),
        ])
    };

    let hint = |key: &'static str, desc: &'static str| {
        vec![
            Span::styled(
                key,
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ),
            Span::styled(desc, Style::default().fg(theme.dim)),
        ]
    };

    let hints = if state.editing_path {
        [hint("  Enter", ": keep path   "), hint("Esc", ": discard")].concat()
    } else {
        [
            hint("  Enter", ": write file   "),
            hint("y", ": copy   "),
            hint("p", ": edit path   "),
            hint("Esc", ": close"),
        ]
        .concat()
    };

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "  Export {} selected papers as BibTeX",
                app.session.selection().len()
            ),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        path_line,
        Line::from(""),
        Line::from(hints),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.active))
            .title(" Export "),
    );

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}
