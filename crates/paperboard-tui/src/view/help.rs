use ratatui::Frame;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::theme::Theme;
use crate::view::centered_rect;

/// Render the help overlay as a centered popup.
pub fn render(f: &mut Frame, theme: &Theme) {
    let popup = centered_rect(64, 36, f.area());

    let lines = vec![
        Line::from(Span::styled(" Keyboard Shortcuts ", theme.header_style())),
        Line::from(""),
        section_header("Navigation", theme),
        key_line("j / \u{2193}", "Move down", theme),
        key_line("k / \u{2191}", "Move up", theme),
        key_line("Ctrl+d / PgDn", "Page down", theme),
        key_line("Ctrl+u / PgUp", "Page up", theme),
        key_line("g / G", "Go to top / bottom", theme),
        key_line("Enter", "Toggle detail pane", theme),
        Line::from(""),
        section_header("Filters", theme),
        key_line("s", "Cycle status", theme),
        key_line("c", "Cycle category", theme),
        key_line("f", "Cycle research field", theme),
        key_line("t", "Cycle task (needs a field)", theme),
        key_line("o", "Toggle sort order", theme),
        key_line("/", "Search title, abstract, authors", theme),
        key_line("d", "Date range (YYYY-MM-DD..YYYY-MM-DD)", theme),
        key_line("m", "Cycle month (all / single month)", theme),
        Line::from(""),
        section_header("Selection & Export", theme),
        key_line("Space", "Select / unselect paper", theme),
        key_line("A", "Select all shown papers", theme),
        key_line("C", "Clear selection", theme),
        key_line("e", "Export selection as BibTeX", theme),
        key_line("y", "Copy BibTeX to clipboard (OSC 52)", theme),
        Line::from(""),
        section_header("Global", theme),
        key_line("T", "Cycle theme", theme),
        key_line("Ctrl+s", "Save theme and export path", theme),
        key_line("?", "Toggle this help", theme),
        key_line("q", "Quit", theme),
        key_line("Ctrl+c", "Force quit", theme),
    ];

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.active))
                .title(" Help "),
        )
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup);
    f.render_widget(paragraph, popup);
}

fn section_header<'a>(title: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(Span::styled(
        format!("  {title}"),
        Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
    ))
}

fn key_line<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("    {key:<16}"), Style::default().fg(theme.text)),
        Span::styled(desc, Style::default().fg(theme.dim)),
    ])
}
