use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use paperboard_core::PaperView;

use crate::app::App;
use crate::theme::Theme;

/// Render every field of the cursor record.
pub fn render_in(f: &mut Frame, app: &App, area: Rect) {
    let theme = &app.theme;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style())
        .title(" Detail ");

    let Some(paper) = app.cursor_paper() else {
        let empty = Paragraph::new(Span::styled("  No paper selected", Style::default().fg(theme.dim)))
            .block(block);
        f.render_widget(empty, area);
        return;
    };
    let view = PaperView::from(paper.as_ref());
    let selected = app.session.selection().contains(&view.id);

    let mut lines: Vec<Line> = Vec::new();
    if selected {
        lines.push(Line::from(Span::styled(
            "\u{2713} Selected for export",
            Style::default().fg(theme.selected).add_modifier(Modifier::BOLD),
        )));
    }
    lines.push(Line::from(Span::styled(
        view.title.clone(),
        Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        view.link.clone(),
        Style::default().fg(theme.active),
    )));
    lines.push(Line::from(""));

    lines.push(field_line("Published", &view.date, theme));
    lines.push(Line::from(vec![
        Span::styled(format!("{:<11}", "Status"), Style::default().fg(theme.dim)),
        Span::styled(
            view.status.to_string(),
            Style::default().fg(theme.status_color(view.status)),
        ),
    ]));
    if let Some(venue) = &view.venue {
        lines.push(Line::from(vec![
            Span::styled(format!("{:<11}", "Venue"), Style::default().fg(theme.dim)),
            Span::styled(
                venue.text.clone(),
                Style::default()
                    .fg(theme.badge_color(venue.badge))
                    .add_modifier(Modifier::BOLD),
            ),
        ]));
    }
    if let Some(category) = &view.primary_category {
        lines.push(field_line("arXiv", category, theme));
    }
    if let Some(code) = &view.code_link {
        lines.push(field_line("Code", code, theme));
    }
    if !view.tags.is_empty() {
        lines.push(field_line("Tags", &view.tags.join(", "), theme));
    }
    lines.push(Line::from(""));

    section(&mut lines, "Authors", &view.authors, theme);
    if !view.summary.is_empty() {
        section(&mut lines, "Summary", &view.summary, theme);
    }
    section(&mut lines, "Abstract", &view.abstract_text, theme);

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: true });
    f.render_widget(paragraph, area);
}

fn field_line<'a>(name: &'a str, value: &str, theme: &Theme) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("{name:<11}"), Style::default().fg(theme.dim)),
        Span::styled(value.to_string(), Style::default().fg(theme.text)),
    ])
}

fn section(lines: &mut Vec<Line<'_>>, heading: &str, body: &str, theme: &Theme) {
    lines.push(Line::from(Span::styled(
        heading.to_string(),
        Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        body.to_string(),
        Style::default().fg(theme.text),
    )));
    lines.push(Line::from(""));
}
