use std::fmt::Display;

use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState};

use paperboard_core::{FacetCount, SortOrder, VenueBadge};

use crate::app::{App, InputMode};
use crate::theme::Theme;
use crate::view::{spinner_char, truncate};

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let store = app.session.store();
    let mut spans = vec![
        Span::styled(" PAPERBOARD ", theme.header_style()),
        Span::styled(
            format!(" {}", store.source().describe()),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                "  {}/{} months loaded",
                store.cached_months(),
                store.index().len()
            ),
            Style::default().fg(theme.dim),
        ),
    ];
    if app.is_loading() {
        let what = if app.index_loaded {
            format!(" loading {} months", app.pending_months.len())
        } else {
            " loading index".to_string()
        };
        spans.push(Span::styled(
            format!("  {}{}", spinner_char(app.tick), what),
            Style::default().fg(theme.spinner),
        ));
    }
    if !app.failed_months.is_empty() {
        spans.push(Span::styled(
            format!("  {} failed", app.failed_months.len()),
            Style::default().fg(theme.error),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Four rows of facet buttons, then the search/date/month/sort line.
pub fn render_facets(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let filter = app.session.filter();
    let facets = app.session.facets();

    let mut lines = vec![
        facet_line("Status", "s", &facets.status, filter.status.as_ref(), theme),
        facet_line("Category", "c", &facets.category, filter.category.as_ref(), theme),
        facet_line("Field", "f", &facets.field, filter.field.as_ref(), theme),
        facet_line("Task", "t", &facets.task, filter.task.as_ref(), theme),
    ];

    let mut query = Vec::new();
    if app.input_mode == InputMode::Search || !filter.search.is_empty() {
        let text = if app.input_mode == InputMode::Search {
            &app.search_buffer
        } else {
            &filter.search
        };
        query.push(Span::styled(
            " /",
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ));
        query.push(Span::styled(text.clone(), Style::default().fg(theme.text)));
        if app.input_mode == InputMode::Search {
            query.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        }
        query.push(Span::raw("  "));
    }
    if app.input_mode == InputMode::DateInput {
        query.push(Span::styled(
            " date: ",
            Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
        ));
        query.push(Span::styled(app.date_buffer.clone(), Style::default().fg(theme.text)));
        query.push(Span::styled("\u{2588}", Style::default().fg(theme.active)));
        query.push(Span::raw("  "));
    } else if let Some(range) = &filter.date_range {
        query.push(Span::styled(
            format!(" date: {range}  "),
            Style::default().fg(theme.text),
        ));
    }
    query.push(Span::styled(
        format!(" month: {}  ", app.session.month().label()),
        Style::default().fg(theme.dim),
    ));
    let arrow = match filter.sort {
        SortOrder::DateDesc => "\u{2193}",
        SortOrder::DateAsc => "\u{2191}",
    };
    query.push(Span::styled(
        format!(" sort: date {arrow} (o)"),
        Style::default().fg(theme.dim),
    ));
    lines.push(Line::from(query));

    f.render_widget(Paragraph::new(lines), area);
}

fn facet_line<'a, T: Display + PartialEq>(
    name: &'a str,
    key: &'a str,
    counts: &[FacetCount<T>],
    active: Option<&T>,
    theme: &Theme,
) -> Line<'a> {
    let mut spans = vec![Span::styled(
        format!(" {name:<9}({key}) "),
        Style::default().fg(theme.dim),
    )];
    for facet in counts {
        let is_active = facet.value.as_ref() == active;
        spans.push(Span::styled(
            format!(" {} {} ", facet.label(), facet.count),
            theme.facet_style(is_active),
        ));
    }
    Line::from(spans)
}

/// Rendered records plus a trailing "Loading more" row while the pager has
/// more to give.
pub fn render_table(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let rendered = app.session.rendered();
    let selection = app.session.selection();
    let title_width = (area.width as usize).saturating_sub(40);

    let header = Row::new(["", "Date", "Title", "Venue"].into_iter().map(|h| {
        Cell::from(h).style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
    }))
    .height(1);

    let mut rows: Vec<Row> = rendered
        .iter()
        .map(|paper| {
            let mark = if selection.contains(&paper.id) {
                Cell::from("[x]").style(Style::default().fg(theme.selected))
            } else {
                Cell::from("[ ]").style(Style::default().fg(theme.dim))
            };
            let venue = match paper.venue() {
                Some(v) => Cell::from(truncate(v, 18)).style(
                    Style::default().fg(theme.badge_color(VenueBadge::for_venue(v))),
                ),
                None => Cell::from("preprint").style(Style::default().fg(theme.preprint)),
            };
            Row::new(vec![
                mark,
                Cell::from(paper.published.clone()).style(Style::default().fg(theme.dim)),
                Cell::from(truncate(&paper.title, title_width)),
                venue,
            ])
        })
        .collect();

    if app.session.pager().has_more() {
        let remaining = app.session.results().len() - rendered.len();
        rows.push(Row::new(vec![
            Cell::from(""),
            Cell::from(""),
            Cell::from(format!(
                "{} Loading more\u{2026} ({remaining} remaining)",
                spinner_char(app.tick)
            ))
            .style(Style::default().fg(theme.spinner)),
            Cell::from(""),
        ]));
    }

    let widths = [
        Constraint::Length(3),
        Constraint::Length(10),
        Constraint::Min(20),
        Constraint::Length(18),
    ];

    let title = format!(
        " {} results \u{2022} {} shown \u{2022} {} selected ",
        app.session.results().len(),
        rendered.len(),
        selection.len()
    );
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(title),
        )
        .row_highlight_style(theme.highlight_style());

    let mut state = TableState::default()
        .with_offset(app.scroll_offset)
        .with_selected((!rendered.is_empty()).then_some(app.cursor));
    f.render_stateful_widget(table, area, &mut state);
}

pub fn render_footer(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;

    let line = if let Some(msg) = &app.status_message {
        Line::from(Span::styled(format!(" {msg}"), theme.footer_style()))
    } else {
        let hints: &[(&str, &str)] = match app.input_mode {
            InputMode::Search => &[("Enter", "keep"), ("Esc", "cancel")],
            InputMode::DateInput => &[("Enter", "apply (empty clears)"), ("Esc", "cancel")],
            InputMode::Normal | InputMode::ExportPath => &[
                ("Space", "select"),
                ("e", "export"),
                ("/", "search"),
                ("d", "dates"),
                ("m", "month"),
                ("?", "help"),
                ("q", "quit"),
            ],
        };
        let mut spans = Vec::new();
        for (key, desc) in hints {
            spans.push(Span::styled(
                format!(" {key}"),
                Style::default().fg(theme.active).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(format!(" {desc} "), theme.footer_style()));
        }
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), area);
}
