use ratatui::style::{Color, Modifier, Style};

use paperboard_core::{PublicationStatus, VenueBadge};

/// Theme names in cycle order.
pub const THEMES: &[&str] = &["hacker", "modern"];

/// Color theme for the TUI.
pub struct Theme {
    pub published: Color,
    pub preprint: Color,
    pub ml_venue: Color,
    pub cv_venue: Color,
    pub nlp_venue: Color,
    pub ai_venue: Color,
    pub error: Color,

    pub header_fg: Color,
    pub header_bg: Color,
    pub border: Color,
    pub text: Color,
    pub dim: Color,
    pub highlight_bg: Color,
    pub active: Color,
    pub selected: Color,
    pub spinner: Color,
    pub footer_fg: Color,
    pub footer_bg: Color,
}

impl Theme {
    /// Look a theme up by name; unknown names fall back to `hacker`.
    pub fn named(name: &str) -> Self {
        match name {
            "modern" => Self::modern(),
            _ => Self::hacker(),
        }
    }

    /// Hacker-green terminal theme.
    pub fn hacker() -> Self {
        Self {
            published: Color::Rgb(0, 210, 0),
            preprint: Color::DarkGray,
            ml_venue: Color::Magenta,
            cv_venue: Color::Blue,
            nlp_venue: Color::Yellow,
            ai_venue: Color::Cyan,
            error: Color::Red,

            header_fg: Color::Black,
            header_bg: Color::Rgb(0, 210, 0),
            border: Color::DarkGray,
            text: Color::White,
            dim: Color::DarkGray,
            highlight_bg: Color::Rgb(30, 50, 30),
            active: Color::Cyan,
            selected: Color::Rgb(0, 210, 0),
            spinner: Color::Cyan,
            footer_fg: Color::DarkGray,
            footer_bg: Color::Reset,
        }
    }

    /// Modern theme: white text, electric blue accents, dark blue header.
    pub fn modern() -> Self {
        Self {
            published: Color::Rgb(0, 200, 80),
            preprint: Color::Rgb(120, 120, 140),
            ml_venue: Color::Rgb(200, 90, 230),
            cv_venue: Color::Rgb(60, 140, 255),
            nlp_venue: Color::Rgb(255, 200, 0),
            ai_venue: Color::Rgb(0, 200, 200),
            error: Color::Rgb(255, 80, 80),

            header_fg: Color::White,
            header_bg: Color::Rgb(30, 60, 120),
            border: Color::Rgb(60, 60, 80),
            text: Color::White,
            dim: Color::Rgb(120, 120, 140),
            highlight_bg: Color::Rgb(30, 40, 80),
            active: Color::Rgb(60, 140, 255),
            selected: Color::Rgb(0, 200, 80),
            spinner: Color::Rgb(60, 140, 255),
            footer_fg: Color::Rgb(120, 120, 140),
            footer_bg: Color::Reset,
        }
    }

    pub fn status_color(&self, status: PublicationStatus) -> Color {
        match status {
            PublicationStatus::Published => self.published,
            PublicationStatus::Preprint => self.preprint,
        }
    }

    pub fn badge_color(&self, badge: VenueBadge) -> Color {
        match badge {
            VenueBadge::Neurips | VenueBadge::Iclr | VenueBadge::Icml => self.ml_venue,
            VenueBadge::Cvpr | VenueBadge::Iccv | VenueBadge::Eccv => self.cv_venue,
            VenueBadge::Acl | VenueBadge::Emnlp | VenueBadge::Naacl => self.nlp_venue,
            VenueBadge::Aaai | VenueBadge::Ijcai => self.ai_venue,
            VenueBadge::Published => self.published,
        }
    }

    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header_fg)
            .bg(self.header_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default()
            .bg(self.highlight_bg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    pub fn footer_style(&self) -> Style {
        Style::default().fg(self.footer_fg).bg(self.footer_bg)
    }

    /// Style for an active facet button versus an idle one.
    pub fn facet_style(&self, active: bool) -> Style {
        if active {
            Style::default()
                .fg(self.header_fg)
                .bg(self.active)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text)
        }
    }
}
