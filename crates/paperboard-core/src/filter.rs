//! Filter state and the pure filter/sort pass over the working set.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::taxonomy::{Category, ResearchField};
use crate::{CatalogError, Paper, PublicationStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            Self::DateDesc => Self::DateAsc,
            Self::DateAsc => Self::DateDesc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::DateDesc => "date-desc",
            Self::DateAsc => "date-asc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date-desc" | "desc" | "newest" => Some(Self::DateDesc),
            "date-asc" | "asc" | "oldest" => Some(Self::DateAsc),
            _ => None,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inclusive `[start, end]` range of ISO dates.
///
/// Both bounds are validated as calendar dates on construction; matching is a
/// plain string comparison against `published`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange {
    start: String,
    end: String,
}

impl DateRange {
    pub fn new(start: &str, end: &str) -> Result<Self, CatalogError> {
        let start = start.trim();
        let end = end.trim();
        let s = parse_date(start)?;
        let e = parse_date(end)?;
        if s > e {
            return Err(CatalogError::InvalidDate(format!("{start}..{end}")));
        }
        Ok(Self {
            start: start.to_string(),
            end: end.to_string(),
        })
    }

    /// Parse `YYYY-MM-DD..YYYY-MM-DD`.
    pub fn parse(s: &str) -> Result<Self, CatalogError> {
        let (start, end) = s
            .split_once("..")
            .ok_or_else(|| CatalogError::InvalidDate(s.to_string()))?;
        Self::new(start, end)
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn end(&self) -> &str {
        &self.end
    }

    pub fn contains(&self, published: &str) -> bool {
        published >= self.start.as_str() && published <= self.end.as_str()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, CatalogError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| CatalogError::InvalidDate(s.to_string()))
}

/// The seven orthogonal filter dimensions. `None` means "all".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub status: Option<PublicationStatus>,
    pub category: Option<Category>,
    pub field: Option<ResearchField>,
    pub task: Option<String>,
    pub date_range: Option<DateRange>,
    pub search: String,
    pub sort: SortOrder,
}

impl FilterState {
    /// Build a predicate for this state. The search term is lowered once here.
    pub(crate) fn predicate(&self) -> impl Fn(&Paper) -> bool + '_ {
        let needle = self.search.to_lowercase();
        move |p: &Paper| {
            self.date_range
                .as_ref()
                .is_none_or(|r| r.contains(&p.published))
                && self.status.is_none_or(|s| p.status() == s)
                && self
                    .category
                    .is_none_or(|c| p.categories.iter().any(|pc| pc == c.as_str()))
                && self.field.is_none_or(|f| p.field() == Some(f.as_str()))
                && self.task.as_deref().is_none_or(|t| p.task() == Some(t))
                && (needle.is_empty() || p.search_text().contains(&needle))
        }
    }

    /// Whether a single record passes every predicate.
    pub fn matches(&self, paper: &Paper) -> bool {
        (self.predicate())(paper)
    }

    /// Short human-readable summary of the active (non-"all") filters.
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if let Some(s) = self.status {
            parts.push(format!("status={s}"));
        }
        if let Some(c) = self.category {
            parts.push(format!("category={c}"));
        }
        if let Some(f) = self.field {
            parts.push(format!("field={f}"));
        }
        if let Some(t) = &self.task {
            parts.push(format!("task={t}"));
        }
        if let Some(r) = &self.date_range {
            parts.push(format!("date={r}"));
        }
        if !self.search.is_empty() {
            parts.push(format!("search={:?}", self.search));
        }
        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Filter `working` by `filter` and sort by publication date.
///
/// The sort is stable, so records with equal dates keep working-set order.
pub fn compute_results(working: &[Arc<Paper>], filter: &FilterState) -> Vec<Arc<Paper>> {
    let keep = filter.predicate();
    let mut results: Vec<Arc<Paper>> = working.iter().filter(|&p| keep(p)).cloned().collect();
    match filter.sort {
        SortOrder::DateDesc => results.sort_by(|a, b| b.published.cmp(&a.published)),
        SortOrder::DateAsc => results.sort_by(|a, b| a.published.cmp(&b.published)),
    }
    results
}
