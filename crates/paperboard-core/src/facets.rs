//! Per-dimension counts for the filter buttons.
//!
//! Each dimension is counted with its own predicate relaxed to "all" while
//! every other active predicate (search and date range included) still
//! applies. The count next to a button is therefore the number of results the
//! user would get by pressing it.

use std::fmt;
use std::sync::Arc;

use crate::filter::FilterState;
use crate::taxonomy::{Category, ResearchField};
use crate::{Paper, PublicationStatus};

/// One button: a value (or `None` for "all") and how many records it would show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetCount<T> {
    pub value: Option<T>,
    pub count: usize,
}

impl<T: fmt::Display> FacetCount<T> {
    pub fn label(&self) -> String {
        match &self.value {
            Some(v) => v.to_string(),
            None => "all".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetCounts {
    pub status: Vec<FacetCount<PublicationStatus>>,
    pub category: Vec<FacetCount<Category>>,
    pub field: Vec<FacetCount<ResearchField>>,
    pub task: Vec<FacetCount<String>>,
}

impl FacetCounts {
    pub fn status_count(&self, value: Option<PublicationStatus>) -> usize {
        lookup(&self.status, value.as_ref())
    }

    pub fn category_count(&self, value: Option<Category>) -> usize {
        lookup(&self.category, value.as_ref())
    }

    pub fn field_count(&self, value: Option<ResearchField>) -> usize {
        lookup(&self.field, value.as_ref())
    }

    pub fn task_count(&self, value: Option<&str>) -> usize {
        self.task
            .iter()
            .find(|f| f.value.as_deref() == value)
            .map_or(0, |f| f.count)
    }

    /// Task values offered for the current field, "all" excluded.
    pub fn task_values(&self) -> impl Iterator<Item = &str> {
        self.task.iter().filter_map(|f| f.value.as_deref())
    }
}

fn lookup<T: PartialEq>(counts: &[FacetCount<T>], value: Option<&T>) -> usize {
    counts
        .iter()
        .find(|f| f.value.as_ref() == value)
        .map_or(0, |f| f.count)
}

fn subset<'a>(working: &'a [Arc<Paper>], filter: &FilterState) -> Vec<&'a Paper> {
    let keep = filter.predicate();
    working.iter().map(|p| &**p).filter(|&p| keep(p)).collect()
}

pub fn compute_facets(working: &[Arc<Paper>], filter: &FilterState) -> FacetCounts {
    FacetCounts {
        status: status_facet(working, filter),
        category: category_facet(working, filter),
        field: field_facet(working, filter),
        task: task_facet(working, filter),
    }
}

fn status_facet(working: &[Arc<Paper>], filter: &FilterState) -> Vec<FacetCount<PublicationStatus>> {
    let relaxed = FilterState {
        status: None,
        ..filter.clone()
    };
    let papers = subset(working, &relaxed);
    let mut out = vec![FacetCount {
        value: None,
        count: papers.len(),
    }];
    out.extend(PublicationStatus::all().iter().map(|&s| FacetCount {
        value: Some(s),
        count: papers.iter().filter(|p| p.status() == s).count(),
    }));
    out
}

fn category_facet(working: &[Arc<Paper>], filter: &FilterState) -> Vec<FacetCount<Category>> {
    let relaxed = FilterState {
        category: None,
        ..filter.clone()
    };
    let papers = subset(working, &relaxed);
    let mut out = vec![FacetCount {
        value: None,
        count: papers.len(),
    }];
    out.extend(Category::all().iter().map(|&c| FacetCount {
        value: Some(c),
        count: papers
            .iter()
            .filter(|p| p.categories.iter().any(|pc| pc == c.as_str()))
            .count(),
    }));
    out
}

fn field_facet(working: &[Arc<Paper>], filter: &FilterState) -> Vec<FacetCount<ResearchField>> {
    let relaxed = FilterState {
        field: None,
        ..filter.clone()
    };
    let papers = subset(working, &relaxed);
    let mut out = vec![FacetCount {
        value: None,
        count: papers.len(),
    }];
    out.extend(ResearchField::all().iter().map(|&f| FacetCount {
        value: Some(f),
        count: papers.iter().filter(|p| p.field() == Some(f.as_str())).count(),
    }));
    out
}

/// With no field selected only "all" is offered. Otherwise the field's
/// predefined tasks come first, then any other task strings found in the data
/// in first-seen order. Records with no task only count toward "all".
fn task_facet(working: &[Arc<Paper>], filter: &FilterState) -> Vec<FacetCount<String>> {
    let relaxed = FilterState {
        task: None,
        ..filter.clone()
    };
    let papers = subset(working, &relaxed);
    let mut out = vec![FacetCount {
        value: None,
        count: papers.len(),
    }];
    let Some(field) = filter.field else {
        return out;
    };

    out.extend(field.tasks().iter().map(|t| FacetCount {
        value: Some(t.to_string()),
        count: 0,
    }));
    for task in papers.iter().filter_map(|p| p.task()) {
        match out.iter_mut().find(|f| f.value.as_deref() == Some(task)) {
            Some(entry) => entry.count += 1,
            None => out.push(FacetCount {
                value: Some(task.to_string()),
                count: 1,
            }),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::compute_results;

    fn paper(
        id: &str,
        conference: Option<&str>,
        category: &[&str],
        field: Option<&str>,
        task: Option<&str>,
    ) -> Arc<Paper> {
        Arc::new(Paper {
            id: id.into(),
            title: format!("Study {id}"),
            published: "2024-01-01".into(),
            conference: conference.map(String::from),
            categories: category.iter().map(|s| s.to_string()).collect(),
            field: field.map(String::from),
            task: task.map(String::from),
            ..Default::default()
        })
    }

    fn sample() -> Vec<Arc<Paper>> {
        vec![
            paper("1", Some("ICSE"), &["Empirical"], Some("AIOps"), Some("Log Parsing")),
            paper("2", None, &["Survey"], Some("AIOps"), Some("Log Anomaly Detection")),
            paper("3", None, &["Empirical", "Benchmark"], Some("Maintenance"), Some("Code Review")),
            paper("4", Some("FSE"), &[], Some("AIOps"), None),
            paper("5", None, &["Technical"], None, None),
        ]
    }

    #[test]
    fn unfiltered_counts() {
        let facets = compute_facets(&sample(), &FilterState::default());
        assert_eq!(facets.status_count(None), 5);
        assert_eq!(facets.status_count(Some(PublicationStatus::Published)), 2);
        assert_eq!(facets.status_count(Some(PublicationStatus::Preprint)), 3);
        assert_eq!(facets.category_count(Some(Category::Empirical)), 2);
        assert_eq!(facets.category_count(Some(Category::Survey)), 1);
        assert_eq!(facets.field_count(Some(ResearchField::AiOps)), 3);
        assert_eq!(facets.field.len(), 8);
        assert_eq!(facets.category.len(), 5);
    }

    #[test]
    fn task_facet_only_all_without_field() {
        let facets = compute_facets(&sample(), &FilterState::default());
        assert_eq!(facets.task.len(), 1);
        assert_eq!(facets.task_count(None), 5);
    }

    #[test]
    fn task_facet_lists_field_tasks_then_extras() {
        let filter = FilterState {
            field: Some(ResearchField::AiOps),
            ..Default::default()
        };
        let facets = compute_facets(&sample(), &filter);
        let values: Vec<&str> = facets.task_values().collect();
        assert_eq!(
            values,
            vec!["Log Statement Generation", "Log Parsing", "Log Anomaly Detection"]
        );
        assert_eq!(facets.task_count(None), 3);
        assert_eq!(facets.task_count(Some("Log Parsing")), 1);
        assert_eq!(facets.task_count(Some("Log Statement Generation")), 0);
        assert_eq!(facets.task_count(Some("Log Anomaly Detection")), 1);
    }

    #[test]
    fn own_dimension_is_relaxed_others_apply() {
        let filter = FilterState {
            status: Some(PublicationStatus::Preprint),
            category: Some(Category::Empirical),
            ..Default::default()
        };
        let facets = compute_facets(&sample(), &filter);
        // status counts ignore the status filter but honour category
        assert_eq!(facets.status_count(None), 2);
        assert_eq!(facets.status_count(Some(PublicationStatus::Published)), 1);
        assert_eq!(facets.status_count(Some(PublicationStatus::Preprint)), 1);
        // category counts ignore category but honour status
        assert_eq!(facets.category_count(None), 3);
        assert_eq!(facets.category_count(Some(Category::Survey)), 1);
    }

    #[test]
    fn selected_value_count_equals_result_length() {
        let working = sample();
        let filter = FilterState {
            status: Some(PublicationStatus::Preprint),
            field: Some(ResearchField::AiOps),
            search: "study".into(),
            ..Default::default()
        };
        let results = compute_results(&working, &filter);
        let facets = compute_facets(&working, &filter);
        assert_eq!(facets.status_count(filter.status), results.len());
        assert_eq!(facets.field_count(filter.field), results.len());
        assert_eq!(facets.task_count(None), results.len());
    }

    #[test]
    fn search_narrows_every_facet() {
        let filter = FilterState {
            search: "study 3".into(),
            ..Default::default()
        };
        let facets = compute_facets(&sample(), &filter);
        assert_eq!(facets.status_count(None), 1);
        assert_eq!(facets.field_count(Some(ResearchField::Maintenance)), 1);
        assert_eq!(facets.field_count(Some(ResearchField::AiOps)), 0);
    }
}
