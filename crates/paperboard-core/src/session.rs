//! The single controller tying store, filters, pager and selection together.
//!
//! Every filter mutation re-runs the filter engine, recomputes facet counts,
//! resets the pager and renders the first batch.

use std::sync::Arc;

use crate::bibtex::{self, ExportError, Selection};
use crate::facets::{FacetCounts, compute_facets};
use crate::filter::{DateRange, FilterState, SortOrder, compute_results};
use crate::pager::{Batch, Pager, Sentinel};
use crate::source::ShardSource;
use crate::store::{CatalogStore, LoadReport, MonthSelection};
use crate::taxonomy::{Category, ResearchField};
use crate::{CatalogError, Paper, PublicationStatus};

pub struct Session {
    store: CatalogStore,
    filter: FilterState,
    results: Vec<Arc<Paper>>,
    facets: FacetCounts,
    pager: Pager,
    selection: Selection,
    month: MonthSelection,
}

impl Session {
    pub fn new(store: CatalogStore, pager: Pager) -> Self {
        Self {
            store,
            filter: FilterState::default(),
            results: Vec::new(),
            facets: FacetCounts::default(),
            pager,
            selection: Selection::new(),
            month: MonthSelection::All,
        }
    }

    /// Load the index and every month, then render the first batch.
    pub async fn open(source: Arc<dyn ShardSource>, pager: Pager) -> (Self, LoadReport) {
        let mut session = Self::new(CatalogStore::new(source), pager);
        session.store.load_index().await;
        let report = session.store.load_all().await;
        session.refresh();
        (session, report)
    }

    // ── accessors ──────────────────────────────────────────────────────

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut CatalogStore {
        &mut self.store
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn results(&self) -> &[Arc<Paper>] {
        &self.results
    }

    /// The prefix of `results` rendered so far.
    pub fn rendered(&self) -> &[Arc<Paper>] {
        &self.results[..self.pager.cursor().min(self.results.len())]
    }

    pub fn facets(&self) -> &FacetCounts {
        &self.facets
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn month(&self) -> &MonthSelection {
        &self.month
    }

    // ── filter mutators ────────────────────────────────────────────────

    pub fn set_status(&mut self, status: Option<PublicationStatus>) {
        self.filter.status = status;
        self.refresh();
    }

    pub fn set_category(&mut self, category: Option<Category>) {
        self.filter.category = category;
        self.refresh();
    }

    /// Changing the field always resets the task to "all".
    pub fn set_field(&mut self, field: Option<ResearchField>) {
        self.filter.field = field;
        self.filter.task = None;
        self.refresh();
    }

    pub fn set_task(&mut self, task: Option<String>) {
        self.filter.task = task.filter(|t| !t.is_empty());
        self.refresh();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.filter.search = search.into();
        self.refresh();
    }

    pub fn set_sort(&mut self, sort: SortOrder) {
        self.filter.sort = sort;
        self.refresh();
    }

    /// Set or clear the date range. Setting one fetches every missing month
    /// it overlaps and switches the working set to all cached months.
    pub async fn set_date_range(
        &mut self,
        range: Option<DateRange>,
    ) -> Result<LoadReport, CatalogError> {
        let report = match &range {
            Some(r) => {
                let report = self.store.ensure_range(r.start(), r.end()).await?;
                self.month = MonthSelection::All;
                report
            }
            None => LoadReport::default(),
        };
        self.filter.date_range = range;
        self.refresh();
        Ok(report)
    }

    /// Like [`set_date_range`](Self::set_date_range) but without fetching:
    /// returns the months the host must fetch and feed back through
    /// [`apply_loaded_month`](Self::apply_loaded_month).
    pub fn set_date_range_deferred(
        &mut self,
        range: Option<DateRange>,
    ) -> Result<Vec<String>, CatalogError> {
        let missing = match &range {
            Some(r) => {
                let missing = self.store.missing_months(r.start(), r.end())?;
                self.month = MonthSelection::All;
                self.store.rebuild_working_set();
                missing
            }
            None => Vec::new(),
        };
        self.filter.date_range = range;
        self.refresh();
        Ok(missing)
    }

    pub async fn select_month(
        &mut self,
        selection: MonthSelection,
    ) -> Result<LoadReport, CatalogError> {
        let report = self.store.select(&selection).await?;
        self.month = selection;
        self.refresh();
        Ok(report)
    }

    /// Switch month mode using only cached shards; returns the months the
    /// host must fetch.
    pub fn select_month_deferred(&mut self, selection: MonthSelection) -> Vec<String> {
        let missing = match &selection {
            MonthSelection::All => {
                self.store.rebuild_working_set();
                self.store.missing_index_months()
            }
            MonthSelection::Month(m) => {
                self.store.focus_month(m);
                if self.store.is_cached(m) {
                    Vec::new()
                } else {
                    vec![m.clone()]
                }
            }
        };
        self.month = selection;
        self.refresh();
        missing
    }

    /// Cache a shard fetched by the host and fold it into the working set
    /// according to the current month mode.
    pub fn apply_loaded_month(&mut self, month: &str, papers: Vec<Paper>) {
        if !self.store.insert_shard(month, papers) {
            return;
        }
        match &self.month {
            MonthSelection::All => self.store.rebuild_working_set(),
            MonthSelection::Month(m) if m == month => self.store.focus_month(month),
            MonthSelection::Month(_) => return,
        }
        self.refresh();
    }

    /// Install a month index fetched by the host and return the months the
    /// current month mode still needs.
    pub fn apply_index(&mut self, months: Vec<String>) -> Vec<String> {
        self.store.set_index(months);
        let selection = self.month.clone();
        self.select_month_deferred(selection)
    }

    /// Recompute results and facets, reset the pager and render the first batch.
    pub fn refresh(&mut self) -> Option<Batch> {
        let working = self.store.working_set();
        self.results = compute_results(working, &self.filter);
        self.facets = compute_facets(working, &self.filter);
        self.pager.reset(self.results.len());
        tracing::debug!(
            working = working.len(),
            results = self.results.len(),
            filters = %self.filter.describe(),
            "refreshed results"
        );
        self.pager.load_more()
    }

    // ── incremental rendering ──────────────────────────────────────────

    pub fn load_more(&mut self) -> Option<Batch> {
        self.pager.load_more()
    }

    pub fn on_visible(&mut self, sentinel: Sentinel) -> Option<Batch> {
        self.pager.on_visible(sentinel)
    }

    // ── selection & export ─────────────────────────────────────────────

    pub fn toggle(&mut self, id: &str) -> bool {
        self.selection.toggle(id)
    }

    /// Check `id`; a no-op if it is already checked.
    pub fn select(&mut self, id: &str) {
        self.selection.insert(id);
    }

    /// Check every rendered record. Records not rendered yet stay as they are.
    pub fn select_rendered(&mut self) -> usize {
        let ids: Vec<String> = self.rendered().iter().map(|p| p.id.clone()).collect();
        for id in &ids {
            self.selection.insert(id);
        }
        ids.len()
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// BibTeX for every selected record in the full catalog, regardless of
    /// the current filters.
    pub fn export_bibtex(&self) -> Result<String, ExportError> {
        let catalog = self.store.catalog();
        bibtex::export_bibtex(catalog.iter().map(|p| &**p), &self.selection)
    }

    /// Find a record anywhere in the cached catalog.
    pub fn find(&self, id: &str) -> Option<Arc<Paper>> {
        self.store.catalog().into_iter().find(|p| p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSource;

    fn paper(id: &str, published: &str, field: Option<&str>, task: Option<&str>) -> Paper {
        Paper {
            id: id.into(),
            title: format!("Paper {id}"),
            published: published.into(),
            field: field.map(String::from),
            task: task.map(String::from),
            ..Default::default()
        }
    }

    fn session_with(papers: Vec<Paper>) -> Session {
        let mut store = CatalogStore::new(Arc::new(MockSource::new()));
        store.insert_shard("2024-01", papers);
        store.rebuild_working_set();
        let mut session = Session::new(store, Pager::default());
        session.refresh();
        session
    }

    fn many(n: usize) -> Vec<Paper> {
        (0..n)
            .map(|i| paper(&format!("p{i:03}"), "2024-01-01", None, None))
            .collect()
    }

    #[test]
    fn refresh_renders_first_batch() {
        let session = session_with(many(45));
        assert_eq!(session.results().len(), 45);
        assert_eq!(session.rendered().len(), 20);
        assert!(session.pager().sentinel().is_some());
    }

    #[test]
    fn mutation_resets_render_cursor() {
        let mut session = session_with(many(45));
        session.load_more();
        assert_eq!(session.rendered().len(), 30);
        session.set_sort(SortOrder::DateAsc);
        assert_eq!(session.rendered().len(), 20);
    }

    #[test]
    fn set_field_resets_task() {
        let mut session = session_with(vec![
            paper("1", "2024-01-01", Some("AIOps"), Some("Log Parsing")),
            paper("2", "2024-01-02", Some("AIOps"), None),
        ]);
        session.set_field(Some(ResearchField::AiOps));
        session.set_task(Some("Log Parsing".into()));
        assert_eq!(session.results().len(), 1);

        session.set_field(Some(ResearchField::Maintenance));
        assert!(session.filter().task.is_none());
        session.set_field(Some(ResearchField::AiOps));
        assert_eq!(session.results().len(), 2);
    }

    #[test]
    fn select_rendered_only_checks_rendered_records() {
        let mut session = session_with(many(25));
        assert_eq!(session.select_rendered(), 20);
        assert_eq!(session.selection().len(), 20);
        assert!(!session.selection().contains("p024"));
        session.clear_selection();
        assert!(session.selection().is_empty());
    }

    #[test]
    fn select_is_idempotent() {
        let mut session = session_with(many(3));
        session.select("p001");
        session.select("p001");
        assert!(session.selection().contains("p001"));
        assert_eq!(session.selection().len(), 1);
        assert!(session.export_bibtex().unwrap().contains("@article{p001,"));
    }

    #[test]
    fn export_ignores_current_filters() {
        let mut session = session_with(vec![
            paper("keep", "2024-01-01", None, None),
            paper("hidden", "2024-01-02", None, None),
        ]);
        session.toggle("hidden");
        session.set_search("Paper keep");
        assert_eq!(session.results().len(), 1);

        let bib = session.export_bibtex().unwrap();
        assert!(bib.contains("@article{hidden,"));
    }

    #[test]
    fn export_empty_selection_fails() {
        let session = session_with(many(3));
        assert!(matches!(
            session.export_bibtex(),
            Err(ExportError::EmptySelection)
        ));
    }

    #[test]
    fn stale_sentinel_after_refresh_is_ignored() {
        let mut session = session_with(many(45));
        let old = session.pager().sentinel().unwrap();
        session.set_search("paper");
        assert!(session.on_visible(old).is_none());
        let fresh = session.pager().sentinel().unwrap();
        assert!(session.on_visible(fresh).is_some());
        assert_eq!(session.rendered().len(), 30);
    }

    #[test]
    fn deferred_month_selection_and_apply() {
        let mut session = session_with(many(2));
        let missing = session.select_month_deferred(MonthSelection::Month("2024-02".into()));
        assert_eq!(missing, vec!["2024-02"]);
        assert!(session.results().is_empty());

        session.apply_loaded_month("2024-02", vec![paper("feb", "2024-02-01", None, None)]);
        assert_eq!(session.results().len(), 1);

        // a month outside the focused one is cached but not shown
        session.apply_loaded_month("2024-03", vec![paper("mar", "2024-03-01", None, None)]);
        assert_eq!(session.results().len(), 1);

        session.select_month_deferred(MonthSelection::All);
        assert_eq!(session.results().len(), 4);
    }

    #[test]
    fn apply_index_reports_uncached_months() {
        let mut session = session_with(many(2));
        let missing = session.apply_index(vec!["2024-02".into(), "2024-01".into()]);
        assert_eq!(missing, vec!["2024-02"]);
        assert_eq!(session.store().index(), ["2024-02", "2024-01"]);
        assert_eq!(session.results().len(), 2);
    }
}
