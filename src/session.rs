use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};

use crate::data::filter::{filter, Bounds, FilterCriteria, FilteredView, Selection};
use crate::data::model::{CategoryColumn, Dataset};
use crate::error::EmptyViewError;
use crate::report::{build_report, DashboardReport};
use crate::stats::{summarize, AggregateSummary};

// ---------------------------------------------------------------------------
// Interaction state
// ---------------------------------------------------------------------------

/// One user's dashboard state, independent of rendering.
///
/// Every mutation recomputes the visible rows and the summary exactly once,
/// so readers always see results consistent with the current criteria.
#[derive(Debug, Clone)]
pub struct Session {
    dataset: Arc<Dataset>,

    /// Current predicates, as chosen by the user.
    criteria: FilterCriteria,

    /// Indices of listings passing the current criteria (cached).
    visible_indices: Vec<usize>,

    summary: Result<AggregateSummary, EmptyViewError>,

    /// Whether the raw filtered rows are part of the report.
    show_raw_table: bool,
}

impl Session {
    /// Open a session showing every listing.
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_criteria(dataset, FilterCriteria::default())
    }

    pub fn with_criteria(dataset: Arc<Dataset>, criteria: FilterCriteria) -> Self {
        let mut session = Self {
            dataset,
            criteria,
            visible_indices: Vec::new(),
            summary: Err(EmptyViewError {
                rows: 0,
                required: 1,
            }),
            show_raw_table: false,
        };
        session.refilter();
        session
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    /// Recompute `visible_indices` and the summary after a criteria change.
    fn refilter(&mut self) {
        let view = filter(&self.dataset, &self.criteria);
        self.summary = summarize(&view);
        self.visible_indices = view.indices().to_vec();
        debug!(
            "session shows {} of {} listings",
            self.visible_indices.len(),
            self.dataset.len()
        );
    }

    /// Replace every predicate at once.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
        self.refilter();
    }

    /// Multi-select semantics: an empty pick selects every brand.
    pub fn set_brands<I, S>(&mut self, brands: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.brands = Selection::from_multiselect(brands);
        self.refilter();
    }

    pub fn set_transmissions<I, S>(&mut self, transmissions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.transmissions = Selection::from_multiselect(transmissions);
        self.refilter();
    }

    pub fn set_fuels<I, S>(&mut self, fuels: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.criteria.fuels = Selection::from_multiselect(fuels);
        self.refilter();
    }

    /// Toggle a single value in a column's selection. Deselecting the last
    /// value falls back to selecting everything.
    pub fn toggle_value(&mut self, column: CategoryColumn, value: &str) {
        let all_values = self.dataset.distinct(column);
        let Some(selection) = self.criteria.selection_mut(column) else {
            warn!("{column} is not a filterable column");
            return;
        };

        let mut selected: BTreeSet<String> = match selection {
            Selection::Subset(set) if !set.is_empty() => set.clone(),
            _ => all_values,
        };
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
        *selection = Selection::from_multiselect(selected);
        self.refilter();
    }

    pub fn toggle_brand(&mut self, brand: &str) {
        self.toggle_value(CategoryColumn::Brand, brand);
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: CategoryColumn) {
        match self.criteria.selection_mut(column) {
            Some(selection) => {
                *selection = Selection::All;
                self.refilter();
            }
            None => warn!("{column} is not a filterable column"),
        }
    }

    pub fn set_year_range(&mut self, min: i32, max: i32) {
        self.criteria.years = Bounds::new(min, max);
        self.refilter();
    }

    pub fn set_price_range(&mut self, min: f64, max: f64) {
        self.criteria.prices = Bounds::new(min, max);
        self.refilter();
    }

    /// Drop both range constraints.
    pub fn clear_ranges(&mut self) {
        self.criteria.years = Bounds::unbounded();
        self.criteria.prices = Bounds::unbounded();
        self.refilter();
    }

    pub fn set_show_raw_table(&mut self, show: bool) {
        self.show_raw_table = show;
    }

    pub fn show_raw_table(&self) -> bool {
        self.show_raw_table
    }

    pub fn visible_count(&self) -> usize {
        self.visible_indices.len()
    }

    pub fn view(&self) -> FilteredView<'_> {
        FilteredView::from_indices(&self.dataset, self.visible_indices.clone())
    }

    pub fn summary(&self) -> Result<AggregateSummary, EmptyViewError> {
        self.summary
    }

    /// Everything the presentation layer needs for the current state.
    pub fn report(&self) -> DashboardReport {
        build_report(&self.view(), &self.criteria, self.show_raw_table)
    }
}
