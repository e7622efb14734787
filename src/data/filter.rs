use std::collections::BTreeSet;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::model::{CategoryColumn, Dataset, Listing};

// ---------------------------------------------------------------------------
// Selection: which values of one categorical column pass
// ---------------------------------------------------------------------------

/// Multi-valued predicate over one categorical column.
///
/// `All` means "no constraint". A `Subset` passes rows whose value is one of
/// its members; an empty subset is never allowed to hide everything and
/// behaves like `All`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    All,
    Subset(BTreeSet<String>),
}

impl Selection {
    /// Interpret the values picked in a multi-select widget. Picking nothing
    /// selects everything.
    pub fn from_multiselect<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        if set.is_empty() {
            Selection::All
        } else {
            Selection::Subset(set)
        }
    }

    pub fn is_all(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Subset(set) => set.is_empty(),
        }
    }

    pub fn matches(&self, value: &str) -> bool {
        match self {
            Selection::All => true,
            Selection::Subset(set) => set.is_empty() || set.contains(value),
        }
    }

    /// Drop values the dataset never contains. A subset left empty becomes
    /// `All`; a subset covering every distinct value also becomes `All`.
    fn normalized(&self, dataset: &Dataset, column: CategoryColumn) -> Selection {
        let Selection::Subset(set) = self else {
            return Selection::All;
        };
        let (known, unknown): (BTreeSet<String>, BTreeSet<String>) = set
            .iter()
            .cloned()
            .partition(|v| dataset.contains_value(column, v));
        if !unknown.is_empty() {
            warn!("ignoring unknown {column} values: {unknown:?}");
        }
        if known.is_empty() || known.len() == dataset.distinct(column).len() {
            Selection::All
        } else {
            Selection::Subset(known)
        }
    }
}

// ---------------------------------------------------------------------------
// Bounds: inclusive two-ended range
// ---------------------------------------------------------------------------

/// Inclusive range; a missing end is unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: T, max: T) -> Self {
        Bounds {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn unbounded() -> Self {
        Bounds {
            min: None,
            max: None,
        }
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |lo| value >= lo) && self.max.map_or(true, |hi| value <= hi)
    }

    /// Swap reversed ends, and drop ends that do not compare (NaN).
    fn normalized(&self) -> Bounds<T> {
        let comparable = |v: T| v.partial_cmp(&v).is_some();
        let min = self.min.filter(|v| comparable(*v));
        let max = self.max.filter(|v| comparable(*v));
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => Bounds {
                min: Some(hi),
                max: Some(lo),
            },
            _ => Bounds { min, max },
        }
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria: all predicates of one interaction
// ---------------------------------------------------------------------------

/// The user-chosen predicates narrowing a dataset. AND across fields, OR
/// within a [`Selection`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterCriteria {
    pub brands: Selection,
    pub transmissions: Selection,
    pub fuels: Selection,
    pub years: Bounds<i32>,
    pub prices: Bounds<f64>,
}

impl FilterCriteria {
    pub fn with_brands<I, S>(mut self, brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brands = Selection::from_multiselect(brands);
        self
    }

    pub fn with_transmissions<I, S>(mut self, transmissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.transmissions = Selection::from_multiselect(transmissions);
        self
    }

    pub fn with_fuels<I, S>(mut self, fuels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fuels = Selection::from_multiselect(fuels);
        self
    }

    pub fn with_year_range(mut self, min: i32, max: i32) -> Self {
        self.years = Bounds::new(min, max);
        self
    }

    pub fn with_price_range(mut self, min: f64, max: f64) -> Self {
        self.prices = Bounds::new(min, max);
        self
    }

    /// The selection constraining `column`, if that column is filterable.
    pub fn selection_mut(&mut self, column: CategoryColumn) -> Option<&mut Selection> {
        match column {
            CategoryColumn::Brand => Some(&mut self.brands),
            CategoryColumn::Transmission => Some(&mut self.transmissions),
            CategoryColumn::FuelType => Some(&mut self.fuels),
            CategoryColumn::Model | CategoryColumn::Condition => None,
        }
    }

    /// Rewrite criteria so they only refer to things the dataset has:
    /// reversed ranges are swapped and unknown category values ignored.
    pub fn normalized(&self, dataset: &Dataset) -> FilterCriteria {
        let years = self.years.normalized();
        let prices = self.prices.normalized();
        if years != self.years || prices.min != self.prices.min || prices.max != self.prices.max {
            warn!("normalized filter ranges: years {years:?}, prices {prices:?}");
        }
        FilterCriteria {
            brands: self.brands.normalized(dataset, CategoryColumn::Brand),
            transmissions: self
                .transmissions
                .normalized(dataset, CategoryColumn::Transmission),
            fuels: self.fuels.normalized(dataset, CategoryColumn::FuelType),
            years,
            prices,
        }
    }

    /// Whether a single listing passes every predicate.
    pub fn matches(&self, listing: &Listing) -> bool {
        self.brands.matches(&listing.brand)
            && self.transmissions.matches(&listing.transmission)
            && self.fuels.matches(&listing.fuel_type)
            && self.years.contains(listing.year)
            && self.prices.contains(listing.price)
    }
}

// ---------------------------------------------------------------------------
// FilteredView: rows of a dataset passing the criteria
// ---------------------------------------------------------------------------

/// The subsequence of a dataset's rows that pass a [`FilterCriteria`],
/// in dataset order.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// A view over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        FilteredView {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    pub(crate) fn from_indices(dataset: &'a Dataset, indices: Vec<usize>) -> Self {
        FilteredView { dataset, indices }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Positions of the visible rows within the dataset.
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Listing> + '_ {
        let listings = self.dataset.listings();
        self.indices.iter().map(move |&i| &listings[i])
    }

    /// Owned copies of the visible rows (the raw-table toggle).
    pub fn to_listings(&self) -> Vec<Listing> {
        self.iter().cloned().collect()
    }
}

/// Return indices of listings that pass all predicates of already
/// normalized criteria.
pub fn filtered_indices(dataset: &Dataset, criteria: &FilterCriteria) -> Vec<usize> {
    dataset
        .listings()
        .iter()
        .enumerate()
        .filter(|(_, listing)| criteria.matches(listing))
        .map(|(i, _)| i)
        .collect()
}

/// Derive the filtered view of `dataset` under `criteria`. Pure: the same
/// inputs always give the same rows, and an empty result is a valid view.
pub fn filter<'a>(dataset: &'a Dataset, criteria: &FilterCriteria) -> FilteredView<'a> {
    let criteria = criteria.normalized(dataset);
    let indices = filtered_indices(dataset, &criteria);
    debug!("filter kept {} of {} listings", indices.len(), dataset.len());
    FilteredView::from_indices(dataset, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(brand: &str, transmission: &str, fuel: &str, year: i32, price: f64) -> Listing {
        Listing {
            brand: brand.to_string(),
            model: None,
            year,
            engine_size: 2.0,
            fuel_type: fuel.to_string(),
            transmission: transmission.to_string(),
            mileage: 50_000,
            condition: None,
            price,
        }
    }

    fn dataset() -> Dataset {
        Dataset::from_listings(vec![
            listing("Toyota", "Automatic", "Hybrid", 2015, 15_000.0),
            listing("Ford", "Manual", "Petrol", 2010, 8_000.0),
            listing("BMW", "Automatic", "Diesel", 2020, 40_000.0),
            listing("Toyota", "Manual", "Petrol", 2021, 22_000.0),
        ])
    }

    #[test]
    fn empty_multiselect_is_all() {
        assert_eq!(Selection::from_multiselect(Vec::<String>::new()), Selection::All);
        assert!(Selection::Subset(BTreeSet::new()).matches("anything"));
    }

    #[test]
    fn default_criteria_keep_everything() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default());
        assert_eq!(view.indices(), &[0, 1, 2, 3]);
    }

    #[test]
    fn and_across_fields_or_within() {
        let ds = dataset();
        let criteria = FilterCriteria::default()
            .with_brands(["Toyota", "BMW"])
            .with_transmissions(["Automatic"]);
        let view = filter(&ds, &criteria);
        assert_eq!(view.indices(), &[0, 2]);
    }

    #[test]
    fn year_bounds_are_inclusive() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default().with_year_range(2015, 2020));
        assert_eq!(view.indices(), &[0, 2]);
        let view = filter(&ds, &FilterCriteria::default().with_year_range(2016, 2019));
        assert!(view.is_empty());
    }

    #[test]
    fn price_bounds_are_inclusive() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default().with_price_range(15_000.0, 22_000.0));
        assert_eq!(view.indices(), &[0, 3]);
        let view = filter(&ds, &FilterCriteria::default().with_price_range(15_001.0, 21_999.0));
        assert!(view.is_empty());
        let view = filter(&ds, &FilterCriteria::default().with_price_range(14_999.0, 22_001.0));
        assert_eq!(view.indices(), &[0, 3]);
    }

    #[test]
    fn reversed_range_is_swapped() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default().with_price_range(20_000.0, 5_000.0));
        assert_eq!(view.indices(), &[0, 1]);
    }

    #[test]
    fn nan_price_bound_is_ignored() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default().with_price_range(f64::NAN, 10_000.0));
        assert_eq!(view.indices(), &[1]);
    }

    #[test]
    fn unknown_categories_are_ignored() {
        let ds = dataset();
        let only_unknown = FilterCriteria::default().with_brands(["Tesla"]);
        assert_eq!(filter(&ds, &only_unknown).len(), 4);

        let mixed = FilterCriteria::default().with_brands(["Tesla", "Ford"]);
        assert_eq!(filter(&ds, &mixed).indices(), &[1]);
    }

    #[test]
    fn normalization_collapses_full_subset() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_fuels(["Hybrid", "Petrol", "Diesel"]);
        assert_eq!(criteria.normalized(&ds).fuels, Selection::All);
    }

    #[test]
    fn empty_view_is_valid() {
        let ds = dataset();
        let view = filter(&ds, &FilterCriteria::default().with_price_range(1.0, 2.0));
        assert!(view.is_empty());
        assert_eq!(view.iter().count(), 0);
    }
}
