//! Serialisable snapshot of everything a dashboard draws.
//!
//! The presentation layer owns charts and widgets; it receives one
//! [`DashboardReport`] per interaction, typically as JSON.

use serde::{Deserialize, Serialize};

use crate::data::filter::{FilterCriteria, FilteredView};
use crate::data::model::{CategoryColumn, Listing, NumericColumn};
use crate::error::EmptyViewError;
use crate::stats::{
    correlate, group_mean, group_mean_price_by_brand, summarize, value_counts, AggregateSummary,
    Correlation, GroupKey, GroupMean, GroupOrder, ValueCount,
};

/// An aggregate, or an explicit "no data" marker when the view was too
/// small to compute it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Section<T> {
    Ready(T),
    NoData { rows: usize, required: usize },
}

impl<T> Section<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Section::Ready(v) => Some(v),
            Section::NoData { .. } => None,
        }
    }
}

impl<T> From<Result<T, EmptyViewError>> for Section<T> {
    fn from(result: Result<T, EmptyViewError>) -> Self {
        match result {
            Ok(v) => Section::Ready(v),
            Err(EmptyViewError { rows, required }) => Section::NoData { rows, required },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardReport {
    pub total_listings: usize,
    pub filtered_listings: usize,
    pub criteria: FilterCriteria,
    pub summary: Section<AggregateSummary>,
    /// Cheapest brand first.
    pub price_by_brand: Section<Vec<GroupMean>>,
    /// Ascending model year, for the price trend line.
    pub price_by_year: Section<Vec<GroupMean>>,
    pub transmission_counts: Vec<ValueCount>,
    /// Correlation of every numeric column with price, strongest first.
    pub price_correlations: Section<Vec<Correlation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<Listing>>,
}

impl DashboardReport {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Compute every aggregate for `view`. `include_rows` adds the raw
/// filtered table.
pub fn build_report(
    view: &FilteredView<'_>,
    criteria: &FilterCriteria,
    include_rows: bool,
) -> DashboardReport {
    DashboardReport {
        total_listings: view.dataset().len(),
        filtered_listings: view.len(),
        criteria: criteria.clone(),
        summary: summarize(view).into(),
        price_by_brand: group_mean_price_by_brand(view, GroupOrder::AscendingMean).into(),
        price_by_year: group_mean(view, GroupKey::Year, NumericColumn::Price, GroupOrder::Key)
            .into(),
        transmission_counts: value_counts(view, CategoryColumn::Transmission),
        price_correlations: correlate(view, &NumericColumn::ALL)
            .map(|m| m.ranked_against(NumericColumn::Price))
            .into(),
        rows: include_rows.then(|| view.to_listings()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::data::filter::filter;
    use crate::data::model::Dataset;

    fn dataset() -> Dataset {
        let rows = [
            ("Toyota", 2016, 12_000.0),
            ("Toyota", 2019, 18_000.0),
            ("BMW", 2020, 35_000.0),
        ];
        Dataset::from_listings(
            rows.iter()
                .map(|&(brand, year, price)| Listing {
                    brand: brand.to_string(),
                    model: None,
                    year,
                    engine_size: 2.0,
                    fuel_type: "Petrol".to_string(),
                    transmission: "Automatic".to_string(),
                    mileage: 30_000,
                    condition: None,
                    price,
                })
                .collect(),
        )
    }

    #[test]
    fn full_view_report() {
        let ds = dataset();
        let criteria = FilterCriteria::default();
        let report = build_report(&filter(&ds, &criteria), &criteria, false);
        assert_eq!(report.total_listings, 3);
        assert_eq!(report.filtered_listings, 3);
        assert_eq!(report.summary.ready().unwrap().mean_price, 65_000.0 / 3.0);
        let brands: Vec<&str> = report
            .price_by_brand
            .ready()
            .unwrap()
            .iter()
            .map(|g| g.key.as_str())
            .collect();
        assert_eq!(brands, vec!["Toyota", "BMW"]);
        assert!(report.rows.is_none());
    }

    #[test]
    fn single_row_has_summary_but_no_correlation() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_brands(["BMW"]);
        let report = build_report(&filter(&ds, &criteria), &criteria, true);
        assert!(report.summary.ready().is_some());
        assert_eq!(
            report.price_correlations,
            Section::NoData {
                rows: 1,
                required: 2
            }
        );
        assert_eq!(report.rows.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn no_data_serialises_explicitly() {
        let ds = dataset();
        let criteria = FilterCriteria::default().with_year_range(1950, 1960);
        let report = build_report(&filter(&ds, &criteria), &criteria, false);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value["summary"],
            json!({"status": "no_data", "data": {"rows": 0, "required": 1}})
        );
        assert_eq!(value["transmission_counts"], json!([]));
        assert!(value.get("rows").is_none());
    }
}
