use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::summary::require_rows;
use crate::data::filter::FilteredView;
use crate::data::model::{CategoryColumn, Listing, NumericColumn};
use crate::error::EmptyViewError;

// ---------------------------------------------------------------------------
// Grouping keys and ordering
// ---------------------------------------------------------------------------

/// What to partition a view by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Category(CategoryColumn),
    Year,
}

/// Order of the returned partitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOrder {
    /// Lowest mean first (ranking charts). Ties keep insertion order.
    #[default]
    AscendingMean,
    /// Order in which each key first appears in the view.
    Insertion,
    /// By key: lexicographic for categories, numeric for years.
    Key,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum KeyValue {
    Year(i32),
    Text(String),
}

impl KeyValue {
    fn of(listing: &Listing, key: GroupKey) -> Option<KeyValue> {
        match key {
            GroupKey::Year => Some(KeyValue::Year(listing.year)),
            GroupKey::Category(column) => listing
                .category(column)
                .map(|v| KeyValue::Text(v.to_string())),
        }
    }

    fn into_label(self) -> String {
        match self {
            KeyValue::Year(y) => y.to_string(),
            KeyValue::Text(s) => s,
        }
    }
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Mean of one numeric column within one partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub key: String,
    pub mean: f64,
    pub count: usize,
}

/// Partition `view` by `key` and average `value` in each partition.
///
/// Rows without a value for `key` (an absent optional column) are skipped.
pub fn group_mean(
    view: &FilteredView<'_>,
    key: GroupKey,
    value: NumericColumn,
    order: GroupOrder,
) -> Result<Vec<GroupMean>, EmptyViewError> {
    require_rows(view, 1)?;

    let mut slots: HashMap<KeyValue, usize> = HashMap::new();
    let mut groups: Vec<(KeyValue, f64, usize)> = Vec::new();
    for listing in view.iter() {
        let Some(k) = KeyValue::of(listing, key) else {
            continue;
        };
        let slot = *slots.entry(k.clone()).or_insert_with(|| {
            groups.push((k, 0.0, 0));
            groups.len() - 1
        });
        let (_, sum, count) = &mut groups[slot];
        *sum += listing.numeric(value);
        *count += 1;
    }

    let mut means: Vec<(KeyValue, GroupMean)> = groups
        .into_iter()
        .map(|(k, sum, count)| {
            let mean = GroupMean {
                key: String::new(),
                mean: sum / count as f64,
                count,
            };
            (k, mean)
        })
        .collect();

    match order {
        GroupOrder::AscendingMean => means.sort_by(|a, b| a.1.mean.total_cmp(&b.1.mean)),
        GroupOrder::Insertion => {}
        GroupOrder::Key => means.sort_by(|a, b| a.0.cmp(&b.0)),
    }

    Ok(means
        .into_iter()
        .map(|(k, mut m)| {
            m.key = k.into_label();
            m
        })
        .collect())
}

/// Mean price per brand, the "price by brand" chart.
pub fn group_mean_price_by_brand(
    view: &FilteredView<'_>,
    order: GroupOrder,
) -> Result<Vec<GroupMean>, EmptyViewError> {
    group_mean(
        view,
        GroupKey::Category(CategoryColumn::Brand),
        NumericColumn::Price,
        order,
    )
}

// ---------------------------------------------------------------------------
// Value counts
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Number of rows per value of a categorical column, most frequent first
/// (ties alphabetical). An empty view yields no counts.
pub fn value_counts(view: &FilteredView<'_>, column: CategoryColumn) -> Vec<ValueCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for listing in view.iter() {
        if let Some(v) = listing.category(column) {
            *counts.entry(v).or_default() += 1;
        }
    }
    let mut out: Vec<ValueCount> = counts
        .into_iter()
        .map(|(value, count)| ValueCount {
            value: value.to_string(),
            count,
        })
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.value.cmp(&b.value)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Dataset;

    fn listing(brand: &str, year: i32, price: f64) -> Listing {
        Listing {
            brand: brand.to_string(),
            model: None,
            year,
            engine_size: 1.5,
            fuel_type: "Petrol".to_string(),
            transmission: if price > 10.0 { "Automatic" } else { "Manual" }.to_string(),
            mileage: 0,
            condition: None,
            price,
        }
    }

    fn abc() -> Dataset {
        Dataset::from_listings(vec![
            listing("A", 2012, 10.0),
            listing("A", 2009, 20.0),
            listing("B", 2012, 5.0),
        ])
    }

    #[test]
    fn grouped_mean_by_brand() {
        let ds = abc();
        let view = FilteredView::all(&ds);
        let means = group_mean_price_by_brand(&view, GroupOrder::Insertion).unwrap();
        assert_eq!(
            means,
            vec![
                GroupMean {
                    key: "A".into(),
                    mean: 15.0,
                    count: 2
                },
                GroupMean {
                    key: "B".into(),
                    mean: 5.0,
                    count: 1
                },
            ]
        );
    }

    #[test]
    fn ascending_mean_order() {
        let ds = abc();
        let view = FilteredView::all(&ds);
        let keys: Vec<String> = group_mean_price_by_brand(&view, GroupOrder::AscendingMean)
            .unwrap()
            .into_iter()
            .map(|g| g.key)
            .collect();
        assert_eq!(keys, vec!["B", "A"]);
    }

    #[test]
    fn year_groups_sort_numerically() {
        let ds = abc();
        let view = FilteredView::all(&ds);
        let by_year = group_mean(&view, GroupKey::Year, NumericColumn::Price, GroupOrder::Key).unwrap();
        let keys: Vec<&str> = by_year.iter().map(|g| g.key.as_str()).collect();
        assert_eq!(keys, vec!["2009", "2012"]);
        assert_eq!(by_year[1].mean, 7.5);
    }

    #[test]
    fn missing_optional_key_is_skipped() {
        let ds = abc();
        let view = FilteredView::all(&ds);
        let by_model = group_mean(
            &view,
            GroupKey::Category(CategoryColumn::Model),
            NumericColumn::Price,
            GroupOrder::Insertion,
        )
        .unwrap();
        assert!(by_model.is_empty());
    }

    #[test]
    fn grouped_mean_of_empty_view_fails() {
        let ds = Dataset::from_listings(Vec::new());
        let view = FilteredView::all(&ds);
        assert!(group_mean_price_by_brand(&view, GroupOrder::Insertion).is_err());
    }

    #[test]
    fn counts_most_frequent_first() {
        let ds = abc();
        let counts = value_counts(&FilteredView::all(&ds), CategoryColumn::Transmission);
        assert_eq!(
            counts,
            vec![
                ValueCount {
                    value: "Manual".into(),
                    count: 2
                },
                ValueCount {
                    value: "Automatic".into(),
                    count: 1
                },
            ]
        );
    }
}
