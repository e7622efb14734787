use log::debug;
use serde::{Deserialize, Serialize};

use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;
use crate::error::EmptyViewError;

/// Scalar means over a filtered view (the dashboard's KPI row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub count: usize,
    pub mean_price: f64,
    pub mean_mileage: f64,
    /// Rounded to the nearest model year.
    pub mean_year: i32,
    pub mean_engine_size: f64,
}

/// Fails unless the view has at least `required` rows.
pub(crate) fn require_rows(view: &FilteredView<'_>, required: usize) -> Result<(), EmptyViewError> {
    if view.len() < required {
        Err(EmptyViewError {
            rows: view.len(),
            required,
        })
    } else {
        Ok(())
    }
}

/// Arithmetic mean of one numeric column.
pub fn mean(view: &FilteredView<'_>, column: NumericColumn) -> Result<f64, EmptyViewError> {
    require_rows(view, 1)?;
    let sum: f64 = view.iter().map(|l| l.numeric(column)).sum();
    Ok(sum / view.len() as f64)
}

/// Means of every numeric column. An empty view has no mean and is
/// reported as [`EmptyViewError`], never as NaN or zero.
pub fn summarize(view: &FilteredView<'_>) -> Result<AggregateSummary, EmptyViewError> {
    require_rows(view, 1)?;
    let summary = AggregateSummary {
        count: view.len(),
        mean_price: mean(view, NumericColumn::Price)?,
        mean_mileage: mean(view, NumericColumn::Mileage)?,
        mean_year: mean(view, NumericColumn::Year)?.round() as i32,
        mean_engine_size: mean(view, NumericColumn::EngineSize)?,
    };
    debug!("summarized {} listings", summary.count);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{filter, FilterCriteria};
    use crate::data::model::{Dataset, Listing};

    fn listing(year: i32, engine_size: f64, mileage: i64, price: f64) -> Listing {
        Listing {
            brand: "Toyota".to_string(),
            model: Some("Corolla".to_string()),
            year,
            engine_size,
            fuel_type: "Petrol".to_string(),
            transmission: "Manual".to_string(),
            mileage,
            condition: None,
            price,
        }
    }

    #[test]
    fn empty_view_is_an_error() {
        let ds = Dataset::from_listings(vec![listing(2015, 1.6, 1000, 9000.0)]);
        let view = filter(&ds, &FilterCriteria::default().with_year_range(1990, 1991));
        assert_eq!(
            summarize(&view),
            Err(EmptyViewError {
                rows: 0,
                required: 1
            })
        );
    }

    #[test]
    fn single_row_mean_is_the_row() {
        let ds = Dataset::from_listings(vec![listing(2015, 1.6, 1000, 9000.0)]);
        let summary = summarize(&FilteredView::all(&ds)).unwrap();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.mean_price, 9000.0);
        assert_eq!(summary.mean_mileage, 1000.0);
        assert_eq!(summary.mean_year, 2015);
        assert_eq!(summary.mean_engine_size, 1.6);
    }

    #[test]
    fn mean_year_rounds() {
        let ds = Dataset::from_listings(vec![
            listing(2015, 1.0, 0, 1.0),
            listing(2016, 2.0, 10, 2.0),
            listing(2016, 3.0, 20, 3.0),
        ]);
        let summary = summarize(&FilteredView::all(&ds)).unwrap();
        // 2015.67
        assert_eq!(summary.mean_year, 2016);
        approx::assert_relative_eq!(summary.mean_engine_size, 2.0);
        approx::assert_relative_eq!(summary.mean_mileage, 10.0);
    }
}
