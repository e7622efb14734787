//! Filter-and-aggregate pipeline for vehicle listing dashboards.
//!
//! A [`Dataset`] is loaded once, then every user interaction derives a
//! [`FilteredView`] from a [`FilterCriteria`] and recomputes the aggregates
//! the charts are drawn from. Nothing here renders; results are plain,
//! serialisable data.
//!
//! ```no_run
//! use car_insights::prelude::*;
//!
//! let dataset = load(std::path::Path::new("car_price_prediction_.csv")).unwrap();
//! let criteria = FilterCriteria::default()
//!     .with_brands(["Toyota"])
//!     .with_year_range(2015, 2020);
//! let view = filter(&dataset, &criteria);
//! match summarize(&view) {
//!     Ok(summary) => println!("mean price {:.0}", summary.mean_price),
//!     Err(_) => println!("no data"),
//! }
//! ```

pub mod cache;
pub mod config;
pub mod data;
pub mod error;
pub mod report;
pub mod session;
pub mod stats;

pub use cache::DatasetCache;
pub use config::Config;
pub use data::filter::{filter, Bounds, FilterCriteria, FilteredView, Selection};
pub use data::loader::load;
pub use data::model::{CategoryColumn, Dataset, Listing, NumericColumn};
pub use error::{EmptyViewError, Error, LoadError, Result};
pub use report::{build_report, DashboardReport, Section};
pub use session::Session;
pub use stats::{correlate, group_mean, summarize, AggregateSummary, CorrelationMatrix};

pub mod prelude {
    pub use crate::data::filter::{filter, Bounds, FilterCriteria, FilteredView, Selection};
    pub use crate::data::loader::load;
    pub use crate::data::model::{CategoryColumn, Dataset, Listing, NumericColumn};
    pub use crate::error::{EmptyViewError, LoadError};
    pub use crate::stats::{
        correlate, group_mean, group_mean_price_by_brand, summarize, value_counts, GroupKey,
        GroupOrder,
    };
}
