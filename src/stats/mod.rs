//! Aggregates over a [`FilteredView`](crate::data::filter::FilteredView).
//!
//! Everything here is a pure function of the view. Aggregates that are
//! undefined for too few rows return [`EmptyViewError`](crate::error::EmptyViewError).

pub mod correlation;
pub mod grouped;
pub mod summary;

pub use correlation::{correlate, Correlation, CorrelationMatrix};
pub use grouped::{
    group_mean, group_mean_price_by_brand, value_counts, GroupKey, GroupMean, GroupOrder,
    ValueCount,
};
pub use summary::{mean, summarize, AggregateSummary};
