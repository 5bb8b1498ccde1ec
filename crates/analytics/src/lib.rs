//! Time-series metrics aggregation engine — bucket-key normalization,
//! day/week/month regrouping, cross-series combination, and categorical
//! breakdown aggregation for campaign analytics charts and export.
//!
//! Every operation is a deterministic, synchronous transform of in-memory
//! data: identical input yields identical output, and regrouping
//! already-grouped points at the same interval is a no-op.

pub mod breakdown;
pub mod combine;
pub mod interval;
pub mod metrics;
pub mod normalize;
pub mod payload;

pub use breakdown::aggregate_breakdown;
pub use combine::{combine, combine_at};
pub use interval::aggregate;
pub use metrics::OverallTotals;
pub use normalize::normalize;
pub use payload::{points_from_payload, series_from_payload};
