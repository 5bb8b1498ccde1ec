//! Cross-series combination — merges independently aggregated named series
//! into one date-indexed table, the exact shape a multi-line chart consumes.

use crate::interval;
use chrono::NaiveDate;
use std::collections::{BTreeSet, HashMap};
use trendlens_core::types::{
    CombinedRow, CombinedTable, Interval, MetricField, Series, COMBINED_TOTAL,
};

/// Merge `series` into a [`CombinedTable`] on the selected field.
///
/// The row set is the union of dates across all series; a series with no
/// point on a date contributes 0 for that row (intentional zero-fill, not an
/// error). With `include_combined_total` and more than one series, a
/// synthesized [`COMBINED_TOTAL`] column holds the per-date sum across all
/// series. Series names must be unique within one combine call; the column
/// set is identical on every row.
///
/// Input series are expected to already be regrouped at a common interval —
/// see [`combine_at`] for the variant that does both steps.
pub fn combine(series: &[Series], field: MetricField, include_combined_total: bool) -> CombinedTable {
    let dates: BTreeSet<NaiveDate> = series
        .iter()
        .flat_map(|s| s.points.iter().map(|p| p.date))
        .collect();

    let with_total = include_combined_total && series.len() > 1;
    let mut columns: Vec<String> = series.iter().map(|s| s.name.clone()).collect();
    if with_total {
        columns.push(COMBINED_TOTAL.to_string());
    }

    let lookups: Vec<HashMap<NaiveDate, f64>> = series
        .iter()
        .map(|s| s.points.iter().map(|p| (p.date, field.select(p))).collect())
        .collect();

    let rows = dates
        .into_iter()
        .map(|date| {
            let mut values: Vec<f64> = lookups
                .iter()
                .map(|lookup| lookup.get(&date).copied().unwrap_or(0.0))
                .collect();
            if with_total {
                values.push(values.iter().sum());
            }
            CombinedRow { date, values }
        })
        .collect();

    CombinedTable { columns, rows }
}

/// Regroup every series at `interval` independently, then [`combine`].
pub fn combine_at(
    series: &[Series],
    interval: Interval,
    field: MetricField,
    include_combined_total: bool,
) -> CombinedTable {
    let regrouped: Vec<Series> = series
        .iter()
        .map(|s| Series {
            name: s.name.clone(),
            points: interval::aggregate(&s.points, interval),
        })
        .collect();
    combine(&regrouped, field, include_combined_total)
}
