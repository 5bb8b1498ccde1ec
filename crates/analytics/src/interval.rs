//! Interval regrouping — folds canonical-dated points into day/week/month
//! buckets, summing raw counts and recomputing ratios from the sums.

use crate::metrics;
use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeMap;
use trendlens_core::types::{Interval, TimePoint};

/// Sunday that starts the week containing `date`.
pub fn week_anchor(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// First day of `date`'s month.
pub fn month_anchor(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Group key a point falls under at the given interval. The key doubles as
/// the regrouped point's date.
pub fn group_key(date: NaiveDate, interval: Interval) -> NaiveDate {
    match interval {
        Interval::Day => date,
        Interval::Week => week_anchor(date),
        Interval::Month => month_anchor(date),
    }
}

#[derive(Default)]
struct Totals {
    impressions: u64,
    clicks: u64,
    conversions: u64,
    revenue: Option<f64>,
}

/// Regroup `points` into the given interval, summing impressions, clicks,
/// conversions, and revenue field-wise per group key. CTR and conversion
/// rate are recomputed from the summed totals — averaging the per-point
/// ratios would weight sparse days equally with dense ones and is wrong.
/// Output is sorted ascending by date; empty input yields empty output.
pub fn aggregate(points: &[TimePoint], interval: Interval) -> Vec<TimePoint> {
    let mut groups: BTreeMap<NaiveDate, Totals> = BTreeMap::new();

    for point in points {
        let totals = groups.entry(group_key(point.date, interval)).or_default();
        totals.impressions += point.impressions;
        totals.clicks += point.clicks;
        totals.conversions += point.conversions;
        if let Some(revenue) = point.revenue {
            *totals.revenue.get_or_insert(0.0) += revenue;
        }
    }

    groups
        .into_iter()
        .map(|(date, t)| {
            metrics::derive_point(date, t.impressions, t.clicks, t.conversions, t.revenue)
        })
        .collect()
}
