//! Trend-payload ingestion — turns the backend's three parallel
//! bucket-key → count maps into normalized, date-ascending points.

use crate::{metrics, normalize};
use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;
use trendlens_core::types::{Series, TimePoint, TrendPayload};

#[derive(Default)]
struct Counts {
    impressions: u64,
    clicks: u64,
    conversions: u64,
}

/// Build day-grained points from a raw payload.
///
/// The point set is the union of bucket keys across the impression, click,
/// and conversion maps; each key is normalized to a calendar date, and
/// distinct raw keys that normalize to the same date are summed. Ratios are
/// derived per resulting point. Output is sorted ascending by date.
pub fn points_from_payload(payload: &TrendPayload) -> Vec<TimePoint> {
    let keys: BTreeSet<&str> = payload
        .impression
        .keys()
        .chain(payload.click.keys())
        .chain(payload.conversion.keys())
        .map(String::as_str)
        .collect();

    let mut groups: BTreeMap<NaiveDate, Counts> = BTreeMap::new();
    for key in keys {
        let date = normalize::normalize(key);
        let counts = groups.entry(date).or_default();
        counts.impressions += payload.impression.get(key).copied().unwrap_or(0);
        counts.clicks += payload.click.get(key).copied().unwrap_or(0);
        counts.conversions += payload.conversion.get(key).copied().unwrap_or(0);
    }

    debug!(points = groups.len(), "trend payload ingested");
    groups
        .into_iter()
        .map(|(date, c)| metrics::derive_point(date, c.impressions, c.clicks, c.conversions, None))
        .collect()
}

/// Build a named series from a raw payload.
pub fn series_from_payload(name: &str, payload: &TrendPayload) -> Series {
    Series {
        name: name.to_string(),
        points: points_from_payload(payload),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interval;
    use chrono::Utc;
    use trendlens_core::types::Interval;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_bucket_normalized_and_monthly_regroup_is_noop() {
        let payload: TrendPayload =
            serde_json::from_str(r#"{"impression": {"2024-01": 100}}"#).unwrap();
        let points = points_from_payload(&payload);

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, date(2024, 1, 1));
        assert_eq!(points[0].impressions, 100);
        assert_eq!(points[0].clicks, 0);
        assert_eq!(points[0].ctr, 0.0);

        let monthly = interval::aggregate(&points, Interval::Month);
        assert_eq!(monthly, points);
    }

    #[test]
    fn test_union_of_keys_across_maps() {
        let payload: TrendPayload = serde_json::from_str(
            r#"{
                "impression": {"2024-01-01": 100},
                "click": {"2024-01-02": 5},
                "conversion": {"2024-01-01": 1}
            }"#,
        )
        .unwrap();
        let points = points_from_payload(&payload);

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].impressions, 100);
        assert_eq!(points[0].conversions, 1);
        assert_eq!(points[1].clicks, 5);
        assert_eq!(points[1].impressions, 0);
    }

    #[test]
    fn test_keys_normalizing_to_same_date_are_summed() {
        // "2024-01" and "January 2024" both land on 2024-01-01.
        let payload: TrendPayload = serde_json::from_str(
            r#"{"impression": {"2024-01": 60, "January 2024": 40}}"#,
        )
        .unwrap();
        let points = points_from_payload(&payload);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].impressions, 100);
    }

    #[test]
    fn test_garbage_key_does_not_raise() {
        let payload: TrendPayload =
            serde_json::from_str(r#"{"impression": {"garbage": 7}}"#).unwrap();
        let points = points_from_payload(&payload);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].date, Utc::now().date_naive());
        assert_eq!(points[0].impressions, 7);

        // Downstream aggregation proceeds without error.
        let daily = interval::aggregate(&points, Interval::Day);
        assert_eq!(daily[0].impressions, 7);
    }

    #[test]
    fn test_empty_payload() {
        assert!(points_from_payload(&TrendPayload::default()).is_empty());
    }
}
