//! End-to-end flow: raw trend payloads → ingestion → weekly regrouping →
//! multi-series combination, plus breakdown aggregation from wire rows.

use chrono::NaiveDate;
use trendlens_analytics::{aggregate_breakdown, combine_at, metrics, series_from_payload};
use trendlens_core::types::{
    BreakdownRecord, Dimension, Interval, MetricField, TrendPayload, COMBINED_TOTAL,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// One campaign's raw payload mixing bucket-key formats, as the backend
/// actually emits them.
fn campaign_a_payload() -> TrendPayload {
    serde_json::from_str(
        r#"{
            "impression": {"2024-01-15": 100, "2024-01-16": 200, "2024-01-21": 50},
            "click": {"2024-01-15": 10, "2024-01-16": 10},
            "conversion": {"2024-01-16": 2}
        }"#,
    )
    .unwrap()
}

fn campaign_b_payload() -> TrendPayload {
    serde_json::from_str(
        r#"{
            "impression": {"2024-W03": 300},
            "click": {"2024-W03": 30}
        }"#,
    )
    .unwrap()
}

#[test]
fn test_payloads_to_weekly_chart_table() {
    let a = series_from_payload("Campaign A", &campaign_a_payload());
    let b = series_from_payload("Campaign B", &campaign_b_payload());

    let table = combine_at(
        &[a, b],
        Interval::Week,
        MetricField::Impressions,
        true,
    );

    // Week of Sun 2024-01-14 holds A's Mon+Tue points and all of B
    // ("2024-W03" normalizes into the same Sunday anchor); A's 2024-01-21
    // point starts the next week.
    assert_eq!(
        table.columns,
        vec!["Campaign A", "Campaign B", COMBINED_TOTAL]
    );
    let week1 = date(2024, 1, 14);
    let week2 = date(2024, 1, 21);
    assert_eq!(table.value(week1, "Campaign A"), Some(300.0));
    assert_eq!(table.value(week1, "Campaign B"), Some(300.0));
    assert_eq!(table.value(week1, COMBINED_TOTAL), Some(600.0));
    assert_eq!(table.value(week2, "Campaign A"), Some(50.0));
    assert_eq!(table.value(week2, "Campaign B"), Some(0.0));
    assert_eq!(table.value(week2, COMBINED_TOTAL), Some(50.0));
}

#[test]
fn test_weekly_ctr_derived_from_summed_counts() {
    let a = series_from_payload("Campaign A", &campaign_a_payload());
    let table = combine_at(&[a], Interval::Week, MetricField::Ctr, false);

    // Week 1: 20 clicks / 300 impressions.
    let week1 = date(2024, 1, 14);
    let ctr = table.value(week1, "Campaign A").unwrap();
    assert!((ctr - 20.0 / 300.0 * 100.0).abs() < 1e-9);
    // No clicks in week 2: CTR is 0, never NaN.
    let week2_ctr = table.value(date(2024, 1, 21), "Campaign A").unwrap();
    assert_eq!(week2_ctr, 0.0);
}

#[test]
fn test_overall_totals_from_ingested_points() {
    let a = series_from_payload("Campaign A", &campaign_a_payload());
    let totals = metrics::summarize(&a.points);
    assert_eq!(totals.impressions, 350);
    assert_eq!(totals.clicks, 20);
    assert_eq!(totals.conversions, 2);
    assert!((totals.conversion_rate - 10.0).abs() < 1e-9);
}

#[test]
fn test_wire_breakdown_rows_to_ranked_entries() {
    let records: Vec<BreakdownRecord> = serde_json::from_str(
        r#"[
            {"eventType": 0, "eventCount": 80, "gender": "Male"},
            {"eventType": 1, "eventCount": 8, "gender": "Male"},
            {"eventType": 0, "eventCount": 20, "gender": "Female"},
            {"eventType": 2, "eventCount": 1, "gender": "Female"}
        ]"#,
    )
    .unwrap();

    let rows: Vec<_> = records
        .into_iter()
        .map(|r| r.into_row(Dimension::Gender))
        .collect();
    let entries = aggregate_breakdown(&rows, Dimension::Gender);

    assert_eq!(entries[0].name, "Male");
    assert_eq!(entries[0].value, 80);
    assert_eq!(entries[0].percentage, 80.00);
    assert_eq!(entries[1].name, "Female");
    assert_eq!(entries[1].conversions, 1);
}

#[test]
fn test_determinism_byte_identical_output() {
    let run = || {
        let a = series_from_payload("Campaign A", &campaign_a_payload());
        let b = series_from_payload("Campaign B", &campaign_b_payload());
        let table = combine_at(&[a, b], Interval::Week, MetricField::Impressions, true);
        serde_json::to_string(&table).unwrap()
    };
    assert_eq!(run(), run());
}
