//! Ratio derivation shared by every aggregation step.
//!
//! A zero denominator always yields 0, so no NaN or infinity can reach an
//! output structure. Ratios are recomputed from summed raw counts after every
//! regrouping; per-point ratios are never averaged.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trendlens_core::types::TimePoint;

/// Click-through rate as a percentage of impressions.
pub fn ctr(impressions: u64, clicks: u64) -> f64 {
    if impressions > 0 {
        clicks as f64 / impressions as f64 * 100.0
    } else {
        0.0
    }
}

/// Conversion rate as a percentage of clicks.
pub fn conversion_rate(clicks: u64, conversions: u64) -> f64 {
    if clicks > 0 {
        conversions as f64 / clicks as f64 * 100.0
    } else {
        0.0
    }
}

/// Return on ad spend; 0 when there was no spend.
pub fn roas(revenue: f64, spend: f64) -> f64 {
    if spend > 0.0 {
        revenue / spend
    } else {
        0.0
    }
}

/// Revenue proxy from conversion counts and an average order value.
pub fn estimated_revenue(conversions: u64, value_per_conversion: f64) -> f64 {
    conversions as f64 * value_per_conversion
}

/// Round to 2 decimal places. Per-entry rounding can drift a percentage sum
/// slightly off 100; that tolerance is accepted.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build a [`TimePoint`] from raw counts, deriving both ratios.
pub fn derive_point(
    date: NaiveDate,
    impressions: u64,
    clicks: u64,
    conversions: u64,
    revenue: Option<f64>,
) -> TimePoint {
    TimePoint {
        date,
        impressions,
        clicks,
        conversions,
        ctr: ctr(impressions, clicks),
        conversion_rate: conversion_rate(clicks, conversions),
        revenue,
    }
}

/// Whole-of-period totals across a trend, with ratios derived from the
/// summed counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub conversion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
}

/// Sum a sequence of points into whole-of-period totals.
pub fn summarize(points: &[TimePoint]) -> OverallTotals {
    let impressions: u64 = points.iter().map(|p| p.impressions).sum();
    let clicks: u64 = points.iter().map(|p| p.clicks).sum();
    let conversions: u64 = points.iter().map(|p| p.conversions).sum();
    let revenue = points
        .iter()
        .filter_map(|p| p.revenue)
        .fold(None, |acc: Option<f64>, r| Some(acc.unwrap_or(0.0) + r));

    OverallTotals {
        impressions,
        clicks,
        conversions,
        ctr: ctr(impressions, clicks),
        conversion_rate: conversion_rate(clicks, conversions),
        revenue,
    }
}
