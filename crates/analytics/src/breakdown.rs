//! Categorical breakdown aggregation — folds flat event-tagged rows into
//! ranked percentage-of-total distributions by gender, platform, location,
//! or age bucket.

use crate::metrics;
use std::collections::HashMap;
use tracing::{debug, warn};
use trendlens_core::types::{
    BreakdownEntry, Dimension, EventType, RawEventRow, AGE_BUCKET_LABELS, UNKNOWN_DIMENSION,
};

#[derive(Default)]
struct CategoryTotals {
    impressions: u64,
    clicks: u64,
    conversions: u64,
}

/// Accumulates per-category totals in first-appearance order, so the later
/// descending sort breaks ties by which category showed up first.
#[derive(Default)]
struct Accumulator {
    index: HashMap<String, usize>,
    groups: Vec<(String, CategoryTotals)>,
}

impl Accumulator {
    fn add(&mut self, name: &str, event_type: EventType, count: u64) {
        let idx = match self.index.get(name) {
            Some(&idx) => idx,
            None => {
                self.index.insert(name.to_string(), self.groups.len());
                self.groups
                    .push((name.to_string(), CategoryTotals::default()));
                self.groups.len() - 1
            }
        };
        let totals = &mut self.groups[idx].1;
        match event_type {
            EventType::Impression => totals.impressions += count,
            EventType::Click => totals.clicks += count,
            EventType::Conversion => totals.conversions += count,
        }
    }
}

/// Fold `rows` into per-category totals for `dimension` and rank them.
///
/// Single-category dimensions group on the row's dimension value, with rows
/// missing it folded under [`UNKNOWN_DIMENSION`] so totals stay
/// reconcilable. The age dimension instead unpivots the eight parallel slot
/// counts, each non-zero slot contributing under its label.
///
/// `value` is the category's impressions; `percentage` is its share of the
/// summed values, rounded to 2 decimals (0 when the total is 0). Entries are
/// sorted descending by value, ties in first-appearance order.
pub fn aggregate_breakdown(rows: &[RawEventRow], dimension: Dimension) -> Vec<BreakdownEntry> {
    let mut acc = Accumulator::default();

    for row in rows {
        match dimension {
            Dimension::AgeBucket => {
                let Some(slots) = row.age_bucket_slots else {
                    warn!("age breakdown row without bucket slots, skipping");
                    continue;
                };
                for (slot, &count) in slots.iter().enumerate() {
                    if count > 0 {
                        acc.add(AGE_BUCKET_LABELS[slot], row.event_type, count);
                    }
                }
            }
            _ => {
                let name = row
                    .dimension_value
                    .as_deref()
                    .filter(|v| !v.is_empty())
                    .unwrap_or(UNKNOWN_DIMENSION);
                acc.add(name, row.event_type, row.event_count);
            }
        }
    }

    let total: u64 = acc.groups.iter().map(|(_, t)| t.impressions).sum();
    let mut entries: Vec<BreakdownEntry> = acc
        .groups
        .into_iter()
        .map(|(name, t)| BreakdownEntry {
            name,
            value: t.impressions,
            percentage: if total > 0 {
                metrics::round2(t.impressions as f64 / total as f64 * 100.0)
            } else {
                0.0
            },
            impressions: t.impressions,
            clicks: t.clicks,
            conversions: t.conversions,
        })
        .collect();

    // Stable sort keeps first-appearance order on equal values.
    entries.sort_by(|a, b| b.value.cmp(&a.value));

    debug!(
        dimension = dimension.as_str(),
        categories = entries.len(),
        total_impressions = total,
        "breakdown aggregated"
    );
    entries
}
