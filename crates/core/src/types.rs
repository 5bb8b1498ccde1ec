use crate::error::TrendError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Event kind carried by every raw analytics row. The wire encodes these as
/// integer codes 0/1/2; anything else is rejected at deserialization time
/// instead of being silently dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum EventType {
    Impression,
    Click,
    Conversion,
}

impl TryFrom<u8> for EventType {
    type Error = TrendError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(EventType::Impression),
            1 => Ok(EventType::Click),
            2 => Ok(EventType::Conversion),
            other => Err(TrendError::UnknownEventType(other)),
        }
    }
}

impl From<EventType> for u8 {
    fn from(event_type: EventType) -> u8 {
        match event_type {
            EventType::Impression => 0,
            EventType::Click => 1,
            EventType::Conversion => 2,
        }
    }
}

/// Time interval used to regroup canonical-dated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl std::str::FromStr for Interval {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "day" | "daily" => Ok(Interval::Day),
            "week" | "weekly" => Ok(Interval::Week),
            "month" | "monthly" => Ok(Interval::Month),
            other => Err(TrendError::Config(format!("unknown interval: {other}"))),
        }
    }
}

/// Categorical dimension for breakdown aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Gender,
    Platform,
    Location,
    AgeBucket,
}

impl std::str::FromStr for Dimension {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gender" => Ok(Dimension::Gender),
            "platform" => Ok(Dimension::Platform),
            "location" => Ok(Dimension::Location),
            "age" | "age_bucket" => Ok(Dimension::AgeBucket),
            other => Err(TrendError::Config(format!("unknown dimension: {other}"))),
        }
    }
}

impl Dimension {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Gender => "gender",
            Dimension::Platform => "platform",
            Dimension::Location => "location",
            Dimension::AgeBucket => "age",
        }
    }
}

/// Numeric field of a [`TimePoint`] selectable for charting/combining.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Impressions,
    Clicks,
    Conversions,
    Ctr,
    ConversionRate,
    Revenue,
}

impl MetricField {
    /// Extract this field's value from a point. Absent revenue reads as 0.
    pub fn select(&self, point: &TimePoint) -> f64 {
        match self {
            MetricField::Impressions => point.impressions as f64,
            MetricField::Clicks => point.clicks as f64,
            MetricField::Conversions => point.conversions as f64,
            MetricField::Ctr => point.ctr,
            MetricField::ConversionRate => point.conversion_rate,
            MetricField::Revenue => point.revenue.unwrap_or(0.0),
        }
    }
}

impl std::str::FromStr for MetricField {
    type Err = TrendError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "impressions" => Ok(MetricField::Impressions),
            "clicks" => Ok(MetricField::Clicks),
            "conversions" => Ok(MetricField::Conversions),
            "ctr" => Ok(MetricField::Ctr),
            "conversion_rate" => Ok(MetricField::ConversionRate),
            "revenue" => Ok(MetricField::Revenue),
            other => Err(TrendError::Config(format!("unknown metric: {other}"))),
        }
    }
}

/// One canonical-dated point of a trend series. `date` is always a real
/// calendar date; ratios are derived from the counts on the same point and
/// are finite by construction (0 when the denominator is 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    pub date: NaiveDate,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub ctr: f64,
    pub conversion_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
}

/// A named, date-ascending sequence of points (e.g. one per campaign).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<TimePoint>,
}

/// Column label of the synthesized cross-series total.
pub const COMBINED_TOTAL: &str = "Combined Total";

/// Date-indexed multi-column table, the exact shape a multi-line chart
/// consumes: one row per date, one column per series name (plus, optionally,
/// [`COMBINED_TOTAL`]). The column set is stable across all rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedTable {
    pub columns: Vec<String>,
    pub rows: Vec<CombinedRow>,
}

/// One row of a [`CombinedTable`]; `values` is aligned with `columns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CombinedRow {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl CombinedTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Value at (date, column), if both exist.
    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows
            .iter()
            .find(|r| r.date == date)
            .and_then(|r| r.values.get(idx).copied())
    }
}

/// Sentinel category for rows missing their dimension value. Retained in the
/// output so totals stay reconcilable; callers typically filter it.
pub const UNKNOWN_DIMENSION: &str = "Unknown";

/// Number of parallel age-bucket slots on a raw row.
pub const AGE_BUCKET_SLOTS: usize = 8;

/// Labels for the age-bucket slots, by slot index.
pub const AGE_BUCKET_LABELS: [&str; AGE_BUCKET_SLOTS] = [
    "13-18", "18-24", "25-34", "35-44", "45-54", "55-64", "65+", "NA",
];

/// Internal flat event row consumed by breakdown aggregation. Either
/// `dimension_value` (single-category dimensions) or `age_bucket_slots`
/// (parallel slot counts) is populated, per the requested dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEventRow {
    pub event_type: EventType,
    pub event_count: u64,
    #[serde(default)]
    pub dimension_value: Option<String>,
    #[serde(default)]
    pub age_bucket_slots: Option<[u64; AGE_BUCKET_SLOTS]>,
}

/// One ranked entry of a categorical breakdown. `value` mirrors
/// `impressions`; `percentage` is the share of the summed values across the
/// whole breakdown, rounded to 2 decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub name: String,
    pub value: u64,
    pub percentage: f64,
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
}

/// Raw trend payload as fetched from the backend: three parallel maps from an
/// arbitrary bucket-key string to a count. The union of keys across the maps
/// is the point set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendPayload {
    #[serde(default)]
    pub impression: HashMap<String, u64>,
    #[serde(default)]
    pub click: HashMap<String, u64>,
    #[serde(default)]
    pub conversion: HashMap<String, u64>,
}

/// Raw breakdown row as fetched from the backend. Carries every possible
/// dimension field; [`BreakdownRecord::into_row`] projects the one the caller
/// asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakdownRecord {
    #[serde(rename = "eventType")]
    pub event_type: EventType,
    #[serde(rename = "eventCount", default)]
    pub event_count: u64,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(rename = "ageBucket0", default)]
    pub age_bucket0: u64,
    #[serde(rename = "ageBucket1", default)]
    pub age_bucket1: u64,
    #[serde(rename = "ageBucket2", default)]
    pub age_bucket2: u64,
    #[serde(rename = "ageBucket3", default)]
    pub age_bucket3: u64,
    #[serde(rename = "ageBucket4", default)]
    pub age_bucket4: u64,
    #[serde(rename = "ageBucket5", default)]
    pub age_bucket5: u64,
    #[serde(rename = "ageBucket6", default)]
    pub age_bucket6: u64,
    #[serde(rename = "ageBucket7", default)]
    pub age_bucket7: u64,
}

impl BreakdownRecord {
    /// Project this wire record onto the internal row shape for `dimension`.
    pub fn into_row(self, dimension: Dimension) -> RawEventRow {
        let (dimension_value, age_bucket_slots) = match dimension {
            Dimension::Gender => (self.gender, None),
            Dimension::Platform => (self.platform, None),
            Dimension::Location => (self.location, None),
            Dimension::AgeBucket => (
                None,
                Some([
                    self.age_bucket0,
                    self.age_bucket1,
                    self.age_bucket2,
                    self.age_bucket3,
                    self.age_bucket4,
                    self.age_bucket5,
                    self.age_bucket6,
                    self.age_bucket7,
                ]),
            ),
        };
        RawEventRow {
            event_type: self.event_type,
            event_count: self.event_count,
            dimension_value,
            age_bucket_slots,
        }
    }
}
