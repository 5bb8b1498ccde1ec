//! Bucket-key normalization.
//!
//! Upstream trend payloads label time buckets with whatever the data source
//! produced: canonical dates, `YYYY-MM` months, week numbers, month names,
//! raw unix timestamps, or garbage. [`normalize`] maps any of them to a real
//! calendar date so downstream regrouping never has to re-parse strings.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, Utc};
use tracing::warn;

type BucketParser = fn(&str) -> Option<NaiveDate>;

/// Ordered parser cascade; first match wins. New bucket formats slot in here
/// without touching the existing entries.
const PARSERS: &[BucketParser] = &[
    parse_canonical,
    parse_year_month,
    parse_week_number,
    parse_month_name,
    parse_unix_timestamp,
    parse_generic,
];

/// Map an arbitrary bucket key to a canonical calendar date. Never fails:
/// a key no parser recognizes is attributed to the current UTC date (with a
/// diagnostic) so a single bad upstream label cannot take down a whole
/// chart or export. The misattribution tradeoff is deliberate.
pub fn normalize(bucket_key: &str) -> NaiveDate {
    let key = bucket_key.trim();
    for parse in PARSERS {
        if let Some(date) = parse(key) {
            return date;
        }
    }
    let today = Utc::now().date_naive();
    warn!(bucket_key, %today, "unparseable bucket key, substituting current date");
    today
}

/// `YYYY-MM-DD`, already canonical.
fn parse_canonical(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key, "%Y-%m-%d").ok()
}

/// `YYYY-MM` mapped to the first of the month.
fn parse_year_month(key: &str) -> Option<NaiveDate> {
    let (year, month) = key.split_once('-')?;
    if year.len() != 4 || month.len() > 2 {
        return None;
    }
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
}

/// `YYYY-W##` or `Week ## YYYY`, mapped to the Sunday-anchored start of that
/// week of the year.
fn parse_week_number(key: &str) -> Option<NaiveDate> {
    if let Some((year, rest)) = key.split_once('-') {
        if let Some(week) = rest.strip_prefix('W').or_else(|| rest.strip_prefix('w')) {
            return week_start(year.parse().ok()?, week.parse().ok()?);
        }
    }
    let rest = key
        .strip_prefix("Week ")
        .or_else(|| key.strip_prefix("week "))?;
    let (week, year) = rest.split_once(' ')?;
    week_start(year.trim().parse().ok()?, week.trim().parse().ok()?)
}

/// Week start as the upstream producer computes it:
/// `jan1 + (week - 1) * 7 - jan1.weekday_from_sunday`. Not true ISO-8601
/// weeks; week 1 is the week containing January 1st.
fn week_start(year: i32, week: u32) -> Option<NaiveDate> {
    if week == 0 || week > 54 {
        return None;
    }
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset =
        (week as i64 - 1) * 7 - jan1.weekday().num_days_from_sunday() as i64;
    jan1.checked_add_signed(Duration::days(offset))
}

/// `<MonthName> YYYY` (full or abbreviated), mapped to the first of the month.
fn parse_month_name(key: &str) -> Option<NaiveDate> {
    let padded = format!("01 {key}");
    NaiveDate::parse_from_str(&padded, "%d %B %Y")
        .or_else(|_| NaiveDate::parse_from_str(&padded, "%d %b %Y"))
        .ok()
}

/// Pure numeric string treated as a unix timestamp; values below 1e10 are
/// seconds, anything larger is already milliseconds.
fn parse_unix_timestamp(key: &str) -> Option<NaiveDate> {
    let raw: i64 = key.parse().ok()?;
    let millis = if raw.abs() < 10_000_000_000 {
        raw.checked_mul(1000)?
    } else {
        raw
    };
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.date_naive())
}

/// Last-ditch generic parse over the formats upstream sources have been seen
/// emitting.
fn parse_generic(key: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(key) {
        return Some(dt.date_naive());
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(key, format) {
            return Some(dt.date());
        }
    }
    for format in ["%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(key, format) {
            return Some(date);
        }
    }
    None
}
