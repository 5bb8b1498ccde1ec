//! Export formatting — flattens overall totals, ranked breakdowns, and the
//! trend into one tabular structure with a `sheet_section` discriminator.
//! Percentages become `"NN.NN%"` strings at this boundary only; everything
//! upstream keeps numeric percentages.

use crate::catalog::CatalogService;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;
use trendlens_analytics::metrics::OverallTotals;
use trendlens_core::config::AppConfig;
use trendlens_core::types::{BreakdownEntry, Dimension, TimePoint, UNKNOWN_DIMENSION};

/// One flat export record. `fields` preserves column order for CSV.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRow {
    pub sheet_section: String,
    pub fields: Vec<(String, String)>,
}

impl ExportRow {
    fn new(section: &str) -> Self {
        Self {
            sheet_section: section.to_string(),
            fields: Vec::new(),
        }
    }

    fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields.push((key.to_string(), value.into()));
        self
    }
}

fn format_pct(value: f64) -> String {
    format!("{value:.2}%")
}

fn format_money(value: f64) -> String {
    format!("{value:.2}")
}

/// Builds the flat export row set consumed by the CSV download.
pub struct ExportBuilder {
    filter_unknown: bool,
    catalog: CatalogService,
}

impl ExportBuilder {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            filter_unknown: config.export.filter_unknown,
            catalog: CatalogService::new(&config.cache),
        }
    }

    /// Flatten totals, per-dimension breakdowns, and the trend into one row
    /// set. Breakdown rows keep their rank order; known catalog labels with
    /// no data are appended as zero rows so the sheet always shows the full
    /// category set.
    pub fn build(
        &self,
        totals: &OverallTotals,
        breakdowns: &[(Dimension, Vec<BreakdownEntry>)],
        trend: &[TimePoint],
    ) -> Vec<ExportRow> {
        let mut rows = Vec::new();

        let mut overview = ExportRow::new("overview")
            .field("impressions", totals.impressions.to_string())
            .field("clicks", totals.clicks.to_string())
            .field("conversions", totals.conversions.to_string())
            .field("ctr", format_pct(totals.ctr))
            .field("conversion_rate", format_pct(totals.conversion_rate));
        if let Some(revenue) = totals.revenue {
            overview = overview.field("revenue", format_money(revenue));
        }
        rows.push(overview);

        for (dimension, entries) in breakdowns {
            rows.extend(self.breakdown_rows(*dimension, entries));
        }

        for point in trend {
            let mut row = ExportRow::new("trend")
                .field("date", point.date.to_string())
                .field("impressions", point.impressions.to_string())
                .field("clicks", point.clicks.to_string())
                .field("conversions", point.conversions.to_string())
                .field("ctr", format_pct(point.ctr))
                .field("conversion_rate", format_pct(point.conversion_rate));
            if let Some(revenue) = point.revenue {
                row = row.field("revenue", format_money(revenue));
            }
            rows.push(row);
        }

        debug!(rows = rows.len(), "export rows built");
        rows
    }

    fn breakdown_rows(&self, dimension: Dimension, entries: &[BreakdownEntry]) -> Vec<ExportRow> {
        let section = dimension.as_str();
        let mut rows: Vec<ExportRow> = entries
            .iter()
            .filter(|e| !(self.filter_unknown && e.name == UNKNOWN_DIMENSION))
            .map(|e| {
                ExportRow::new(section)
                    .field("name", e.name.clone())
                    .field("impressions", e.impressions.to_string())
                    .field("clicks", e.clicks.to_string())
                    .field("conversions", e.conversions.to_string())
                    .field("percentage", format_pct(e.percentage))
            })
            .collect();

        // Zero-fill catalog labels the data never mentioned.
        for label in self.catalog.known_labels(dimension) {
            if self.filter_unknown && label == UNKNOWN_DIMENSION {
                continue;
            }
            if entries.iter().any(|e| e.name == label) {
                continue;
            }
            rows.push(
                ExportRow::new(section)
                    .field("name", label)
                    .field("impressions", "0")
                    .field("clicks", "0")
                    .field("conversions", "0")
                    .field("percentage", format_pct(0.0)),
            );
        }
        rows
    }
}

/// Render rows as CSV. The header is `sheet_section` plus the union of field
/// keys in first-appearance order; rows leave missing columns empty.
pub fn to_csv(rows: &[ExportRow]) -> String {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        for (key, _) in &row.fields {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut csv = String::from("sheet_section");
    for column in &columns {
        csv.push(',');
        csv.push_str(&escape_csv(column));
    }
    csv.push('\n');

    for row in rows {
        csv.push_str(&escape_csv(&row.sheet_section));
        for column in &columns {
            csv.push(',');
            if let Some((_, value)) = row.fields.iter().find(|(k, _)| k == column) {
                csv.push_str(&escape_csv(value));
            }
        }
        csv.push('\n');
    }
    csv
}

/// Render rows as flat JSON records.
pub fn to_json(rows: &[ExportRow]) -> Value {
    let records: Vec<Value> = rows
        .iter()
        .map(|row| {
            let mut record = Map::new();
            record.insert(
                "sheet_section".to_string(),
                Value::String(row.sheet_section.clone()),
            );
            for (key, value) in &row.fields {
                record.insert(key.clone(), Value::String(value.clone()));
            }
            Value::Object(record)
        })
        .collect();
    Value::Array(records)
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use trendlens_analytics::metrics;

    fn sample_totals() -> OverallTotals {
        OverallTotals {
            impressions: 100,
            clicks: 8,
            conversions: 2,
            ctr: 8.0,
            conversion_rate: 25.0,
            revenue: Some(49.5),
        }
    }

    fn sample_breakdown() -> Vec<BreakdownEntry> {
        vec![
            BreakdownEntry {
                name: "Male".to_string(),
                value: 80,
                percentage: 80.0,
                impressions: 80,
                clicks: 8,
                conversions: 2,
            },
            BreakdownEntry {
                name: UNKNOWN_DIMENSION.to_string(),
                value: 20,
                percentage: 20.0,
                impressions: 20,
                clicks: 0,
                conversions: 0,
            },
        ]
    }

    fn builder() -> ExportBuilder {
        ExportBuilder::new(&AppConfig::default())
    }

    #[test]
    fn test_sections_and_percentage_formatting() {
        let trend = vec![metrics::derive_point(
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            100,
            8,
            2,
            None,
        )];
        let rows = builder().build(
            &sample_totals(),
            &[(Dimension::Gender, sample_breakdown())],
            &trend,
        );

        assert_eq!(rows[0].sheet_section, "overview");
        let ctr = rows[0].fields.iter().find(|(k, _)| k == "ctr").unwrap();
        assert_eq!(ctr.1, "8.00%");

        let trend_row = rows.iter().find(|r| r.sheet_section == "trend").unwrap();
        let date = trend_row.fields.iter().find(|(k, _)| k == "date").unwrap();
        assert_eq!(date.1, "2024-01-15");
    }

    #[test]
    fn test_unknown_filtered_and_catalog_zero_filled() {
        let rows = builder().build(
            &sample_totals(),
            &[(Dimension::Gender, sample_breakdown())],
            &[],
        );
        let gender: Vec<_> = rows.iter().filter(|r| r.sheet_section == "gender").collect();

        // Unknown dropped by default config; Female zero-filled from catalog.
        assert!(gender.iter().all(|r| {
            r.fields
                .iter()
                .all(|(k, v)| !(k == "name" && v == UNKNOWN_DIMENSION))
        }));
        let female = gender
            .iter()
            .find(|r| r.fields.iter().any(|(k, v)| k == "name" && v == "Female"))
            .unwrap();
        assert!(female
            .fields
            .iter()
            .any(|(k, v)| k == "percentage" && v == "0.00%"));
    }

    #[test]
    fn test_csv_header_union_and_quoting() {
        let rows = vec![
            ExportRow::new("overview").field("impressions", "100"),
            ExportRow::new("gender")
                .field("name", "He said \"hi\", twice")
                .field("impressions", "5"),
        ];
        let csv = to_csv(&rows);
        let mut lines = csv.lines();

        assert_eq!(lines.next().unwrap(), "sheet_section,impressions,name");
        // Missing column renders empty.
        assert_eq!(lines.next().unwrap(), "overview,100,");
        assert_eq!(
            lines.next().unwrap(),
            "gender,5,\"He said \"\"hi\"\", twice\""
        );
    }

    #[test]
    fn test_json_records_are_flat() {
        let rows = vec![ExportRow::new("overview").field("impressions", "100")];
        let json = to_json(&rows);
        assert_eq!(json[0]["sheet_section"], "overview");
        assert_eq!(json[0]["impressions"], "100");
    }
}
