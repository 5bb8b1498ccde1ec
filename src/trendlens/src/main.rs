//! Trendlens — offline driver for the campaign analytics aggregation engine.
//!
//! Reads raw trend/breakdown JSON payloads as fetched from the backend, runs
//! normalization, regrouping, and combination, and writes chart-ready JSON
//! or export CSV.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};
use trendlens_analytics::{aggregate_breakdown, combine_at, interval, metrics, series_from_payload};
use trendlens_core::config::AppConfig;
use trendlens_core::types::{
    BreakdownRecord, Dimension, Interval, MetricField, TimePoint, TrendPayload,
};
use trendlens_reporting::{to_csv, ExportBuilder};

#[derive(Parser, Debug)]
#[command(name = "trendlens")]
#[command(about = "Campaign analytics trend and breakdown aggregation")]
#[command(version)]
struct Cli {
    /// Trend payload JSON: an object mapping series name to a raw payload
    /// with "impression"/"click"/"conversion" bucket-key maps
    #[arg(long)]
    trend: Option<PathBuf>,

    /// Breakdown payload JSON: an array of flat event rows
    #[arg(long)]
    breakdown: Option<PathBuf>,

    /// Dimension the breakdown rows are keyed by
    #[arg(long, default_value = "gender")]
    dimension: Dimension,

    /// Regrouping interval for the trend
    #[arg(long, default_value = "day", env = "TRENDLENS__INTERVAL")]
    interval: Interval,

    /// Time-point field charted per series
    #[arg(long, default_value = "impressions")]
    metric: MetricField,

    /// Suppress the synthesized "Combined Total" column
    #[arg(long, default_value_t = false)]
    no_combined_total: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Output file (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum OutputFormat {
    Json,
    Csv,
}

fn main() -> anyhow::Result<()> {
    // Diagnostics go to stderr; stdout carries the data output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trendlens=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });

    let include_total = !cli.no_combined_total && config.export.combined_total;

    // Trend: named payloads → per-series regrouping → combined table.
    let mut table = None;
    let mut trend_points: Vec<TimePoint> = Vec::new();
    if let Some(path) = &cli.trend {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading trend payload {}", path.display()))?;
        let payloads: BTreeMap<String, TrendPayload> =
            serde_json::from_str(&raw).context("parsing trend payload")?;

        let series: Vec<_> = payloads
            .iter()
            .map(|(name, payload)| series_from_payload(name, payload))
            .collect();
        info!(series = series.len(), interval = ?cli.interval, "combining trend series");

        // Cross-campaign trend for the export sheet: all points regrouped
        // together at the same interval.
        let all_points: Vec<TimePoint> = series
            .iter()
            .flat_map(|s| s.points.iter().cloned())
            .collect();
        trend_points = interval::aggregate(&all_points, cli.interval);

        table = Some(combine_at(&series, cli.interval, cli.metric, include_total));
    }

    // Breakdown: wire rows → ranked percentage entries.
    let mut breakdown_entries = None;
    if let Some(path) = &cli.breakdown {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading breakdown payload {}", path.display()))?;
        let records: Vec<BreakdownRecord> =
            serde_json::from_str(&raw).context("parsing breakdown payload")?;
        let rows: Vec<_> = records
            .into_iter()
            .map(|r| r.into_row(cli.dimension))
            .collect();
        info!(rows = rows.len(), dimension = cli.dimension.as_str(), "aggregating breakdown");
        breakdown_entries = Some(aggregate_breakdown(&rows, cli.dimension));
    }

    let totals = metrics::summarize(&trend_points);

    let rendered = match cli.format {
        OutputFormat::Json => {
            let out = serde_json::json!({
                "overall": totals,
                "trend": table,
                "breakdown": breakdown_entries,
            });
            serde_json::to_string_pretty(&out)?
        }
        OutputFormat::Csv => {
            let breakdowns: Vec<_> = breakdown_entries
                .map(|entries| vec![(cli.dimension, entries)])
                .unwrap_or_default();
            let rows = ExportBuilder::new(&config).build(&totals, &breakdowns, &trend_points);
            to_csv(&rows)
        }
    };

    match &cli.output {
        Some(path) => std::fs::write(path, rendered)
            .with_context(|| format!("writing output {}", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}
