//! Export-side of the analytics engine — flattens aggregated structures into
//! rank-ordered tabular rows for CSV export, backed by cached reference
//! catalogs.

pub mod catalog;
pub mod export;

pub use catalog::CatalogService;
pub use export::{to_csv, to_json, ExportBuilder, ExportRow};
