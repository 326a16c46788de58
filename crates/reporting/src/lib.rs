//! CSV reports for stock alerts, purchase forecasts and the stock listing.
//!
//! The header rows and column order are consumed by spreadsheets downstream
//! and must stay byte-stable.

pub mod config;
pub mod error;
pub mod exporter;
pub mod format;

pub use config::ReportConfig;
pub use error::ReportError;
pub use exporter::{ExportSummary, ReportExporter, ReportKind, outcome_message, read_report};
pub use format::{ALERTS_HEADER, FORECAST_HEADER, FORECAST_SUPPLIERS_COLUMN, escape_text};
