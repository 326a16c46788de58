use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use stockroom_inventory::{ForecastItem, ProductStock, StockAlert};

use crate::config::ReportConfig;
use crate::error::ReportError;
use crate::format::{
    ALERTS_HEADER, FORECAST_HEADER, FORECAST_SUPPLIERS_COLUMN, alert_row, forecast_row,
    header_row, stock_row,
};

/// Which report a file holds; also the file name prefix.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    StockAlerts,
    PurchaseForecast,
    Stock,
}

impl ReportKind {
    pub fn prefix(self) -> &'static str {
        match self {
            ReportKind::StockAlerts => "stock_alerts",
            ReportKind::PurchaseForecast => "purchase_forecast",
            ReportKind::Stock => "stock",
        }
    }

    /// `<prefix>_<yyyy-mm-dd_HH-MM-SS-mmm>.csv`
    pub fn file_name(self, at: DateTime<Utc>) -> String {
        self.numbered_file_name(at, 0)
    }

    /// Like [`ReportKind::file_name`], with `_<n>` before the extension for
    /// `n > 0`. Used when an earlier report already took the plain name.
    pub fn numbered_file_name(self, at: DateTime<Utc>, n: u32) -> String {
        let stamp = at.format("%Y-%m-%d_%H-%M-%S-%3f");
        if n == 0 {
            format!("{}_{}.csv", self.prefix(), stamp)
        } else {
            format!("{}_{}_{}.csv", self.prefix(), stamp, n)
        }
    }
}

/// A report that was written successfully.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub kind: ReportKind,
    pub path: PathBuf,
    /// Data rows, header excluded.
    pub rows: usize,
}

impl core::fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "CSV report generated at {} ({} item(s) exported)",
            self.path.display(),
            self.rows
        )
    }
}

/// Text to show the operator for an export attempt, whatever its outcome.
pub fn outcome_message(outcome: &Result<ExportSummary, ReportError>) -> String {
    match outcome {
        Ok(summary) => summary.to_string(),
        Err(err) => format!("Failed to generate CSV report: {err}"),
    }
}

/// Writes CSV reports into the configured reports directory.
#[derive(Debug, Clone, Default)]
pub struct ReportExporter {
    config: ReportConfig,
}

impl ReportExporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    pub fn export_alerts(&self, alerts: &[StockAlert]) -> Result<ExportSummary, ReportError> {
        self.export_alerts_at(alerts, Utc::now())
    }

    pub fn export_alerts_at(
        &self,
        alerts: &[StockAlert],
        at: DateTime<Utc>,
    ) -> Result<ExportSummary, ReportError> {
        let rows = alerts.iter().map(alert_row);
        self.write(ReportKind::StockAlerts, header_row(&ALERTS_HEADER), rows, at)
    }

    /// Adds the supplier column when at least one item carries supplier text.
    pub fn export_forecast(&self, items: &[ForecastItem]) -> Result<ExportSummary, ReportError> {
        self.export_forecast_at(items, Utc::now())
    }

    pub fn export_forecast_at(
        &self,
        items: &[ForecastItem],
        at: DateTime<Utc>,
    ) -> Result<ExportSummary, ReportError> {
        let with_suppliers = items.iter().any(|i| i.suppliers.is_some());
        let mut header = header_row(&FORECAST_HEADER);
        if with_suppliers {
            header.push(FORECAST_SUPPLIERS_COLUMN.to_string());
        }
        let rows = items.iter().map(|i| forecast_row(i, with_suppliers));
        self.write(ReportKind::PurchaseForecast, header, rows, at)
    }

    /// Full stock listing, one row per product, in the alert report layout.
    pub fn export_stock(&self, items: &[ProductStock]) -> Result<ExportSummary, ReportError> {
        self.export_stock_at(items, Utc::now())
    }

    pub fn export_stock_at(
        &self,
        items: &[ProductStock],
        at: DateTime<Utc>,
    ) -> Result<ExportSummary, ReportError> {
        let rows = items.iter().map(stock_row);
        self.write(ReportKind::Stock, header_row(&ALERTS_HEADER), rows, at)
    }

    fn write<I>(
        &self,
        kind: ReportKind,
        header: Vec<String>,
        rows: I,
        at: DateTime<Utc>,
    ) -> Result<ExportSummary, ReportError>
    where
        I: Iterator<Item = Vec<String>>,
    {
        let result = self.write_file(kind, header, rows, at);
        match &result {
            Ok(summary) => info!(
                report = kind.prefix(),
                path = %summary.path.display(),
                rows = summary.rows,
                "report exported"
            ),
            Err(err) => warn!(report = kind.prefix(), error = %err, "report export failed"),
        }
        result
    }

    fn write_file<I>(
        &self,
        kind: ReportKind,
        header: Vec<String>,
        rows: I,
        at: DateTime<Utc>,
    ) -> Result<ExportSummary, ReportError>
    where
        I: Iterator<Item = Vec<String>>,
    {
        let dir = &self.config.reports_dir;
        fs::create_dir_all(dir).map_err(|source| ReportError::CreateDir {
            path: dir.clone(),
            source,
        })?;

        let (path, file) = create_report_file(dir, kind, at)?;
        let write_err = |source| ReportError::Write {
            path: path.clone(),
            source,
        };

        // Fields arrive already escaped, so the writer must not quote again.
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .quote_style(csv::QuoteStyle::Never)
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(file);

        writer.write_record(&header).map_err(write_err)?;
        let mut count = 0usize;
        for row in rows {
            writer.write_record(&row).map_err(write_err)?;
            count += 1;
        }
        writer.flush().map_err(|source| ReportError::Flush {
            path: path.clone(),
            source,
        })?;

        Ok(ExportSummary {
            kind,
            path,
            rows: count,
        })
    }
}

/// Upper bound on `_<n>` suffixes tried for one timestamp.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// Creates a fresh report file, never reusing an existing one.
fn create_report_file(
    dir: &Path,
    kind: ReportKind,
    at: DateTime<Utc>,
) -> Result<(PathBuf, File), ReportError> {
    let mut n = 0;
    loop {
        let path = dir.join(kind.numbered_file_name(at, n));
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && n < MAX_NAME_ATTEMPTS => {
                n += 1;
            }
            Err(source) => return Err(ReportError::CreateFile { path, source }),
        }
    }
}

/// Reads a report back as raw field values, header row included.
pub fn read_report(path: &Path) -> Result<Vec<Vec<String>>, ReportError> {
    let read_err = |source| ReportError::Read {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(read_err)?;

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(read_err)?;
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn file_names_are_timestamped_and_filesystem_safe() {
        let at = Utc.with_ymd_and_hms(2024, 7, 3, 14, 5, 9).unwrap();
        let name = ReportKind::PurchaseForecast.file_name(at);
        assert_eq!(name, "purchase_forecast_2024-07-03_14-05-09-000.csv");
        assert!(!name.contains(':'));
        assert!(ReportKind::StockAlerts.file_name(at).starts_with("stock_alerts_"));
    }

    #[test]
    fn numbered_names_keep_prefix_and_stamp() {
        let at = Utc.with_ymd_and_hms(2024, 7, 3, 14, 5, 9).unwrap();
        assert_eq!(
            ReportKind::Stock.numbered_file_name(at, 0),
            ReportKind::Stock.file_name(at)
        );
        assert_eq!(
            ReportKind::Stock.numbered_file_name(at, 2),
            "stock_2024-07-03_14-05-09-000_2.csv"
        );
    }

    #[test]
    fn outcome_message_describes_success_and_failure() {
        let ok = Ok(ExportSummary {
            kind: ReportKind::Stock,
            path: PathBuf::from("reports/stock.csv"),
            rows: 3,
        });
        assert_eq!(
            outcome_message(&ok),
            "CSV report generated at reports/stock.csv (3 item(s) exported)"
        );

        let err = Err(ReportError::CreateDir {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        let msg = outcome_message(&err);
        assert!(msg.starts_with("Failed to generate CSV report"));
        assert!(msg.contains("/nope"));
    }
}
