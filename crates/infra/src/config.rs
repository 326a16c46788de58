use serde::{Deserialize, Serialize};

use stockroom_inventory::ThresholdPolicy;
use stockroom_reporting::{ReportConfig, ReportExporter};

/// Environment variable switching threshold enforcement on threshold edits.
pub const ENFORCE_THRESHOLDS_ENV: &str = "STOCKROOM_ENFORCE_THRESHOLDS";

/// Settings for [`crate::StockService`] and the report exporter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub reports: ReportConfig,
    /// When false, threshold edits may store `emergency > minimum`; such
    /// records then classify as a data error.
    pub enforce_thresholds: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            reports: ReportConfig::default(),
            enforce_thresholds: true,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        let enforce_thresholds = std::env::var(ENFORCE_THRESHOLDS_ENV)
            .ok()
            .and_then(|raw| parse_flag(&raw))
            .unwrap_or(true);
        Self {
            reports: ReportConfig::from_env(),
            enforce_thresholds,
        }
    }

    pub fn exporter(&self) -> ReportExporter {
        ReportExporter::new(self.reports.clone())
    }

    pub fn threshold_policy(&self) -> ThresholdPolicy {
        if self.enforce_thresholds {
            ThresholdPolicy::Enforce
        } else {
            ThresholdPolicy::Lenient
        }
    }
}

/// Unrecognized values yield `None` so the default applies.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
