use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Environment variable overriding [`ReportConfig::reports_dir`].
pub const REPORTS_DIR_ENV: &str = "STOCKROOM_REPORTS_DIR";

/// Where reports are written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Created on first export if missing.
    pub reports_dir: PathBuf,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl ReportConfig {
    pub fn new(reports_dir: impl Into<PathBuf>) -> Self {
        Self {
            reports_dir: reports_dir.into(),
        }
    }

    /// Defaults, with `STOCKROOM_REPORTS_DIR` applied when set and non-blank.
    pub fn from_env() -> Self {
        match std::env::var(REPORTS_DIR_ENV) {
            Ok(dir) if !dir.trim().is_empty() => Self::new(dir.trim()),
            _ => Self::default(),
        }
    }
}
