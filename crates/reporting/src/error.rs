use std::path::PathBuf;

use thiserror::Error;

/// Failure while producing a report file.
#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not create reports directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not create report {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not write report {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("could not flush report {}: {source}", .path.display())]
    Flush {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not read report {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

impl ReportError {
    /// File or directory the failed operation was working on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            ReportError::CreateDir { path, .. }
            | ReportError::CreateFile { path, .. }
            | ReportError::Write { path, .. }
            | ReportError::Flush { path, .. }
            | ReportError::Read { path, .. } => path,
        }
    }
}
