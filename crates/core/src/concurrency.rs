//! Optimistic concurrency expectation for single-row writes.

use crate::error::{StockError, StockResult};

/// What the writer believes the stored revision to be.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ExpectedVersion {
    /// Skip the check (seeding, administrative overwrites).
    Any,
    /// Require the stored row to be at exactly this revision.
    Exact(u64),
}

impl ExpectedVersion {
    pub fn matches(self, actual: u64) -> bool {
        match self {
            ExpectedVersion::Any => true,
            ExpectedVersion::Exact(v) => v == actual,
        }
    }

    /// Fails with [`StockError::ConcurrentModification`] when the stored
    /// revision moved underneath the writer.
    pub fn check(self, actual: u64) -> StockResult<()> {
        if self.matches(actual) {
            Ok(())
        } else {
            Err(StockError::concurrent(format!(
                "stock record changed concurrently (expected: {self:?}, actual: {actual})"
            )))
        }
    }
}
