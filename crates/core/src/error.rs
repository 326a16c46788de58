//! Stock-domain error taxonomy.

use thiserror::Error;

/// Result type used across the stock domain.
pub type StockResult<T> = Result<T, StockError>;

/// Recoverable failures of the replenishment engine.
///
/// Every variant is an expected outcome at the call boundary. The caller
/// decides how to present it; none of them should terminate the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StockError {
    /// Non-positive, negative or unparseable quantity.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    /// The referenced product has no stock record.
    #[error("stock record not found")]
    StockNotFound,

    /// Withdrawal exceeds the on-hand quantity.
    #[error("insufficient stock: requested {requested}, available {available}")]
    InsufficientStock { requested: i64, available: i64 },

    /// The row changed between read and write. Safe to retry.
    #[error("concurrent modification: {0}")]
    ConcurrentModification(String),

    /// Thresholds violate `emergency <= minimum` (or another record invariant).
    #[error("data invariant violated: {0}")]
    DataInvariantViolation(String),

    /// Malformed descriptive input (empty product name and the like).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier failed to parse.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// The persistence collaborator could not serve the request.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl StockError {
    pub fn invalid_quantity(msg: impl Into<String>) -> Self {
        Self::InvalidQuantity(msg.into())
    }

    pub fn concurrent(msg: impl Into<String>) -> Self {
        Self::ConcurrentModification(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::DataInvariantViolation(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageUnavailable(msg.into())
    }

    pub fn insufficient(requested: i64, available: i64) -> Self {
        Self::InsufficientStock {
            requested,
            available,
        }
    }

    /// Only optimistic-concurrency conflicts can succeed on a plain retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentModification(_))
    }
}
