//! Persistence boundary for products and their stock records.

mod in_memory;

use std::sync::Arc;

use thiserror::Error;

use stockroom_core::{ExpectedVersion, ProductId, StockError};
use stockroom_inventory::{ProductStock, StockRecord};

pub use in_memory::InMemoryStockRepository;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// No stock record exists for the product being written.
    #[error("stock record not found for product {0}")]
    NotFound(ProductId),

    /// The stored revision differs from the one the writer read.
    #[error("concurrency conflict: {0}")]
    Conflict(String),

    /// The backing store failed (lock poisoned, connection lost, ...).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<RepositoryError> for StockError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(_) => StockError::StockNotFound,
            RepositoryError::Conflict(msg) => StockError::concurrent(msg),
            RepositoryError::Unavailable(msg) => StockError::storage(msg),
        }
    }
}

/// Where products and stock records live.
///
/// Writes are row-atomic: `persist` either stores the whole record or
/// nothing, and refuses the write when `expected` does not match the stored
/// revision.
pub trait StockRepository: Send + Sync {
    /// Every product paired with its stock record, unstocked ones included.
    fn list_stock_with_products(&self) -> Result<Vec<ProductStock>, RepositoryError>;

    fn find_by_product(&self, product_id: ProductId)
    -> Result<Option<ProductStock>, RepositoryError>;

    fn persist(
        &self,
        record: &StockRecord,
        expected: ExpectedVersion,
    ) -> Result<(), RepositoryError>;
}

impl<S> StockRepository for Arc<S>
where
    S: StockRepository + ?Sized,
{
    fn list_stock_with_products(&self) -> Result<Vec<ProductStock>, RepositoryError> {
        (**self).list_stock_with_products()
    }

    fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductStock>, RepositoryError> {
        (**self).find_by_product(product_id)
    }

    fn persist(
        &self,
        record: &StockRecord,
        expected: ExpectedVersion,
    ) -> Result<(), RepositoryError> {
        (**self).persist(record, expected)
    }
}
