use std::collections::HashMap;
use std::sync::RwLock;

use stockroom_core::{ExpectedVersion, ProductId, Versioned};
use stockroom_inventory::{ProductStock, StockRecord};

use super::{RepositoryError, StockRepository};

#[derive(Debug, Default)]
struct Table {
    rows: Vec<ProductStock>,
    by_product: HashMap<ProductId, usize>,
}

/// In-memory product/stock table.
///
/// Intended for tests and local runs. Listing keeps insertion order.
#[derive(Debug, Default)]
pub struct InMemoryStockRepository {
    table: RwLock<Table>,
}

impl InMemoryStockRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: impl IntoIterator<Item = ProductStock>) -> Self {
        let repo = Self::new();
        if let Ok(mut table) = repo.table.write() {
            for item in items {
                Self::upsert(&mut table, item);
            }
        }
        repo
    }

    /// Inserts a product (and its record, if any), replacing an existing
    /// entry for the same product without any version check.
    pub fn insert(&self, item: ProductStock) -> Result<(), RepositoryError> {
        let mut table = self.table.write().map_err(|_| poisoned())?;
        Self::upsert(&mut table, item);
        Ok(())
    }

    fn upsert(table: &mut Table, item: ProductStock) {
        let product_id = item.product.product_id();
        match table.by_product.get(&product_id) {
            Some(&idx) => table.rows[idx] = item,
            None => {
                table.by_product.insert(product_id, table.rows.len());
                table.rows.push(item);
            }
        }
    }
}

fn poisoned() -> RepositoryError {
    RepositoryError::Unavailable("lock poisoned".to_string())
}

impl StockRepository for InMemoryStockRepository {
    fn list_stock_with_products(&self) -> Result<Vec<ProductStock>, RepositoryError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table.rows.clone())
    }

    fn find_by_product(
        &self,
        product_id: ProductId,
    ) -> Result<Option<ProductStock>, RepositoryError> {
        let table = self.table.read().map_err(|_| poisoned())?;
        Ok(table
            .by_product
            .get(&product_id)
            .map(|&idx| table.rows[idx].clone()))
    }

    fn persist(
        &self,
        record: &StockRecord,
        expected: ExpectedVersion,
    ) -> Result<(), RepositoryError> {
        let product_id = record.product_id();
        let mut table = self.table.write().map_err(|_| poisoned())?;
        let idx = *table
            .by_product
            .get(&product_id)
            .ok_or(RepositoryError::NotFound(product_id))?;

        let row = &mut table.rows[idx];
        let current = row.stock.as_ref().map(Versioned::version).unwrap_or(0);
        if !expected.matches(current) {
            return Err(RepositoryError::Conflict(format!(
                "expected {expected:?}, found {current}"
            )));
        }

        row.stock = Some(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::StockId;
    use stockroom_inventory::{Product, StockLevels, withdraw};

    fn stocked(name: &str, q: i64) -> ProductStock {
        let product = Product::new(ProductId::new(), name, "Dry goods", Utc::now()).unwrap();
        let stock = StockRecord::new(
            StockId::new(),
            product.product_id(),
            StockLevels::new(q, 10, 3),
            Utc::now(),
        )
        .unwrap();
        ProductStock::stocked(product, stock)
    }

    #[test]
    fn listing_keeps_insertion_order() {
        let repo = InMemoryStockRepository::with_items([
            stocked("Flour", 5),
            stocked("Sugar", 7),
            stocked("Salt", 9),
        ]);
        let names: Vec<_> = repo
            .list_stock_with_products()
            .unwrap()
            .into_iter()
            .map(|i| i.product.name().to_string())
            .collect();
        assert_eq!(names, ["Flour", "Sugar", "Salt"]);
    }

    #[test]
    fn persist_checks_the_stored_revision() {
        let item = stocked("Flour", 5);
        let product_id = item.product.product_id();
        let original = item.stock.clone().unwrap();
        let repo = InMemoryStockRepository::with_items([item]);

        let first = withdraw(Some(&original), 1, Utc::now()).unwrap();
        repo.persist(&first, ExpectedVersion::Exact(original.version()))
            .unwrap();

        // A second writer still holding the original revision loses.
        let stale = withdraw(Some(&original), 2, Utc::now()).unwrap();
        let err = repo
            .persist(&stale, ExpectedVersion::Exact(original.version()))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));

        let stored = repo.find_by_product(product_id).unwrap().unwrap();
        assert_eq!(stored.stock.unwrap().quantity(), 4);
    }

    #[test]
    fn persist_for_unknown_product_is_not_found() {
        let repo = InMemoryStockRepository::new();
        let record = stocked("Ghost", 1).stock.unwrap();
        let err = repo.persist(&record, ExpectedVersion::Any).unwrap_err();
        assert_eq!(err, RepositoryError::NotFound(record.product_id()));
        assert_eq!(
            stockroom_core::StockError::from(err),
            stockroom_core::StockError::StockNotFound
        );
    }

    #[test]
    fn insert_replaces_by_product() {
        let item = stocked("Flour", 5);
        let product = item.product.clone();
        let repo = InMemoryStockRepository::with_items([item]);
        repo.insert(ProductStock::unstocked(product.clone())).unwrap();

        let all = repo.list_stock_with_products().unwrap();
        assert_eq!(all.len(), 1);
        assert!(all[0].stock.is_none());
    }
}
