//! Stock service: loads from the repository, applies the inventory rules and
//! writes the result back.
//!
//! Every change to a stock record runs as read-check-write under a lock held
//! for that product only, and the write carries the revision that was read.
//! A store shared with other writers (another process, a second service
//! instance) therefore still rejects a stale write with
//! [`StockError::ConcurrentModification`] instead of losing an update.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use stockroom_core::{ExpectedVersion, ProductId, StockError, StockResult, Versioned};
use stockroom_inventory::{
    ForecastItem, ProductStock, StockAlert, StockLevels, StockRecord, StockStatus,
    check_consistency, ensure_positive_amount, generate_alerts, parse_quantity,
};
use stockroom_observability::StockMetrics;

use crate::config::EngineConfig;
use crate::repository::StockRepository;

/// Called with every record the service has just persisted.
pub type StockObserver = Box<dyn Fn(&StockRecord) + Send + Sync>;

pub struct StockService<R> {
    repository: R,
    config: EngineConfig,
    metrics: StockMetrics,
    record_locks: Mutex<HashMap<ProductId, Arc<Mutex<()>>>>,
    observer: Option<StockObserver>,
}

impl<R> StockService<R> {
    pub fn new(repository: R, config: EngineConfig) -> Self {
        Self {
            repository,
            config,
            metrics: StockMetrics::new(),
            record_locks: Mutex::new(HashMap::new()),
            observer: None,
        }
    }

    /// Registers the single observer notified after each successful change.
    pub fn with_observer(mut self, observer: impl Fn(&StockRecord) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn metrics(&self) -> &StockMetrics {
        &self.metrics
    }

    /// Runs `f` while holding the lock of `product_id`.
    ///
    /// The lock entry lives only while some caller holds or waits for it, so
    /// the table never grows past the number of products in flight.
    fn with_record_lock<T>(
        &self,
        product_id: ProductId,
        f: impl FnOnce() -> StockResult<T>,
    ) -> StockResult<T> {
        let lock = {
            let mut locks = self
                .record_locks
                .lock()
                .map_err(|_| StockError::storage("record lock table poisoned"))?;
            Arc::clone(locks.entry(product_id).or_default())
        };

        let result = match lock.lock() {
            Ok(_guard) => f(),
            Err(_) => Err(StockError::storage("record lock poisoned")),
        };
        self.release_record_lock(product_id, lock);
        result
    }

    // Our handle is dropped under the table lock; whoever sees the last
    // remaining reference (the table's) removes the entry.
    fn release_record_lock(&self, product_id: ProductId, lock: Arc<Mutex<()>>) {
        let Ok(mut locks) = self.record_locks.lock() else {
            return;
        };
        drop(lock);
        if locks
            .get(&product_id)
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(&product_id);
        }
    }
}

impl<R: StockRepository> StockService<R> {
    /// Every product with its stock record.
    ///
    /// Records with `emergency > minimum` are returned as stored; each one is
    /// logged and counted.
    pub fn list(&self) -> StockResult<Vec<ProductStock>> {
        let items = self.repository.list_stock_with_products()?;
        for record in items.iter().filter_map(|item| item.stock.as_ref()) {
            self.audit(record);
        }
        Ok(items)
    }

    /// Status of every product, in listing order.
    pub fn statuses(&self) -> StockResult<Vec<(ProductId, StockStatus)>> {
        Ok(self
            .list()?
            .iter()
            .map(|item| {
                let status = match &item.stock {
                    Some(stock) => stockroom_inventory::classify(stock),
                    None => StockStatus::for_missing_record(),
                };
                (item.product.product_id(), status)
            })
            .collect())
    }

    /// Alerts for every product below its minimum, in listing order.
    pub fn alerts(&self) -> StockResult<Vec<StockAlert>> {
        let items = self.list()?;
        let alerts: Vec<_> = generate_alerts(&items).collect();
        debug!(products = items.len(), alerts = alerts.len(), "alerts computed");
        Ok(alerts)
    }

    pub fn forecast(&self) -> StockResult<Vec<ForecastItem>> {
        let items = self.list()?;
        let lines = stockroom_inventory::forecast(&items);
        debug!(products = items.len(), lines = lines.len(), "forecast computed");
        Ok(lines)
    }

    pub fn withdraw(&self, product_id: ProductId, amount: i64) -> StockResult<StockRecord> {
        let result = ensure_positive_amount("withdrawal", amount).and_then(|()| {
            self.apply(product_id, |current, at| {
                stockroom_inventory::withdraw(current, amount, at)
            })
        });
        match &result {
            Ok(record) => {
                self.metrics.record_withdrawal();
                info!(
                    product_id = %product_id,
                    amount,
                    remaining = record.quantity(),
                    "stock withdrawn"
                );
            }
            Err(err) => {
                if !err.is_retryable() {
                    self.metrics.record_rejected_withdrawal();
                }
                warn!(product_id = %product_id, amount, error = %err, "withdrawal rejected");
            }
        }
        result
    }

    /// Withdraws an amount typed by the operator.
    pub fn withdraw_text(&self, product_id: ProductId, amount: &str) -> StockResult<StockRecord> {
        match parse_quantity(amount) {
            Ok(amount) => self.withdraw(product_id, amount),
            Err(err) => {
                self.metrics.record_rejected_withdrawal();
                warn!(product_id = %product_id, input = amount, error = %err, "withdrawal rejected");
                Err(err)
            }
        }
    }

    pub fn restock(&self, product_id: ProductId, amount: i64) -> StockResult<StockRecord> {
        let result = ensure_positive_amount("restock", amount).and_then(|()| {
            self.apply(product_id, |current, at| {
                stockroom_inventory::restock(current, amount, at)
            })
        });
        match &result {
            Ok(record) => info!(
                product_id = %product_id,
                amount,
                quantity = record.quantity(),
                "stock received"
            ),
            Err(err) => warn!(product_id = %product_id, amount, error = %err, "restock rejected"),
        }
        result
    }

    /// Replaces quantity and thresholds, honouring the configured
    /// threshold policy.
    pub fn update_levels(
        &self,
        product_id: ProductId,
        levels: StockLevels,
    ) -> StockResult<StockRecord> {
        let policy = self.config.threshold_policy();
        let result = self.apply(product_id, |current, at| {
            let current = current.ok_or(StockError::StockNotFound)?;
            stockroom_inventory::update_levels(current, levels, policy, at)
        });
        match &result {
            Ok(record) => {
                info!(product_id = %product_id, ?levels, "stock levels updated");
                self.audit(record);
            }
            Err(err) => warn!(product_id = %product_id, ?levels, error = %err, "level update rejected"),
        }
        result
    }

    /// Read-check-write of one record under its product lock, then the
    /// observer, once the lock is released.
    fn apply<F>(&self, product_id: ProductId, change: F) -> StockResult<StockRecord>
    where
        F: FnOnce(Option<&StockRecord>, DateTime<Utc>) -> StockResult<StockRecord>,
    {
        let updated =
            self.with_record_lock(product_id, || self.read_check_write(product_id, change))?;

        if let Some(observer) = &self.observer {
            observer(&updated);
        }
        Ok(updated)
    }

    fn read_check_write<F>(&self, product_id: ProductId, change: F) -> StockResult<StockRecord>
    where
        F: FnOnce(Option<&StockRecord>, DateTime<Utc>) -> StockResult<StockRecord>,
    {
        let current = self
            .repository
            .find_by_product(product_id)?
            .and_then(|item| item.stock);
        let updated = change(current.as_ref(), Utc::now())?;

        let expected = match &current {
            Some(record) => ExpectedVersion::Exact(record.version()),
            None => ExpectedVersion::Any,
        };
        if let Err(err) = self.repository.persist(&updated, expected) {
            let err = StockError::from(err);
            if err.is_retryable() {
                self.metrics.record_conflict();
                warn!(product_id = %product_id, error = %err, "stock write lost a race");
            }
            return Err(err);
        }
        Ok(updated)
    }

    fn audit(&self, record: &StockRecord) {
        if let Err(err) = check_consistency(record) {
            self.metrics.record_invariant_violation();
            warn!(
                stock_id = %record.stock_id(),
                product_id = %record.product_id(),
                error = %err,
                "inconsistent stock thresholds"
            );
        }
    }
}
