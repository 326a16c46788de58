use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, ProductId, StockError, StockId, StockResult, Versioned};

/// Quantity/threshold triple of a stock record.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StockLevels {
    /// On-hand count.
    pub quantity: i64,
    /// Reorder point.
    pub minimum: i64,
    /// Critical point, expected to sit at or below `minimum`.
    pub emergency: i64,
}

impl StockLevels {
    pub fn new(quantity: i64, minimum: i64, emergency: i64) -> Self {
        Self {
            quantity,
            minimum,
            emergency,
        }
    }

    /// Rejects negative values. All three fields are counts.
    pub fn ensure_non_negative(&self) -> StockResult<()> {
        for (field, value) in [
            ("quantity", self.quantity),
            ("minimum", self.minimum),
            ("emergency", self.emergency),
        ] {
            if value < 0 {
                return Err(StockError::invalid_quantity(format!(
                    "{field} cannot be negative (got {value})"
                )));
            }
        }
        Ok(())
    }

    pub fn thresholds_consistent(&self) -> bool {
        self.emergency <= self.minimum
    }

    pub fn ensure_thresholds(&self) -> StockResult<()> {
        if self.thresholds_consistent() {
            Ok(())
        } else {
            Err(StockError::invariant(format!(
                "emergency threshold ({}) exceeds minimum threshold ({})",
                self.emergency, self.minimum
            )))
        }
    }
}

/// Whether threshold edits must keep `emergency <= minimum`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdPolicy {
    /// Reject inconsistent thresholds with `DataInvariantViolation`.
    #[default]
    Enforce,
    /// Store them as given; the classifier reports them as a data error.
    Lenient,
}

/// Stock record attached one-to-one to a product.
///
/// Fields are private; quantity and threshold changes go through
/// [`crate::withdrawal`], which keeps `quantity >= 0` and stamps `updated_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StockSnapshot", into = "StockSnapshot")]
pub struct StockRecord {
    id: StockId,
    product_id: ProductId,
    levels: StockLevels,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
    version: u64,
}

/// Plain, serializable view of a stored stock row.
///
/// Used when a record crosses the persistence boundary in either direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub id: StockId,
    pub product_id: ProductId,
    pub quantity: i64,
    pub minimum: i64,
    pub emergency: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub version: u64,
}

impl StockRecord {
    /// Creates the record for a product that is stocked for the first time.
    ///
    /// Enforces every record invariant, including `emergency <= minimum`.
    pub fn new(
        id: StockId,
        product_id: ProductId,
        levels: StockLevels,
        created_at: DateTime<Utc>,
    ) -> StockResult<Self> {
        levels.ensure_non_negative()?;
        levels.ensure_thresholds()?;
        Ok(Self {
            id,
            product_id,
            levels,
            created_at,
            updated_at: None,
            version: 1,
        })
    }

    /// Rebuilds a record read back from storage.
    ///
    /// Negative counts are still rejected, but thresholds are taken as stored:
    /// rows written before enforcement existed may carry `emergency > minimum`,
    /// and the classifier is expected to flag them rather than this loader.
    pub fn restore(snapshot: StockSnapshot) -> StockResult<Self> {
        let levels = StockLevels::new(snapshot.quantity, snapshot.minimum, snapshot.emergency);
        levels.ensure_non_negative()?;
        Ok(Self {
            id: snapshot.id,
            product_id: snapshot.product_id,
            levels,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
            version: snapshot.version,
        })
    }

    pub fn snapshot(&self) -> StockSnapshot {
        StockSnapshot {
            id: self.id,
            product_id: self.product_id,
            quantity: self.levels.quantity,
            minimum: self.levels.minimum,
            emergency: self.levels.emergency,
            created_at: self.created_at,
            updated_at: self.updated_at,
            version: self.version,
        }
    }

    pub fn stock_id(&self) -> StockId {
        self.id
    }

    pub fn product_id(&self) -> ProductId {
        self.product_id
    }

    pub fn levels(&self) -> StockLevels {
        self.levels
    }

    pub fn quantity(&self) -> i64 {
        self.levels.quantity
    }

    pub fn minimum(&self) -> i64 {
        self.levels.minimum
    }

    pub fn emergency(&self) -> i64 {
        self.levels.emergency
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Most recent change, falling back to creation for never-updated rows.
    pub fn last_touched(&self) -> DateTime<Utc> {
        self.updated_at.unwrap_or(self.created_at)
    }

    /// Copy of this record carrying `levels`, stamped at `at` and one revision
    /// ahead. Validation is the caller's job.
    pub(crate) fn with_levels(&self, levels: StockLevels, at: DateTime<Utc>) -> Self {
        Self {
            levels,
            updated_at: Some(self.next_timestamp(at)),
            version: self.version + 1,
            ..self.clone()
        }
    }

    // Keeps `updated_at` strictly increasing even when the wall clock repeats
    // or steps backwards between two changes.
    fn next_timestamp(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let last = self.last_touched();
        if at > last {
            at
        } else {
            last + Duration::microseconds(1)
        }
    }
}

impl Entity for StockRecord {
    type Id = StockId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Versioned for StockRecord {
    fn version(&self) -> u64 {
        self.version
    }
}

impl TryFrom<StockSnapshot> for StockRecord {
    type Error = StockError;

    fn try_from(snapshot: StockSnapshot) -> Result<Self, Self::Error> {
        Self::restore(snapshot)
    }
}

impl From<StockRecord> for StockSnapshot {
    fn from(record: StockRecord) -> Self {
        record.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()
    }

    fn record(levels: StockLevels) -> StockResult<StockRecord> {
        StockRecord::new(StockId::new(), ProductId::new(), levels, at(8))
    }

    #[test]
    fn new_record_starts_at_revision_one_without_update_time() {
        let r = record(StockLevels::new(5, 10, 3)).unwrap();
        assert_eq!(r.version(), 1);
        assert_eq!(r.updated_at(), None);
        assert_eq!(r.last_touched(), at(8));
        assert_eq!(r.stock_id(), *Entity::id(&r));
    }

    #[test]
    fn new_rejects_negative_counts() {
        let err = record(StockLevels::new(-1, 10, 3)).unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity(_)));

        let err = record(StockLevels::new(1, -10, 0)).unwrap_err();
        assert!(matches!(err, StockError::InvalidQuantity(_)));
    }

    #[test]
    fn new_rejects_emergency_above_minimum() {
        let err = record(StockLevels::new(5, 3, 4)).unwrap_err();
        assert!(matches!(err, StockError::DataInvariantViolation(_)));
    }

    #[test]
    fn restore_accepts_inconsistent_thresholds_but_not_negative_quantity() {
        let ok = record(StockLevels::new(5, 10, 3)).unwrap();
        let mut snapshot = ok.snapshot();
        snapshot.emergency = 20;
        let restored = StockRecord::restore(snapshot.clone()).unwrap();
        assert_eq!(restored.emergency(), 20);

        snapshot.quantity = -2;
        assert!(StockRecord::restore(snapshot).is_err());
    }

    #[test]
    fn with_levels_moves_time_forward_even_for_stale_clock() {
        let r = record(StockLevels::new(5, 10, 3)).unwrap();
        let next = r.with_levels(StockLevels::new(4, 10, 3), at(7));
        assert!(next.updated_at().unwrap() > r.created_at());
        assert_eq!(next.version(), 2);
    }

    #[test]
    fn serde_goes_through_snapshot_validation() {
        let r = record(StockLevels::new(5, 10, 3)).unwrap();
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["quantity"], 5);
        let back: StockRecord = serde_json::from_value(json.clone()).unwrap();
        assert_eq!(back, r);

        let mut bad = json;
        bad["quantity"] = serde_json::json!(-1);
        assert!(serde_json::from_value::<StockRecord>(bad).is_err());
    }
}
