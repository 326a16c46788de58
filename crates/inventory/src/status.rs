//! Stock health classification.

use serde::{Deserialize, Serialize};

use stockroom_core::{StockError, StockResult};

use crate::stock::{StockLevels, StockRecord};

/// Five-level stock health, plus a fallback for inconsistent thresholds.
///
/// Numeric levels are part of the display contract: 0 Zeroed, 1 Emergency,
/// 2 Minimum, 3 Good, 4 Ideal, 5 Data error.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StockStatus {
    Zeroed,
    Emergency,
    Minimum,
    Good,
    Ideal,
    DataError,
}

impl StockStatus {
    pub fn level(self) -> u8 {
        match self {
            StockStatus::Zeroed => 0,
            StockStatus::Emergency => 1,
            StockStatus::Minimum => 2,
            StockStatus::Good => 3,
            StockStatus::Ideal => 4,
            StockStatus::DataError => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StockStatus::Zeroed => "Zeroed",
            StockStatus::Emergency => "Emergency",
            StockStatus::Minimum => "Minimum",
            StockStatus::Good => "Good",
            StockStatus::Ideal => "Ideal",
            StockStatus::DataError => "Data error",
        }
    }

    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(StockStatus::Zeroed),
            1 => Some(StockStatus::Emergency),
            2 => Some(StockStatus::Minimum),
            3 => Some(StockStatus::Good),
            4 => Some(StockStatus::Ideal),
            5 => Some(StockStatus::DataError),
            _ => None,
        }
    }

    /// Status shown for a product that has no stock record at all.
    pub fn for_missing_record() -> Self {
        StockStatus::Zeroed
    }
}

impl core::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

pub fn classify(record: &StockRecord) -> StockStatus {
    classify_levels(record.levels())
}

/// Classifies a quantity against its thresholds. First match wins.
///
/// The zero/ideal/good checks only involve `minimum`. Below the minimum the
/// emergency threshold decides, which is only meaningful while
/// `emergency <= minimum`; otherwise the record is reported as
/// [`StockStatus::DataError`].
///
/// Alert priority does not go through this function. It keeps the raw
/// `quantity < emergency` comparison, so a record with `q < m < e` classifies
/// as `DataError` here yet still raises an `Emergency` alert and is not
/// dropped from the alert list.
pub fn classify_levels(levels: StockLevels) -> StockStatus {
    let StockLevels {
        quantity,
        minimum,
        emergency,
    } = levels;

    if quantity == 0 {
        StockStatus::Zeroed
    } else if quantity >= minimum.saturating_mul(2) {
        StockStatus::Ideal
    } else if quantity >= minimum {
        StockStatus::Good
    } else if !levels.thresholds_consistent() {
        StockStatus::DataError
    } else if quantity >= emergency {
        StockStatus::Minimum
    } else {
        StockStatus::Emergency
    }
}

/// Like [`classify`], but turns the data-error fallback into
/// [`StockError::DataInvariantViolation`].
pub fn check_consistency(record: &StockRecord) -> StockResult<StockStatus> {
    match classify(record) {
        StockStatus::DataError => Err(StockError::invariant(format!(
            "stock record {} has emergency threshold {} above minimum {}",
            record.stock_id(),
            record.emergency(),
            record.minimum()
        ))),
        status => Ok(status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stockroom_core::{ProductId, StockId};

    fn levels(q: i64, m: i64, e: i64) -> StockLevels {
        StockLevels::new(q, m, e)
    }

    #[test]
    fn zero_quantity_is_zeroed_before_anything_else() {
        assert_eq!(classify_levels(levels(0, 10, 3)), StockStatus::Zeroed);
        assert_eq!(classify_levels(levels(0, 0, 0)), StockStatus::Zeroed);
        assert_eq!(classify_levels(levels(0, 3, 9)), StockStatus::Zeroed);
    }

    #[test]
    fn boundaries() {
        assert_eq!(classify_levels(levels(10, 10, 3)), StockStatus::Good);
        assert_eq!(classify_levels(levels(20, 10, 3)), StockStatus::Ideal);
        assert_eq!(classify_levels(levels(19, 10, 3)), StockStatus::Good);
        assert_eq!(classify_levels(levels(3, 10, 3)), StockStatus::Minimum);
        assert_eq!(classify_levels(levels(2, 10, 3)), StockStatus::Emergency);
    }

    #[test]
    fn zero_minimum_is_always_ideal_when_stocked() {
        assert_eq!(classify_levels(levels(1, 0, 0)), StockStatus::Ideal);
    }

    #[test]
    fn inconsistent_thresholds_below_minimum_are_a_data_error() {
        let status = classify_levels(levels(2, 5, 8));
        assert_eq!(status, StockStatus::DataError);
        assert_eq!(status.level(), 5);
        assert_eq!(status.label(), "Data error");

        // Above the minimum the emergency threshold plays no part.
        assert_eq!(classify_levels(levels(6, 5, 8)), StockStatus::Good);
    }

    #[test]
    fn check_consistency_reports_invariant_violation() {
        let snapshot = crate::stock::StockSnapshot {
            id: StockId::new(),
            product_id: ProductId::new(),
            quantity: 1,
            minimum: 4,
            emergency: 6,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        };
        let record = StockRecord::restore(snapshot).unwrap();
        let err = check_consistency(&record).unwrap_err();
        assert!(matches!(err, StockError::DataInvariantViolation(_)));
    }

    #[test]
    fn inverted_record_is_a_data_error_but_still_an_emergency_alert() {
        use crate::alerts::{AlertPriority, generate_alerts};
        use crate::product::{Product, ProductStock};

        let product = Product::new(ProductId::new(), "Cream", "Dairy", Utc::now()).unwrap();
        let snapshot = crate::stock::StockSnapshot {
            id: StockId::new(),
            product_id: product.product_id(),
            quantity: 2,
            minimum: 4,
            emergency: 6,
            created_at: Utc::now(),
            updated_at: None,
            version: 1,
        };
        let record = StockRecord::restore(snapshot).unwrap();
        assert_eq!(classify(&record), StockStatus::DataError);

        let items = [ProductStock::stocked(product, record)];
        let alerts: Vec<_> = generate_alerts(&items).collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].priority, AlertPriority::Emergency);
    }

    #[test]
    fn levels_and_labels_round_trip() {
        for level in 0..=5 {
            let status = StockStatus::from_level(level).unwrap();
            assert_eq!(status.level(), level);
        }
        assert_eq!(StockStatus::from_level(6), None);
        assert_eq!(StockStatus::Minimum.to_string(), "Minimum");
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 1000,
                ..ProptestConfig::default()
            })]

            /// Consistent thresholds never produce the data-error fallback.
            #[test]
            fn consistent_thresholds_classify_into_levels_zero_to_four(
                (minimum, emergency) in (0i64..500).prop_flat_map(|m| (Just(m), 0..=m)),
                quantity in 0i64..2000,
            ) {
                let status = classify_levels(StockLevels::new(quantity, minimum, emergency));
                prop_assert!(status.level() <= 4);
            }

            /// Level 5 only ever shows up with `emergency > minimum`.
            #[test]
            fn data_error_implies_inverted_thresholds(
                quantity in 0i64..2000,
                minimum in 0i64..500,
                emergency in 0i64..1000,
            ) {
                let status = classify_levels(StockLevels::new(quantity, minimum, emergency));
                if status == StockStatus::DataError {
                    prop_assert!(emergency > minimum);
                }
            }
        }
    }
}
