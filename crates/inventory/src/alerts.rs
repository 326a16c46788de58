//! Low-stock warnings over a product collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{ProductId, StockId};

use crate::product::ProductStock;

/// How urgent a low-stock warning is.
///
/// `Emergency` sorts before `Minimum`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertPriority {
    Emergency,
    Minimum,
}

impl AlertPriority {
    pub fn label(self) -> &'static str {
        match self {
            AlertPriority::Emergency => "Emergency",
            AlertPriority::Minimum => "Minimum",
        }
    }
}

impl core::fmt::Display for AlertPriority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// A product whose on-hand quantity fell below its reorder point.
///
/// Derived value: it copies what it needs from the product and its stock
/// record and holds no reference back to either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub product_id: ProductId,
    pub stock_id: StockId,
    pub product_name: String,
    pub brand: Option<String>,
    pub category: String,
    pub product_created_at: DateTime<Utc>,
    pub quantity: i64,
    pub minimum: i64,
    pub emergency: i64,
    /// `minimum - quantity`, always positive.
    pub deficit: i64,
    pub priority: AlertPriority,
    /// Last stock update, or the record's creation if it was never updated.
    pub reference_at: DateTime<Utc>,
    pub message: String,
}

impl StockAlert {
    /// Reference day as `dd/mm/yyyy`.
    pub fn date(&self) -> String {
        self.reference_at.format("%d/%m/%Y").to_string()
    }

    /// Reference time as `HH:MM`.
    pub fn time(&self) -> String {
        self.reference_at.format("%H:%M").to_string()
    }

    /// `"<deficit> / <minimum>"`, the "units to minimum" column.
    pub fn shortfall(&self) -> String {
        format!("{} / {}", self.deficit, self.minimum)
    }
}

/// Lazily derives alerts for every stocked product below its minimum.
///
/// Products without a stock record are skipped. Output follows input order;
/// see [`sort_by_priority`] for an emergency-first ordering.
pub fn generate_alerts(items: &[ProductStock]) -> impl Iterator<Item = StockAlert> + '_ {
    items.iter().filter_map(|item| {
        let stock = item.stock.as_ref()?;
        if stock.quantity() >= stock.minimum() {
            return None;
        }

        let product = &item.product;
        let deficit = stock.minimum() - stock.quantity();
        let priority = if stock.quantity() < stock.emergency() {
            AlertPriority::Emergency
        } else {
            AlertPriority::Minimum
        };

        Some(StockAlert {
            product_id: product.product_id(),
            stock_id: stock.stock_id(),
            product_name: product.name().to_string(),
            brand: product.brand().map(str::to_string),
            category: product.category().to_string(),
            product_created_at: product.created_at(),
            quantity: stock.quantity(),
            minimum: stock.minimum(),
            emergency: stock.emergency(),
            deficit,
            priority,
            reference_at: stock.last_touched(),
            message: format!(
                "{} is {} unit(s) below the minimum ({})",
                product.name(),
                deficit,
                stock.minimum()
            ),
        })
    })
}

/// Stable sort: emergencies first, input order kept within a priority.
pub fn sort_by_priority(alerts: &mut [StockAlert]) {
    alerts.sort_by_key(|a| a.priority);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::product::Product;
    use crate::stock::{StockLevels, StockRecord};

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 45, 0).unwrap()
    }

    fn item(name: &str, q: i64, m: i64, e: i64) -> ProductStock {
        let product = Product::new(ProductId::new(), name, "Dry goods", created()).unwrap();
        let stock = StockRecord::new(
            StockId::new(),
            product.product_id(),
            StockLevels::new(q, m, e),
            created(),
        )
        .unwrap();
        ProductStock::stocked(product, stock)
    }

    #[test]
    fn only_items_below_minimum_are_reported() {
        let items = vec![
            item("Rice", 10, 10, 3),
            item("Beans", 5, 10, 3),
            item("Oil", 25, 10, 3),
            ProductStock::unstocked(
                Product::new(ProductId::new(), "Salt", "Dry goods", created()).unwrap(),
            ),
        ];

        let alerts: Vec<_> = generate_alerts(&items).collect();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].product_name, "Beans");
        assert_eq!(alerts[0].deficit, 5);
        assert_eq!(alerts[0].priority, AlertPriority::Minimum);
        assert_eq!(
            alerts[0].message,
            "Beans is 5 unit(s) below the minimum (10)"
        );
    }

    #[test]
    fn below_emergency_is_an_emergency() {
        let items = vec![item("Flour", 2, 10, 3), item("Sugar", 3, 10, 3)];
        let alerts: Vec<_> = generate_alerts(&items).collect();
        assert_eq!(alerts[0].priority, AlertPriority::Emergency);
        assert_eq!(alerts[0].deficit, 8);
        // quantity == emergency is not yet an emergency.
        assert_eq!(alerts[1].priority, AlertPriority::Minimum);
    }

    #[test]
    fn reference_time_falls_back_to_creation_and_is_split_for_display() {
        let items = vec![item("Yeast", 1, 4, 2)];
        let alert = generate_alerts(&items).next().unwrap();
        assert_eq!(alert.reference_at, created());
        assert_eq!(alert.date(), "17/05/2024");
        assert_eq!(alert.time(), "09:45");
        assert_eq!(alert.shortfall(), "3 / 4");
    }

    #[test]
    fn sort_by_priority_is_stable() {
        let items = vec![
            item("A", 5, 10, 3),
            item("B", 1, 10, 3),
            item("C", 6, 10, 3),
            item("D", 0, 10, 3),
        ];
        let mut alerts: Vec<_> = generate_alerts(&items).collect();
        sort_by_priority(&mut alerts);
        let names: Vec<_> = alerts.iter().map(|a| a.product_name.as_str()).collect();
        assert_eq!(names, ["B", "D", "A", "C"]);
    }

    #[test]
    fn each_call_recomputes() {
        let items = vec![item("Milk", 1, 2, 0)];
        assert_eq!(generate_alerts(&items).count(), 1);
        assert_eq!(generate_alerts(&items).count(), 1);
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            #[test]
            fn alerts_never_include_stock_at_or_above_minimum(
                rows in prop::collection::vec(
                    (0i64..200, 0i64..100).prop_flat_map(|(q, m)| (Just(q), Just(m), 0..=m)),
                    0..30,
                )
            ) {
                let items: Vec<_> = rows
                    .iter()
                    .map(|(q, m, e)| item("P", *q, *m, *e))
                    .collect();

                let expected = rows.iter().filter(|(q, m, _)| q < m).count();
                let alerts: Vec<_> = generate_alerts(&items).collect();
                prop_assert_eq!(alerts.len(), expected);

                for alert in &alerts {
                    prop_assert!(alert.quantity < alert.minimum);
                    prop_assert_eq!(alert.deficit, alert.minimum - alert.quantity);
                    prop_assert!(alert.deficit > 0);
                }
            }
        }
    }
}
