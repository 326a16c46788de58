//! Stock status & replenishment domain.
//!
//! Business rules for food-service stock levels, implemented purely as
//! deterministic domain logic (no IO, no storage). Callers load
//! [`ProductStock`] pairs from a persistence collaborator, derive alerts and
//! purchase forecasts from them, and apply withdrawals/restocks that return
//! the updated [`StockRecord`] for the collaborator to persist.

pub mod alerts;
pub mod forecast;
pub mod product;
pub mod status;
pub mod stock;
pub mod withdrawal;

pub use alerts::{AlertPriority, StockAlert, generate_alerts, sort_by_priority};
pub use forecast::{
    ForecastFilter, ForecastItem, Urgency, categories, forecast, quantity_to_buy, shopping_list,
    urgency,
};
pub use product::{Product, ProductStock};
pub use status::{StockStatus, check_consistency, classify, classify_levels};
pub use stock::{StockLevels, StockRecord, StockSnapshot, ThresholdPolicy};
pub use withdrawal::{ensure_positive_amount, parse_quantity, restock, update_levels, withdraw};
