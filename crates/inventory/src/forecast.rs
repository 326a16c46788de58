//! Purchase forecasting: how much to buy and how urgently.
//!
//! The urgency band here is measured as a fraction of the minimum threshold
//! and ignores the emergency threshold entirely. It is a separate scale from
//! [`crate::StockStatus`] and the two must not be mixed.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use stockroom_core::ProductId;

use crate::product::ProductStock;

/// Purchase urgency band.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Urgency {
    Critical,
    High,
    Medium,
    Low,
    Undefined,
}

impl Urgency {
    pub fn label(self) -> &'static str {
        match self {
            Urgency::Critical => "Critical",
            Urgency::High => "High",
            Urgency::Medium => "Medium",
            Urgency::Low => "Low",
            Urgency::Undefined => "Undefined",
        }
    }
}

impl core::fmt::Display for Urgency {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

/// Units needed to bring `quantity` back up to `minimum`.
///
/// Never negative, and zero for a non-positive minimum.
pub fn quantity_to_buy(quantity: i64, minimum: i64) -> i64 {
    if minimum <= 0 {
        return 0;
    }
    minimum.saturating_sub(quantity).max(0)
}

/// Urgency band of `quantity` relative to `minimum`. First match wins.
///
/// | condition                   | band      |
/// |-----------------------------|-----------|
/// | `minimum <= 0`              | Undefined |
/// | `quantity == 0`             | Critical  |
/// | `quantity < 30% of minimum` | High      |
/// | `quantity < 70% of minimum` | Medium    |
/// | otherwise                   | Low       |
pub fn urgency(quantity: i64, minimum: i64) -> Urgency {
    if minimum <= 0 {
        return Urgency::Undefined;
    }
    if quantity == 0 {
        return Urgency::Critical;
    }

    // Exact comparison: q < m * 3/10  <=>  10q < 3m.
    let q = i128::from(quantity) * 10;
    let m = i128::from(minimum);
    if q < m * 3 {
        Urgency::High
    } else if q < m * 7 {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}

/// One line of the purchase forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub product_id: ProductId,
    pub product_name: String,
    pub category: String,
    pub current_stock: i64,
    pub minimum_stock: i64,
    pub quantity_to_buy: i64,
    pub urgency: Urgency,
    /// Supplier availability text, filled in by the supplier module if present.
    pub suppliers: Option<String>,
}

impl ForecastItem {
    pub fn with_suppliers(mut self, suppliers: impl Into<String>) -> Self {
        self.suppliers = Some(suppliers.into());
        self
    }
}

/// Purchase forecast for every stocked product that needs buying.
///
/// Items with nothing to buy, and products without a stock record, are left
/// out. Input order is preserved.
pub fn forecast(items: &[ProductStock]) -> Vec<ForecastItem> {
    items
        .iter()
        .filter_map(|item| {
            let stock = item.stock.as_ref()?;
            let to_buy = quantity_to_buy(stock.quantity(), stock.minimum());
            if to_buy <= 0 {
                return None;
            }
            Some(ForecastItem {
                product_id: item.product.product_id(),
                product_name: item.product.name().to_string(),
                category: item.product.category().to_string(),
                current_stock: stock.quantity(),
                minimum_stock: stock.minimum(),
                quantity_to_buy: to_buy,
                urgency: urgency(stock.quantity(), stock.minimum()),
                suppliers: None,
            })
        })
        .collect()
}

/// Narrows a forecast list for display. Unset criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastFilter {
    name_contains: Option<String>,
    urgency: Option<Urgency>,
    category: Option<String>,
}

impl ForecastFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring of the product name. Blank text is ignored.
    pub fn with_name(mut self, text: impl AsRef<str>) -> Self {
        let text = text.as_ref().trim().to_lowercase();
        self.name_contains = (!text.is_empty()).then_some(text);
        self
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = Some(urgency);
        self
    }

    /// Exact category match after trimming both sides.
    pub fn with_category(mut self, category: impl AsRef<str>) -> Self {
        let category = category.as_ref().trim().to_string();
        self.category = (!category.is_empty()).then_some(category);
        self
    }

    pub fn matches(&self, item: &ForecastItem) -> bool {
        let name_ok = self
            .name_contains
            .as_deref()
            .is_none_or(|needle| item.product_name.to_lowercase().contains(needle));
        let urgency_ok = self.urgency.is_none_or(|u| item.urgency == u);
        let category_ok = self
            .category
            .as_deref()
            .is_none_or(|c| item.category.trim() == c);
        name_ok && urgency_ok && category_ok
    }

    pub fn apply<'a>(&self, items: &'a [ForecastItem]) -> Vec<&'a ForecastItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Distinct, trimmed, sorted category names of a forecast list.
pub fn categories(items: &[ForecastItem]) -> Vec<String> {
    items
        .iter()
        .map(|item| item.category.trim())
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Plain-text shopping list, or `None` when there is nothing to buy.
pub fn shopping_list<'a, I>(items: I) -> Option<String>
where
    I: IntoIterator<Item = &'a ForecastItem>,
{
    let mut out = String::from("SHOPPING LIST:\n\n");
    let mut count = 0usize;
    let mut units = 0i64;

    for item in items {
        out.push_str(&format!(
            "- {}: {} units ({})\n",
            item.product_name, item.quantity_to_buy, item.urgency
        ));
        count += 1;
        units += item.quantity_to_buy;
    }

    if count == 0 {
        return None;
    }
    out.push_str(&format!("\nTOTAL: {count} products / {units} units"));
    Some(out)
}
