use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stockroom_core::{Entity, ProductId, StockError, StockResult};

use crate::stock::StockRecord;

/// Catalog product, as owned by the persistence layer.
///
/// Read-only from the engine's point of view: alerts and forecasts copy the
/// descriptive fields they need and never hold on to the product itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    id: ProductId,
    name: String,
    brand: Option<String>,
    category: String,
    created_at: DateTime<Utc>,
}

impl Product {
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> StockResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(StockError::validation("product name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            brand: None,
            category: category.into(),
            created_at,
        })
    }

    /// Blank brands are stored as absent.
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        let brand = brand.into();
        self.brand = if brand.trim().is_empty() {
            None
        } else {
            Some(brand)
        };
        self
    }

    pub fn product_id(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn brand(&self) -> Option<&str> {
        self.brand.as_deref()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A product joined with its (possibly missing) stock record.
///
/// This is the row shape returned by the persistence collaborator's
/// `list_stock_with_products` query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductStock {
    pub product: Product,
    pub stock: Option<StockRecord>,
}

impl ProductStock {
    pub fn new(product: Product, stock: Option<StockRecord>) -> Self {
        Self { product, stock }
    }

    pub fn stocked(product: Product, stock: StockRecord) -> Self {
        Self {
            product,
            stock: Some(stock),
        }
    }

    pub fn unstocked(product: Product) -> Self {
        Self {
            product,
            stock: None,
        }
    }
}
