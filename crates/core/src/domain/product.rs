use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProductId(pub i64);

/// Where a product sits on the shop floor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShelfLocation {
    pub aisle: String,
    pub section: String,
    pub shelf: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub sku: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub shelf_stock: i64,
    pub warehouse_stock: i64,
    pub location: ShelfLocation,
    pub last_updated: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub shelf_stock: i64,
    pub warehouse_stock: i64,
    pub location: ShelfLocation,
}

/// Partial stock change. Absent fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockUpdate {
    pub shelf_stock: Option<i64>,
    pub warehouse_stock: Option<i64>,
}

pub fn validate_stock_level(field: &'static str, value: i64) -> Result<i64, DomainError> {
    if value < 0 {
        return Err(DomainError::NegativeQuantity { field, value });
    }
    Ok(value)
}

pub fn validate_price(price: &Decimal) -> Result<(), DomainError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DomainError::NegativePrice(price.to_string()));
    }
    Ok(())
}

fn require_text(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::BlankField(field));
    }
    Ok(())
}

impl Product {
    /// Shelf plus warehouse stock.
    pub fn total_stock(&self) -> i64 {
        self.shelf_stock.saturating_add(self.warehouse_stock)
    }

    pub fn apply_stock_update(
        &mut self,
        update: StockUpdate,
        at: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        update.validate()?;
        if let Some(shelf_stock) = update.shelf_stock {
            self.shelf_stock = shelf_stock;
        }
        if let Some(warehouse_stock) = update.warehouse_stock {
            self.warehouse_stock = warehouse_stock;
        }
        if self.shelf_stock.checked_add(self.warehouse_stock).is_none() {
            return Err(DomainError::InvariantViolation(format!(
                "total stock for product {} overflows",
                self.id.0
            )));
        }
        self.last_updated = Some(at);
        Ok(())
    }
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        require_text("sku", &self.sku)?;
        require_text("name", &self.name)?;
        require_text("category", &self.category)?;
        require_text("aisle", &self.location.aisle)?;
        require_text("section", &self.location.section)?;
        require_text("shelf", &self.location.shelf)?;
        validate_price(&self.price)?;
        validate_stock_level("shelf_stock", self.shelf_stock)?;
        validate_stock_level("warehouse_stock", self.warehouse_stock)?;
        Ok(())
    }

    pub fn total_stock(&self) -> i64 {
        self.shelf_stock.saturating_add(self.warehouse_stock)
    }
}

impl StockUpdate {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let Some(value) = self.shelf_stock {
            validate_stock_level("shelf_stock", value)?;
        }
        if let Some(value) = self.warehouse_stock {
            validate_stock_level("warehouse_stock", value)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.shelf_stock.is_none() && self.warehouse_stock.is_none()
    }
}
