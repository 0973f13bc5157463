//! Catalog entities: categories and the products filed under them.

use common::{CategoryId, ProductId};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::Money;

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A sellable product with its current stock level.
///
/// `stock` is signed: under the permissive stock policy a checkout may drive
/// it below zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub category: Category,
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
}

impl NewCategory {
    /// Builds a validated category write model.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: required_name(name.into(), "Category")?,
        })
    }
}

/// Input for renaming a category.
#[derive(Debug, Clone)]
pub struct CategoryUpdate {
    pub name: String,
}

impl CategoryUpdate {
    /// Builds a validated category update.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        Ok(Self {
            name: required_name(name.into(), "Category")?,
        })
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub category_id: CategoryId,
}

impl NewProduct {
    /// Builds a validated product write model.
    ///
    /// The category reference is only checked for existence by the caller
    /// that owns a store.
    pub fn new(
        name: impl Into<String>,
        price: i64,
        stock: i64,
        category_id: CategoryId,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: required_name(name.into(), "Product")?,
            price: non_negative_price(price)?,
            stock: non_negative_stock(stock)?,
            category_id,
        })
    }
}

/// Input for editing a product.
///
/// When `category_id` is `None` the product keeps its current category.
#[derive(Debug, Clone)]
pub struct ProductUpdate {
    pub name: String,
    pub price: Money,
    pub stock: i64,
    pub category_id: Option<CategoryId>,
}

impl ProductUpdate {
    /// Builds a validated product update.
    pub fn new(
        name: impl Into<String>,
        price: i64,
        stock: i64,
        category_id: Option<CategoryId>,
    ) -> Result<Self, DomainError> {
        Ok(Self {
            name: required_name(name.into(), "Product")?,
            price: non_negative_price(price)?,
            stock: non_negative_stock(stock)?,
            category_id,
        })
    }
}

impl Product {
    /// Case-insensitive substring match on the product name.
    pub fn name_matches(&self, filter: &str) -> bool {
        self.name.to_lowercase().contains(&filter.to_lowercase())
    }
}

fn required_name(name: String, entity: &'static str) -> Result<String, DomainError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(DomainError::BlankName { entity });
    }
    Ok(trimmed.to_string())
}

fn non_negative_price(price: i64) -> Result<Money, DomainError> {
    if price < 0 {
        return Err(DomainError::InvalidPrice { price });
    }
    Ok(Money::new(price))
}

fn non_negative_stock(stock: i64) -> Result<i64, DomainError> {
    if stock < 0 {
        return Err(DomainError::InvalidStock { stock });
    }
    Ok(stock)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laptop() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Laptop Gaming".to_string(),
            price: Money::new(35_000_000),
            stock: 10,
            category: Category {
                id: CategoryId::new(1),
                name: "Elektronik".to_string(),
            },
        }
    }

    #[test]
    fn test_new_category_trims_name() {
        let category = NewCategory::new("  Minuman ").unwrap();
        assert_eq!(category.name, "Minuman");
    }

    #[test]
    fn test_new_category_rejects_blank_name() {
        assert_eq!(
            NewCategory::new("   ").unwrap_err(),
            DomainError::BlankName { entity: "Category" }
        );
    }

    #[test]
    fn test_new_product_rejects_negative_price() {
        let err = NewProduct::new("Kopi", -1, 5, CategoryId::new(1)).unwrap_err();
        assert_eq!(err, DomainError::InvalidPrice { price: -1 });
    }

    #[test]
    fn test_new_product_rejects_negative_stock() {
        let err = NewProduct::new("Kopi", 10_000, -5, CategoryId::new(1)).unwrap_err();
        assert_eq!(err, DomainError::InvalidStock { stock: -5 });
    }

    #[test]
    fn test_product_update_keeps_category_optional() {
        let update = ProductUpdate::new("Kopi Susu", 12_000, 3, None).unwrap();
        assert!(update.category_id.is_none());
        assert_eq!(update.price, Money::new(12_000));
    }

    #[test]
    fn test_name_matches_is_case_insensitive() {
        let product = laptop();
        assert!(product.name_matches("gaming"));
        assert!(product.name_matches("LAPTOP"));
        assert!(!product.name_matches("mouse"));
    }

    #[test]
    fn test_product_serialization_shape() {
        let json = serde_json::to_value(laptop()).unwrap();
        assert_eq!(json["id"], 1);
        assert_eq!(json["price"], 35_000_000);
        assert_eq!(json["stock"], 10);
        assert_eq!(json["category"]["name"], "Elektronik");
    }
}
