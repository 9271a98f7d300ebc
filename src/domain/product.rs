use crate::utils::error::{AppError, Result};
use crate::utils::helpers::{format_currency, generate_sku};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Food,
    Books,
    Other,
}

impl ProductCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "electronics",
            ProductCategory::Clothing => "clothing",
            ProductCategory::Food => "food",
            ProductCategory::Books => "books",
            ProductCategory::Other => "other",
        }
    }
}

impl fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductVariant {
    pub sku: String,
    pub color: Option<String>,
    pub size: Option<String>,
    pub stock: u32,
    pub price_modifier: f64,
}

impl ProductVariant {
    pub fn new(sku: &str) -> Self {
        Self {
            sku: sku.to_string(),
            color: None,
            size: None,
            stock: 0,
            price_modifier: 0.0,
        }
    }

    pub fn color(mut self, color: &str) -> Self {
        self.color = Some(color.to_string());
        self
    }

    pub fn size(mut self, size: &str) -> Self {
        self.size = Some(size.to_string());
        self
    }

    pub fn stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn price_modifier(mut self, modifier: f64) -> Self {
        self.price_modifier = modifier;
        self
    }
}

/// A product without variants is not stock-tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "units")]
pub enum Stock {
    Unlimited,
    Limited(u32),
}

impl fmt::Display for Stock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stock::Unlimited => f.write_str("unlimited"),
            Stock::Limited(units) => write!(f, "{}", units),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub product_id: String,
    pub name: String,
    pub base_price: f64,
    pub category: ProductCategory,
    pub description: String,
    pub variants: Vec<ProductVariant>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub is_available: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductSummary {
    pub product_id: String,
    pub name: String,
    pub price: f64,
    pub formatted_price: String,
    pub category: ProductCategory,
    pub total_stock: Stock,
    pub is_available: bool,
}

impl Product {
    /// The product id defaults to a SKU derived from name and category.
    pub fn new(name: &str, base_price: f64, category: ProductCategory) -> Self {
        Self {
            product_id: generate_sku(name, category.as_str()),
            name: name.to_string(),
            base_price,
            category,
            description: String::new(),
            variants: Vec::new(),
            tags: Vec::new(),
            created_at: Utc::now(),
            is_available: true,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn with_id(mut self, product_id: &str) -> Self {
        self.product_id = product_id.to_string();
        self
    }

    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn formatted_price(&self) -> String {
        format_currency(self.base_price, "USD")
    }

    pub fn total_stock(&self) -> Stock {
        if self.variants.is_empty() {
            Stock::Unlimited
        } else {
            Stock::Limited(self.variants.iter().map(|v| v.stock).sum())
        }
    }

    pub fn add_variant(&mut self, variant: ProductVariant) {
        self.variants.push(variant);
    }

    pub fn get_variant_by_sku(&self, sku: &str) -> Option<&ProductVariant> {
        self.variants.iter().find(|v| v.sku == sku)
    }

    /// Discounted price rounded to cents. Leaves the product untouched.
    pub fn apply_discount(&self, percent: f64) -> Result<f64> {
        if !(percent > 0.0 && percent < 100.0) {
            return Err(AppError::validation(
                "Discount percent must be between 0 and 100.",
            ));
        }
        let discounted = self.base_price * (1.0 - percent / 100.0);
        Ok((discounted * 100.0).round() / 100.0)
    }

    pub fn summary(&self) -> ProductSummary {
        ProductSummary {
            product_id: self.product_id.clone(),
            name: self.name.clone(),
            price: self.base_price,
            formatted_price: self.formatted_price(),
            category: self.category,
            total_stock: self.total_stock(),
            is_available: self.is_available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serde() {
        assert_eq!(
            serde_json::to_value(ProductCategory::Electronics).unwrap(),
            serde_json::json!("electronics")
        );
        assert_eq!(ProductCategory::Books.to_string(), "books");
    }

    #[test]
    fn test_product_id_defaults_to_sku() {
        let p = Product::new("Laptop", 999.99, ProductCategory::Electronics);
        assert_eq!(p.product_id, generate_sku("Laptop", "electronics"));

        let p = p.with_id("CUSTOM-1");
        assert_eq!(p.product_id, "CUSTOM-1");
    }

    #[test]
    fn test_discount_bounds() {
        let p = Product::new("Shirt", 50.0, ProductCategory::Clothing);
        assert_eq!(p.apply_discount(20.0).unwrap(), 40.0);
        assert_eq!(p.apply_discount(33.0).unwrap(), 33.5);
        assert!(p.apply_discount(0.0).is_err());
        assert!(p.apply_discount(100.0).is_err());
        assert!(p.apply_discount(f64::NAN).is_err());
        assert_eq!(p.base_price, 50.0);
    }

    #[test]
    fn test_summary() {
        let mut p = Product::new("Running Shoes", 89.99, ProductCategory::Clothing)
            .with_tags(["sport", "shoes"]);
        p.add_variant(ProductVariant::new("SHOE-BLK-42").stock(10));
        let summary = p.summary();
        assert_eq!(summary.formatted_price, "$89.99");
        assert_eq!(summary.total_stock, Stock::Limited(10));
        assert_eq!(p.tags, vec!["sport".to_string(), "shoes".to_string()]);
    }

    #[test]
    fn test_stock_display() {
        assert_eq!(Stock::Unlimited.to_string(), "unlimited");
        assert_eq!(Stock::Limited(15).to_string(), "15");
    }
}
