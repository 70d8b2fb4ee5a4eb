use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub brand: String,
    pub stock: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub discount_percent: i32,
    #[schema(value_type = Object)]
    pub storage_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub color_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub warranty_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    pub free_shipping: bool,
    pub allow_open_box: bool,
    pub return_policy_30days: bool,
    pub is_out_of_stock: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    pub fn is_on_sale(&self) -> bool {
        self.original_price.map_or(false, |op| op > self.price)
    }
}

/// Discount percent derived immediately before every save. When the original
/// price undercuts the sale price the percentage is recomputed (truncated
/// toward zero); otherwise the stored value is kept as-is.
pub fn derive_discount_percent(price: i64, original_price: Option<i64>, current: i32) -> i32 {
    match original_price {
        Some(op) if op > price && op > 0 => ((op - price) * 100 / op) as i32,
        _ => current,
    }
}

/// Stock flag derived unconditionally on every save, overriding any
/// manually supplied value.
pub fn derive_out_of_stock(stock: i64) -> bool {
    stock == 0
}

fn default_storage_options() -> serde_json::Value {
    serde_json::Value::Array(vec![])
}

fn default_specifications() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    #[schema(example = "iPhone 15 Pro Max")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub stock: i64,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub discount_percent: Option<i32>,
    #[serde(default = "default_storage_options")]
    #[schema(value_type = Object)]
    pub storage_options: serde_json::Value,
    #[serde(default = "default_storage_options")]
    #[schema(value_type = Object)]
    pub color_options: serde_json::Value,
    #[serde(default = "default_storage_options")]
    #[schema(value_type = Object)]
    pub warranty_options: serde_json::Value,
    #[serde(default = "default_specifications")]
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    #[serde(default)]
    pub free_shipping: bool,
    #[serde(default)]
    pub allow_open_box: bool,
    #[serde(default)]
    pub return_policy_30days: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub image: Option<String>,
    pub category_id: Option<i64>,
    pub brand: Option<String>,
    pub stock: Option<i64>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    #[schema(value_type = Option<Object>)]
    pub storage_options: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub color_options: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub warranty_options: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub specifications: Option<serde_json::Value>,
    pub free_shipping: Option<bool>,
    pub allow_open_box: Option<bool>,
    pub return_policy_30days: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub original_price: Option<i64>,
    pub discount_percent: i32,
    pub is_on_sale: bool,
    pub image: Option<String>,
    pub brand: String,
    pub stock: i64,
    pub is_active: bool,
    pub is_featured: bool,
    #[schema(value_type = Object)]
    pub storage_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub color_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub warranty_options: serde_json::Value,
    #[schema(value_type = Object)]
    pub specifications: serde_json::Value,
    pub free_shipping: bool,
    pub allow_open_box: bool,
    pub return_policy_30days: bool,
    pub is_out_of_stock: bool,
    pub category_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        let is_on_sale = p.is_on_sale();
        Self {
            id: p.id,
            name: p.name,
            slug: p.slug,
            description: p.description,
            price: p.price,
            original_price: p.original_price,
            discount_percent: p.discount_percent,
            is_on_sale,
            image: p.image,
            brand: p.brand,
            stock: p.stock,
            is_active: p.is_active,
            is_featured: p.is_featured,
            storage_options: p.storage_options,
            color_options: p.color_options,
            warranty_options: p.warranty_options,
            specifications: p.specifications,
            free_shipping: p.free_shipping,
            allow_open_box: p.allow_open_box,
            return_policy_30days: p.return_policy_30days,
            is_out_of_stock: p.is_out_of_stock,
            category_id: p.category_id,
            created_at: p.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discount_percent_derivation() {
        // price=8990000, original=10990000 -> floor((1 - 0.8180...) * 100) = 18
        assert_eq!(derive_discount_percent(8_990_000, Some(10_990_000), 0), 18);
        assert_eq!(derive_discount_percent(50, Some(100), 0), 50);
        assert_eq!(derive_discount_percent(1, Some(3), 0), 66);
    }

    #[test]
    fn test_discount_percent_kept_when_not_discounted() {
        // No original price, or original <= price: the stored value survives.
        assert_eq!(derive_discount_percent(100, None, 25), 25);
        assert_eq!(derive_discount_percent(100, Some(100), 25), 25);
        assert_eq!(derive_discount_percent(100, Some(80), 25), 25);
    }

    #[test]
    fn test_out_of_stock_derivation() {
        assert!(derive_out_of_stock(0));
        assert!(!derive_out_of_stock(1));
    }
}
