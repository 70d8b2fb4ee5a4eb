use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Hard cap on special promotions, enforced at the data-access layer.
pub const MAX_SPECIAL_PROMOTIONS: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct SpecialPromotion {
    pub id: i64,
    pub product_id: i64,
    pub discount_percent: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Promotion row joined with its product, as listed on the home page and in
/// the admin panel.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct PromotionWithProduct {
    pub id: i64,
    pub product_id: i64,
    pub discount_percent: i32,
    pub is_active: bool,
    pub product_name: String,
    pub product_slug: String,
    pub product_price: i64,
    pub product_image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Promotional price, computed on read and never stored.
pub fn discounted_price(price: i64, discount_percent: i32) -> i64 {
    price * (100 - discount_percent as i64) / 100
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreatePromotionRequest {
    pub product_id: i64,
    pub discount_percent: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromotionResponse {
    pub id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_slug: String,
    pub product_price: i64,
    pub product_image: Option<String>,
    pub discount_percent: i32,
    pub discounted_price: i64,
    pub is_active: bool,
}

impl From<PromotionWithProduct> for PromotionResponse {
    fn from(p: PromotionWithProduct) -> Self {
        let discounted = discounted_price(p.product_price, p.discount_percent);
        Self {
            id: p.id,
            product_id: p.product_id,
            product_name: p.product_name,
            product_slug: p.product_slug,
            product_price: p.product_price,
            product_image: p.product_image,
            discount_percent: p.discount_percent,
            discounted_price: discounted,
            is_active: p.is_active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discounted_price() {
        assert_eq!(discounted_price(10_000_000, 20), 8_000_000);
        assert_eq!(discounted_price(9_990_000, 15), 8_491_500);
        assert_eq!(discounted_price(1_000_000, 0), 1_000_000);
    }
}
