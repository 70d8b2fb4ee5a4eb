use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "discount_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DiscountType {
    Percent,
    Amount,
}

impl std::fmt::Display for DiscountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountType::Percent => write!(f, "percent"),
            DiscountType::Amount => write!(f, "amount"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_amount: i64,
    pub max_discount: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub usage_limit: i64,
    pub used_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reasons a coupon does not apply to a given order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouponRejection {
    Inactive,
    NotStarted,
    Expired,
    LimitReached,
    BelowMinimum { min_order_amount: i64 },
}

impl std::fmt::Display for CouponRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CouponRejection::Inactive => write!(f, "This coupon has been deactivated"),
            CouponRejection::NotStarted => write!(f, "This coupon is not active yet"),
            CouponRejection::Expired => write!(f, "This coupon has expired"),
            CouponRejection::LimitReached => write!(f, "This coupon has reached its usage limit"),
            CouponRejection::BelowMinimum { min_order_amount } => {
                write!(f, "Order must be at least {min_order_amount} to use this coupon")
            }
        }
    }
}

impl Coupon {
    /// Validity window predicate: active, inside the inclusive date window,
    /// and under the usage limit.
    pub fn is_valid(&self, now: DateTime<Utc>) -> bool {
        self.is_active
            && self.start_date <= now
            && now <= self.end_date
            && self.used_count < self.usage_limit
    }

    /// Evaluate the coupon against an order amount, returning the discount.
    /// The rejection order mirrors the validity predicate, so a deactivated
    /// expired coupon reports `Inactive` rather than `Expired`.
    pub fn evaluate(&self, order_amount: i64, now: DateTime<Utc>) -> Result<i64, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Inactive);
        }
        if now < self.start_date {
            return Err(CouponRejection::NotStarted);
        }
        if now > self.end_date {
            return Err(CouponRejection::Expired);
        }
        if self.used_count >= self.usage_limit {
            return Err(CouponRejection::LimitReached);
        }
        if order_amount < self.min_order_amount {
            return Err(CouponRejection::BelowMinimum {
                min_order_amount: self.min_order_amount,
            });
        }

        let raw = match self.discount_type {
            DiscountType::Amount => self.discount_value,
            DiscountType::Percent => order_amount * self.discount_value / 100,
        };
        Ok(match self.max_discount {
            Some(cap) => raw.min(cap),
            None => raw,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateCouponRequest {
    #[schema(example = "WELCOME500")]
    pub code: String,
    #[schema(example = "New member welcome")]
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    #[serde(default)]
    pub min_order_amount: i64,
    pub max_discount: Option<i64>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub usage_limit: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CouponResponse {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub description: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_order_amount: i64,
    pub max_discount: Option<i64>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub is_active: bool,
    pub usage_limit: i64,
    pub used_count: i64,
}

impl From<Coupon> for CouponResponse {
    fn from(c: Coupon) -> Self {
        Self {
            id: c.id,
            code: c.code,
            name: c.name,
            description: c.description,
            discount_type: c.discount_type,
            discount_value: c.discount_value,
            min_order_amount: c.min_order_amount,
            max_discount: c.max_discount,
            start_date: c.start_date,
            end_date: c.end_date,
            is_active: c.is_active,
            usage_limit: c.usage_limit,
            used_count: c.used_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyCouponRequest {
    #[schema(example = "WELCOME500")]
    pub code: String,
    pub order_amount: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ApplyCouponResponse {
    pub code: String,
    pub discount: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn coupon(discount_type: DiscountType, value: i64, min_order: i64, cap: Option<i64>) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: 1,
            code: "TEST".to_string(),
            name: "Test coupon".to_string(),
            description: String::new(),
            discount_type,
            discount_value: value,
            min_order_amount: min_order,
            max_discount: cap,
            start_date: now - Duration::days(1),
            end_date: now + Duration::days(30),
            is_active: true,
            usage_limit: 100,
            used_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_fixed_amount_coupon() {
        // WELCOME500: 500k off orders of at least 5M.
        let c = coupon(DiscountType::Amount, 500_000, 5_000_000, Some(500_000));
        assert_eq!(c.evaluate(6_000_000, Utc::now()), Ok(500_000));
        assert_eq!(
            c.evaluate(4_000_000, Utc::now()),
            Err(CouponRejection::BelowMinimum {
                min_order_amount: 5_000_000
            })
        );
    }

    #[test]
    fn test_percent_coupon_capped() {
        // SALE10: 10%, capped at 200k.
        let c = coupon(DiscountType::Percent, 10, 0, Some(200_000));
        assert_eq!(c.evaluate(3_000_000, Utc::now()), Ok(200_000));
        assert_eq!(c.evaluate(1_000_000, Utc::now()), Ok(100_000));
    }

    #[test]
    fn test_percent_coupon_uncapped() {
        let c = coupon(DiscountType::Percent, 10, 0, None);
        assert_eq!(c.evaluate(3_000_000, Utc::now()), Ok(300_000));
    }

    #[test]
    fn test_window_and_state_rejections() {
        let now = Utc::now();

        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        c.is_active = false;
        assert_eq!(c.evaluate(1_000_000, now), Err(CouponRejection::Inactive));

        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        c.start_date = now + Duration::days(1);
        assert_eq!(c.evaluate(1_000_000, now), Err(CouponRejection::NotStarted));

        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        c.end_date = now - Duration::days(1);
        assert_eq!(c.evaluate(1_000_000, now), Err(CouponRejection::Expired));

        let mut c = coupon(DiscountType::Percent, 10, 0, None);
        c.used_count = c.usage_limit;
        assert_eq!(c.evaluate(1_000_000, now), Err(CouponRejection::LimitReached));
    }

    #[test]
    fn test_window_is_inclusive() {
        let c = coupon(DiscountType::Percent, 10, 0, None);
        assert!(c.is_valid(c.start_date));
        assert!(c.is_valid(c.end_date));
        assert!(!c.is_valid(c.end_date + Duration::seconds(1)));
    }
}
