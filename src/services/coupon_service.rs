use crate::error::{AppError, AppResult};
use crate::models::*;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

#[derive(Clone)]
pub struct CouponService {
    pool: PgPool,
}

impl CouponService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_coupon(&self, request: CreateCouponRequest) -> AppResult<CouponResponse> {
        let code = request.code.trim().to_uppercase();
        let name = request.name.trim().to_string();
        if code.is_empty() || name.is_empty() {
            return Err(AppError::ValidationError(
                "Coupon code and name are required".to_string(),
            ));
        }
        if request.discount_value <= 0 {
            return Err(AppError::ValidationError(
                "Discount value must be positive".to_string(),
            ));
        }

        let taken: Option<i64> = sqlx::query_scalar("SELECT id FROM coupons WHERE code = $1")
            .bind(&code)
            .fetch_optional(&self.pool)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict(
                "A coupon with this code already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let start_date = request.start_date.unwrap_or(now);
        let end_date = request.end_date.unwrap_or(now + Duration::days(30));
        if end_date < start_date {
            return Err(AppError::ValidationError(
                "End date must not be before start date".to_string(),
            ));
        }

        let coupon = sqlx::query_as::<_, Coupon>(
            r#"
            INSERT INTO coupons (
                code, name, description, discount_type, discount_value,
                min_order_amount, max_discount, start_date, end_date,
                is_active, usage_limit
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, TRUE, $10)
            RETURNING *
            "#,
        )
        .bind(&code)
        .bind(&name)
        .bind(&request.description)
        .bind(request.discount_type)
        .bind(request.discount_value)
        .bind(request.min_order_amount)
        .bind(request.max_discount)
        .bind(start_date)
        .bind(end_date)
        .bind(request.usage_limit.unwrap_or(100))
        .fetch_one(&self.pool)
        .await?;

        Ok(CouponResponse::from(coupon))
    }

    pub async fn list_coupons(&self) -> AppResult<Vec<CouponResponse>> {
        let coupons =
            sqlx::query_as::<_, Coupon>("SELECT * FROM coupons ORDER BY created_at DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(coupons.into_iter().map(CouponResponse::from).collect())
    }

    /// Coupons a customer can still use right now, soonest expiry first.
    pub async fn list_valid_coupons(&self, now: DateTime<Utc>) -> AppResult<Vec<CouponResponse>> {
        let coupons = sqlx::query_as::<_, Coupon>(
            r#"
            SELECT * FROM coupons
            WHERE is_active
              AND start_date <= $1
              AND end_date >= $1
              AND used_count < usage_limit
            ORDER BY end_date ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(coupons.into_iter().map(CouponResponse::from).collect())
    }

    /// Check a code against an order amount and report the discount it
    /// would grant. Does not consume a use.
    pub async fn validate(
        &self,
        code: &str,
        order_amount: i64,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        let coupon = self.get_by_code(code).await?;
        coupon
            .evaluate(order_amount, now)
            .map_err(|rejection| AppError::ValidationError(rejection.to_string()))
    }

    /// Consume one use of the coupon. The usage counter is advanced with a
    /// guarded UPDATE, so two redemptions racing for the last use cannot
    /// both succeed.
    pub async fn redeem(
        &self,
        code: &str,
        order_amount: i64,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        let discount = self.validate(code, order_amount, now).await?;

        let claimed = sqlx::query(
            r#"
            UPDATE coupons SET used_count = used_count + 1, updated_at = now()
            WHERE code = $1 AND used_count < usage_limit
            "#,
        )
        .bind(code.trim().to_uppercase())
        .execute(&self.pool)
        .await?
        .rows_affected();

        if claimed == 0 {
            return Err(AppError::ValidationError(
                CouponRejection::LimitReached.to_string(),
            ));
        }

        Ok(discount)
    }

    pub async fn delete_coupon(&self, coupon_id: i64) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(coupon_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Coupon not found".to_string()));
        }
        Ok(())
    }

    async fn get_by_code(&self, code: &str) -> AppResult<Coupon> {
        let coupon = sqlx::query_as::<_, Coupon>("SELECT * FROM coupons WHERE code = $1")
            .bind(code.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await?;

        coupon.ok_or_else(|| AppError::NotFound("Coupon not found".to_string()))
    }
}
