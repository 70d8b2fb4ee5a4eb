use crate::error::{AppError, AppResult};
use crate::models::*;
use sqlx::PgPool;

/// Advisory lock key serializing promotion creation; the cap check and the
/// insert must not interleave across requests.
const PROMOTION_CAP_LOCK: i64 = 0x5050_524f_4d4f;

#[derive(Clone)]
pub struct PromotionService {
    pool: PgPool,
}

impl PromotionService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_promotions(&self) -> AppResult<Vec<PromotionResponse>> {
        let rows = sqlx::query_as::<_, PromotionWithProduct>(
            r#"
            SELECT
                sp.id, sp.product_id, sp.discount_percent, sp.is_active,
                p.name AS product_name, p.slug AS product_slug,
                p.price AS product_price, p.image AS product_image,
                sp.created_at
            FROM special_promotions sp
            JOIN products p ON p.id = sp.product_id
            ORDER BY sp.created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PromotionResponse::from).collect())
    }

    /// Promotions shown on the home page: active only, capped at 5 by the
    /// creation invariant.
    pub async fn list_active_promotions(&self) -> AppResult<Vec<PromotionResponse>> {
        let rows = sqlx::query_as::<_, PromotionWithProduct>(
            r#"
            SELECT
                sp.id, sp.product_id, sp.discount_percent, sp.is_active,
                p.name AS product_name, p.slug AS product_slug,
                p.price AS product_price, p.image AS product_image,
                sp.created_at
            FROM special_promotions sp
            JOIN products p ON p.id = sp.product_id
            WHERE sp.is_active
            ORDER BY sp.created_at DESC
            LIMIT 5
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(PromotionResponse::from).collect())
    }

    /// The cap is checked and the row inserted under one advisory
    /// transaction lock: two concurrent creates at four existing rows
    /// serialize, and the loser sees five.
    pub async fn add_promotion(&self, request: CreatePromotionRequest) -> AppResult<PromotionResponse> {
        if !(0..=100).contains(&request.discount_percent) {
            return Err(AppError::ValidationError(
                "Discount percent must be between 0 and 100".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(PROMOTION_CAP_LOCK)
            .execute(&mut *tx)
            .await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM special_promotions")
            .fetch_one(&mut *tx)
            .await?;
        if count >= MAX_SPECIAL_PROMOTIONS {
            return Err(AppError::LimitExceeded(format!(
                "At most {MAX_SPECIAL_PROMOTIONS} special promotions are allowed"
            )));
        }

        let already: Option<i64> =
            sqlx::query_scalar("SELECT id FROM special_promotions WHERE product_id = $1")
                .bind(request.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        if already.is_some() {
            return Err(AppError::ValidationError(
                "This product already has a special promotion".to_string(),
            ));
        }

        let product: Option<(String, String, i64, Option<String>)> = sqlx::query_as(
            "SELECT name, slug, price, image FROM products WHERE id = $1",
        )
        .bind(request.product_id)
        .fetch_optional(&mut *tx)
        .await?;
        let (product_name, product_slug, product_price, product_image) =
            product.ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

        let promotion = sqlx::query_as::<_, SpecialPromotion>(
            r#"
            INSERT INTO special_promotions (product_id, discount_percent, is_active)
            VALUES ($1, $2, TRUE)
            RETURNING *
            "#,
        )
        .bind(request.product_id)
        .bind(request.discount_percent)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(PromotionResponse::from(PromotionWithProduct {
            id: promotion.id,
            product_id: promotion.product_id,
            discount_percent: promotion.discount_percent,
            is_active: promotion.is_active,
            product_name,
            product_slug,
            product_price,
            product_image,
            created_at: promotion.created_at,
        }))
    }

    /// No side effects on the product.
    pub async fn delete_promotion(&self, promotion_id: i64) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM special_promotions WHERE id = $1")
            .bind(promotion_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Promotion not found".to_string()));
        }
        Ok(())
    }
}
