use crate::error::{AppError, AppResult};
use crate::models::*;
use sqlx::PgPool;

#[derive(Clone)]
pub struct AddressService {
    pool: PgPool,
}

impl AddressService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_addresses(&self, user_id: i64) -> AppResult<Vec<AddressResponse>> {
        let addresses = sqlx::query_as::<_, Address>(
            r#"
            SELECT * FROM addresses
            WHERE user_id = $1
            ORDER BY is_default DESC, created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(addresses.into_iter().map(AddressResponse::from).collect())
    }

    /// At most one address per user is the default. A new address marked
    /// default demotes the others before it is inserted; an unmarked one is
    /// promoted when the user has no default yet. A partial unique index on
    /// (user_id) WHERE is_default backs this up in the store.
    pub async fn add_address(
        &self,
        user_id: i64,
        request: CreateAddressRequest,
    ) -> AppResult<AddressResponse> {
        for (field, value) in [
            ("full_name", &request.full_name),
            ("phone", &request.phone),
            ("province", &request.province),
            ("district", &request.district),
            ("ward", &request.ward),
            ("address_detail", &request.address_detail),
        ] {
            if value.trim().is_empty() {
                return Err(AppError::ValidationError(format!("{field} is required")));
            }
        }

        let mut tx = self.pool.begin().await?;

        let is_default = if request.is_default {
            // Demote any existing default before the insert so the unique
            // index never sees two defaults.
            sqlx::query(
                "UPDATE addresses SET is_default = FALSE, updated_at = now()
                 WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        } else {
            let has_default: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM addresses WHERE user_id = $1 AND is_default",
            )
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
            has_default.is_none()
        };

        let address = sqlx::query_as::<_, Address>(
            r#"
            INSERT INTO addresses (
                user_id, full_name, phone, province, district, ward,
                address_detail, is_default
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(request.full_name.trim())
        .bind(request.phone.trim())
        .bind(request.province.trim())
        .bind(request.district.trim())
        .bind(request.ward.trim())
        .bind(request.address_detail.trim())
        .bind(is_default)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(AddressResponse::from(address))
    }

    pub async fn set_default_address(&self, user_id: i64, address_id: i64) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        // Ownership check doubles as existence check; other users' addresses
        // must look absent, never forbidden.
        let owned: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM addresses WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(address_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if owned.is_none() {
            return Err(AppError::NotFound("Address not found".to_string()));
        }

        sqlx::query(
            "UPDATE addresses SET is_default = FALSE, updated_at = now()
             WHERE user_id = $1 AND is_default AND id <> $2",
        )
        .bind(user_id)
        .bind(address_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE addresses SET is_default = TRUE, updated_at = now() WHERE id = $1")
            .bind(address_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Deleting the default leaves the user with no default; no other
    /// address is promoted.
    pub async fn delete_address(&self, user_id: i64, address_id: i64) -> AppResult<()> {
        let deleted = sqlx::query("DELETE FROM addresses WHERE id = $1 AND user_id = $2")
            .bind(address_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted == 0 {
            return Err(AppError::NotFound("Address not found".to_string()));
        }
        Ok(())
    }
}
