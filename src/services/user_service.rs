use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::validate_email;
use sqlx::PgPool;

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_profile(&self, user_id: i64) -> AppResult<UserResponse> {
        let user = self.get_user_by_id(user_id).await?;
        Ok(UserResponse::from(user))
    }

    pub async fn update_profile(
        &self,
        user_id: i64,
        request: UpdateProfileRequest,
    ) -> AppResult<UserResponse> {
        let user = self.get_user_by_id(user_id).await?;

        if request.first_name.is_none() && request.email.is_none() {
            return Err(AppError::ValidationError("No fields to update".to_string()));
        }

        let first_name = match &request.first_name {
            Some(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(AppError::ValidationError(
                        "Full name must not be empty".to_string(),
                    ));
                }
                name.to_string()
            }
            None => user.first_name.clone(),
        };

        let email = match &request.email {
            Some(email) => {
                let email = email.trim().to_string();
                validate_email(&email)?;
                if email != user.email {
                    let taken: Option<i64> =
                        sqlx::query_scalar("SELECT id FROM users WHERE email = $1 AND id <> $2")
                            .bind(&email)
                            .bind(user_id)
                            .fetch_optional(&self.pool)
                            .await?;
                    if taken.is_some() {
                        return Err(AppError::Conflict("Email already in use".to_string()));
                    }
                }
                email
            }
            None => user.email.clone(),
        };

        let updated = sqlx::query_as::<_, User>(
            r#"
            UPDATE users SET first_name = $1, email = $2, updated_at = now()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(&first_name)
        .bind(&email)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(UserResponse::from(updated))
    }

    /// Admin gate: the acting user must hold staff or superuser rights.
    /// Checked against the database, not the token, so a revoked staff flag
    /// takes effect immediately.
    pub async fn ensure_staff(&self, user_id: i64) -> AppResult<User> {
        let user = self.get_user_by_id(user_id).await?;
        if !user.is_admin() {
            return Err(AppError::PermissionDenied);
        }
        Ok(user)
    }
}
