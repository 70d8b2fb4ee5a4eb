use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Reset tokens stay redeemable for half an hour.
const RESET_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: PgPool, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let username = request.username.trim().to_string();
        let email = request.email.trim().to_string();
        let first_name = request.first_name.trim().to_string();

        validate_username(&username)?;
        validate_email(&email)?;
        validate_password(&request.password)?;
        if first_name.is_empty() {
            return Err(AppError::ValidationError(
                "Full name is required".to_string(),
            ));
        }

        let username_taken: Option<i64> =
            sqlx::query_scalar("SELECT id FROM users WHERE username = $1")
                .bind(&username)
                .fetch_optional(&self.pool)
                .await?;
        if username_taken.is_some() {
            return Err(AppError::Conflict("Username already taken".to_string()));
        }

        let email_taken: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(&self.pool)
            .await?;
        if email_taken.is_some() {
            return Err(AppError::Conflict("Email already in use".to_string()));
        }

        let password_hash = hash_password(&request.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, first_name, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&username)
        .bind(&email)
        .bind(&first_name)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await?;

        // Registration logs the account straight in.
        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
            .bind(request.username.trim())
            .fetch_optional(&self.pool)
            .await?;

        let user = user
            .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

        let is_valid = verify_password(&request.password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::AuthError(
                "Invalid username or password".to_string(),
            ));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id: i64 = claims
            .sub
            .parse()
            .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

        let user = self.get_user_by_id(user_id).await?;
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let expires_in = self.jwt_service.get_access_token_expires_in();

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in,
        })
    }

    /// Issue a single-use reset token for the account behind `email`.
    /// The caller-facing answer is identical whether or not the account
    /// exists, so the endpoint cannot be used to probe for registered
    /// emails. Token delivery (mail) is an external collaborator; until it
    /// is wired up the token is only written to the server log.
    pub async fn forgot_password(&self, email: &str) -> AppResult<()> {
        validate_email(email.trim())?;

        let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        if let Some(user_id) = user_id {
            let token = Uuid::new_v4();
            let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);

            sqlx::query(
                r#"
                INSERT INTO password_reset_tokens (user_id, token, expires_at)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(user_id)
            .bind(token)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

            log::info!(
                "Password reset token issued for user {user_id}: {token} (mail delivery not configured)"
            );
        }

        Ok(())
    }

    pub async fn reset_password(&self, request: ResetPasswordRequest) -> AppResult<()> {
        validate_password(&request.new_password)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT id, user_id FROM password_reset_tokens
            WHERE token = $1 AND NOT used AND expires_at > now()
            FOR UPDATE
            "#,
        )
        .bind(request.token)
        .fetch_optional(&mut *tx)
        .await?;

        let (token_id, user_id) = row.ok_or_else(|| {
            AppError::ValidationError("Invalid or expired reset token".to_string())
        })?;

        let password_hash = hash_password(&request.new_password)?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE id = $1")
            .bind(token_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn change_password(
        &self,
        user_id: i64,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        let user = self.get_user_by_id(user_id).await?;

        let is_valid = verify_password(&request.current_password, &user.password_hash)?;
        if !is_valid {
            return Err(AppError::AuthError(
                "Current password is incorrect".to_string(),
            ));
        }

        validate_password(&request.new_password)?;
        let password_hash = hash_password(&request.new_password)?;

        sqlx::query("UPDATE users SET password_hash = $1, updated_at = now() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    fn issue_tokens(&self, user: User) -> AppResult<AuthResponse> {
        let access_token = self
            .jwt_service
            .generate_access_token(user.id, &user.username)?;
        let refresh_token = self
            .jwt_service
            .generate_refresh_token(user.id, &user.username)?;
        let expires_in = self.jwt_service.get_access_token_expires_in();

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in,
        })
    }

    async fn get_user_by_id(&self, user_id: i64) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        user.ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
