//! User Service
//!
//! Account lookups and lifecycle: registration, email verification,
//! password reset, and the one-time codes that drive both flows.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::requests::RegisterUser;
use crate::models::user::{Otp, User};
use crate::utils::security::{generate_otp_code, hash_password};
use crate::utils::validation::normalize_email;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(normalize_email(email))
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Register a new account. The email must be unused.
    pub async fn create(&self, payload: &RegisterUser) -> AppResult<User> {
        let email = normalize_email(&payload.email);
        if self.get_by_email(&email).await?.is_some() {
            return Err(AppError::invalid_entry(
                "email",
                "Email already registered!",
            ));
        }
        let password_hash = hash_password(&payload.password)?;
        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING *",
        )
        .bind(&payload.first_name)
        .bind(&payload.last_name)
        .bind(&email)
        .bind(&password_hash)
        .bind(payload.terms_agreement)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn mark_email_verified(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("UPDATE users SET is_email_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_password(&self, user_id: Uuid, password: &str) -> AppResult<()> {
        let password_hash = hash_password(password)?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(&password_hash)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        first_name: &str,
        last_name: &str,
        avatar_id: Option<Uuid>,
    ) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            "UPDATE users
             SET first_name = $1, last_name = $2, avatar_id = COALESCE($3, avatar_id),
                 updated_at = NOW()
             WHERE id = $4
             RETURNING *",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(avatar_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    /// Issue a one-time code for the user, replacing any existing one.
    /// Reissuing resets the expiry clock.
    pub async fn issue_otp(&self, user_id: Uuid) -> AppResult<Otp> {
        let code = generate_otp_code();
        let otp = sqlx::query_as::<_, Otp>(
            "INSERT INTO otps (user_id, code) VALUES ($1, $2)
             ON CONFLICT (user_id)
             DO UPDATE SET code = EXCLUDED.code, updated_at = NOW()
             RETURNING *",
        )
        .bind(user_id)
        .bind(code)
        .fetch_one(&self.pool)
        .await?;
        Ok(otp)
    }

    pub async fn get_otp(&self, user_id: Uuid) -> AppResult<Option<Otp>> {
        let otp = sqlx::query_as::<_, Otp>("SELECT * FROM otps WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(otp)
    }

    /// Check a submitted code against the stored one. Wrong codes are a
    /// 404, stale ones a 400.
    pub async fn verify_otp(&self, user_id: Uuid, code: i32, expire_seconds: i64) -> AppResult<()> {
        let otp = self
            .get_otp(user_id)
            .await?
            .filter(|otp| otp.code == code)
            .ok_or_else(|| AppError::NotFound("Incorrect Otp".to_string()))?;
        if otp.is_expired(expire_seconds) {
            return Err(AppError::BadRequest("Expired Otp".to_string()));
        }
        Ok(())
    }

    pub async fn delete_otp(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM otps WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
