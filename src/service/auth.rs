//! Authentication Service
//!
//! Issues and verifies the access/refresh token pair. A user holds at
//! most one stored pair; issuing a new one revokes whatever came
//! before, and bearer authentication checks the presented access token
//! against the stored row so revoked tokens stop working immediately.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::auth::{AccessClaims, RefreshClaims};
use crate::models::responses::TokensData;
use crate::models::user::{Jwt, User};
use crate::utils::security::random_string;
use crate::utils::{AppError, AppResult};

#[derive(Clone)]
pub struct AuthService {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.config.secret_key.as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.config.secret_key.as_bytes())
    }

    /// Create a signed access token carrying the user id
    pub fn create_access_token(&self, user_id: Uuid) -> AppResult<String> {
        let claims = AccessClaims {
            user_id,
            exp: (Utc::now() + Duration::minutes(self.config.access_token_expire_minutes))
                .timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key())?)
    }

    /// Create a signed refresh token with a random payload
    pub fn create_refresh_token(&self) -> AppResult<String> {
        let claims = RefreshClaims {
            data: random_string(10),
            exp: (Utc::now() + Duration::minutes(self.config.refresh_token_expire_minutes))
                .timestamp(),
        };
        Ok(encode(&Header::default(), &claims, &self.encoding_key())?)
    }

    fn decode_access(&self, token: &str) -> Option<AccessClaims> {
        decode::<AccessClaims>(token, &self.decoding_key(), &Validation::default())
            .map(|data| data.claims)
            .ok()
    }

    fn decode_refresh(&self, token: &str) -> bool {
        decode::<RefreshClaims>(token, &self.decoding_key(), &Validation::default()).is_ok()
    }

    /// Issue a fresh token pair, replacing any stored pair for the user
    pub async fn issue_tokens(&self, user_id: Uuid) -> AppResult<TokensData> {
        let access = self.create_access_token(user_id)?;
        let refresh = self.create_refresh_token()?;
        sqlx::query("DELETE FROM jwts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        sqlx::query("INSERT INTO jwts (user_id, access, refresh) VALUES ($1, $2, $3)")
            .bind(user_id)
            .bind(&access)
            .bind(&refresh)
            .execute(&self.pool)
            .await?;
        Ok(TokensData { access, refresh })
    }

    /// Exchange a refresh token for a new pair. The presented token must
    /// match a stored row and still verify; the pair is then rotated.
    pub async fn refresh_tokens(&self, refresh: &str) -> AppResult<TokensData> {
        let jwt = sqlx::query_as::<_, Jwt>("SELECT * FROM jwts WHERE refresh = $1")
            .bind(refresh)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Refresh token does not exist".to_string()))?;

        if !self.decode_refresh(refresh) {
            return Err(AppError::Unauthorized(
                "Refresh token is invalid or expired".to_string(),
            ));
        }

        let access = self.create_access_token(jwt.user_id)?;
        let new_refresh = self.create_refresh_token()?;
        sqlx::query("UPDATE jwts SET access = $1, refresh = $2, updated_at = NOW() WHERE id = $3")
            .bind(&access)
            .bind(&new_refresh)
            .bind(jwt.id)
            .execute(&self.pool)
            .await?;
        Ok(TokensData {
            access,
            refresh: new_refresh,
        })
    }

    /// Resolve a bearer access token to its user. The token must verify
    /// and match the stored row for that user.
    pub async fn authenticate(&self, access: &str) -> AppResult<User> {
        let invalid = || AppError::Unauthorized("Auth Token is Invalid or Expired!".to_string());

        let claims = self.decode_access(access).ok_or_else(invalid)?;
        let jwt = sqlx::query_as::<_, Jwt>("SELECT * FROM jwts WHERE user_id = $1")
            .bind(claims.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(invalid)?;
        if jwt.access != access {
            return Err(invalid());
        }
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(claims.user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(invalid)
    }

    /// Drop the stored token pair, revoking both tokens
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        sqlx::query("DELETE FROM jwts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> AuthConfig {
        AuthConfig {
            secret_key: "test-secret-key-for-tokens".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_minutes: 1440,
            otp_expire_seconds: 900,
        }
    }

    #[sqlx::test]
    async fn test_access_token_round_trip(pool: PgPool) {
        let service = AuthService::new(pool, test_config());
        let user_id = Uuid::new_v4();
        let token = service.create_access_token(user_id).unwrap();
        let claims = service.decode_access(&token).unwrap();
        assert_eq!(claims.user_id, user_id);
    }

    #[sqlx::test]
    async fn test_access_token_rejects_wrong_secret(pool: PgPool) {
        let service = AuthService::new(pool.clone(), test_config());
        let other = AuthService::new(
            pool,
            AuthConfig {
                secret_key: "a-different-secret".to_string(),
                ..test_config()
            },
        );
        let token = service.create_access_token(Uuid::new_v4()).unwrap();
        assert!(other.decode_access(&token).is_none());
    }

    #[sqlx::test]
    async fn test_issue_replaces_previous_pair(pool: PgPool) {
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement)
             VALUES ('John', 'Doe', 'john@example.com', 'x', TRUE) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let service = AuthService::new(pool.clone(), test_config());
        let first = service.issue_tokens(user_id).await.unwrap();
        let second = service.issue_tokens(user_id).await.unwrap();
        assert_ne!(first.refresh, second.refresh);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jwts WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);

        // the first pair no longer authenticates
        assert!(service.authenticate(&first.access).await.is_err());
        assert!(service.authenticate(&second.access).await.is_ok());
    }

    #[sqlx::test]
    async fn test_refresh_rotates_tokens(pool: PgPool) {
        let user_id: Uuid = sqlx::query_scalar(
            "INSERT INTO users (first_name, last_name, email, password_hash, terms_agreement)
             VALUES ('Jane', 'Doe', 'jane@example.com', 'x', TRUE) RETURNING id",
        )
        .fetch_one(&pool)
        .await
        .unwrap();

        let service = AuthService::new(pool, test_config());
        let pair = service.issue_tokens(user_id).await.unwrap();
        let rotated = service.refresh_tokens(&pair.refresh).await.unwrap();
        assert_ne!(pair.refresh, rotated.refresh);

        // the consumed refresh token is gone
        let err = service.refresh_tokens(&pair.refresh).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[sqlx::test]
    async fn test_refresh_unknown_token_is_not_found(pool: PgPool) {
        let service = AuthService::new(pool, test_config());
        let err = service.refresh_tokens("no-such-token").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
