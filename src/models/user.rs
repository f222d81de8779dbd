//! User Account Models
//!
//! Rows backing accounts, issued token pairs, one-time codes, guest
//! sessions, and stored file records.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A registered account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_email_verified: bool,
    pub is_superuser: bool,
    pub is_staff: bool,
    pub terms_agreement: bool,
    pub avatar_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Token pair stored per user. A user holds at most one row; issuing a
/// new pair replaces the old one, revoking it.
#[derive(Debug, Clone, FromRow)]
pub struct Jwt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub access: String,
    pub refresh: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One-time code for email verification and password reset
#[derive(Debug, Clone, FromRow)]
pub struct Otp {
    pub id: Uuid,
    pub user_id: Uuid,
    pub code: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Otp {
    /// An OTP expires a fixed interval after it was last (re)issued.
    pub fn is_expired(&self, expire_seconds: i64) -> bool {
        Utc::now() > self.updated_at + Duration::seconds(expire_seconds)
    }
}

/// Anonymous session used for guest watchlists
#[derive(Debug, Clone, FromRow)]
pub struct GuestUser {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Uploaded file record; only the resource type is tracked here,
/// the binary lives in external storage keyed by id.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct StoredFile {
    pub id: Uuid,
    pub resource_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            first_name: "John".into(),
            last_name: "Doe".into(),
            email: "john@example.com".into(),
            password_hash: "hashed".into(),
            is_email_verified: true,
            is_superuser: false,
            is_staff: false,
            terms_agreement: true,
            avatar_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(sample_user().full_name(), "John Doe");
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let json = serde_json::to_value(sample_user()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("email").is_some());
    }

    #[test]
    fn test_otp_expiry() {
        let now = Utc::now();
        let otp = Otp {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            code: 123456,
            created_at: now - Duration::seconds(120),
            updated_at: now - Duration::seconds(120),
        };
        assert!(otp.is_expired(60));
        assert!(!otp.is_expired(900));
    }
}
