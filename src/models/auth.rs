//! Token Claims
//!
//! Claim payloads carried by the access and refresh JWTs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    pub user_id: Uuid,
    pub exp: i64,
}

/// Claims carried by a refresh token. The payload is random; refresh
/// tokens only prove possession and are matched against the stored row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub data: String,
    pub exp: i64,
}

/// Caller identity for endpoints that accept either a signed-in user
/// or an anonymous guest session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Client {
    User(Uuid),
    Guest(Uuid),
}

impl Client {
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Client::User(id) => Some(*id),
            Client::Guest(_) => None,
        }
    }

    pub fn session_key(&self) -> Option<Uuid> {
        match self {
            Client::User(_) => None,
            Client::Guest(id) => Some(*id),
        }
    }
}
