//! Request Payloads
//!
//! Deserialized and validated JSON bodies for every endpoint that
//! accepts input. Validation failures surface as a 422 keyed by field.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

/// Account registration payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[validate(
        length(max = 50, message = "50 characters max"),
        custom = "crate::utils::validation::single_name_validator"
    )]
    pub first_name: String,
    #[validate(
        length(max = 50, message = "50 characters max"),
        custom = "crate::utils::validation::single_name_validator"
    )]
    pub last_name: String,
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
    #[validate(length(min = 8, max = 50, message = "8 to 50 characters"))]
    pub password: String,
    #[validate(custom = "crate::utils::validation::terms_agreement_validator")]
    pub terms_agreement: bool,
}

/// Email plus one-time code, used for verification and password reset
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VerifyOtp {
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
    pub otp: i32,
}

/// Request a fresh one-time code by email
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RequestOtp {
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
}

/// Complete a password reset with the emailed code
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct SetNewPassword {
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
    pub otp: i32,
    #[validate(length(min = 8, max = 50, message = "8 to 50 characters"))]
    pub password: String,
}

/// Credentials for login
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginUser {
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
    pub password: String,
}

/// Refresh token exchange payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefreshTokens {
    #[validate(length(min = 1, message = "This field is required"))]
    pub refresh: String,
}

/// A bid offer on a listing
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBid {
    #[validate(range(min = 0.01, message = "Must be greater than 0"))]
    pub amount: f64,
}

/// Toggle a listing in or out of a watchlist
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AddOrRemoveWatchlist {
    #[validate(length(min = 1, message = "This field is required"))]
    pub slug: String,
}

/// Auctioneer profile update
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(
        length(max = 50, message = "50 characters max"),
        custom = "crate::utils::validation::single_name_validator"
    )]
    pub first_name: String,
    #[validate(
        length(max = 50, message = "50 characters max"),
        custom = "crate::utils::validation::single_name_validator"
    )]
    pub last_name: String,
    pub file_type: Option<String>,
}

/// New listing payload. The category is referenced by slug, with
/// "other" standing for the absent category.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateListing {
    #[validate(length(min = 1, max = 70, message = "1 to 70 characters"))]
    pub name: String,
    #[serde(rename = "desc")]
    #[validate(length(min = 1, message = "This field is required"))]
    pub description: String,
    pub category: String,
    #[validate(range(min = 0.01, message = "Must be greater than 0"))]
    pub price: f64,
    #[validate(custom = "crate::utils::validation::future_date_validator")]
    pub closing_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "This field is required"))]
    pub file_type: String,
}

/// Partial listing update; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateListing {
    #[validate(length(max = 70, message = "70 characters max"))]
    pub name: Option<String>,
    #[serde(rename = "desc")]
    pub description: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 0.01, message = "Must be greater than 0"))]
    pub price: Option<f64>,
    #[validate(custom = "crate::utils::validation::future_date_validator")]
    pub closing_date: Option<DateTime<Utc>>,
    pub active: Option<bool>,
    pub file_type: Option<String>,
}

/// Newsletter subscription payload
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Subscribe {
    #[validate(custom = "crate::utils::validation::email_validator")]
    pub email: String,
}
