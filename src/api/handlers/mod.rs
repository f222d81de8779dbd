//! HTTP Handlers
//!
//! Request handlers grouped by API section.

pub mod auctioneer;
pub mod auth;
pub mod general;
pub mod listings;

use std::sync::Arc;

use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::AppConfig;
use crate::service::{
    AuthService, EmailService, FileService, GeneralService, ListingService, UserService,
};
use crate::utils::{error::from_validation_errors, AppResult};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub listing_service: Arc<ListingService>,
    pub general_service: Arc<GeneralService>,
    pub file_service: Arc<FileService>,
    pub email_service: Arc<EmailService>,
    pub config: Arc<AppConfig>,
}

/// Run payload validation, mapping failures to a field-keyed 422
pub fn validate_payload<T: Validate>(payload: &T) -> AppResult<()> {
    payload.validate().map_err(from_validation_errors)
}

/// Optional result-set cap shared by the listing endpoints
#[derive(Debug, Deserialize)]
pub struct QuantityParams {
    pub quantity: Option<i64>,
}

/// Liveness probe
pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "success": "pong!" }))
}
