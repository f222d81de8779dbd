//! General Handlers
//!
//! Site details, newsletter subscription, and reviews.

use axum::{extract::State, response::Response, Json};

use super::{validate_payload, AppState};
use crate::models::general::{SiteDetail, Subscriber};
use crate::models::requests::Subscribe;
use crate::models::responses::{created, ReviewData, SuccessResponse};
use crate::utils::AppResult;

/// Site contact details
pub async fn site_detail(
    State(state): State<AppState>,
) -> AppResult<SuccessResponse<SiteDetail>> {
    let detail = state.general_service.site_detail().await?;
    Ok(SuccessResponse::new("Site Details fetched", detail))
}

/// Subscribe an address to the newsletter
pub async fn subscribe(
    State(state): State<AppState>,
    Json(payload): Json<Subscribe>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let subscriber: Subscriber = state.general_service.subscribe(&payload.email).await?;
    Ok(created(SuccessResponse::new(
        "Subscription successful",
        subscriber,
    )))
}

/// Publicly visible reviews
pub async fn reviews(
    State(state): State<AppState>,
) -> AppResult<SuccessResponse<Vec<ReviewData>>> {
    let data = state
        .general_service
        .reviews()
        .await?
        .into_iter()
        .map(ReviewData::from)
        .collect();
    Ok(SuccessResponse::new("Reviews fetched", data))
}
