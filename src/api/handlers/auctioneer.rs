//! Auctioneer Handlers
//!
//! The signed-in seller's profile and listing management.

use axum::{
    extract::{Extension, Path, Query, State},
    response::Response,
    Json,
};
use uuid::Uuid;

use super::{validate_payload, AppState, QuantityParams};
use crate::api::middleware::CurrentUser;
use crate::models::requests::{CreateListing, UpdateListing, UpdateProfile};
use crate::models::responses::{
    created, BidData, ListingBidsData, ListingData, ProfileData, SuccessResponse,
};
use crate::utils::{AppError, AppResult};

/// Resolve a category slug from a payload, with "other" meaning none
async fn resolve_category(state: &AppState, slug: &str) -> AppResult<Option<Uuid>> {
    if slug == "other" {
        return Ok(None);
    }
    let category = state
        .listing_service
        .category_by_slug(slug)
        .await?
        .ok_or_else(|| AppError::invalid_entry("category", "Invalid category"))?;
    Ok(Some(category.id))
}

async fn listing_data_by_slug(state: &AppState, slug: &str) -> AppResult<ListingData> {
    let row = state
        .listing_service
        .get_by_slug(slug, None)
        .await?
        .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;
    Ok(ListingData::from(row))
}

/// The caller's profile
pub async fn profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<SuccessResponse<ProfileData>> {
    Ok(SuccessResponse::new(
        "User details fetched!",
        ProfileData {
            first_name: user.first_name,
            last_name: user.last_name,
            avatar_id: user.avatar_id,
        },
    ))
}

/// Update the caller's profile, replacing the avatar when a file type
/// accompanies the payload
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfile>,
) -> AppResult<SuccessResponse<ProfileData>> {
    validate_payload(&payload)?;
    let avatar_id = match &payload.file_type {
        Some(file_type) => Some(
            state
                .file_service
                .create_or_update(user.avatar_id, file_type)
                .await?
                .id,
        ),
        None => None,
    };
    let updated = state
        .user_service
        .update_profile(user.id, &payload.first_name, &payload.last_name, avatar_id)
        .await?;
    Ok(SuccessResponse::new(
        "User updated!",
        ProfileData {
            first_name: updated.first_name,
            last_name: updated.last_name,
            avatar_id: updated.avatar_id,
        },
    ))
}

/// The caller's own listings, newest first
pub async fn my_listings(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(params): Query<QuantityParams>,
) -> AppResult<SuccessResponse<Vec<ListingData>>> {
    let data = state
        .listing_service
        .listings_by_auctioneer(user.id, params.quantity)
        .await?
        .into_iter()
        .map(ListingData::from)
        .collect();
    Ok(SuccessResponse::new("Auctioneer Listings fetched", data))
}

/// Create a listing under the caller's account
pub async fn create_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(payload): Json<CreateListing>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let category_id = resolve_category(&state, &payload.category).await?;
    let image_id = state.file_service.create(&payload.file_type).await?.id;
    let listing = state
        .listing_service
        .create(user.id, &payload, category_id, Some(image_id))
        .await?;
    let data = listing_data_by_slug(&state, &listing.slug).await?;
    Ok(created(SuccessResponse::new(
        "Listing created successfully",
        data,
    )))
}

/// Partially update one of the caller's listings
pub async fn update_listing(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdateListing>,
) -> AppResult<SuccessResponse<ListingData>> {
    validate_payload(&payload)?;
    // ownership gate comes first, ahead of any file mutation
    let current = state.listing_service.owned_listing(user.id, &slug).await?;
    let category_id = match &payload.category {
        Some(slug) => Some(resolve_category(&state, slug).await?),
        None => None,
    };
    let image_id = match &payload.file_type {
        Some(file_type) => Some(
            state
                .file_service
                .create_or_update(current.image_id, file_type)
                .await?
                .id,
        ),
        None => None,
    };
    let listing = state
        .listing_service
        .update(&current, &payload, category_id, image_id)
        .await?;
    let data = listing_data_by_slug(&state, &listing.slug).await?;
    Ok(SuccessResponse::new("Listing updated successfully", data))
}

/// Bids on one of the caller's listings
pub async fn listing_bids(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Path(slug): Path<String>,
) -> AppResult<SuccessResponse<ListingBidsData>> {
    let listing = state.listing_service.owned_listing(user.id, &slug).await?;
    let bids = state
        .listing_service
        .bids(listing.id, None)
        .await?
        .into_iter()
        .map(BidData::from)
        .collect();
    Ok(SuccessResponse::new(
        "Listing Bids fetched",
        ListingBidsData {
            listing: listing.name,
            bids,
        },
    ))
}
