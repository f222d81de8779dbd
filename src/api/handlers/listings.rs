//! Listing Handlers
//!
//! Public listing browsing, bidding, watchlists, and categories.

use axum::{
    extract::{Extension, Path, Query, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use super::{validate_payload, AppState, QuantityParams};
use crate::api::middleware::MaybeClient;
use crate::models::auth::Client;
use crate::models::listing::Category;
use crate::models::requests::{AddOrRemoveWatchlist, CreateBid};
use crate::models::responses::{
    created, BidData, GuestUserIdData, ListingBidsData, ListingData, ListingDetailData,
    SuccessResponse,
};
use crate::utils::{AppError, AppResult};

fn listing_not_found() -> AppError {
    AppError::NotFound("Listing does not exist!".to_string())
}

/// Latest listings, optionally capped by the quantity parameter
pub async fn list_listings(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
    Query(params): Query<QuantityParams>,
) -> AppResult<SuccessResponse<Vec<ListingData>>> {
    let rows = state
        .listing_service
        .list(params.quantity, client.as_ref())
        .await?;
    let data = rows.into_iter().map(ListingData::from).collect();
    Ok(SuccessResponse::new("Listings fetched", data))
}

/// Single listing by slug, with a few others from its category
pub async fn listing_detail(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
    Path(slug): Path<String>,
) -> AppResult<SuccessResponse<ListingDetailData>> {
    let row = state
        .listing_service
        .get_by_slug(&slug, client.as_ref())
        .await?
        .ok_or_else(listing_not_found)?;
    let related_listings = state
        .listing_service
        .related_listings(row.id, row.category_id, client.as_ref())
        .await?
        .into_iter()
        .map(ListingData::from)
        .collect();
    Ok(SuccessResponse::new(
        "Listing details fetched",
        ListingDetailData {
            listing: ListingData::from(row),
            related_listings,
        },
    ))
}

/// A listing together with its three latest bids
pub async fn listing_bids(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<SuccessResponse<ListingBidsData>> {
    let row = state
        .listing_service
        .get_by_slug(&slug, None)
        .await?
        .ok_or_else(listing_not_found)?;
    let bids = state
        .listing_service
        .bids(row.id, Some(3))
        .await?
        .into_iter()
        .map(BidData::from)
        .collect();
    Ok(SuccessResponse::new(
        "Listing Bids fetched",
        ListingBidsData {
            listing: row.name,
            bids,
        },
    ))
}

/// Place or raise a bid on a listing. Bidding requires a signed-in
/// user; guest sessions cannot bid.
pub async fn place_bid(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
    Path(slug): Path<String>,
    Json(payload): Json<CreateBid>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let user_id = client
        .and_then(|client| client.user_id())
        .ok_or_else(|| AppError::Unauthorized("Unauthorized User!".to_string()))?;
    let user = state
        .user_service
        .get_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Unauthorized User!".to_string()))?;
    let bid = state
        .listing_service
        .place_bid(&user, &slug, payload.amount)
        .await?;
    Ok(created(SuccessResponse::new(
        "Bid added to listing",
        BidData::from(bid),
    )))
}

/// Listings watched by the caller; an unresolved caller gets an empty set
pub async fn watchlist(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
) -> AppResult<SuccessResponse<Vec<ListingData>>> {
    let data = match client {
        Some(client) => state
            .listing_service
            .watchlist(&client)
            .await?
            .into_iter()
            .map(ListingData::from)
            .collect(),
        None => Vec::new(),
    };
    Ok(SuccessResponse::new("Watchlist Listings fetched", data))
}

/// Toggle a listing in or out of the caller's watchlist. A caller with
/// no session gets a fresh guest session whose id is returned.
pub async fn toggle_watchlist(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
    Json(payload): Json<AddOrRemoveWatchlist>,
) -> AppResult<Response> {
    validate_payload(&payload)?;
    let client = match client {
        Some(client) => client,
        None => Client::Guest(state.listing_service.create_guest().await?.id),
    };
    let added = state
        .listing_service
        .toggle_watchlist(&client, &payload.slug)
        .await?;
    let data = GuestUserIdData {
        guestuser_id: client.session_key(),
    };
    if added {
        Ok(created(SuccessResponse::new(
            "Listing added to user watchlist",
            data,
        )))
    } else {
        Ok(SuccessResponse::new("Listing removed from user watchlist", data).into_response())
    }
}

#[derive(Debug, Serialize)]
pub struct CategoryData {
    pub name: String,
    pub slug: String,
}

impl From<Category> for CategoryData {
    fn from(category: Category) -> Self {
        Self {
            name: category.name,
            slug: category.slug,
        }
    }
}

/// All listing categories
pub async fn categories(
    State(state): State<AppState>,
) -> AppResult<SuccessResponse<Vec<CategoryData>>> {
    let data = state
        .listing_service
        .categories()
        .await?
        .into_iter()
        .map(CategoryData::from)
        .collect();
    Ok(SuccessResponse::new("Categories fetched", data))
}

/// Listings under one category; "other" selects the uncategorized set
pub async fn category_listings(
    State(state): State<AppState>,
    Extension(MaybeClient(client)): Extension<MaybeClient>,
    Path(slug): Path<String>,
) -> AppResult<SuccessResponse<Vec<ListingData>>> {
    let category_id = if slug == "other" {
        None
    } else {
        let category = state
            .listing_service
            .category_by_slug(&slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid category".to_string()))?;
        Some(category.id)
    };
    let data = state
        .listing_service
        .listings_by_category(category_id, client.as_ref())
        .await?
        .into_iter()
        .map(ListingData::from)
        .collect();
    Ok(SuccessResponse::new("Category Listings fetched", data))
}
