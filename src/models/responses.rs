//! Response Envelope and Output Shapes
//!
//! Every successful response carries the same envelope: a literal
//! "success" status, a human message, and an optional data payload.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::general::ReviewRow;
use super::listing::{BidRow, ListingRow};

/// Uniform success envelope
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> SuccessResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: Some(data),
        }
    }
}

impl SuccessResponse<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for SuccessResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Envelope with an explicit status code
pub fn created<T: Serialize>(body: SuccessResponse<T>) -> Response {
    (StatusCode::CREATED, Json(body)).into_response()
}

/// Condensed user shape embedded in listings, bids, and reviews
#[derive(Debug, Clone, Serialize)]
pub struct ShortUserData {
    pub id: Uuid,
    pub name: String,
    pub avatar_id: Option<Uuid>,
}

/// Registration result, echoing the address the code was sent to
#[derive(Debug, Clone, Serialize)]
pub struct EmailData {
    pub email: String,
}

/// Access and refresh pair returned on login and refresh
#[derive(Debug, Clone, Serialize)]
pub struct TokensData {
    pub access: String,
    pub refresh: String,
}

/// Public shape of a listing
#[derive(Debug, Clone, Serialize)]
pub struct ListingData {
    pub auctioneer: ShortUserData,
    pub name: String,
    pub slug: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub category: Option<String>,
    pub price: f64,
    pub closing_date: DateTime<Utc>,
    pub time_left_seconds: i64,
    pub active: bool,
    pub bids_count: i32,
    pub highest_bid: f64,
    pub image_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watchlist: Option<bool>,
}

impl From<ListingRow> for ListingData {
    fn from(row: ListingRow) -> Self {
        let time_left_seconds = row.time_left_seconds();
        Self {
            auctioneer: ShortUserData {
                id: row.auctioneer_id,
                name: format!("{} {}", row.auctioneer_first_name, row.auctioneer_last_name),
                avatar_id: row.auctioneer_avatar_id,
            },
            name: row.name,
            slug: row.slug,
            description: row.description,
            category: Some(row.category_name.unwrap_or_else(|| "Other".to_string())),
            price: row.price,
            closing_date: row.closing_date,
            time_left_seconds,
            active: row.active,
            bids_count: row.bids_count,
            highest_bid: row.highest_bid,
            image_id: row.image_id,
            watchlist: row.watching,
        }
    }
}

/// Public shape of a bid
#[derive(Debug, Clone, Serialize)]
pub struct BidData {
    pub id: Uuid,
    pub user: ShortUserData,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BidRow> for BidData {
    fn from(row: BidRow) -> Self {
        Self {
            id: row.id,
            user: ShortUserData {
                id: row.user_id,
                name: format!("{} {}", row.user_first_name, row.user_last_name),
                avatar_id: row.user_avatar_id,
            },
            amount: row.amount,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A listing's name with its current bids
#[derive(Debug, Clone, Serialize)]
pub struct ListingBidsData {
    pub listing: String,
    pub bids: Vec<BidData>,
}

/// Listing detail with a few listings from the same category
#[derive(Debug, Clone, Serialize)]
pub struct ListingDetailData {
    pub listing: ListingData,
    pub related_listings: Vec<ListingData>,
}

/// Auctioneer profile shape
#[derive(Debug, Clone, Serialize)]
pub struct ProfileData {
    pub first_name: String,
    pub last_name: String,
    pub avatar_id: Option<Uuid>,
}

/// Public shape of a review
#[derive(Debug, Clone, Serialize)]
pub struct ReviewData {
    pub reviewer: ShortUserData,
    pub text: String,
}

impl From<ReviewRow> for ReviewData {
    fn from(row: ReviewRow) -> Self {
        Self {
            reviewer: ShortUserData {
                id: row.reviewer_id,
                name: format!("{} {}", row.reviewer_first_name, row.reviewer_last_name),
                avatar_id: row.reviewer_avatar_id,
            },
            text: row.text,
        }
    }
}

/// Watchlist toggle result; real users get a null guest id
#[derive(Debug, Clone, Serialize)]
pub struct GuestUserIdData {
    pub guestuser_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_shape() {
        let body = SuccessResponse::new("Details fetched", EmailData {
            email: "john@example.com".into(),
        });
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Details fetched");
        assert_eq!(json["data"]["email"], "john@example.com");
    }

    #[test]
    fn test_message_only_omits_data() {
        let body = SuccessResponse::message_only("Logout successful");
        let json = serde_json::to_value(&body).unwrap();
        assert!(json.get("data").is_none());
    }

    #[test]
    fn test_listing_data_defaults_category_to_other() {
        let now = Utc::now();
        let row = ListingRow {
            id: Uuid::new_v4(),
            name: "Vintage Lamp".into(),
            slug: "vintage-lamp".into(),
            description: "A lamp".into(),
            price: 100.0,
            highest_bid: 0.0,
            bids_count: 0,
            closing_date: now + chrono::Duration::hours(1),
            active: true,
            image_id: None,
            auctioneer_id: Uuid::new_v4(),
            auctioneer_first_name: "John".into(),
            auctioneer_last_name: "Doe".into(),
            auctioneer_avatar_id: None,
            category_id: None,
            category_name: None,
            watching: None,
        };
        let data = ListingData::from(row);
        assert_eq!(data.category.as_deref(), Some("Other"));
        assert_eq!(data.auctioneer.name, "John Doe");
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("desc").is_some());
        assert!(json.get("watchlist").is_none());
    }
}
