//! Marketplace Models
//!
//! Auction listings, their categories, bids placed against them, and
//! watchlist entries for both signed-in users and guest sessions.

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A listing category
#[derive(Debug, Clone, FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An auction listing
#[derive(Debug, Clone, FromRow)]
pub struct Listing {
    pub id: Uuid,
    pub auctioneer_id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub category_id: Option<Uuid>,
    pub price: f64,
    pub highest_bid: f64,
    pub bids_count: i32,
    pub closing_date: DateTime<Utc>,
    pub active: bool,
    pub image_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    /// Seconds remaining before the auction closes. Negative once closed.
    pub fn time_left_seconds(&self) -> i64 {
        (self.closing_date - Utc::now()).num_seconds()
    }

    /// Remaining auction time; closed and inactive listings report zero.
    pub fn time_left(&self) -> i64 {
        if !self.active {
            return 0;
        }
        self.time_left_seconds().max(0)
    }
}

/// A bid placed on a listing. Each user holds at most one bid per
/// listing; raising the offer updates the row in place.
#[derive(Debug, Clone, FromRow)]
pub struct Bid {
    pub id: Uuid,
    pub user_id: Uuid,
    pub listing_id: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A watchlist entry owned by either a user or a guest session
#[derive(Debug, Clone, FromRow)]
pub struct WatchList {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_key: Option<Uuid>,
    pub listing_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing joined with its auctioneer and category for API output
#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: f64,
    pub highest_bid: f64,
    pub bids_count: i32,
    pub closing_date: DateTime<Utc>,
    pub active: bool,
    pub image_id: Option<Uuid>,
    pub auctioneer_id: Uuid,
    pub auctioneer_first_name: String,
    pub auctioneer_last_name: String,
    pub auctioneer_avatar_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub category_name: Option<String>,
    pub watching: Option<bool>,
}

impl ListingRow {
    pub fn time_left_seconds(&self) -> i64 {
        if !self.active {
            return 0;
        }
        (self.closing_date - Utc::now()).num_seconds().max(0)
    }
}

/// Bid joined with its bidder for API output
#[derive(Debug, Clone, FromRow)]
pub struct BidRow {
    pub id: Uuid,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub user_first_name: String,
    pub user_last_name: String,
    pub user_avatar_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_listing(active: bool, closes_in: Duration) -> Listing {
        let now = Utc::now();
        Listing {
            id: Uuid::new_v4(),
            auctioneer_id: Uuid::new_v4(),
            name: "Vintage Lamp".into(),
            slug: "vintage-lamp".into(),
            description: "A lamp".into(),
            category_id: None,
            price: 100.0,
            highest_bid: 0.0,
            bids_count: 0,
            closing_date: now + closes_in,
            active,
            image_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_time_left_open_listing() {
        let listing = sample_listing(true, Duration::hours(2));
        assert!(listing.time_left() > 7000);
    }

    #[test]
    fn test_time_left_closed_listing() {
        let listing = sample_listing(true, Duration::hours(-1));
        assert_eq!(listing.time_left(), 0);
        assert!(listing.time_left_seconds() < 0);
    }

    #[test]
    fn test_time_left_inactive_listing() {
        let listing = sample_listing(false, Duration::hours(2));
        assert_eq!(listing.time_left(), 0);
    }
}
