//! Listing Service
//!
//! Auction listings and everything hanging off them: categories, bids
//! with their acceptance guards, and watchlists for both signed-in
//! users and guest sessions.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::auth::Client;
use crate::models::listing::{Bid, BidRow, Category, Listing, ListingRow};
use crate::models::requests::{CreateListing, UpdateListing};
use crate::models::user::{GuestUser, User};
use crate::utils::security::random_string;
use crate::utils::validation::slugify;
use crate::utils::{AppError, AppResult};

/// Joined listing projection shared by every listing query. The two
/// client binds feed the watching flag.
const LISTING_SELECT: &str = "
    SELECT l.id, l.name, l.slug, l.description, l.price, l.highest_bid,
           l.bids_count, l.closing_date, l.active, l.image_id,
           l.auctioneer_id,
           u.first_name AS auctioneer_first_name,
           u.last_name AS auctioneer_last_name,
           u.avatar_id AS auctioneer_avatar_id,
           l.category_id,
           c.name AS category_name,
           EXISTS(
               SELECT 1 FROM watchlists w
               WHERE w.listing_id = l.id
                 AND (($1::uuid IS NOT NULL AND w.user_id = $1)
                   OR ($2::uuid IS NOT NULL AND w.session_key = $2))
           ) AS watching
    FROM listings l
    JOIN users u ON u.id = l.auctioneer_id
    LEFT JOIN categories c ON c.id = l.category_id";

const BID_SELECT: &str = "
    SELECT b.id, b.amount, b.created_at, b.updated_at,
           b.user_id,
           u.first_name AS user_first_name,
           u.last_name AS user_last_name,
           u.avatar_id AS user_avatar_id
    FROM bids b
    JOIN users u ON u.id = b.user_id";

#[derive(Clone)]
pub struct ListingService {
    pool: PgPool,
}

impl ListingService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn client_binds(client: Option<&Client>) -> (Option<Uuid>, Option<Uuid>) {
        match client {
            Some(c) => (c.user_id(), c.session_key()),
            None => (None, None),
        }
    }

    /// Latest listings first, optionally capped to a quantity
    pub async fn list(
        &self,
        quantity: Option<i64>,
        client: Option<&Client>,
    ) -> AppResult<Vec<ListingRow>> {
        let (user_id, session_key) = Self::client_binds(client);
        let sql = format!("{LISTING_SELECT} ORDER BY l.created_at DESC LIMIT $3");
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(user_id)
            .bind(session_key)
            .bind(quantity.filter(|q| *q > 0).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn get_by_slug(
        &self,
        slug: &str,
        client: Option<&Client>,
    ) -> AppResult<Option<ListingRow>> {
        let (user_id, session_key) = Self::client_binds(client);
        let sql = format!("{LISTING_SELECT} WHERE l.slug = $3");
        let row = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(user_id)
            .bind(session_key)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    /// Up to three other listings from the same category, newest first
    pub async fn related_listings(
        &self,
        listing_id: Uuid,
        category_id: Option<Uuid>,
        client: Option<&Client>,
    ) -> AppResult<Vec<ListingRow>> {
        let (user_id, session_key) = Self::client_binds(client);
        let sql = format!(
            "{LISTING_SELECT}
             WHERE (($3::uuid IS NULL AND l.category_id IS NULL) OR l.category_id = $3)
               AND l.id <> $4
             ORDER BY l.created_at DESC LIMIT 3"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(user_id)
            .bind(session_key)
            .bind(category_id)
            .bind(listing_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn get_model_by_slug(&self, slug: &str) -> AppResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>("SELECT * FROM listings WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(listing)
    }

    pub async fn listings_by_auctioneer(
        &self,
        auctioneer_id: Uuid,
        quantity: Option<i64>,
    ) -> AppResult<Vec<ListingRow>> {
        let sql = format!(
            "{LISTING_SELECT} WHERE l.auctioneer_id = $3 ORDER BY l.created_at DESC LIMIT $4"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(None::<Uuid>)
            .bind(None::<Uuid>)
            .bind(auctioneer_id)
            .bind(quantity.filter(|q| *q > 0).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn listings_by_category(
        &self,
        category_id: Option<Uuid>,
        client: Option<&Client>,
    ) -> AppResult<Vec<ListingRow>> {
        let (user_id, session_key) = Self::client_binds(client);
        let sql = format!(
            "{LISTING_SELECT}
             WHERE ($3::uuid IS NULL AND l.category_id IS NULL) OR l.category_id = $3
             ORDER BY l.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(user_id)
            .bind(session_key)
            .bind(category_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Build a unique slug from the listing name, suffixing on collision
    async fn unique_slug(&self, name: &str, exclude: Option<Uuid>) -> AppResult<String> {
        let base = slugify(name);
        let mut slug = base.clone();
        loop {
            let taken: bool = sqlx::query_scalar(
                "SELECT EXISTS(
                     SELECT 1 FROM listings
                     WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2)
                 )",
            )
            .bind(&slug)
            .bind(exclude)
            .fetch_one(&self.pool)
            .await?;
            if !taken {
                return Ok(slug);
            }
            slug = format!("{}-{}", base, random_string(4).to_lowercase());
        }
    }

    pub async fn create(
        &self,
        auctioneer_id: Uuid,
        payload: &CreateListing,
        category_id: Option<Uuid>,
        image_id: Option<Uuid>,
    ) -> AppResult<Listing> {
        let slug = self.unique_slug(&payload.name, None).await?;
        let listing = sqlx::query_as::<_, Listing>(
            "INSERT INTO listings
                 (auctioneer_id, name, slug, description, category_id, price,
                  closing_date, image_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING *",
        )
        .bind(auctioneer_id)
        .bind(&payload.name)
        .bind(&slug)
        .bind(&payload.description)
        .bind(category_id)
        .bind(payload.price)
        .bind(payload.closing_date)
        .bind(image_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(listing)
    }

    /// Resolve a listing the auctioneer owns. Must run before any side
    /// effect of an update, so strangers cannot touch related records.
    pub async fn owned_listing(&self, auctioneer_id: Uuid, slug: &str) -> AppResult<Listing> {
        let listing = self
            .get_model_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;
        if listing.auctioneer_id != auctioneer_id {
            return Err(AppError::BadRequest(
                "This listing doesn't belong to you!".to_string(),
            ));
        }
        Ok(listing)
    }

    /// Partial update of a listing already resolved through
    /// `owned_listing`. The outer `Option` on `category_id` is whether
    /// the payload named a category at all; the inner one carries
    /// "other" as an explicit clear.
    pub async fn update(
        &self,
        listing: &Listing,
        payload: &UpdateListing,
        category_id: Option<Option<Uuid>>,
        image_id: Option<Uuid>,
    ) -> AppResult<Listing> {
        // renaming regenerates the slug
        let new_slug = match payload.name.as_deref() {
            Some(name) if name != listing.name => {
                Some(self.unique_slug(name, Some(listing.id)).await?)
            }
            _ => None,
        };
        let updated = sqlx::query_as::<_, Listing>(
            "UPDATE listings
             SET name = COALESCE($1, name),
                 slug = COALESCE($2, slug),
                 description = COALESCE($3, description),
                 category_id = CASE WHEN $4 THEN $5::uuid ELSE category_id END,
                 price = COALESCE($6, price),
                 closing_date = COALESCE($7, closing_date),
                 active = COALESCE($8, active),
                 image_id = COALESCE($9, image_id),
                 updated_at = NOW()
             WHERE id = $10
             RETURNING *",
        )
        .bind(payload.name.as_deref())
        .bind(new_slug.as_deref())
        .bind(payload.description.as_deref())
        .bind(category_id.is_some())
        .bind(category_id.flatten())
        .bind(payload.price)
        .bind(payload.closing_date)
        .bind(payload.active)
        .bind(image_id)
        .bind(listing.id)
        .fetch_one(&self.pool)
        .await?;
        Ok(updated)
    }

    pub async fn categories(&self) -> AppResult<Vec<Category>> {
        let rows = sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    pub async fn category_by_slug(&self, slug: &str) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(category)
    }

    pub async fn category_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let category =
            sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE LOWER(name) = LOWER($1)")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;
        Ok(category)
    }

    /// Bids on a listing, newest first, optionally capped
    pub async fn bids(&self, listing_id: Uuid, limit: Option<i64>) -> AppResult<Vec<BidRow>> {
        let sql =
            format!("{BID_SELECT} WHERE b.listing_id = $1 ORDER BY b.updated_at DESC LIMIT $2");
        let rows = sqlx::query_as::<_, BidRow>(&sql)
            .bind(listing_id)
            .bind(limit.unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Place or raise a bid on the listing behind `slug`. The offer must
    /// clear the asking price and the current highest bid, the auction
    /// must still be open, and auctioneers cannot bid on their own
    /// listings. A user's repeat offer updates their existing bid.
    pub async fn place_bid(&self, user: &User, slug: &str, amount: f64) -> AppResult<BidRow> {
        let listing = self
            .get_model_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;

        if listing.auctioneer_id == user.id {
            return Err(AppError::Forbidden(
                "You cannot bid your own product!".to_string(),
            ));
        }
        if !listing.active {
            return Err(AppError::Gone("This auction is closed!".to_string()));
        }
        if listing.time_left_seconds() < 1 {
            return Err(AppError::Gone(
                "This auction is expired and closed!".to_string(),
            ));
        }
        if amount < listing.price {
            return Err(AppError::BadRequest(
                "Bid amount cannot be less than the bidding price!".to_string(),
            ));
        }
        if amount <= listing.highest_bid {
            return Err(AppError::BadRequest(
                "Bid amount must be more than the highest bid!".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let existing = sqlx::query_as::<_, Bid>(
            "SELECT * FROM bids WHERE user_id = $1 AND listing_id = $2",
        )
        .bind(user.id)
        .bind(listing.id)
        .fetch_optional(&mut *tx)
        .await?;

        let bid = match existing {
            Some(bid) => {
                sqlx::query_as::<_, Bid>(
                    "UPDATE bids SET amount = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
                )
                .bind(amount)
                .bind(bid.id)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                let bid = sqlx::query_as::<_, Bid>(
                    "INSERT INTO bids (user_id, listing_id, amount)
                     VALUES ($1, $2, $3) RETURNING *",
                )
                .bind(user.id)
                .bind(listing.id)
                .bind(amount)
                .fetch_one(&mut *tx)
                .await?;
                sqlx::query("UPDATE listings SET bids_count = bids_count + 1 WHERE id = $1")
                    .bind(listing.id)
                    .execute(&mut *tx)
                    .await?;
                bid
            }
        };

        sqlx::query("UPDATE listings SET highest_bid = $1, updated_at = NOW() WHERE id = $2")
            .bind(amount)
            .bind(listing.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(BidRow {
            id: bid.id,
            amount: bid.amount,
            created_at: bid.created_at,
            updated_at: bid.updated_at,
            user_id: user.id,
            user_first_name: user.first_name.clone(),
            user_last_name: user.last_name.clone(),
            user_avatar_id: user.avatar_id,
        })
    }

    /// Listings the client is watching
    pub async fn watchlist(&self, client: &Client) -> AppResult<Vec<ListingRow>> {
        let (user_id, session_key) = Self::client_binds(Some(client));
        let sql = format!(
            "{LISTING_SELECT}
             WHERE EXISTS(
                 SELECT 1 FROM watchlists w
                 WHERE w.listing_id = l.id
                   AND (($1::uuid IS NOT NULL AND w.user_id = $1)
                     OR ($2::uuid IS NOT NULL AND w.session_key = $2))
             )
             ORDER BY l.created_at DESC"
        );
        let rows = sqlx::query_as::<_, ListingRow>(&sql)
            .bind(user_id)
            .bind(session_key)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Add the listing to the client's watchlist, or remove it if it is
    /// already there. Returns true when the entry was added.
    pub async fn toggle_watchlist(&self, client: &Client, slug: &str) -> AppResult<bool> {
        let listing = self
            .get_model_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::NotFound("Listing does not exist!".to_string()))?;
        let (user_id, session_key) = Self::client_binds(Some(client));

        let existing: Option<Uuid> = sqlx::query_scalar(
            "SELECT id FROM watchlists
             WHERE listing_id = $1
               AND (($2::uuid IS NOT NULL AND user_id = $2)
                 OR ($3::uuid IS NOT NULL AND session_key = $3))",
        )
        .bind(listing.id)
        .bind(user_id)
        .bind(session_key)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(id) => {
                sqlx::query("DELETE FROM watchlists WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool)
                    .await?;
                Ok(false)
            }
            None => {
                sqlx::query(
                    "INSERT INTO watchlists (user_id, session_key, listing_id)
                     VALUES ($1, $2, $3)",
                )
                .bind(user_id)
                .bind(session_key)
                .bind(listing.id)
                .execute(&self.pool)
                .await?;
                Ok(true)
            }
        }
    }

    pub async fn get_guest(&self, id: Uuid) -> AppResult<Option<GuestUser>> {
        let guest = sqlx::query_as::<_, GuestUser>("SELECT * FROM guestusers WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(guest)
    }

    pub async fn create_guest(&self) -> AppResult<GuestUser> {
        let guest =
            sqlx::query_as::<_, GuestUser>("INSERT INTO guestusers DEFAULT VALUES RETURNING *")
                .fetch_one(&self.pool)
                .await?;
        Ok(guest)
    }

    /// Move a guest session's watchlist onto a freshly signed-in user.
    /// Entries the user already watches are skipped, then the guest
    /// session is dropped, cascading its remaining rows.
    pub async fn migrate_guest_watchlist(&self, guest_id: Uuid, user_id: Uuid) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(
            "INSERT INTO watchlists (user_id, listing_id)
             SELECT $1, w.listing_id FROM watchlists w
             WHERE w.session_key = $2
             ON CONFLICT (user_id, listing_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(guest_id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("DELETE FROM guestusers WHERE id = $1")
            .bind(guest_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}
