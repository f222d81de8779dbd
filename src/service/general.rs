//! General Service
//!
//! Site contact details, newsletter subscriptions, and reviews.

use sqlx::PgPool;

use crate::models::general::{ReviewRow, SiteDetail, Subscriber};
use crate::utils::validation::normalize_email;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct GeneralService {
    pool: PgPool,
}

impl GeneralService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fetch the site detail singleton, creating it with defaults on
    /// first access.
    pub async fn site_detail(&self) -> AppResult<SiteDetail> {
        if let Some(detail) =
            sqlx::query_as::<_, SiteDetail>("SELECT * FROM sitedetails LIMIT 1")
                .fetch_optional(&self.pool)
                .await?
        {
            return Ok(detail);
        }
        let detail = sqlx::query_as::<_, SiteDetail>(
            "INSERT INTO sitedetails DEFAULT VALUES RETURNING *",
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(detail)
    }

    /// Subscribe an address to the newsletter. Repeat subscriptions are
    /// accepted silently.
    pub async fn subscribe(&self, email: &str) -> AppResult<Subscriber> {
        let email = normalize_email(email);
        let subscriber = sqlx::query_as::<_, Subscriber>(
            "INSERT INTO subscribers (email) VALUES ($1)
             ON CONFLICT (email) DO UPDATE SET updated_at = subscribers.updated_at
             RETURNING *",
        )
        .bind(&email)
        .fetch_one(&self.pool)
        .await?;
        Ok(subscriber)
    }

    /// Reviews flagged for public display
    pub async fn reviews(&self) -> AppResult<Vec<ReviewRow>> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT r.text, r.reviewer_id,
                    u.first_name AS reviewer_first_name,
                    u.last_name AS reviewer_last_name,
                    u.avatar_id AS reviewer_avatar_id
             FROM reviews r
             JOIN users u ON u.id = r.reviewer_id
             WHERE r.show = TRUE
             ORDER BY r.created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
