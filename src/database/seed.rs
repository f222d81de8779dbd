//! First-run Seeding
//!
//! Creates the site detail singleton, the default listing categories,
//! and the initial accounts named in the environment. Everything here
//! is idempotent so startup can run it unconditionally.

use log::info;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::SeedConfig;
use crate::utils::security::hash_password;
use crate::utils::validation::{normalize_email, slugify};
use crate::utils::{AppError, AppResult};

const DEFAULT_CATEGORIES: &[&str] = &[
    "Technology",
    "Accessories",
    "Automobile",
    "Fashion",
    "House",
];

pub async fn run(pool: &PgPool, config: &SeedConfig) -> AppResult<()> {
    seed_site_detail(pool).await?;
    seed_categories(pool).await?;

    if let (Some(email), Some(password)) =
        (&config.superuser_email, &config.superuser_password)
    {
        seed_user(pool, "Site", "Admin", email, password, true).await?;
    }
    if let (Some(email), Some(password)) =
        (&config.auctioneer_email, &config.auctioneer_password)
    {
        seed_user(pool, "First", "Auctioneer", email, password, false).await?;
    }
    if let (Some(email), Some(password)) = (&config.reviewer_email, &config.reviewer_password) {
        let reviewer_id = seed_user(pool, "First", "Reviewer", email, password, false).await?;
        seed_review(pool, reviewer_id).await?;
    }
    Ok(())
}

async fn seed_site_detail(pool: &PgPool) -> AppResult<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM sitedetails)")
        .fetch_one(pool)
        .await?;
    if !exists {
        sqlx::query("INSERT INTO sitedetails DEFAULT VALUES")
            .execute(pool)
            .await?;
        info!("Seeded site details");
    }
    Ok(())
}

async fn seed_categories(pool: &PgPool) -> AppResult<()> {
    for name in DEFAULT_CATEGORIES {
        sqlx::query(
            "INSERT INTO categories (name, slug) VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING",
        )
        .bind(name)
        .bind(slugify(name))
        .execute(pool)
        .await?;
    }
    Ok(())
}

async fn seed_user(
    pool: &PgPool,
    first_name: &str,
    last_name: &str,
    email: &str,
    password: &str,
    superuser: bool,
) -> AppResult<Uuid> {
    let email = normalize_email(email);
    if let Some(id) = sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(pool)
        .await?
    {
        return Ok(id);
    }
    let password_hash = hash_password(password).map_err(AppError::Hashing)?;
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (first_name, last_name, email, password_hash, is_email_verified,
                            is_superuser, is_staff, terms_agreement)
         VALUES ($1, $2, $3, $4, TRUE, $5, $5, TRUE)
         RETURNING id",
    )
    .bind(first_name)
    .bind(last_name)
    .bind(&email)
    .bind(&password_hash)
    .bind(superuser)
    .fetch_one(pool)
    .await?;
    info!("Seeded account {}", email);
    Ok(id)
}

async fn seed_review(pool: &PgPool, reviewer_id: Uuid) -> AppResult<()> {
    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM reviews WHERE reviewer_id = $1)")
            .bind(reviewer_id)
            .fetch_one(pool)
            .await?;
    if !exists {
        sqlx::query("INSERT INTO reviews (reviewer_id, show, text) VALUES ($1, TRUE, $2)")
            .bind(reviewer_id)
            .bind("Maecenas vitae porttitor neque, ac porttitor nunc. Duis venenatis lacinia libero.")
            .execute(pool)
            .await?;
    }
    Ok(())
}
