//! Bidhouse Server
//!
//! Binds the full API surface with configuration taken from the
//! environment. Runs migrations and first-run seeding on startup.

use std::sync::Arc;

use anyhow::Context;
use dotenv::dotenv;

use bidhouse::{
    api::{AppState, RouterBuilder},
    config::AppConfig,
    database::{self, DatabaseConfig},
    service::{
        AuthService, EmailService, FileService, GeneralService, ListingService, UserService,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    log::info!("Starting Bidhouse v{}", bidhouse::VERSION);

    let config = Arc::new(AppConfig::from_env().map_err(anyhow::Error::msg)?);
    config.validate().map_err(anyhow::Error::msg)?;

    let db_config = DatabaseConfig::from_env().map_err(anyhow::Error::msg)?;
    let pool = db_config
        .create_pool()
        .await
        .context("failed to connect to database")?;

    log::info!("Running database migrations");
    database::run_migrations(&pool).await?;
    database::seed::run(&pool, &config.seed).await?;

    let state = AppState {
        auth_service: Arc::new(AuthService::new(pool.clone(), config.auth.clone())),
        user_service: Arc::new(UserService::new(pool.clone())),
        listing_service: Arc::new(ListingService::new(pool.clone())),
        general_service: Arc::new(GeneralService::new(pool.clone())),
        file_service: Arc::new(FileService::new(pool)),
        email_service: Arc::new(EmailService::new(config.email.clone())?),
        config: config.clone(),
    };

    let router = RouterBuilder::with_all_routes().build(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    log::info!("Listening on {}", addr);
    axum::serve(listener, router).await?;

    Ok(())
}
