//! Bidhouse Library
//!
//! A bidding marketplace service: account registration with email
//! verification, JWT authentication, auction listings with bids and
//! watchlists (for signed-in users and guest sessions alike), and the
//! general site endpoints.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use bidhouse::{
//!     api::{AppState, RouterBuilder},
//!     config::AppConfig,
//!     database::DatabaseConfig,
//!     service::{
//!         AuthService, EmailService, FileService, GeneralService, ListingService, UserService,
//!     },
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Arc::new(AppConfig::from_env()?);
//!     let pool = DatabaseConfig::from_env()?.create_pool().await?;
//!
//!     let state = AppState {
//!         auth_service: Arc::new(AuthService::new(pool.clone(), config.auth.clone())),
//!         user_service: Arc::new(UserService::new(pool.clone())),
//!         listing_service: Arc::new(ListingService::new(pool.clone())),
//!         general_service: Arc::new(GeneralService::new(pool.clone())),
//!         file_service: Arc::new(FileService::new(pool)),
//!         email_service: Arc::new(EmailService::new(config.email.clone())?),
//!         config,
//!     };
//!     let router = RouterBuilder::with_all_routes().build(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8000").await?;
//!     axum::serve(listener, router).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod database;
pub mod models;
pub mod service;
pub mod utils;

pub use api::{AppState, RouterBuilder};
pub use config::{AppConfig, AuthConfig, EmailConfig, SeedConfig, ServerConfig};
pub use database::DatabaseConfig;
pub use service::{
    AuthService, EmailService, FileService, GeneralService, ListingService, UserService,
};
pub use utils::{AppError, AppResult, ErrorResponse};

/// Library version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
