//! Service Layer
//!
//! Business logic sitting between the HTTP handlers and the database.

pub mod auth;
pub mod email;
pub mod files;
pub mod general;
pub mod listing;
pub mod user;

pub use auth::AuthService;
pub use email::{EmailKind, EmailService};
pub use files::FileService;
pub use general::GeneralService;
pub use listing::ListingService;
pub use user::UserService;
