//! API Layer
//!
//! Routes, middleware, and HTTP handlers.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::AppState;
pub use routes::RouterBuilder;
