//! Database Layer
//!
//! Connection pooling, migrations, and first-run seeding.

pub mod connection;
pub mod seed;

pub use connection::{run_migrations, DatabaseConfig};
