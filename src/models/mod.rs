//! Data Models
//!
//! Database rows, token claims, request payloads, and response shapes.

pub mod auth;
pub mod general;
pub mod listing;
pub mod requests;
pub mod responses;
pub mod user;
