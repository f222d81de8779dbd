//! Utilities Module
//!
//! Shared utilities for error handling, security, and validation.

pub mod error;
pub mod security;
pub mod validation;

pub use error::{AppError, AppResult, ErrorResponse};
