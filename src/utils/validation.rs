//! Validation Utilities
//!
//! Custom validators for request payloads plus slug generation.

use regex::Regex;
use std::sync::OnceLock;
use validator::ValidationError;

/// Validates email address format
pub fn validate_email_format(email: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });
    regex.is_match(email)
}

/// Normalizes email to lowercase without surrounding whitespace
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Lowercase-hyphenated slug from a display name
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_dash = true;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            last_was_dash = false;
        } else if !last_was_dash {
            slug.push('-');
            last_was_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Custom validator for email fields
pub fn email_validator(email: &str) -> Result<(), ValidationError> {
    if validate_email_format(email) {
        Ok(())
    } else {
        let mut err = ValidationError::new("invalid_email");
        err.message = Some("Invalid email address".into());
        Err(err)
    }
}

/// First/last names must be single words (no spacing)
pub fn single_name_validator(name: &str) -> Result<(), ValidationError> {
    if name.trim().split(' ').count() > 1 {
        let mut err = ValidationError::new("no_spacing");
        err.message = Some("No spacing allowed".into());
        return Err(err);
    }
    if name.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some("This field is required".into());
        return Err(err);
    }
    Ok(())
}

/// Auction closing dates must lie in the future
pub fn future_date_validator(date: &chrono::DateTime<chrono::Utc>) -> Result<(), ValidationError> {
    if *date > chrono::Utc::now() {
        Ok(())
    } else {
        let mut err = ValidationError::new("closing_date");
        err.message = Some("Closing date must be in the future".into());
        Err(err)
    }
}

/// Terms agreement must be accepted on registration
pub fn terms_agreement_validator(agreed: &bool) -> Result<(), ValidationError> {
    if *agreed {
        Ok(())
    } else {
        let mut err = ValidationError::new("terms_agreement");
        err.message = Some("You must agree to terms and conditions".into());
        Err(err)
    }
}
