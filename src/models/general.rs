//! Site-wide Models
//!
//! Site contact details, newsletter subscribers, and customer reviews.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Singleton row holding site contact details
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct SiteDetail {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub fb: String,
    pub tw: String,
    pub wh: String,
    pub ig: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Newsletter subscriber
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Subscriber {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub exported: bool,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub updated_at: DateTime<Utc>,
}

/// Customer review; only rows flagged for display are listed publicly
#[derive(Debug, Clone, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub show: bool,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Review joined with its reviewer for API output
#[derive(Debug, Clone, FromRow)]
pub struct ReviewRow {
    pub text: String,
    pub reviewer_id: Uuid,
    pub reviewer_first_name: String,
    pub reviewer_last_name: String,
    pub reviewer_avatar_id: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_detail_hides_row_metadata() {
        let now = Utc::now();
        let detail = SiteDetail {
            id: Uuid::new_v4(),
            name: "Bidhouse".into(),
            email: "hello@bidhouse.com".into(),
            phone: "+2348133831036".into(),
            address: "234, Lagos, Nigeria".into(),
            fb: "https://facebook.com".into(),
            tw: "https://twitter.com".into(),
            wh: "https://wa.me/2348133831036".into(),
            ig: "https://instagram.com".into(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(detail).unwrap();
        assert!(json.get("id").is_none());
        assert!(json.get("created_at").is_none());
        assert_eq!(json["name"], "Bidhouse");
    }
}
