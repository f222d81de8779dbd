//! File Service
//!
//! Bookkeeping for uploaded files. Only a record with the declared
//! resource type is stored here; clients upload the binary to external
//! storage keyed by the record id.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::user::StoredFile;
use crate::utils::AppResult;

#[derive(Clone)]
pub struct FileService {
    pool: PgPool,
}

impl FileService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, resource_type: &str) -> AppResult<StoredFile> {
        let file = sqlx::query_as::<_, StoredFile>(
            "INSERT INTO files (resource_type) VALUES ($1) RETURNING *",
        )
        .bind(resource_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(file)
    }

    /// Update an existing record in place, or create one when the id is
    /// absent. Used when replacing a listing image or avatar.
    pub async fn create_or_update(
        &self,
        existing: Option<Uuid>,
        resource_type: &str,
    ) -> AppResult<StoredFile> {
        match existing {
            Some(id) => {
                let updated = sqlx::query_as::<_, StoredFile>(
                    "UPDATE files SET resource_type = $1, updated_at = NOW()
                     WHERE id = $2 RETURNING *",
                )
                .bind(resource_type)
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
                match updated {
                    Some(file) => Ok(file),
                    None => self.create(resource_type).await,
                }
            }
            None => self.create(resource_type).await,
        }
    }
}
