//! SQLite-backed persistence for website records.
//!
//! One table, `websites`, keyed by a store-assigned rowid with a UNIQUE
//! constraint on `url`. That constraint is the authoritative duplicate
//! defense: concurrent ingests of the same URL race to insert and the loser
//! surfaces as [`StoreError::DuplicateUrl`], no application locking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{FromRow, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Website already exists")]
    DuplicateUrl,
    #[error("website not found")]
    NotFound,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// A persisted website. `url` and `created_at` are immutable after
/// creation; `brand_name` and `description` may be patched independently.
///
/// Serialized field names follow the public API's camelCase contract.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct WebsiteRecord {
    pub id: i64,
    pub url: String,
    pub brand_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a record; the store assigns `id` and
/// `created_at` itself.
#[derive(Debug, Clone)]
pub struct NewWebsite {
    pub url: String,
    pub brand_name: String,
    pub description: String,
}

/// Partial update. `None` fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct WebsitePatch {
    pub brand_name: Option<String>,
    pub description: Option<String>,
}

/// One page of records plus the full table count.
#[derive(Debug)]
pub struct WebsiteListing {
    pub records: Vec<WebsiteRecord>,
    pub total: i64,
}

#[derive(Clone)]
pub struct WebsiteStore {
    pool: SqlitePool,
}

impl WebsiteStore {
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Fresh in-memory store with the schema applied. A single connection
    /// keeps the in-memory database alive for the pool's lifetime.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS websites (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                brand_name TEXT NOT NULL,
                description TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;
        debug!("store.migrate");
        Ok(())
    }

    pub async fn create(&self, website: NewWebsite) -> Result<WebsiteRecord, StoreError> {
        let created_at = Utc::now();
        let res = sqlx::query(
            r#"INSERT INTO websites (url, brand_name, description, created_at)
               VALUES (?1, ?2, ?3, ?4)"#,
        )
        .bind(&website.url)
        .bind(&website.brand_name)
        .bind(&website.description)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .map_err(insert_error)?;

        let id = res.last_insert_rowid();
        info!(id, url = %website.url, "store.create");
        Ok(WebsiteRecord {
            id,
            url: website.url,
            brand_name: website.brand_name,
            description: website.description,
            created_at,
        })
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<WebsiteRecord>, StoreError> {
        let record = sqlx::query_as::<_, WebsiteRecord>(
            r#"SELECT id, url, brand_name, description, created_at
               FROM websites WHERE id = ?1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<WebsiteRecord>, StoreError> {
        let record = sqlx::query_as::<_, WebsiteRecord>(
            r#"SELECT id, url, brand_name, description, created_at
               FROM websites WHERE url = ?1"#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    /// Newest first; id breaks ties so repeated listings with no writes in
    /// between return identical pages.
    pub async fn list(&self, page: i64, limit: i64) -> Result<WebsiteListing, StoreError> {
        // Saturate so an absurd page number reads as an empty page rather
        // than wrapping into a negative offset.
        let offset = page.saturating_sub(1).saturating_mul(limit);
        let records = sqlx::query_as::<_, WebsiteRecord>(
            r#"SELECT id, url, brand_name, description, created_at
               FROM websites
               ORDER BY created_at DESC, id DESC
               LIMIT ?1 OFFSET ?2"#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM websites"#)
            .fetch_one(&self.pool)
            .await?;

        debug!(page, limit, total, rows = records.len(), "store.list");
        Ok(WebsiteListing { records, total })
    }

    /// Applies only the supplied fields and returns the updated record.
    pub async fn update(&self, id: i64, patch: WebsitePatch) -> Result<WebsiteRecord, StoreError> {
        let res = sqlx::query(
            r#"UPDATE websites
               SET brand_name = COALESCE(?1, brand_name),
                   description = COALESCE(?2, description)
               WHERE id = ?3"#,
        )
        .bind(patch.brand_name)
        .bind(patch.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!(id, "store.update");
        match self.find_by_id(id).await? {
            Some(record) => Ok(record),
            None => Err(StoreError::NotFound),
        }
    }

    pub async fn delete(&self, id: i64) -> Result<(), StoreError> {
        let res = sqlx::query(r#"DELETE FROM websites WHERE id = ?1"#)
            .bind(id)
            .execute(&self.pool)
            .await?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        info!(id, "store.delete");
        Ok(())
    }
}

fn insert_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db) = e {
        if db.is_unique_violation() {
            return StoreError::DuplicateUrl;
        }
    }
    StoreError::Db(e)
}
