//! src/services/content_service.rs
//!
//! ContentService: adapter over the host platform's content store. Content
//! items and their meta rows live in SQLite tables the host owns; this
//! service only looks items up and writes single meta values.

use crate::models::content_item::{Category, ContentItem};
use chrono::Utc;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Bootstrap schema for a local content database.
const INIT_SQL: &str = include_str!("../../migrations/0001_init.sql");

#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type ContentResult<T> = Result<T, ContentError>;

/// ContentService provides the content-store operations this service needs:
/// - Look up an item with its category, author and status
/// - Read a single meta value
/// - Set a single meta value, reporting whether anything changed
#[derive(Clone)]
pub struct ContentService {
    /// Shared SQLite connection pool for the host content database.
    pub db: Arc<SqlitePool>,
}

impl ContentService {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }

    /// Create the content tables if they are missing.
    pub async fn migrate(&self) -> ContentResult<()> {
        let statements = INIT_SQL
            .split(';')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>();

        tracing::info!("Running {} migration statements...", statements.len());

        for stmt in statements {
            debug!("Executing migration SQL: {}", stmt);
            sqlx::query(stmt).execute(&*self.db).await?;
        }
        Ok(())
    }

    /// Fetch a content item by ID. Returns `None` when it does not exist.
    pub async fn get_item(&self, id: i64) -> ContentResult<Option<ContentItem>> {
        let row = sqlx::query_as::<_, (i64, String, String, String)>(
            "SELECT id, category, author_id, status FROM content_items WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.map(|(id, category, author_id, status)| ContentItem {
            id,
            category: Category::from_slug(&category),
            author_id,
            status,
        }))
    }

    /// Read a single meta value.
    pub async fn get_meta(&self, item_id: i64, key: &str) -> ContentResult<Option<String>> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT meta_value FROM content_meta WHERE item_id = ? AND meta_key = ?",
        )
        .bind(item_id)
        .bind(key)
        .fetch_optional(&*self.db)
        .await?;
        Ok(value)
    }

    /// Store a meta value.
    ///
    /// Returns `true` when a row was inserted or changed and `false` when the
    /// stored value already equals `value`.
    pub async fn set_meta(&self, item_id: i64, key: &str, value: &str) -> ContentResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO content_meta (item_id, meta_key, meta_value, updated_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(item_id, meta_key) DO UPDATE SET
                meta_value = excluded.meta_value,
                updated_at = excluded.updated_at
            WHERE content_meta.meta_value IS NOT excluded.meta_value
            "#,
        )
        .bind(item_id)
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&*self.db)
        .await?;

        let changed = result.rows_affected() > 0;
        debug!(item_id, key, changed, "set meta value");
        Ok(changed)
    }
}
