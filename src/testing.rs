//! Test utilities: an in-memory content store, seeded items and tokens.

use crate::{
    auth::Claims,
    registry::{MetaRegistry, register_meta_fields},
    routes::routes::routes,
    services::content_service::ContentService,
    state::AppState,
};
use axum::Router;
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::{str::FromStr, sync::Arc};

pub const JWT_SECRET: &str = "test-secret";

/// A migrated, empty content store backed by an in-memory SQLite database.
pub async fn content_service() -> ContentService {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    // A single long-lived connection keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .unwrap();

    let content = ContentService::new(Arc::new(pool));
    content.migrate().await.unwrap();
    content
}

pub async fn insert_item(
    content: &ContentService,
    id: i64,
    category: &str,
    author_id: &str,
    status: &str,
) {
    sqlx::query("INSERT INTO content_items (id, category, author_id, status) VALUES (?, ?, ?, ?)")
        .bind(id)
        .bind(category)
        .bind(author_id)
        .bind(status)
        .execute(&*content.db)
        .await
        .unwrap();
}

/// Application state over `content` with the SEO fields registered.
pub fn app_state(content: ContentService, commerce_enabled: bool) -> AppState {
    let mut registry = MetaRegistry::new();
    register_meta_fields(&mut registry, commerce_enabled);
    AppState::new(content, registry, JWT_SECRET, commerce_enabled)
}

pub fn app(content: ContentService, commerce_enabled: bool) -> Router {
    routes().with_state(app_state(content, commerce_enabled))
}

fn sign(claims: &Claims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

/// A bearer token for `user` holding `caps`, valid for an hour.
pub fn token(user: &str, caps: &[&str]) -> String {
    let now = Utc::now();
    sign(&Claims {
        sub: user.to_string(),
        caps: caps.iter().map(|cap| cap.to_string()).collect(),
        exp: (now + Duration::hours(1)).timestamp(),
    })
}

pub fn expired_token(user: &str, caps: &[&str]) -> String {
    let now = Utc::now();
    sign(&Claims {
        sub: user.to_string(),
        caps: caps.iter().map(|cap| cap.to_string()).collect(),
        exp: (now - Duration::hours(2)).timestamp(),
    })
}
