//! Generic object API for content items.
//!
//! `GET /wp/v2/{rest_base}/{id}` returns an item together with the meta fields
//! registered for its category. Each registered field is only included when
//! its authorization hook passes for the caller.
//!
//! `POST /wp/v2/{rest_base}/{id}` writes the registered keys of a `meta`
//! object. Unregistered keys are ignored, and every key is type checked and
//! authorized before the first write.

use crate::{
    auth::{Caller, Identity},
    errors::ApiError,
    models::content_item::{Category, ContentItem},
    registry::{AuthHook, MetaDeclaration},
    sanitize,
    state::AppState,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
pub struct ObjectResponse {
    pub id: i64,
    #[serde(rename = "type")]
    pub category: Category,
    pub status: String,
    pub meta: Map<String, Value>,
}

/// GET `/wp/v2/{rest_base}/{id}`
pub async fn get_object(
    State(state): State<AppState>,
    caller: Caller,
    Path((rest_base, id)): Path<(String, String)>,
) -> Result<Json<ObjectResponse>, ApiError> {
    let item = resolve_item(&state, &rest_base, &id).await?;
    Ok(Json(render_object(&state, caller.identity(), item).await?))
}

/// POST `/wp/v2/{rest_base}/{id}`
pub async fn update_object(
    State(state): State<AppState>,
    caller: Caller,
    Path((rest_base, id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<ObjectResponse>, ApiError> {
    let item = resolve_item(&state, &rest_base, &id).await?;
    let meta = read_meta(&body)?;

    let identity = caller.identity();
    let can_update = state.permissions.can_update_item(identity, &item);

    let mut writes = Vec::new();
    for (key, value) in &meta {
        let Some(declaration) = state
            .registry
            .get(&item.category, key)
            .filter(|declaration| declaration.show_in_rest)
        else {
            debug!(item_id = item.id, key = key.as_str(), "ignoring unregistered meta key");
            continue;
        };
        if value.is_null() {
            continue;
        }

        let raw = declaration
            .accept(value)
            .ok_or_else(|| ApiError::InvalidParam {
                param: "meta",
                reason: format!("{} must be a string", key),
            })?;
        if !passes(declaration, can_update) {
            info!(
                item_id = item.id,
                key = key.as_str(),
                user = identity.map(|i| i.user_id.as_str()).unwrap_or("anonymous"),
                "meta write denied"
            );
            return Err(ApiError::CannotUpdate {
                key: key.clone(),
                authenticated: identity.is_some(),
            });
        }
        writes.push((declaration.key, sanitize::sanitize(declaration.sanitize, raw)));
    }

    for (key, value) in writes {
        let changed = state.content.set_meta(item.id, key, &value).await?;
        debug!(item_id = item.id, key, changed, "object meta written");
    }

    Ok(Json(render_object(&state, identity, item).await?))
}

/// Look up the item behind `/{rest_base}/{id}`. The item must belong to the
/// category the REST base names.
async fn resolve_item(
    state: &AppState,
    rest_base: &str,
    id: &str,
) -> Result<ContentItem, ApiError> {
    let category =
        Category::from_rest_base(rest_base, state.commerce_enabled).ok_or(ApiError::NoRoute)?;
    let id: i64 = id.parse().map_err(|_| ApiError::ItemNotFound)?;
    state
        .content
        .get_item(id)
        .await?
        .filter(|item| item.category == category)
        .ok_or(ApiError::ItemNotFound)
}

/// The `meta` object of a request body. A missing body or `meta` is empty.
fn read_meta(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.is_empty() {
        return Ok(Map::new());
    }
    let mut payload = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => map,
        Ok(_) => return Err(ApiError::InvalidJson("expected a JSON object".into())),
        Err(err) => return Err(ApiError::InvalidJson(err.to_string())),
    };
    match payload.remove("meta") {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(meta)) => Ok(meta),
        Some(_) => Err(ApiError::InvalidParam {
            param: "meta",
            reason: "must be an object".into(),
        }),
    }
}

async fn render_object(
    state: &AppState,
    identity: Option<&Identity>,
    item: ContentItem,
) -> Result<ObjectResponse, ApiError> {
    let can_update = state.permissions.can_update_item(identity, &item);

    let mut meta = Map::new();
    for declaration in state.registry.fields_for(&item.category) {
        if !declaration.show_in_rest || !passes(declaration, can_update) {
            continue;
        }
        // Unset values read as an empty string.
        let stored = state.content.get_meta(item.id, declaration.key).await?;
        meta.insert(
            declaration.key.to_string(),
            Value::String(stored.unwrap_or_default()),
        );
    }

    Ok(ObjectResponse {
        id: item.id,
        category: item.category,
        status: item.status,
        meta,
    })
}

fn passes(declaration: &MetaDeclaration, can_update: bool) -> bool {
    match declaration.auth {
        AuthHook::CanUpdateItem => can_update,
    }
}
