//! `POST /rank-math-api/v1/update-meta`
//!
//! Request handling happens in three stages, each rejecting before the next
//! one runs:
//! 1. argument validation (`post_id` present, numeric, and an existing item;
//!    field values are strings) and per-field sanitization,
//! 2. the update permission check for the resolved item,
//! 3. the handler body, which writes the fields through `MetaService`.

use crate::{
    auth::Caller,
    errors::ApiError,
    models::meta_field::MetaField,
    services::meta_service::{UpdateMetaRequest, UpdateOutcome},
    state::AppState,
};
use axum::{
    Json,
    body::Body,
    extract::{FromRequest, FromRequestParts, Request, State},
    http::{header, request::Parts},
};
use serde_json::{Map, Value};
use tracing::info;

const MAX_BODY_BYTES: usize = 1024 * 1024;
const ITEM_ID_PARAM: &str = "post_id";

/// An update request that passed argument validation and the permission check.
#[derive(Debug)]
pub struct AuthorizedUpdate(pub UpdateMetaRequest);

impl FromRequest<AppState> for AuthorizedUpdate {
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let (mut parts, body) = req.into_parts();
        let caller = Caller::from_request_parts(&mut parts, state).await?;
        let params = read_params(&parts, body).await?;
        let request = validate(&params, state).await?;

        let identity = caller.identity();
        if !state
            .permissions
            .can_update(identity, Some(request.item_id))
            .await?
        {
            info!(
                item_id = request.item_id,
                user = identity.map(|i| i.user_id.as_str()).unwrap_or("anonymous"),
                "meta update denied"
            );
            return Err(ApiError::Unauthorized {
                authenticated: identity.is_some(),
            });
        }

        Ok(AuthorizedUpdate(request))
    }
}

/// Update the SEO meta fields of one content item.
pub async fn update_meta(
    State(state): State<AppState>,
    AuthorizedUpdate(request): AuthorizedUpdate,
) -> Result<Json<UpdateOutcome>, ApiError> {
    let outcome = state.meta.update_meta(&request).await?;
    Ok(Json(outcome))
}

/// Collect query-string and body parameters; body values win.
///
/// The body is parsed as JSON when the content type says so and as a
/// urlencoded form otherwise.
async fn read_params(parts: &Parts, body: Body) -> Result<Map<String, Value>, ApiError> {
    let mut params = Map::new();
    if let Some(query) = parts.uri.query() {
        params.extend(form_pairs(query.as_bytes()));
    }

    let is_json = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.to_ascii_lowercase().starts_with("application/json"));

    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|err| ApiError::InvalidParam {
            param: "body",
            reason: err.to_string(),
        })?;
    if bytes.is_empty() {
        return Ok(params);
    }

    if is_json {
        match serde_json::from_slice::<Value>(&bytes) {
            Ok(Value::Object(map)) => params.extend(map),
            Ok(_) => return Err(ApiError::InvalidJson("expected a JSON object".into())),
            Err(err) => return Err(ApiError::InvalidJson(err.to_string())),
        }
    } else {
        params.extend(form_pairs(&bytes));
    }

    Ok(params)
}

fn form_pairs(input: &[u8]) -> impl Iterator<Item = (String, Value)> + '_ {
    url::form_urlencoded::parse(input)
        .map(|(key, value)| (key.into_owned(), Value::String(value.into_owned())))
}

/// Check `post_id` against the content store and sanitize supplied fields.
async fn validate(
    params: &Map<String, Value>,
    state: &AppState,
) -> Result<UpdateMetaRequest, ApiError> {
    let raw_id = params
        .get(ITEM_ID_PARAM)
        .filter(|value| !value.is_null())
        .ok_or(ApiError::MissingParam(ITEM_ID_PARAM))?;
    let item_id =
        parse_item_id(raw_id).ok_or_else(|| ApiError::InvalidItemId("must be numeric".into()))?;
    let item = state
        .content
        .get_item(item_id)
        .await?
        .ok_or_else(|| ApiError::InvalidItemId(format!("no content item {}", item_id)))?;

    let mut request = UpdateMetaRequest::new(item.id);
    for field in MetaField::ALL {
        match params.get(field.key()) {
            None | Some(Value::Null) => {}
            Some(Value::String(raw)) => request.set(field, raw),
            Some(_) => {
                return Err(ApiError::InvalidParam {
                    param: field.key(),
                    reason: "must be a string".into(),
                });
            }
        }
    }
    Ok(request)
}

/// Accept integers, whole floats and numeric strings.
fn parse_item_id(value: &Value) -> Option<i64> {
    fn whole(f: f64) -> Option<i64> {
        (f.is_finite() && f.fract() == 0.0).then_some(f as i64)
    }

    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(whole))
        }
        _ => None,
    }
}
