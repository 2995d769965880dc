//! Caller identity carried by bearer tokens the host platform issues.
//!
//! Tokens are only verified here (signature and expiry); issuing them is the
//! host's business. A request without an `Authorization` header is anonymous,
//! a request with a malformed or invalid token is rejected outright.

use crate::{errors::ApiError, state::AppState};
use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User identifier.
    pub sub: String,
    /// Capabilities granted to the user.
    #[serde(default)]
    pub caps: Vec<String>,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// An authenticated caller and the capabilities it holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    capabilities: HashSet<String>,
}

impl Identity {
    pub fn new<I, S>(user_id: impl Into<String>, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id: user_id.into(),
            capabilities: capabilities.into_iter().map(Into::into).collect(),
        }
    }

    pub fn has_cap(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Identity::new(claims.sub, claims.caps)
    }
}

/// The caller of a request, `None` when no credentials were sent.
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    pub fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(header_value) = parts.headers.get(header::AUTHORIZATION) else {
            return Ok(Caller(None));
        };

        let token = header_value
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::InvalidToken("Authorization header must use Bearer token format".into())
            })?;

        let identity = verify_token(token, &state.token_key).map_err(ApiError::InvalidToken)?;
        Ok(Caller(Some(identity)))
    }
}

/// Validate a token and turn its claims into an [`Identity`].
pub fn verify_token(token: &str, key: &DecodingKey) -> Result<Identity, String> {
    let token_data = decode::<Claims>(token, key, &Validation::default())
        .map_err(|e| format!("Invalid JWT token: {}", e))?;
    Ok(token_data.claims.into())
}
