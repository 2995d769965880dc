use crate::services::{content_service::ContentError, meta_service::MetaError};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Errors returned to API clients.
///
/// Each variant maps to an HTTP status and a stable machine-readable code;
/// the body is always `{error, message, status}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing parameter(s): {0}")]
    MissingParam(&'static str),

    #[error("Invalid parameter(s): post_id ({0})")]
    InvalidItemId(String),

    #[error("Invalid parameter(s): {param} ({reason})")]
    InvalidParam { param: &'static str, reason: String },

    #[error("Invalid JSON body passed: {0}")]
    InvalidJson(String),

    #[error("No metadata fields were provided in the request")]
    NoFieldsProvided,

    /// The caller lacks permission. `authenticated` selects 403 over 401.
    #[error("Sorry, you are not allowed to do that.")]
    Unauthorized { authenticated: bool },

    /// A registered meta key whose authorization hook failed.
    #[error("Sorry, you are not allowed to edit the {key} custom field.")]
    CannotUpdate { key: String, authenticated: bool },

    #[error("{0}")]
    InvalidToken(String),

    #[error("Invalid post ID.")]
    ItemNotFound,

    #[error("No route was found matching the URL and request method.")]
    NoRoute,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingParam(_)
            | ApiError::InvalidItemId(_)
            | ApiError::InvalidParam { .. }
            | ApiError::InvalidJson(_)
            | ApiError::NoFieldsProvided => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized {
                authenticated: true,
            }
            | ApiError::CannotUpdate {
                authenticated: true,
                ..
            } => StatusCode::FORBIDDEN,
            ApiError::Unauthorized {
                authenticated: false,
            }
            | ApiError::CannotUpdate {
                authenticated: false,
                ..
            }
            | ApiError::InvalidToken(_) => StatusCode::UNAUTHORIZED,
            ApiError::ItemNotFound | ApiError::NoRoute => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::MissingParam(_) => "rest_missing_callback_param",
            ApiError::InvalidItemId(_) | ApiError::InvalidParam { .. } => "rest_invalid_param",
            ApiError::InvalidJson(_) => "rest_invalid_json",
            ApiError::NoFieldsProvided => "no_fields_provided",
            ApiError::Unauthorized { .. } => "rest_forbidden",
            ApiError::CannotUpdate { .. } => "rest_cannot_update",
            ApiError::InvalidToken(_) => "rest_invalid_token",
            ApiError::ItemNotFound => "rest_post_invalid_id",
            ApiError::NoRoute => "rest_no_route",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }

        let body = Json(json!({
            "error": self.code(),
            "message": self.to_string(),
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<MetaError> for ApiError {
    fn from(err: MetaError) -> Self {
        match err {
            MetaError::NoFieldsProvided => ApiError::NoFieldsProvided,
        }
    }
}
