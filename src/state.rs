//! Shared application state handed to every handler.

use crate::{
    registry::MetaRegistry,
    services::{
        content_service::ContentService, meta_service::MetaService,
        permission_service::PermissionService,
    },
};
use jsonwebtoken::DecodingKey;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub content: ContentService,
    pub meta: MetaService,
    pub permissions: PermissionService,
    /// Meta fields exposed through the generic object API.
    pub registry: Arc<MetaRegistry>,
    /// Key used to verify bearer tokens issued by the host platform.
    pub token_key: Arc<DecodingKey>,
    pub commerce_enabled: bool,
}

impl AppState {
    pub fn new(
        content: ContentService,
        registry: MetaRegistry,
        jwt_secret: &str,
        commerce_enabled: bool,
    ) -> Self {
        Self {
            meta: MetaService::new(content.clone()),
            permissions: PermissionService::new(content.clone(), commerce_enabled),
            content,
            registry: Arc::new(registry),
            token_key: Arc::new(DecodingKey::from_secret(jwt_secret.as_bytes())),
            commerce_enabled,
        }
    }
}
