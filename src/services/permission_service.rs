//! Decides whether a caller may change the SEO meta of a content item.

use crate::{
    auth::Identity,
    models::content_item::{Category, ContentItem},
    services::content_service::{ContentResult, ContentService},
};
use tracing::debug;

#[derive(Clone)]
pub struct PermissionService {
    content: ContentService,
    commerce_enabled: bool,
}

impl PermissionService {
    pub fn new(content: ContentService, commerce_enabled: bool) -> Self {
        Self {
            content,
            commerce_enabled,
        }
    }

    /// Whether `identity` may update meta on `item_id`.
    ///
    /// With a positive `item_id` whose item and category resolve, the caller
    /// must be able to edit that specific item. Otherwise the caller only
    /// needs the base edit capability of the default category.
    pub async fn can_update(
        &self,
        identity: Option<&Identity>,
        item_id: Option<i64>,
    ) -> ContentResult<bool> {
        let Some(identity) = identity else {
            return Ok(false);
        };

        if let Some(id) = item_id.filter(|id| *id > 0) {
            if let Some(item) = self.content.get_item(id).await? {
                if let Some(allowed) = self.can_edit_item(identity, &item) {
                    return Ok(allowed);
                }
                debug!(item_id = id, category = %item.category, "category has no capabilities");
            }
        }

        Ok(self.can_edit_default(identity))
    }

    /// Same check for an item that has already been loaded.
    pub fn can_update_item(&self, identity: Option<&Identity>, item: &ContentItem) -> bool {
        match identity {
            Some(identity) => self
                .can_edit_item(identity, item)
                .unwrap_or_else(|| self.can_edit_default(identity)),
            None => false,
        }
    }

    /// `None` when the item's category has no capability set.
    fn can_edit_item(&self, identity: &Identity, item: &ContentItem) -> Option<bool> {
        let caps = item.category.capabilities(self.commerce_enabled)?;

        let mut required = vec![caps.edit];
        if item.author_id != identity.user_id {
            required.push(caps.edit_others);
        }
        if item.is_published() {
            required.push(caps.edit_published);
        }

        Some(required.iter().all(|cap| identity.has_cap(cap)))
    }

    fn can_edit_default(&self, identity: &Identity) -> bool {
        Category::DEFAULT
            .capabilities(self.commerce_enabled)
            .is_some_and(|caps| identity.has_cap(caps.edit))
    }
}
