//! Applies an SEO meta update to a content item, one field at a time.
//!
//! Fields are written in `MetaField::ALL` order with no transaction around
//! them: a field that was written stays written even when a later field
//! fails.

use crate::{
    models::meta_field::{FieldReport, FieldStatus, MetaField},
    sanitize,
    services::content_service::ContentService,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const MSG_ATTEMPTED: &str = "Metadata update attempted.";
pub const MSG_NOTHING_UPDATED: &str =
    "No metadata fields were successfully updated (check values or permissions).";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MetaError {
    #[error("No metadata fields were provided in the request")]
    NoFieldsProvided,
}

/// A validated update: the target item and the sanitized value of every
/// field that was supplied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateMetaRequest {
    pub item_id: i64,
    values: [Option<String>; 4],
}

impl UpdateMetaRequest {
    pub fn new(item_id: i64) -> Self {
        Self {
            item_id,
            values: Default::default(),
        }
    }

    /// Record a submitted value for `field`, sanitizing it for that field.
    pub fn set(&mut self, field: MetaField, raw: &str) {
        self.values[field.index()] = Some(sanitize::sanitize(field.sanitizer(), raw));
    }

    #[cfg(test)]
    pub fn with(mut self, field: MetaField, raw: &str) -> Self {
        self.set(field, raw);
        self
    }

    pub fn value(&self, field: MetaField) -> Option<&str> {
        self.values[field.index()].as_deref()
    }
}

/// Response body of a processed update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateOutcome {
    pub success: bool,
    pub message: &'static str,
    pub details: FieldReport,
}

impl UpdateOutcome {
    fn from_report(details: FieldReport) -> Self {
        let success = details.any_updated();
        Self {
            success,
            message: if success {
                MSG_ATTEMPTED
            } else {
                MSG_NOTHING_UPDATED
            },
            details,
        }
    }
}

#[derive(Clone)]
pub struct MetaService {
    content: ContentService,
}

impl MetaService {
    pub fn new(content: ContentService) -> Self {
        Self { content }
    }

    /// Write every supplied field and report the status of all four.
    /// A request without any field is rejected with `NoFieldsProvided`.
    ///
    /// A store error on one field is logged and reported as
    /// `failed_or_unchanged`; it does not stop the remaining fields.
    pub async fn update_meta(&self, request: &UpdateMetaRequest) -> Result<UpdateOutcome, MetaError> {
        let mut report = FieldReport::default();
        for field in MetaField::ALL {
            let Some(value) = request.value(field) else {
                continue;
            };

            let status = match self
                .content
                .set_meta(request.item_id, field.key(), value)
                .await
            {
                Ok(true) => FieldStatus::Updated,
                Ok(false) => FieldStatus::FailedOrUnchanged,
                Err(err) => {
                    warn!(
                        item_id = request.item_id,
                        key = field.key(),
                        "meta write failed: {}",
                        err
                    );
                    FieldStatus::FailedOrUnchanged
                }
            };
            debug!(item_id = request.item_id, key = field.key(), ?status, "meta field processed");
            report.set(field, status);
        }

        if report.all_not_provided() {
            return Err(MetaError::NoFieldsProvided);
        }
        Ok(UpdateOutcome::from_report(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    async fn service() -> (MetaService, ContentService) {
        let content = testing::content_service().await;
        testing::insert_item(&content, 42, "post", "alice", "draft").await;
        (MetaService::new(content.clone()), content)
    }

    #[test]
    fn request_sanitizes_per_field() {
        let request = UpdateMetaRequest::new(1)
            .with(MetaField::Title, "  <em>Big</em>\nSale ")
            .with(MetaField::CanonicalUrl, "javascript:alert(1)");

        assert_eq!(request.value(MetaField::Title), Some("Big Sale"));
        assert_eq!(request.value(MetaField::CanonicalUrl), Some(""));
        assert_eq!(request.value(MetaField::Description), None);
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let (meta, _) = service().await;
        let result = meta.update_meta(&UpdateMetaRequest::new(42)).await;
        assert_eq!(result, Err(MetaError::NoFieldsProvided));
    }

    #[tokio::test]
    async fn single_field_update() {
        let (meta, content) = service().await;
        let request = UpdateMetaRequest::new(42).with(MetaField::Title, "New Title");

        let outcome = meta.update_meta(&request).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.message, MSG_ATTEMPTED);
        assert_eq!(outcome.details.get(MetaField::Title), FieldStatus::Updated);
        for field in [
            MetaField::Description,
            MetaField::CanonicalUrl,
            MetaField::FocusKeyword,
        ] {
            assert_eq!(outcome.details.get(field), FieldStatus::NotProvided);
        }
        assert_eq!(
            content.get_meta(42, "rank_math_title").await.unwrap().as_deref(),
            Some("New Title")
        );
    }

    #[tokio::test]
    async fn repeated_value_reports_unchanged() {
        let (meta, _) = service().await;
        let request = UpdateMetaRequest::new(42).with(MetaField::FocusKeyword, "rust seo");

        let first = meta.update_meta(&request).await.unwrap();
        assert!(first.success);
        assert_eq!(first.details.get(MetaField::FocusKeyword), FieldStatus::Updated);

        let second = meta.update_meta(&request).await.unwrap();
        assert!(!second.success);
        assert_eq!(second.message, MSG_NOTHING_UPDATED);
        assert_eq!(
            second.details.get(MetaField::FocusKeyword),
            FieldStatus::FailedOrUnchanged
        );
    }

    #[tokio::test]
    async fn partial_change_still_succeeds() {
        let (meta, content) = service().await;
        content.set_meta(42, "rank_math_title", "Same").await.unwrap();

        let request = UpdateMetaRequest::new(42)
            .with(MetaField::Title, "Same")
            .with(MetaField::Description, "Fresh description");
        let outcome = meta.update_meta(&request).await.unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.details.get(MetaField::Title), FieldStatus::FailedOrUnchanged);
        assert_eq!(outcome.details.get(MetaField::Description), FieldStatus::Updated);
    }

    #[tokio::test]
    async fn store_failure_is_reported_per_field() {
        let (meta, _) = service().await;
        // No such item: the meta row violates the item foreign key.
        let request = UpdateMetaRequest::new(7).with(MetaField::Title, "Orphan");

        let outcome = meta.update_meta(&request).await.unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.details.get(MetaField::Title), FieldStatus::FailedOrUnchanged);
    }

    #[tokio::test]
    async fn unsafe_canonical_url_is_never_stored_verbatim() {
        let (meta, content) = service().await;
        let raw = "https://example.com/\"><script>alert(1)</script>";
        let request = UpdateMetaRequest::new(42).with(MetaField::CanonicalUrl, raw);

        meta.update_meta(&request).await.unwrap();
        let stored = content
            .get_meta(42, "rank_math_canonical_url")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored, raw);
        assert!(!stored.contains('<'));
    }
}
