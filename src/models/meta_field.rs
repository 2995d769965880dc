//! The four SEO meta fields and the per-field outcome of an update.

use serde::{Serialize, Serializer, ser::SerializeMap};

/// One of the SEO meta fields managed by this service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetaField {
    Title,
    Description,
    CanonicalUrl,
    FocusKeyword,
}

/// How a submitted value is cleaned before it is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sanitizer {
    PlainText,
    Url,
}

impl MetaField {
    /// All fields, in the order they are processed and reported.
    pub const ALL: [MetaField; 4] = [
        MetaField::Title,
        MetaField::Description,
        MetaField::CanonicalUrl,
        MetaField::FocusKeyword,
    ];

    /// Meta key used on the wire and in the content store.
    pub fn key(self) -> &'static str {
        match self {
            MetaField::Title => "rank_math_title",
            MetaField::Description => "rank_math_description",
            MetaField::CanonicalUrl => "rank_math_canonical_url",
            MetaField::FocusKeyword => "rank_math_focus_keyword",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            MetaField::Title => "SEO Title",
            MetaField::Description => "SEO Description",
            MetaField::CanonicalUrl => "Canonical URL",
            MetaField::FocusKeyword => "Focus Keyword",
        }
    }

    pub fn sanitizer(self) -> Sanitizer {
        match self {
            MetaField::CanonicalUrl => Sanitizer::Url,
            _ => Sanitizer::PlainText,
        }
    }

    /// Position of the field in `ALL`.
    pub(crate) fn index(self) -> usize {
        match self {
            MetaField::Title => 0,
            MetaField::Description => 1,
            MetaField::CanonicalUrl => 2,
            MetaField::FocusKeyword => 3,
        }
    }
}

/// Outcome of one field in an update request.
///
/// The content store cannot tell a failed write from a write of an equal
/// value, so both are reported as `FailedOrUnchanged`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Updated,
    FailedOrUnchanged,
    #[default]
    NotProvided,
}

/// Per-field statuses, serialized as a map keyed by meta key in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldReport {
    statuses: [FieldStatus; 4],
}

impl FieldReport {
    pub fn get(&self, field: MetaField) -> FieldStatus {
        self.statuses[field.index()]
    }

    pub fn set(&mut self, field: MetaField, status: FieldStatus) {
        self.statuses[field.index()] = status;
    }

    pub fn any_updated(&self) -> bool {
        self.statuses.contains(&FieldStatus::Updated)
    }

    pub fn all_not_provided(&self) -> bool {
        self.statuses
            .iter()
            .all(|status| *status == FieldStatus::NotProvided)
    }
}

impl Serialize for FieldReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(MetaField::ALL.len()))?;
        for field in MetaField::ALL {
            map.serialize_entry(field.key(), &self.get(field))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn report_serializes_every_field() {
        let mut report = FieldReport::default();
        report.set(MetaField::Title, FieldStatus::Updated);
        report.set(MetaField::CanonicalUrl, FieldStatus::FailedOrUnchanged);

        assert_eq!(
            serde_json::to_value(report).unwrap(),
            json!({
                "rank_math_title": "updated",
                "rank_math_description": "not_provided",
                "rank_math_canonical_url": "failed_or_unchanged",
                "rank_math_focus_keyword": "not_provided",
            })
        );
    }

    #[test]
    fn report_flags() {
        let mut report = FieldReport::default();
        assert!(report.all_not_provided());
        assert!(!report.any_updated());

        report.set(MetaField::FocusKeyword, FieldStatus::FailedOrUnchanged);
        assert!(!report.all_not_provided());
        assert!(!report.any_updated());

        report.set(MetaField::Description, FieldStatus::Updated);
        assert!(report.any_updated());
    }

    #[test]
    fn only_canonical_url_is_url_sanitized() {
        let url_fields: Vec<_> = MetaField::ALL
            .into_iter()
            .filter(|field| field.sanitizer() == Sanitizer::Url)
            .collect();
        assert_eq!(url_fields, vec![MetaField::CanonicalUrl]);
    }
}
