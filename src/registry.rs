//! Meta fields exposed through the generic object API.
//!
//! `register_meta_fields` is called once at startup and declares the four SEO
//! fields for articles, and for products when commerce is enabled. The
//! object handlers consult the registry to decide which meta keys an item
//! exposes and which permission check guards them.

use crate::models::{
    content_item::Category,
    meta_field::{MetaField, Sanitizer},
};
use serde_json::Value;
use std::collections::HashMap;

/// Value type of a registered meta field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetaType {
    String,
}

/// Permission check guarding a registered field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthHook {
    /// The caller must pass the update permission check for the item.
    CanUpdateItem,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaDeclaration {
    pub key: &'static str,
    pub value_type: MetaType,
    /// A single value per item rather than a list.
    pub single: bool,
    pub description: &'static str,
    /// Cleans submitted values before they are stored.
    pub sanitize: Sanitizer,
    pub show_in_rest: bool,
    pub auth: AuthHook,
}

impl MetaDeclaration {
    pub fn for_field(field: MetaField) -> Self {
        Self {
            key: field.key(),
            value_type: MetaType::String,
            single: true,
            description: field.description(),
            sanitize: field.sanitizer(),
            show_in_rest: true,
            auth: AuthHook::CanUpdateItem,
        }
    }

    /// The submitted value when it fits the declared type and cardinality.
    pub fn accept<'a>(&self, value: &'a Value) -> Option<&'a str> {
        match self.value_type {
            MetaType::String if self.single => value.as_str(),
            MetaType::String => None,
        }
    }
}

/// Registered meta declarations, per category, in registration order.
#[derive(Debug, Default)]
pub struct MetaRegistry {
    by_category: HashMap<Category, Vec<MetaDeclaration>>,
}

impl MetaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `declaration` for `category`, replacing an earlier
    /// declaration of the same key.
    pub fn register(&mut self, category: Category, declaration: MetaDeclaration) {
        tracing::trace!(
            category = %category,
            key = declaration.key,
            description = declaration.description,
            "register meta"
        );
        let fields = self.by_category.entry(category).or_default();
        match fields.iter_mut().find(|existing| existing.key == declaration.key) {
            Some(existing) => *existing = declaration,
            None => fields.push(declaration),
        }
    }

    pub fn fields_for(&self, category: &Category) -> &[MetaDeclaration] {
        self.by_category
            .get(category)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn get(&self, category: &Category, key: &str) -> Option<&MetaDeclaration> {
        self.fields_for(category)
            .iter()
            .find(|declaration| declaration.key == key)
    }
}

/// Declare the SEO fields for articles, and for products when commerce is on.
pub fn register_meta_fields(registry: &mut MetaRegistry, commerce_enabled: bool) {
    let mut categories = vec![Category::Article];
    if commerce_enabled {
        categories.push(Category::Product);
    }

    for category in categories {
        for field in MetaField::ALL {
            registry.register(category.clone(), MetaDeclaration::for_field(field));
        }
        tracing::debug!(category = %category, "registered SEO meta fields");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(registry: &MetaRegistry, category: &Category) -> Vec<&'static str> {
        registry
            .fields_for(category)
            .iter()
            .map(|declaration| declaration.key)
            .collect()
    }

    #[test]
    fn articles_always_get_the_fields() {
        let mut registry = MetaRegistry::new();
        register_meta_fields(&mut registry, false);

        assert_eq!(
            keys(&registry, &Category::Article),
            vec![
                "rank_math_title",
                "rank_math_description",
                "rank_math_canonical_url",
                "rank_math_focus_keyword",
            ]
        );
        assert!(registry.fields_for(&Category::Product).is_empty());
        assert!(registry.fields_for(&Category::Page).is_empty());
    }

    #[test]
    fn products_get_the_fields_with_commerce() {
        let mut registry = MetaRegistry::new();
        register_meta_fields(&mut registry, true);

        assert_eq!(registry.fields_for(&Category::Product).len(), 4);
        let declaration = registry
            .get(&Category::Product, "rank_math_canonical_url")
            .unwrap();
        assert_eq!(declaration.description, "Canonical URL");
        assert_eq!(declaration.value_type, MetaType::String);
        assert!(declaration.single);
        assert_eq!(declaration.sanitize, Sanitizer::Url);
        assert!(declaration.show_in_rest);
        assert_eq!(declaration.auth, AuthHook::CanUpdateItem);
    }

    #[test]
    fn declarations_accept_single_strings_only() {
        let declaration = MetaDeclaration::for_field(MetaField::Title);
        assert_eq!(declaration.accept(&Value::from("SEO")), Some("SEO"));
        assert_eq!(declaration.accept(&Value::from(3)), None);
        assert_eq!(declaration.accept(&serde_json::json!(["a", "b"])), None);
    }

    #[test]
    fn registration_is_idempotent() {
        let mut registry = MetaRegistry::new();
        register_meta_fields(&mut registry, true);
        register_meta_fields(&mut registry, true);

        assert_eq!(registry.fields_for(&Category::Article).len(), 4);
        assert_eq!(registry.fields_for(&Category::Product).len(), 4);
    }
}
