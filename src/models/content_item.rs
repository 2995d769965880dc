//! Represents a content item (article, page, product, ...) as stored by the
//! host platform.

use serde::Serialize;
use std::fmt;

/// Publication status the host uses for live content.
pub const STATUS_PUBLISH: &str = "publish";

/// A single addressable unit of content in the host store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentItem {
    /// Numeric identifier assigned by the host store.
    pub id: i64,

    /// Category (host post type) of the item.
    pub category: Category,

    /// Identity of the user who authored the item.
    pub author_id: String,

    /// Publication status, e.g. `draft` or `publish`.
    pub status: String,
}

impl ContentItem {
    pub fn is_published(&self) -> bool {
        self.status == STATUS_PUBLISH
    }
}

/// Category of a content item.
///
/// Articles are stored under the host slug `post`. Products only exist when
/// the commerce extension is active; without it they are an unknown category
/// for capability purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "String")]
pub enum Category {
    Article,
    Page,
    Product,
    Other(String),
}

/// The capabilities required to edit items of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CapabilitySet {
    /// Needed to edit any item of the category.
    pub edit: &'static str,
    /// Additionally needed when the caller is not the item's author.
    pub edit_others: &'static str,
    /// Additionally needed when the item is published.
    pub edit_published: &'static str,
}

const ARTICLE_CAPS: CapabilitySet = CapabilitySet {
    edit: "edit_posts",
    edit_others: "edit_others_posts",
    edit_published: "edit_published_posts",
};

const PAGE_CAPS: CapabilitySet = CapabilitySet {
    edit: "edit_pages",
    edit_others: "edit_others_pages",
    edit_published: "edit_published_pages",
};

const PRODUCT_CAPS: CapabilitySet = CapabilitySet {
    edit: "edit_products",
    edit_others: "edit_others_products",
    edit_published: "edit_published_products",
};

impl Category {
    /// The category whose base capability is used when no item can be resolved.
    pub const DEFAULT: Category = Category::Article;

    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "post" => Category::Article,
            "page" => Category::Page,
            "product" => Category::Product,
            other => Category::Other(other.to_string()),
        }
    }

    pub fn slug(&self) -> &str {
        match self {
            Category::Article => "post",
            Category::Page => "page",
            Category::Product => "product",
            Category::Other(slug) => slug,
        }
    }

    /// Resolve a REST collection name (`posts`, `pages`, `products`) to a
    /// category. `products` only resolves while commerce is enabled.
    pub fn from_rest_base(base: &str, commerce_enabled: bool) -> Option<Self> {
        match base {
            "posts" => Some(Category::Article),
            "pages" => Some(Category::Page),
            "products" if commerce_enabled => Some(Category::Product),
            _ => None,
        }
    }

    /// Capability set for editing items of this category, or `None` when the
    /// category is not known to the host.
    pub fn capabilities(&self, commerce_enabled: bool) -> Option<CapabilitySet> {
        match self {
            Category::Article => Some(ARTICLE_CAPS),
            Category::Page => Some(PAGE_CAPS),
            Category::Product if commerce_enabled => Some(PRODUCT_CAPS),
            Category::Product | Category::Other(_) => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.slug().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_map_to_categories() {
        assert_eq!(Category::from_slug("post"), Category::Article);
        assert_eq!(Category::from_slug("product"), Category::Product);
        assert_eq!(
            Category::from_slug("attachment"),
            Category::Other("attachment".into())
        );
        assert_eq!(Category::Article.slug(), "post");
    }

    #[test]
    fn products_need_commerce() {
        assert_eq!(Category::Product.capabilities(false), None);
        assert_eq!(
            Category::Product.capabilities(true).map(|caps| caps.edit),
            Some("edit_products")
        );
        assert_eq!(Category::from_rest_base("products", false), None);
        assert_eq!(
            Category::from_rest_base("products", true),
            Some(Category::Product)
        );
    }

    #[test]
    fn unknown_categories_have_no_capabilities() {
        assert_eq!(Category::Other("nav_menu_item".into()).capabilities(true), None);
        assert_eq!(Category::from_rest_base("widgets", true), None);
    }
}
