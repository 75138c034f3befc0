//! Catalog API Wire Models
//!
//! Records as the point-of-sale catalog API returns them. Every field is
//! optional on the wire; the menu normalizer decides what a missing value
//! means.

use serde::Deserialize;

// =============================================================================
// Catalog API Constants
// =============================================================================

/// Label used when an item carries no usable category name
pub const DEFAULT_CATEGORY: &str = "General";

// =============================================================================
// Wire Models
// =============================================================================

/// One page of a list endpoint: `{ "elements": [...] }`
#[derive(Debug, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub elements: Vec<T>,
}

/// A category reference, either embedded in an item or expanded from the
/// categories endpoint
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CategoryRef {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,
}

/// The shapes category information takes on an item record.
///
/// `expand=categories` yields `{ "elements": [...] }`; some merchants return a
/// bare array; older items embed a single object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum RawCategory {
    Expanded { elements: Vec<CategoryRef> },
    List(Vec<CategoryRef>),
    Single(CategoryRef),
}

impl RawCategory {
    /// Whether this is a reference list rather than a single embedded object.
    pub fn is_expanded(&self) -> bool {
        !matches!(self, RawCategory::Single(_))
    }

    pub fn refs(&self) -> &[CategoryRef] {
        match self {
            RawCategory::Expanded { elements } => elements,
            RawCategory::List(refs) => refs,
            RawCategory::Single(single) => std::slice::from_ref(single),
        }
    }
}

/// An item record from `GET /v3/merchants/{id}/items`
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct RawItem {
    #[serde(default)]
    pub id: Option<String>,

    #[serde(default)]
    pub name: Option<String>,

    /// Price in integer cents
    #[serde(default)]
    pub price: Option<i64>,

    #[serde(default)]
    pub hidden: Option<bool>,

    #[serde(default)]
    pub category: Option<RawCategory>,

    #[serde(default)]
    pub categories: Option<RawCategory>,
}

impl RawItem {
    /// All category references on the item, expanded lists first.
    pub fn category_refs(&self) -> Vec<&CategoryRef> {
        let mut sources: Vec<&RawCategory> =
            [&self.categories, &self.category].into_iter().flatten().collect();
        sources.sort_by_key(|c| !c.is_expanded());
        sources.into_iter().flat_map(|c| c.refs()).collect()
    }
}
