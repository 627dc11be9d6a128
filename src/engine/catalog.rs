//! In-memory catalog index.
//!
//! Built once from the item list and then only read: it maps part ids
//! to slugs and selects candidate sets by display name, with no network
//! cost.

use std::collections::HashMap;

use crate::types::CatalogItem;

/// The flat item list plus an id → slug lookup.
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    items: Vec<CatalogItem>,
    slug_by_id: HashMap<String, String>,
}

impl CatalogIndex {
    pub fn from_items(items: Vec<CatalogItem>) -> Self {
        let slug_by_id = items
            .iter()
            .map(|i| (i.id.clone(), i.slug.clone()))
            .collect();
        Self { items, slug_by_id }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn slug_for(&self, id: &str) -> Option<&str> {
        self.slug_by_id.get(id).map(String::as_str)
    }

    /// Items whose display name contains `marker`, in catalog order.
    pub fn candidates<'a>(&'a self, marker: &'a str) -> impl Iterator<Item = &'a CatalogItem> + 'a {
        self.items
            .iter()
            .filter(move |item| item.display_name.contains(marker))
    }
}
