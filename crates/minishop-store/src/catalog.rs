use std::collections::hash_map::Entry;
use std::collections::HashMap;

use minishop_core::{Product, ProductId};

use crate::query::{self, Query};

/// The current catalog snapshot and its filtered/sorted view.
///
/// [`CatalogStore::replace`] is the only way to change the products; it
/// swaps the whole list and marks the view stale until the next
/// [`CatalogStore::apply_query`].
#[derive(Debug, Default)]
pub struct CatalogStore {
    products: Vec<Product>,
    index: HashMap<ProductId, usize>,
    view: Vec<usize>,
    view_stale: bool,
    generation: u64,
}

impl CatalogStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps in a new snapshot. When a snapshot repeats an id, lookups
    /// resolve to its first occurrence.
    pub fn replace(&mut self, products: Vec<Product>) {
        let mut index = HashMap::with_capacity(products.len());
        for (idx, product) in products.iter().enumerate() {
            match index.entry(product.id.clone()) {
                Entry::Occupied(_) => {
                    tracing::warn!(product_id = %product.id, "duplicate product id in catalog snapshot");
                }
                Entry::Vacant(slot) => {
                    slot.insert(idx);
                }
            }
        }

        self.products = products;
        self.index = index;
        self.view.clear();
        self.view_stale = true;
        self.generation += 1;
    }

    #[must_use]
    pub fn lookup(&self, id: &ProductId) -> Option<&Product> {
        self.index.get(id).map(|&idx| &self.products[idx])
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Incremented on every [`CatalogStore::replace`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Recomputes the view for `query`.
    pub fn apply_query(&mut self, query: &Query) {
        self.view = query::apply(&self.products, query);
        self.view_stale = false;
    }

    #[must_use]
    pub fn is_view_stale(&self) -> bool {
        self.view_stale
    }

    /// Products in view order. A stale view falls back to catalog order.
    pub fn visible(&self) -> Box<dyn Iterator<Item = &Product> + '_> {
        if self.view_stale {
            Box::new(self.products.iter())
        } else {
            Box::new(self.view.iter().map(|&idx| &self.products[idx]))
        }
    }
}
