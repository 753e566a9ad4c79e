//! Search and sort over the catalog.
//!
//! The view is always recomputed from the full product list: filter first,
//! then a stable sort by price, so products with equal prices keep their
//! catalog order in both directions.

use minishop_core::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    #[must_use]
    pub fn arrow(self) -> &'static str {
        match self {
            Self::Ascending => "↑",
            Self::Descending => "↓",
        }
    }
}

/// Current search text and sort direction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub search: String,
    pub direction: SortDirection,
}

impl Query {
    /// Lowercased, trimmed search text; `None` when the search matches everything.
    #[must_use]
    pub fn needle(&self) -> Option<String> {
        let trimmed = self.search.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_lowercase())
    }
}

/// Case-insensitive substring match on name or concentration.
/// `needle` must already be lowercased.
#[must_use]
pub fn matches(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.concentration.to_lowercase().contains(needle)
}

/// Returns indices into `products` for the filtered, price-sorted view.
#[must_use]
pub fn apply(products: &[Product], query: &Query) -> Vec<usize> {
    let needle = query.needle();
    let mut view: Vec<usize> = products
        .iter()
        .enumerate()
        .filter(|(_, p)| needle.as_deref().is_none_or(|n| matches(p, n)))
        .map(|(idx, _)| idx)
        .collect();

    // `sort_by` is stable; ties keep filtered order.
    match query.direction {
        SortDirection::Ascending => view.sort_by(|&a, &b| products[a].price.cmp(&products[b].price)),
        SortDirection::Descending => {
            view.sort_by(|&a, &b| products[b].price.cmp(&products[a].price));
        }
    }
    view
}
