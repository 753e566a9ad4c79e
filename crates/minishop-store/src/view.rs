//! Display projections of storefront state.
//!
//! Everything here is a pure function of the stores: nothing is cached and
//! nothing is mutated, so a [`Frame`] rebuilt from the same state is always
//! identical.

use minishop_core::{CartEntry, PriceFormat, Product, ProductId};
use rust_decimal::Decimal;

use crate::catalog::CatalogStore;
use crate::modal::ProductModal;
use crate::order;
use crate::query::SortDirection;

/// Presentation settings shared by every projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewSettings {
    pub price: PriceFormat,
    pub placeholder_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub details: String,
    pub price_label: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogGrid {
    Cards(Vec<ProductCard>),
    /// The view is empty: nothing loaded or nothing matches the search.
    NoMatches,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLineView {
    pub id: ProductId,
    pub name: String,
    pub details: String,
    pub quantity: u32,
    pub unit_price_label: String,
    pub line_total_label: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartBody {
    Empty,
    Lines {
        lines: Vec<CartLineView>,
        subtotal: Decimal,
        subtotal_label: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartView {
    /// Badge count: every entry, stale or not.
    pub item_count: u64,
    pub body: CartBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModalView {
    pub id: ProductId,
    pub name: String,
    pub concentration: String,
    pub volume: String,
    pub price_label: String,
    pub image_url: String,
    pub pending: u32,
}

/// Everything a renderer needs for one paint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub search: String,
    pub sort_label: String,
    pub catalog: CatalogGrid,
    pub cart: CartView,
    pub modal: Option<ModalView>,
}

/// A rendering backend.
pub trait Renderer {
    type Error;

    /// # Errors
    ///
    /// Backend-specific output failure.
    fn render(&mut self, frame: &Frame) -> Result<(), Self::Error>;
}

fn card(product: &Product, settings: &ViewSettings) -> ProductCard {
    ProductCard {
        id: product.id.clone(),
        name: product.name.clone(),
        details: product.details(),
        price_label: settings.price.label(product.price),
        image_url: product.image_or(&settings.placeholder_image_url).to_owned(),
    }
}

#[must_use]
pub fn catalog_grid(catalog: &CatalogStore, settings: &ViewSettings) -> CatalogGrid {
    let cards: Vec<ProductCard> = catalog.visible().map(|p| card(p, settings)).collect();
    if cards.is_empty() {
        CatalogGrid::NoMatches
    } else {
        CatalogGrid::Cards(cards)
    }
}

/// Cart lines resolved against the catalog. Stale entries are left out of
/// the lines and the subtotal but still count toward the badge.
#[must_use]
pub fn cart_view(entries: &[CartEntry], catalog: &CatalogStore, settings: &ViewSettings) -> CartView {
    let item_count = entries.iter().map(|e| u64::from(e.quantity)).sum();

    let mut subtotal = Decimal::ZERO;
    let lines: Vec<CartLineView> = entries
        .iter()
        .filter_map(|entry| {
            let product = catalog.lookup(&entry.id)?;
            let (line_total, running) = order::accumulate(subtotal, product, entry)?;
            subtotal = running;
            Some(CartLineView {
                id: product.id.clone(),
                name: product.name.clone(),
                details: product.details(),
                quantity: entry.quantity,
                unit_price_label: settings.price.label(product.price),
                line_total_label: settings.price.label(line_total),
            })
        })
        .collect();

    let body = if lines.is_empty() {
        CartBody::Empty
    } else {
        CartBody::Lines {
            lines,
            subtotal,
            subtotal_label: settings.price.label(subtotal),
        }
    };
    CartView { item_count, body }
}

/// `None` when no modal is open or its product has left the catalog.
#[must_use]
pub fn modal_view(
    modal: Option<&ProductModal>,
    catalog: &CatalogStore,
    settings: &ViewSettings,
) -> Option<ModalView> {
    let modal = modal?;
    let product = catalog.lookup(modal.product_id())?;
    Some(ModalView {
        id: product.id.clone(),
        name: product.name.clone(),
        concentration: product.concentration.clone(),
        volume: product.volume.clone(),
        price_label: settings.price.label(product.price),
        image_url: product.image_or(&settings.placeholder_image_url).to_owned(),
        pending: modal.pending(),
    })
}

#[must_use]
pub fn sort_label(direction: SortDirection) -> String {
    format!("By price {}", direction.arrow())
}
