//! The application root: owns every store and routes user actions to them.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use minishop_core::{AppConfig, CheckoutMode, PriceFormat, Product, ProductId, UserIdentity};
use minishop_sheets::{SheetClient, SheetError};

use crate::bridge::HostBridge;
use crate::cart::{CartChange, CartStore, ReloadOutcome};
use crate::catalog::CatalogStore;
use crate::error::StoreError;
use crate::handoff::checkout_link;
use crate::mirror::CartMirror;
use crate::modal::ProductModal;
use crate::order::{self, Order};
use crate::query::Query;
use crate::signal::RenderSignal;
use crate::view::{self, Frame, ViewSettings};

/// Where the catalog comes from.
pub trait CatalogSource {
    fn fetch_products(&self) -> impl Future<Output = Result<Vec<Product>, SheetError>> + Send;
}

impl CatalogSource for SheetClient {
    async fn fetch_products(&self) -> Result<Vec<Product>, SheetError> {
        SheetClient::fetch_products(self).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorefrontSettings {
    pub view: ViewSettings,
    /// Operator handle, with or without the leading `@`.
    pub manager_username: String,
    pub checkout_mode: CheckoutMode,
    pub share_origin: Option<String>,
}

impl StorefrontSettings {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            view: ViewSettings {
                price: PriceFormat::new(config.currency_symbol.clone()),
                placeholder_image_url: config.placeholder_image_url.clone(),
            },
            manager_username: config.manager_handle().to_owned(),
            checkout_mode: config.checkout_mode,
            share_origin: config.share_origin.clone(),
        }
    }
}

/// A completed checkout handoff.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub url: String,
    pub order: Order,
}

/// One storefront session.
///
/// Methods take `&mut self`; the session is the single owner of all state.
/// Every state change bumps [`Storefront::signal`].
pub struct Storefront<S, M> {
    source: S,
    catalog: CatalogStore,
    cart: CartStore<M>,
    query: Query,
    modal: Option<ProductModal>,
    identity: UserIdentity,
    settings: StorefrontSettings,
    signal: RenderSignal,
}

impl<S: CatalogSource, M: CartMirror> Storefront<S, M> {
    pub fn new(
        source: S,
        mirror: Arc<M>,
        identity: UserIdentity,
        settings: StorefrontSettings,
    ) -> Self {
        let signal = RenderSignal::new();
        let cart = CartStore::new(identity.id.clone(), mirror, signal.clone());
        Self {
            source,
            catalog: CatalogStore::new(),
            cart,
            query: Query::default(),
            modal: None,
            identity,
            settings,
            signal,
        }
    }

    #[must_use]
    pub fn signal(&self) -> &RenderSignal {
        &self.signal
    }

    #[must_use]
    pub fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &CartStore<M> {
        &self.cart
    }

    #[must_use]
    pub fn query(&self) -> &Query {
        &self.query
    }

    #[must_use]
    pub fn modal(&self) -> Option<&ProductModal> {
        self.modal.as_ref()
    }

    #[must_use]
    pub fn identity(&self) -> &UserIdentity {
        &self.identity
    }

    #[must_use]
    pub fn settings(&self) -> &StorefrontSettings {
        &self.settings
    }

    // -----------------------------------------------------------------------
    // Loading
    // -----------------------------------------------------------------------

    /// Fetches the catalog and replaces the current one, returning the new
    /// product count. The cart is never touched.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Fetch`] on any fetch failure; the previous
    /// catalog stays in place.
    pub async fn load_catalog(&mut self) -> Result<usize, StoreError> {
        match self.source.fetch_products().await {
            Ok(products) => {
                self.catalog.replace(products);
                self.refresh_view();
                tracing::info!(products = self.catalog.len(), "catalog loaded");
                Ok(self.catalog.len())
            }
            Err(e) => {
                tracing::warn!(error = %e, "catalog fetch failed, keeping previous catalog");
                Err(StoreError::Fetch(e))
            }
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::Anonymous`] when the session has no user id.
    pub async fn load_cart(&mut self) -> Result<ReloadOutcome, StoreError> {
        self.cart.reload().await
    }

    /// Session startup: loads the catalog, then the cart when the user is
    /// known. A catalog failure is reported through `bridge`. Returns whether
    /// the catalog loaded.
    pub async fn start(&mut self, bridge: &impl HostBridge) -> bool {
        let loaded = match self.load_catalog().await {
            Ok(_) => true,
            Err(_) => {
                bridge.alert("Could not load the catalog. Please try again later.");
                false
            }
        };
        if !self.identity.is_anonymous() {
            match self.load_cart().await {
                Ok(outcome) => tracing::debug!(?outcome, "cart ready"),
                Err(e) => tracing::debug!(error = %e, "cart not loaded"),
            }
        }
        loaded
    }

    // -----------------------------------------------------------------------
    // Search and sort
    // -----------------------------------------------------------------------

    pub fn set_search(&mut self, text: impl Into<String>) {
        self.query.search = text.into();
        self.refresh_view();
    }

    pub fn toggle_sort(&mut self) {
        self.query.direction = self.query.direction.toggled();
        self.refresh_view();
    }

    fn refresh_view(&mut self) {
        self.catalog.apply_query(&self.query);
        self.signal.bump();
    }

    // -----------------------------------------------------------------------
    // Product modal
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`StoreError::UnknownProduct`] if `id` is not in the catalog.
    pub fn open_product(&mut self, id: &ProductId) -> Result<(), StoreError> {
        if self.catalog.lookup(id).is_none() {
            return Err(StoreError::UnknownProduct(id.clone()));
        }
        self.modal = Some(ProductModal::open(id.clone()));
        self.signal.bump();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NoOpenProduct`] when the modal is closed.
    pub fn increase_pending(&mut self) -> Result<u32, StoreError> {
        let modal = self.modal.as_mut().ok_or(StoreError::NoOpenProduct)?;
        modal.increment();
        let pending = modal.pending();
        self.signal.bump();
        Ok(pending)
    }

    /// # Errors
    ///
    /// Returns [`StoreError::NoOpenProduct`] when the modal is closed.
    pub fn decrease_pending(&mut self) -> Result<u32, StoreError> {
        let modal = self.modal.as_mut().ok_or(StoreError::NoOpenProduct)?;
        modal.decrement();
        let pending = modal.pending();
        self.signal.bump();
        Ok(pending)
    }

    pub fn close_modal(&mut self) {
        if self.modal.take().is_some() {
            self.signal.bump();
        }
    }

    /// Adds the pending quantity of the open product to the cart, closes the
    /// modal, and notifies the user.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NoOpenProduct`] when the modal is closed.
    /// - [`StoreError::UnknownProduct`] if the product left the catalog while
    ///   the modal was open; the modal is closed.
    pub fn commit_modal(&mut self, bridge: &impl HostBridge) -> Result<CartChange, StoreError> {
        let modal = self.modal.take().ok_or(StoreError::NoOpenProduct)?;
        let Some(name) = self.catalog.lookup(modal.product_id()).map(|p| p.name.clone()) else {
            self.signal.bump();
            return Err(StoreError::UnknownProduct(modal.product_id().clone()));
        };

        let change = self
            .cart
            .add_or_increment(modal.product_id().clone(), modal.pending())?;
        bridge.alert(&format!("Added to cart: {name}"));
        Ok(change)
    }

    // -----------------------------------------------------------------------
    // Cart
    // -----------------------------------------------------------------------

    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuantity`] when `quantity` is 0.
    pub fn add_to_cart(&mut self, id: ProductId, quantity: u32) -> Result<CartChange, StoreError> {
        self.cart.add_or_increment(id, quantity)
    }

    pub fn adjust_quantity(&mut self, id: &ProductId, delta: i64) -> CartChange {
        self.cart.set_quantity(id, delta)
    }

    pub fn remove_from_cart(&mut self, id: &ProductId) -> CartChange {
        self.cart.remove(id)
    }

    /// Waits for pending cart saves.
    pub async fn flush(&mut self) {
        self.cart.flush().await;
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn frame(&self) -> Frame {
        let settings = &self.settings.view;
        Frame {
            search: self.query.search.clone(),
            sort_label: view::sort_label(self.query.direction),
            catalog: view::catalog_grid(&self.catalog, settings),
            cart: view::cart_view(self.cart.entries(), &self.catalog, settings),
            modal: view::modal_view(self.modal.as_ref(), &self.catalog, settings),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError::EmptyCart`] when no cart entry resolves.
    pub fn compose_order(&self, placed_at: DateTime<Utc>) -> Result<Order, StoreError> {
        order::compose_order(self.cart.entries(), &self.catalog, &self.identity, placed_at)
    }

    /// Copies the order text to the clipboard.
    ///
    /// # Errors
    ///
    /// - [`StoreError::EmptyCart`] if there is nothing to order.
    /// - [`StoreError::Bridge`] if the clipboard write fails.
    pub fn copy_order(&self, bridge: &impl HostBridge) -> Result<Order, StoreError> {
        let order = match self.compose_order(Utc::now()) {
            Ok(order) => order,
            Err(e) => {
                bridge.alert("Your cart is empty!");
                return Err(e);
            }
        };
        let text = order.render_text(&self.settings.view.price);
        write_clipboard(bridge, &text, "Order copied!")?;
        Ok(order)
    }

    /// Copies one product's share text to the clipboard.
    ///
    /// # Errors
    ///
    /// - [`StoreError::UnknownProduct`] if `id` is not in the catalog.
    /// - [`StoreError::Bridge`] if the clipboard write fails.
    pub fn copy_product(&self, id: &ProductId, bridge: &impl HostBridge) -> Result<String, StoreError> {
        let product = self
            .catalog
            .lookup(id)
            .ok_or_else(|| StoreError::UnknownProduct(id.clone()))?;
        let text = order::product_share_text(
            product,
            &self.settings.view.price,
            self.settings.share_origin.as_deref(),
        );
        write_clipboard(bridge, &text, "Product details copied!")?;
        Ok(text)
    }

    // -----------------------------------------------------------------------
    // Checkout
    // -----------------------------------------------------------------------

    /// Saves the cart and opens the operator deep link.
    ///
    /// # Errors
    ///
    /// - [`StoreError::EmptyCart`] if nothing in the cart resolves; the user
    ///   is prompted and no link is opened.
    /// - [`StoreError::Anonymous`] without a user id.
    /// - [`StoreError::Bridge`] if the host cannot open the link.
    pub fn checkout(&mut self, bridge: &impl HostBridge) -> Result<Checkout, StoreError> {
        let order = match self.compose_order(Utc::now()) {
            Ok(order) => order,
            Err(e) => {
                bridge.alert("Add items to the cart first!");
                return Err(e);
            }
        };
        let Some(user_id) = self.identity.id.clone() else {
            bridge.alert("Checkout needs a chat account.");
            return Err(StoreError::Anonymous);
        };

        self.cart.persist();
        let text = order.render_text(&self.settings.view.price);
        let url = checkout_link(
            self.settings.checkout_mode,
            &self.settings.manager_username,
            &user_id,
            &text,
        );
        bridge.open_link(&url)?;
        tracing::info!(user_id = %user_id, order = order.number, lines = order.lines.len(), "checkout handed off");
        Ok(Checkout { url, order })
    }
}

fn write_clipboard(bridge: &impl HostBridge, text: &str, done: &str) -> Result<(), StoreError> {
    if let Err(e) = bridge.write_clipboard(text) {
        tracing::warn!(error = %e, "clipboard write failed");
        bridge.alert("Copy failed");
        return Err(e.into());
    }
    bridge.alert(done);
    Ok(())
}
