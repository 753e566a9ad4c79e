use std::path::PathBuf;

use minishop_core::ProductId;
use minishop_sheets::SheetError;
use thiserror::Error;

use crate::bridge::BridgeError;

/// Errors from a cart mirror. These never reach the user: a failed load
/// recovers to an empty cart and a failed save is logged.
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("sheet mirror error: {0}")]
    Sheet(#[from] SheetError),

    #[error("cart file I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error for {context}: {source}")]
    Json {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failures returned by storefront operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The catalog could not be fetched; the last good catalog is kept.
    #[error("could not load the catalog: {0}")]
    Fetch(#[from] SheetError),

    #[error("invalid quantity {quantity} for product {product_id}: must be at least 1")]
    InvalidQuantity { product_id: ProductId, quantity: u32 },

    #[error("no user identity: cart persistence and checkout are unavailable")]
    Anonymous,

    #[error("the cart is empty")]
    EmptyCart,

    #[error("product {0} is not in the catalog")]
    UnknownProduct(ProductId),

    #[error("no product is open")]
    NoOpenProduct,

    #[error("host bridge error: {0}")]
    Bridge(#[from] BridgeError),
}
