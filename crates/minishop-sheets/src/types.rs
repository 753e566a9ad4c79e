//! Wire types for the spreadsheet-proxy endpoint.
//!
//! ## Observed shape
//!
//! Every response is wrapped in `{"success": bool, "data": [...], "error": "..."}`.
//! `error` is only present when `success` is `false`. `data` may be missing
//! entirely on a successful write.
//!
//! ### `Products` sheet
//! Rows come back keyed by whatever header text the sheet owner typed, so the
//! same column shows up as `price`, `Цена`, or `цена` depending on the sheet.
//! Rows are kept as [`RawRecord`] and resolved by [`crate::normalize`].
//!
//! ### `Carts` sheet
//! Rows are `{"id": ..., "quantity": ...}`. `id` is a number or a numeric
//! string; `quantity` is usually a number but a hand-edited sheet can turn it
//! into a string.

use minishop_core::CartEntry;
use serde::{Deserialize, Serialize};

/// One loosely-typed row as returned by the proxy.
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// Response envelope shared by every proxy call.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct SheetEnvelope<T> {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Body of the `POST` that overwrites a user's cart row.
#[derive(Debug, Serialize)]
pub struct UpdateCartRequest<'a> {
    pub action: &'static str,
    /// Numeric when the host id is numeric, to match what the sheet script stores.
    pub user_id: serde_json::Value,
    pub cart: &'a [CartEntry],
}

pub const UPDATE_CART_ACTION: &str = "UPDATE_CART";
pub const PRODUCTS_SHEET: &str = "Products";
pub const CARTS_SHEET: &str = "Carts";
