use serde::{Deserialize, Serialize};

use crate::products::ProductId;

/// One line of a cart: a product and how many of it.
///
/// The wire shape `{ "id": ..., "quantity": ... }` is shared by the `Carts`
/// sheet and the local cart files. A stored entry always has `quantity >= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartEntry {
    pub id: ProductId,
    pub quantity: u32,
}

impl CartEntry {
    #[must_use]
    pub fn new(id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            quantity,
        }
    }
}
