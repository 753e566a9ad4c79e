use minishop_core::ProductId;

/// The product detail overlay: which product is open and how many units the
/// user intends to add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductModal {
    product_id: ProductId,
    pending: u32,
}

impl ProductModal {
    /// Opens the modal for `product_id` with a pending quantity of 1.
    #[must_use]
    pub fn open(product_id: ProductId) -> Self {
        Self {
            product_id,
            pending: 1,
        }
    }

    #[must_use]
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    #[must_use]
    pub fn pending(&self) -> u32 {
        self.pending
    }

    pub fn increment(&mut self) {
        self.pending = self.pending.saturating_add(1);
    }

    /// Never drops below 1.
    pub fn decrement(&mut self) {
        if self.pending > 1 {
            self.pending -= 1;
        }
    }
}
