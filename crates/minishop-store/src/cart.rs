//! The user's cart and its best-effort mirror synchronization.

use std::sync::Arc;

use minishop_core::{CartEntry, ProductId, UserId};
use tokio::runtime::Handle;
use tokio::task::JoinSet;

use crate::error::StoreError;
use crate::mirror::CartMirror;
use crate::signal::RenderSignal;

/// What a cart mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    Added,
    Updated,
    Removed,
    Unchanged,
}

impl CartChange {
    #[must_use]
    pub fn is_change(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Result of [`CartStore::reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The mirror answered; `entries` lines were kept after sanitizing.
    Loaded { entries: usize },
    /// The mirror failed and the cart was reset to empty.
    RecoveredEmpty,
}

/// Ordered cart lines owned by one session.
///
/// Entries are unique by product id and always hold `quantity >= 1`. They
/// may reference products that have since left the catalog; readers skip
/// those.
pub struct CartStore<M> {
    entries: Vec<CartEntry>,
    owner: Option<UserId>,
    mirror: Arc<M>,
    signal: RenderSignal,
    in_flight: JoinSet<()>,
}

impl<M: CartMirror> CartStore<M> {
    /// An empty cart. With no `owner` the cart lives in memory only.
    pub fn new(owner: Option<UserId>, mirror: Arc<M>, signal: RenderSignal) -> Self {
        Self {
            entries: Vec::new(),
            owner,
            mirror,
            signal,
            in_flight: JoinSet::new(),
        }
    }

    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    #[must_use]
    pub fn owner(&self) -> Option<&UserId> {
        self.owner.as_ref()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn quantity_of(&self, id: &ProductId) -> Option<u32> {
        self.position(id).map(|idx| self.entries[idx].quantity)
    }

    /// Sum of all quantities, stale entries included.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity)).sum()
    }

    /// Adds `quantity` units of `id`, appending a new line if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidQuantity`] when `quantity` is 0; the cart
    /// is left untouched.
    pub fn add_or_increment(
        &mut self,
        id: ProductId,
        quantity: u32,
    ) -> Result<CartChange, StoreError> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity {
                product_id: id,
                quantity,
            });
        }

        let change = match self.position(&id) {
            Some(idx) => {
                let entry = &mut self.entries[idx];
                entry.quantity = entry.quantity.saturating_add(quantity);
                CartChange::Updated
            }
            None => {
                self.entries.push(CartEntry { id, quantity });
                CartChange::Added
            }
        };
        self.changed();
        Ok(change)
    }

    /// Adjusts the quantity of `id` by `delta`. A result of 0 or less removes
    /// the line; a positive delta on an absent product adds it.
    pub fn set_quantity(&mut self, id: &ProductId, delta: i64) -> CartChange {
        let change = match self.position(id) {
            Some(idx) => {
                let next = i64::from(self.entries[idx].quantity).saturating_add(delta);
                if next <= 0 {
                    self.entries.remove(idx);
                    CartChange::Removed
                } else if delta == 0 {
                    CartChange::Unchanged
                } else {
                    self.entries[idx].quantity = u32::try_from(next).unwrap_or(u32::MAX);
                    CartChange::Updated
                }
            }
            None if delta > 0 => {
                self.entries.push(CartEntry {
                    id: id.clone(),
                    quantity: u32::try_from(delta).unwrap_or(u32::MAX),
                });
                CartChange::Added
            }
            None => CartChange::Unchanged,
        };
        if change.is_change() {
            self.changed();
        }
        change
    }

    /// Deletes the line for `id`, if any.
    pub fn remove(&mut self, id: &ProductId) -> CartChange {
        match self.position(id) {
            Some(idx) => {
                self.entries.remove(idx);
                self.changed();
                CartChange::Removed
            }
            None => CartChange::Unchanged,
        }
    }

    /// Pushes a snapshot of the cart to the mirror in a background task.
    ///
    /// Returns whether a task was started. Anonymous carts and calls made
    /// outside a Tokio runtime start nothing. Save failures are logged by the
    /// task and never reach the caller; the in-memory cart is kept as is.
    ///
    /// Tasks are owned by the store: dropping it before [`CartStore::flush`]
    /// cancels saves that have not finished, and the drop logs how many.
    pub fn persist(&mut self) -> bool {
        let Some(owner) = self.owner.clone() else {
            return false;
        };
        let Ok(handle) = Handle::try_current() else {
            tracing::warn!(user_id = %owner, "no async runtime, cart not persisted");
            return false;
        };

        let mirror = Arc::clone(&self.mirror);
        let snapshot = self.entries.clone();
        self.in_flight.spawn_on(
            async move {
                match mirror.save(&owner, &snapshot).await {
                    Ok(()) => tracing::debug!(user_id = %owner, lines = snapshot.len(), "cart persisted"),
                    Err(e) => tracing::warn!(user_id = %owner, error = %e, "failed to persist cart"),
                }
            },
            &handle,
        );
        while self.in_flight.try_join_next().is_some() {}
        true
    }

    /// Replaces the cart with the mirror's copy.
    ///
    /// A mirror failure is not an error: the cart is cleared and the outcome
    /// says so.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Anonymous`] when the cart has no owner.
    pub async fn reload(&mut self) -> Result<ReloadOutcome, StoreError> {
        let owner = self.owner.clone().ok_or(StoreError::Anonymous)?;

        let outcome = match self.mirror.load(&owner).await {
            Ok(entries) => {
                self.entries = sanitize(entries);
                tracing::debug!(user_id = %owner, lines = self.entries.len(), "cart loaded");
                ReloadOutcome::Loaded {
                    entries: self.entries.len(),
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %owner, error = %e, "failed to load cart, starting empty");
                self.entries.clear();
                ReloadOutcome::RecoveredEmpty
            }
        };
        self.signal.bump();
        Ok(outcome)
    }

    /// Persist tasks started but not yet joined.
    #[must_use]
    pub fn pending_saves(&self) -> usize {
        self.in_flight.len()
    }

    /// Waits for every in-flight persist task to finish.
    pub async fn flush(&mut self) {
        while let Some(joined) = self.in_flight.join_next().await {
            if let Err(e) = joined {
                tracing::warn!(error = %e, "cart persist task did not complete");
            }
        }
    }

    fn position(&self, id: &ProductId) -> Option<usize> {
        self.entries.iter().position(|e| &e.id == id)
    }

    fn changed(&mut self) {
        self.persist();
        self.signal.bump();
    }
}

impl<M> Drop for CartStore<M> {
    fn drop(&mut self) {
        while self.in_flight.try_join_next().is_some() {}
        if !self.in_flight.is_empty() {
            tracing::warn!(
                pending = self.in_flight.len(),
                "cart store dropped before flush, cancelling unfinished saves"
            );
        }
    }
}

/// Merges duplicate ids by summing and drops lines with `quantity < 1`,
/// keeping first-seen order.
fn sanitize(raw: Vec<CartEntry>) -> Vec<CartEntry> {
    let mut entries: Vec<CartEntry> = Vec::with_capacity(raw.len());
    for entry in raw {
        if entry.quantity == 0 {
            continue;
        }
        match entries.iter_mut().find(|e| e.id == entry.id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(entry.quantity),
            None => entries.push(entry),
        }
    }
    entries
}

#[cfg(test)]
#[path = "cart_test.rs"]
mod tests;
