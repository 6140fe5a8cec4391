//! Cart ledger - the session's ordered log of cart entries.
//!
//! The cart is an append log rather than a quantity map: adding the same
//! product twice yields two independently removable entries, and each entry
//! keeps the price it had when it was added. Every mutation is announced on a
//! broadcast channel so a view can redraw.

use crate::errors::{Error, Result};
use crate::models::{CartEntry, Product};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use tracing::{debug, trace, warn};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// What kind of mutation produced a [`CartChange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChangeKind {
    /// An entry was appended at `index`
    Added {
        /// Position of the new entry
        index: usize,
    },
    /// The entry at `index` was removed
    Removed {
        /// Former position of the entry
        index: usize,
    },
    /// All entries were dropped
    Cleared,
}

/// Notification sent after every cart mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChange {
    /// The mutation that happened
    pub kind: CartChangeKind,
    /// Entries in the cart after the mutation
    pub entry_count: usize,
    /// Cart total after the mutation
    pub total: Decimal,
}

/// Session-owned cart state.
#[derive(Debug)]
pub struct CartLedger {
    entries: Vec<CartEntry>,
    changes: broadcast::Sender<CartChange>,
}

impl Default for CartLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl CartLedger {
    /// Creates an empty cart with its own change channel.
    #[must_use]
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            entries: Vec::new(),
            changes,
        }
    }

    /// Subscribes to change notifications.
    ///
    /// A subscriber that falls more than the channel capacity behind sees a
    /// `Lagged` error and should simply redraw from [`Self::entries`].
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<CartChange> {
        self.changes.subscribe()
    }

    /// Appends a copy of `product` with its current price.
    pub fn add(&mut self, product: &Product) {
        self.entries.push(CartEntry::from(product));
        let index = self.entries.len() - 1;
        debug!(product_id = product.id, index, "Added product to cart");
        self.notify(CartChangeKind::Added { index });
    }

    /// Removes the entry at `index`, returning it.
    ///
    /// # Errors
    /// Returns [`Error::IndexOutOfRange`] if `index` is not a current position;
    /// the cart is left unchanged.
    pub fn remove_at(&mut self, index: usize) -> Result<CartEntry> {
        if index >= self.entries.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        let removed = self.entries.remove(index);
        debug!(product_id = removed.product_id, index, "Removed cart entry");
        self.notify(CartChangeKind::Removed { index });
        Ok(removed)
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.entries.clear();
        debug!("Cleared cart");
        self.notify(CartChangeKind::Cleared);
    }

    /// Exact sum of the captured entry prices.
    ///
    /// Saturates at [`Decimal::MAX`] instead of overflowing. Ingested prices
    /// are capped well below that, so only hand-built products can reach it.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.entries
            .iter()
            .try_fold(Decimal::ZERO, |sum, entry| sum.checked_add(entry.price))
            .unwrap_or_else(|| {
                warn!(entries = self.entries.len(), "Cart total overflowed, saturating");
                Decimal::MAX
            })
    }

    /// Read-only view of the entries in cart order.
    #[must_use]
    pub fn entries(&self) -> &[CartEntry] {
        &self.entries
    }

    /// Number of entries, duplicates included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the cart holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn notify(&self, kind: CartChangeKind) {
        let change = CartChange {
            kind,
            entry_count: self.entries.len(),
            total: self.total(),
        };
        // no subscribers is fine
        if self.changes.send(change).is_err() {
            trace!("No cart subscribers for {:?}", change.kind);
        }
    }
}
