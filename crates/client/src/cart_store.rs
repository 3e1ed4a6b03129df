//! Persistent, observable cart.
//!
//! [`CartStore`] owns the current [`Cart`], writes the full snapshot to
//! storage after every change and publishes the new snapshot on a
//! [`tokio::sync::watch`] channel. Views hold a [`CartSubscription`] and
//! re-render when it fires; dropping the subscription unsubscribes.
//!
//! Another process sharing the same storage (a second terminal, say) is
//! picked up with [`CartStore::reload`].

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, warn};
use tsirushka_core::cart::CartLine;
use tsirushka_core::{Cart, Centimos, ProductId};

use crate::storage::{Storage, StorageError};

/// Storage key the cart snapshot lives under.
pub const CART_KEY: &str = "tsir.cart";

/// The cart, persisted and observable.
///
/// Cheap to clone; clones share the same cart and subscribers.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn Storage>,
    cart: Mutex<Cart>,
    updates: watch::Sender<Cart>,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("cart", &*self.lock())
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Open the cart persisted in `storage`.
    ///
    /// A missing snapshot is an empty cart. So is an unreadable or corrupt
    /// one, with a warning logged.
    #[must_use]
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let cart = read_snapshot(storage.as_ref());
        let (updates, _) = watch::channel(cart.clone());
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                cart: Mutex::new(cart),
                updates,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.inner.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `change` and, if it reports a change, persist and notify.
    ///
    /// The in-memory cart only moves forward once the snapshot is written.
    fn mutate(&self, change: impl FnOnce(&mut Cart) -> bool) -> Result<bool, StorageError> {
        let mut current = self.lock();
        let mut next = current.clone();
        if !change(&mut next) {
            return Ok(false);
        }
        write_snapshot(self.inner.storage.as_ref(), &next)?;
        *current = next.clone();
        drop(current);

        debug!(lines = next.lines().len(), items = next.item_count(), "Cart updated");
        self.inner.updates.send_replace(next);
        Ok(true)
    }

    /// A copy of the current cart.
    #[must_use]
    pub fn snapshot(&self) -> Cart {
        self.lock().clone()
    }

    /// Current lines in the order they were added.
    #[must_use]
    pub fn lines(&self) -> Vec<CartLine> {
        self.lock().lines().to_vec()
    }

    /// Exact sum of `unit_price * quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Centimos {
        self.lock().subtotal()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lock().item_count()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Add one unit of a product, capped at 999.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written; the cart is
    /// left unchanged.
    pub fn add(
        &self,
        product_id: ProductId,
        name: impl Into<String>,
        unit_price: Centimos,
    ) -> Result<bool, StorageError> {
        let name = name.into();
        self.mutate(|cart| cart.add(product_id, name, unit_price))
    }

    /// Raise a line's quantity by one.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn increment(&self, product_id: &ProductId) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.increment(product_id))
    }

    /// Lower a line's quantity by one, stopping at 1.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn decrement(&self, product_id: &ProductId) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.decrement(product_id))
    }

    /// Set a line's quantity, clamped to `1..=999`. No-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn set_quantity(&self, product_id: &ProductId, qty: i64) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.set_quantity(product_id, qty))
    }

    /// Remove a product's line.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be written.
    pub fn remove(&self, product_id: &ProductId) -> Result<bool, StorageError> {
        self.mutate(|cart| cart.remove(product_id))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the snapshot cannot be removed.
    pub fn clear(&self) -> Result<bool, StorageError> {
        self.mutate(Cart::clear)
    }

    /// Re-read storage and notify subscribers if the snapshot changed there.
    ///
    /// Returns `true` when a different cart was loaded.
    pub fn reload(&self) -> bool {
        let stored = read_snapshot(self.inner.storage.as_ref());
        let mut current = self.lock();
        if *current == stored {
            return false;
        }
        *current = stored.clone();
        drop(current);

        debug!("Cart changed in storage; notifying subscribers");
        self.inner.updates.send_replace(stored);
        true
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn subscribe(&self) -> CartSubscription {
        CartSubscription {
            rx: self.inner.updates.subscribe(),
        }
    }
}

/// A live view of the cart.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct CartSubscription {
    rx: watch::Receiver<Cart>,
}

impl CartSubscription {
    /// The latest cart, marking it as seen.
    #[must_use]
    pub fn current(&mut self) -> Cart {
        self.rx.borrow_and_update().clone()
    }

    /// Wait for the next change.
    ///
    /// Returns `None` once every [`CartStore`] clone has been dropped.
    pub async fn changed(&mut self) -> Option<Cart> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Whether a change arrived that [`current`](Self::current) or
    /// [`changed`](Self::changed) has not returned yet.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }
}

fn read_snapshot(storage: &dyn Storage) -> Cart {
    let raw = match storage.get(CART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Could not read cart; starting empty");
            return Cart::new();
        }
    };
    if raw.trim().is_empty() {
        return Cart::new();
    }
    match serde_json::from_str::<Vec<CartLine>>(&raw) {
        Ok(lines) => Cart::from_lines(lines),
        Err(e) => {
            warn!(error = %e, "Corrupt cart snapshot; starting empty");
            Cart::new()
        }
    }
}

fn write_snapshot(storage: &dyn Storage, cart: &Cart) -> Result<(), StorageError> {
    if cart.is_empty() {
        return storage.remove(CART_KEY);
    }
    let json = serde_json::to_string(cart).map_err(|source| StorageError::Serialize {
        key: CART_KEY.to_string(),
        source,
    })?;
    storage.set(CART_KEY, &json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    fn memory_store() -> (Arc<MemoryStorage>, CartStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CartStore::open(storage.clone());
        (storage, store)
    }

    #[test]
    fn test_add_then_clamp_scenario() {
        let (_, cart) = memory_store();
        assert_eq!(cart.subtotal(), Centimos::ZERO);

        cart.add(pid("A"), "Barra", Centimos::new(500)).expect("add");
        assert_eq!(cart.subtotal(), Centimos::new(500));

        cart.add(pid("A"), "Barra", Centimos::new(500)).expect("add");
        assert_eq!(cart.lines()[0].quantity, 2);
        assert_eq!(cart.subtotal(), Centimos::new(1000));

        cart.set_quantity(&pid("A"), 1000).expect("set");
        assert_eq!(cart.lines()[0].quantity, 999);
    }

    #[test]
    fn test_every_change_is_persisted() {
        let (storage, cart) = memory_store();
        cart.add(pid("7"), "Nibs", Centimos::new(250)).expect("add");
        let raw = storage.get(CART_KEY).expect("get").expect("persisted");
        assert_eq!(raw, r#"[{"id":"7","nombre":"Nibs","precioCentimos":250,"cantidad":1}]"#);

        cart.clear().expect("clear");
        assert_eq!(storage.get(CART_KEY).expect("get"), None);
    }

    #[test]
    fn test_corrupt_snapshot_reads_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(CART_KEY, "{not json").expect("set");
        assert!(CartStore::open(storage).is_empty());
    }

    #[test]
    fn test_legacy_numeric_ids_load() {
        let storage = Arc::new(MemoryStorage::new());
        storage
            .set(
                CART_KEY,
                r#"[{"id":12,"nombre":"Barra","precioCentimos":500,"cantidad":3}]"#,
            )
            .expect("set");
        let cart = CartStore::open(storage);
        assert_eq!(cart.lines()[0].product_id.as_str(), "12");
        assert_eq!(cart.item_count(), 3);
    }

    #[test]
    fn test_snapshot_round_trip_through_files() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let first = CartStore::open(Arc::new(FileStorage::new(tmp.path())));
        first.add(pid("b"), "Barra", Centimos::new(500)).expect("add");
        first.add(pid("a"), "Nibs", Centimos::new(200)).expect("add");
        first.increment(&pid("a")).expect("inc");

        let second = CartStore::open(Arc::new(FileStorage::new(tmp.path())));
        assert_eq!(second.snapshot(), first.snapshot());
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let (_, cart) = memory_store();
        let mut badge = cart.subscribe();
        let mut page = cart.subscribe();

        cart.add(pid("A"), "Barra", Centimos::new(500)).expect("add");

        assert_eq!(badge.changed().await.expect("open").item_count(), 1);
        assert_eq!(page.changed().await.expect("open").subtotal(), Centimos::new(500));
    }

    #[test]
    fn test_noop_does_not_notify() {
        let (_, cart) = memory_store();
        cart.add(pid("A"), "Barra", Centimos::new(500)).expect("add");
        let mut sub = cart.subscribe();

        assert!(!cart.decrement(&pid("A")).expect("dec"));
        assert!(!cart.remove(&pid("missing")).expect("remove"));
        assert!(!sub.has_changed());
    }

    #[test]
    fn test_reload_picks_up_other_writer() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let ours = CartStore::open(Arc::new(FileStorage::new(tmp.path())));
        let theirs = CartStore::open(Arc::new(FileStorage::new(tmp.path())));
        let mut sub = ours.subscribe();

        theirs.add(pid("A"), "Barra", Centimos::new(500)).expect("add");
        assert!(!sub.has_changed());

        assert!(ours.reload());
        assert!(sub.has_changed());
        assert_eq!(sub.current().item_count(), 1);
        assert!(!ours.reload());
    }
}
