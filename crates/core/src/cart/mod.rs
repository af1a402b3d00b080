//! Quantity-aggregating cart store.
//!
//! The store is a map from product id to cart line, iterated in insertion
//! order. It hydrates from [`Storage`] when created and writes itself back
//! after every mutation. Storage problems never reach the caller: a missing
//! or corrupt payload yields an empty cart, and a failed write is logged
//! while the in-memory state stays authoritative.

pub mod codec;

use indexmap::IndexMap;
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::storage::Storage;
use crate::types::{Product, ProductId};

pub use codec::{CartRecord, CodecError};

/// Storage key the cart is persisted under unless overridden.
pub const STORAGE_KEY: &str = "vitrina.cart";

/// The shopping cart.
#[derive(Debug)]
pub struct CartStore<S: Storage> {
    lines: IndexMap<ProductId, Product>,
    storage: S,
    key: String,
}

impl<S: Storage> CartStore<S> {
    /// Create a cart persisted under [`STORAGE_KEY`], hydrated from `storage`.
    pub fn new(storage: S) -> Self {
        Self::with_key(storage, STORAGE_KEY)
    }

    /// Create a cart persisted under `key`, hydrated from `storage`.
    pub fn with_key(storage: S, key: impl Into<String>) -> Self {
        let mut store = Self {
            lines: IndexMap::new(),
            storage,
            key: key.into(),
        };
        store.hydrate();
        store
    }

    fn hydrate(&mut self) {
        let payload = match self.storage.get_item(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!(key = %self.key, "No persisted cart found");
                return;
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to read persisted cart");
                return;
            }
        };

        match codec::decode(&payload) {
            Ok(products) => {
                self.lines = products
                    .into_iter()
                    .map(|product| (product.id().clone(), product))
                    .collect();
                debug!(key = %self.key, lines = self.lines.len(), "Cart hydrated");
            }
            Err(e) => {
                warn!(key = %self.key, error = %e, "Discarding unreadable persisted cart");
            }
        }
    }

    fn persist(&mut self) {
        let payload = match codec::encode(self.lines.values()) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Failed to encode cart");
                return;
            }
        };

        if let Err(e) = self.storage.set_item(&self.key, &payload) {
            warn!(
                key = %self.key,
                error = %e,
                "Failed to persist cart; changes will not survive a reload"
            );
        }
    }

    /// Add one unit of `product`.
    ///
    /// If the id is already in the cart its quantity goes up by one and the
    /// incoming name, price and category are ignored. Otherwise the product
    /// becomes a new line with its own quantity, raised to one if it is zero.
    pub fn add(&mut self, mut product: Product) {
        if let Some(line) = self.lines.get_mut(product.id()) {
            let quantity = line.quantity().saturating_add(1);
            line.set_quantity(quantity);
            debug!(product_id = %product.id(), quantity, "Incremented cart line");
        } else {
            product.set_quantity(product.quantity().max(1));
            debug!(product_id = %product.id(), quantity = product.quantity(), "Added cart line");
            self.lines.insert(product.id().clone(), product);
        }
        self.persist();
    }

    /// Remove the line for `id`, if any.
    pub fn remove(&mut self, id: &ProductId) {
        if self.lines.shift_remove(id).is_some() {
            debug!(product_id = %id, "Removed cart line");
        }
        self.persist();
    }

    /// Set the quantity of an existing line.
    ///
    /// Unknown ids are ignored. A quantity of zero or less removes the line.
    pub fn update_qty(&mut self, id: &ProductId, quantity: i64) {
        if !self.lines.contains_key(id) {
            return;
        }

        if quantity <= 0 {
            self.lines.shift_remove(id);
            debug!(product_id = %id, "Quantity dropped to zero; removed cart line");
        } else if let Some(line) = self.lines.get_mut(id) {
            line.set_quantity(u32::try_from(quantity).unwrap_or(u32::MAX));
        }
        self.persist();
    }

    /// Empty the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Snapshot of the cart lines in insertion order.
    #[must_use]
    pub fn items(&self) -> Vec<Product> {
        self.lines.values().cloned().collect()
    }

    /// Borrow the cart lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.lines.values()
    }

    /// The line for `id`.
    #[must_use]
    pub fn get(&self, id: &ProductId) -> Option<&Product> {
        self.lines.get(id)
    }

    /// Sum of unit price times quantity over every line.
    ///
    /// Saturates like [`Product::line_total`]; an oversized cart shows the
    /// largest representable amount rather than crashing the page.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.lines
            .values()
            .map(Product::line_total)
            .fold(Decimal::ZERO, Decimal::saturating_add)
    }

    /// Sum of quantities over every line.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.lines.values().map(|line| u64::from(line.quantity())).sum()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Key the cart is persisted under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Give back the storage backend, e.g. to hydrate a new store from it.
    pub fn into_storage(self) -> S {
        self.storage
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStorage, StorageError};
    use crate::types::parse_price;

    fn cupcake() -> Product {
        Product::new("p1", "Cupcake", parse_price("S/ 5.00"))
    }

    fn torta() -> Product {
        Product::new("p2", "Torta", Decimal::from(300))
    }

    fn reload(cart: CartStore<MemoryStorage>) -> CartStore<MemoryStorage> {
        CartStore::new(cart.into_storage())
    }

    #[test]
    fn test_add_same_product_twice() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.add(cupcake());
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.total(), Decimal::new(1000, 2));
    }

    #[test]
    fn test_add_keeps_first_seen_fields() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.add(Product::new("p1", "Renamed", Decimal::from(99)).with_category("otros"));
        let line = cart.get(&ProductId::from("p1")).unwrap();
        assert_eq!(line.name(), "Cupcake");
        assert_eq!(line.unit_price(), Decimal::from(5));
        assert_eq!(line.category(), "general");
        assert_eq!(line.quantity(), 2);
    }

    #[test]
    fn test_add_new_line_uses_given_quantity() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(torta().with_quantity(4));
        assert_eq!(cart.count(), 4);
    }

    #[test]
    fn test_items_preserve_insertion_order() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(torta());
        cart.add(cupcake());
        cart.add(torta());
        let ids: Vec<_> = cart.items().iter().map(|p| p.id().to_string()).collect();
        assert_eq!(ids, ["p2", "p1"]);
    }

    #[test]
    fn test_remove_and_remove_absent() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.remove(&ProductId::from("missing"));
        assert_eq!(cart.count(), 1);
        cart.remove(&ProductId::from("p1"));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_qty_then_negative_removes() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        let id = ProductId::from("p1");
        cart.update_qty(&id, 5);
        assert_eq!(cart.count(), 5);
        cart.update_qty(&id, -1);
        assert!(cart.get(&id).is_none());
        assert_eq!(cart.count(), 0);
    }

    #[test]
    fn test_update_qty_zero_removes() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.add(torta());
        cart.update_qty(&ProductId::from("p1"), 0);
        assert_eq!(cart.count(), 1);
        assert_eq!(cart.total(), Decimal::from(300));
    }

    #[test]
    fn test_update_qty_unknown_id_is_noop() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.update_qty(&ProductId::from("ghost"), 3);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_update_qty_saturates_large_values() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.update_qty(&ProductId::from("p1"), i64::MAX);
        assert_eq!(cart.count(), u64::from(u32::MAX));
    }

    #[test]
    fn test_clear() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        cart.add(torta());
        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
        let reloaded = reload(cart);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake());
        let stored = cart.storage().get_item(STORAGE_KEY).unwrap().unwrap();
        assert!(stored.contains("\"p1\""));

        cart.update_qty(&ProductId::from("p1"), 3);
        let reloaded = reload(cart);
        assert_eq!(reloaded.count(), 3);
        assert_eq!(reloaded.total(), Decimal::from(15));
    }

    #[test]
    fn test_hydrates_reference_payload() {
        let storage = MemoryStorage::new().with_item(
            STORAGE_KEY,
            r#"[{"id":"p2","name":"Torta","price":300,"category":"general","quantity":2}]"#,
        );
        let cart = CartStore::new(storage);
        assert_eq!(cart.total(), Decimal::new(60000, 2));
        assert_eq!(cart.count(), 2);
    }

    #[test]
    fn test_corrupt_payload_yields_empty_cart() {
        let storage = MemoryStorage::new().with_item(STORAGE_KEY, "{{not json");
        let cart = CartStore::new(storage);
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_custom_key() {
        let mut cart = CartStore::with_key(MemoryStorage::new(), "other");
        cart.add(cupcake());
        assert_eq!(cart.storage_key(), "other");
        assert!(cart.storage().get_item(STORAGE_KEY).unwrap().is_none());
        assert!(cart.storage().get_item("other").unwrap().is_some());
    }

    #[test]
    fn test_write_failure_keeps_memory_state() {
        let mut cart = CartStore::new(MemoryStorage::with_quota(8));
        cart.add(cupcake());
        cart.add(cupcake());
        assert_eq!(cart.count(), 2);
        assert!(cart.storage().is_empty());
    }

    #[test]
    fn test_disabled_storage_is_tolerated() {
        let mut cart = CartStore::new(MemoryStorage::disabled());
        cart.add(torta());
        assert_eq!(cart.total(), Decimal::from(300));
        assert!(matches!(
            cart.storage().get_item(STORAGE_KEY),
            Err(StorageError::Disabled)
        ));
    }

    #[test]
    fn test_add_raises_zero_quantity_to_one() {
        let mut cart = CartStore::new(MemoryStorage::new());
        cart.add(cupcake().with_quantity(0));
        let id = ProductId::from("p1");
        assert_eq!(cart.get(&id).unwrap().quantity(), 1);
        assert_eq!(cart.count(), 1);
        assert_eq!(reload(cart).count(), 1);
    }

    #[test]
    fn test_total_saturates_on_huge_prices() {
        let mut cart = CartStore::new(MemoryStorage::new());
        let price = parse_price("S/ 9999999999999999999999999999");
        cart.add(Product::new("p1", "Lingote", price));
        cart.update_qty(&ProductId::from("p1"), 10);
        assert_eq!(cart.total(), Decimal::MAX);

        cart.add(torta());
        assert_eq!(cart.total(), Decimal::MAX);
    }

    #[test]
    fn test_hydrating_huge_line_does_not_panic() {
        let payload = r#"[{"id":"p1","name":"Lingote","price":10000000000000000000000000000,"quantity":10}]"#;
        let cart = CartStore::new(MemoryStorage::new().with_item(STORAGE_KEY, payload));
        assert_eq!(cart.count(), 10);
        assert_eq!(cart.total(), Decimal::MAX);
    }
}
