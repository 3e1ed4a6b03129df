//! The shopping cart model.
//!
//! A [`Cart`] is an ordered list of [`CartLine`]s, one per product, in the
//! order products were first added. Quantities always stay within
//! [`MIN_QUANTITY`]..=[`MAX_QUANTITY`]; a line is removed explicitly, never
//! zeroed.
//!
//! This type is pure. Persistence and change notification are layered on top
//! by `tsirushka_client::CartStore`.

use serde::{Deserialize, Serialize};

use crate::types::{Centimos, ProductId};

/// Smallest quantity a line can hold.
pub const MIN_QUANTITY: u32 = 1;

/// Largest quantity a line can hold.
pub const MAX_QUANTITY: u32 = 999;

/// One product in the cart.
///
/// Serialized with the field names the storefront has always persisted
/// (`id`, `nombre`, `precioCentimos`, `cantidad`) so existing snapshots keep
/// loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "id")]
    pub product_id: ProductId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "precioCentimos")]
    pub unit_price: Centimos,
    #[serde(rename = "cantidad")]
    pub quantity: u32,
}

impl CartLine {
    /// Unit price times quantity.
    #[must_use]
    pub const fn line_total(&self) -> Centimos {
        self.unit_price.times(self.quantity)
    }
}

/// Clamp a requested quantity into the allowed range.
#[must_use]
pub fn clamp_quantity(qty: i64) -> u32 {
    // The clamp bounds fit in u32, so the cast cannot truncate.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = qty.clamp(i64::from(MIN_QUANTITY), i64::from(MAX_QUANTITY)) as u32;
    clamped
}

/// Parse a quantity typed into a text box.
///
/// Empty or non-numeric input counts as 1; anything else is clamped.
#[must_use]
pub fn parse_quantity_input(input: &str) -> u32 {
    input
        .trim()
        .parse::<i64>()
        .map_or(MIN_QUANTITY, clamp_quantity)
}

/// An ordered, de-duplicated list of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from persisted lines, repairing anything out of range.
    ///
    /// Duplicate product IDs are merged into the first occurrence (quantities
    /// summed and capped) and quantities are clamped, so a hand-edited or
    /// legacy snapshot cannot break the invariants.
    #[must_use]
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let mut cart = Self::new();
        for mut line in lines {
            if let Some(existing) = cart.find_mut(&line.product_id) {
                existing.quantity = clamp_quantity(
                    i64::from(existing.quantity) + i64::from(line.quantity),
                );
            } else {
                line.quantity = clamp_quantity(i64::from(line.quantity));
                cart.lines.push(line);
            }
        }
        cart
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The line for a product, if present.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|l| &l.product_id == product_id)
    }

    fn find_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| &l.product_id == product_id)
    }

    /// Add one unit of a product.
    ///
    /// Increments an existing line (capped at [`MAX_QUANTITY`]) or appends a
    /// new line with quantity 1. Returns `true` if the cart changed.
    pub fn add(&mut self, product_id: ProductId, name: String, unit_price: Centimos) -> bool {
        if let Some(line) = self.find_mut(&product_id) {
            return bump(line, 1);
        }
        self.lines.push(CartLine {
            product_id,
            name,
            unit_price,
            quantity: MIN_QUANTITY,
        });
        true
    }

    /// Increase a line's quantity by one, up to [`MAX_QUANTITY`].
    pub fn increment(&mut self, product_id: &ProductId) -> bool {
        self.find_mut(product_id).is_some_and(|line| bump(line, 1))
    }

    /// Decrease a line's quantity by one, never below [`MIN_QUANTITY`].
    pub fn decrement(&mut self, product_id: &ProductId) -> bool {
        self.find_mut(product_id).is_some_and(|line| bump(line, -1))
    }

    /// Set a line's quantity, clamped to the allowed range.
    ///
    /// No-op if the product is not in the cart.
    pub fn set_quantity(&mut self, product_id: &ProductId, qty: i64) -> bool {
        let Some(line) = self.find_mut(product_id) else {
            return false;
        };
        let qty = clamp_quantity(qty);
        if line.quantity == qty {
            return false;
        }
        line.quantity = qty;
        true
    }

    /// Remove a product's line entirely.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| &l.product_id != product_id);
        self.lines.len() != before
    }

    /// Remove every line.
    pub fn clear(&mut self) -> bool {
        let changed = !self.lines.is_empty();
        self.lines.clear();
        changed
    }

    /// Exact integer sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Centimos {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total number of units, shown on the navbar badge.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity)).sum()
    }
}

fn bump(line: &mut CartLine, delta: i64) -> bool {
    let next = clamp_quantity(i64::from(line.quantity) + delta);
    if next == line.quantity {
        return false;
    }
    line.quantity = next;
    true
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn pid(id: &str) -> ProductId {
        ProductId::new(id)
    }

    #[test]
    fn test_empty_cart_subtotal_is_zero() {
        assert_eq!(Cart::new().subtotal(), Centimos::ZERO);
    }

    #[test]
    fn test_add_increment_and_clamp_scenario() {
        let mut cart = Cart::new();
        cart.add(pid("A"), "Cacao 70%".into(), Centimos::new(500));
        assert_eq!(cart.subtotal(), Centimos::new(500));

        cart.add(pid("A"), "Cacao 70%".into(), Centimos::new(500));
        assert_eq!(cart.get(&pid("A")).map(|l| l.quantity), Some(2));
        assert_eq!(cart.subtotal(), Centimos::new(1000));

        assert!(cart.set_quantity(&pid("A"), 1000));
        assert_eq!(cart.get(&pid("A")).map(|l| l.quantity), Some(MAX_QUANTITY));
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let mut cart = Cart::new();
        cart.add(pid("A"), "Nibs".into(), Centimos::new(100));
        assert!(!cart.decrement(&pid("A")));
        assert_eq!(cart.get(&pid("A")).map(|l| l.quantity), Some(1));
        assert!(cart.remove(&pid("A")));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_absent_is_noop() {
        let mut cart = Cart::new();
        assert!(!cart.set_quantity(&pid("missing"), 3));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_clamps_low() {
        let mut cart = Cart::new();
        cart.add(pid("A"), "Nibs".into(), Centimos::new(100));
        cart.increment(&pid("A"));
        cart.set_quantity(&pid("A"), -4);
        assert_eq!(cart.get(&pid("A")).map(|l| l.quantity), Some(1));
    }

    #[test]
    fn test_insertion_order_is_kept() {
        let mut cart = Cart::new();
        for id in ["c", "a", "b"] {
            cart.add(pid(id), id.into(), Centimos::new(1));
        }
        cart.add(pid("a"), "a".into(), Centimos::new(1));
        let ids: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_snapshot_uses_legacy_field_names() {
        let mut cart = Cart::new();
        cart.add(pid("7"), "Barra".into(), Centimos::new(2500));
        let json = serde_json::to_string(&cart).expect("serialize");
        assert_eq!(
            json,
            r#"[{"id":"7","nombre":"Barra","precioCentimos":2500,"cantidad":1}]"#
        );
    }

    #[test]
    fn test_from_lines_repairs_duplicates_and_range() {
        let raw = r#"[
            {"id":1,"nombre":"X","precioCentimos":10,"cantidad":0},
            {"id":"1","nombre":"X","precioCentimos":10,"cantidad":5},
            {"id":2,"nombre":"Y","precioCentimos":10,"cantidad":5000}
        ]"#;
        let lines: Vec<CartLine> = serde_json::from_str(raw).expect("parse");
        let cart = Cart::from_lines(lines);
        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.get(&pid("1")).map(|l| l.quantity), Some(6));
        assert_eq!(cart.get(&pid("2")).map(|l| l.quantity), Some(MAX_QUANTITY));
    }

    #[test]
    fn test_parse_quantity_input() {
        assert_eq!(parse_quantity_input(""), 1);
        assert_eq!(parse_quantity_input("abc"), 1);
        assert_eq!(parse_quantity_input(" 12 "), 12);
        assert_eq!(parse_quantity_input("0"), 1);
        assert_eq!(parse_quantity_input("100000"), MAX_QUANTITY);
    }

    #[test]
    fn test_item_count_sums_quantities() {
        let mut cart = Cart::new();
        cart.add(pid("a"), "a".into(), Centimos::new(1));
        cart.add(pid("a"), "a".into(), Centimos::new(1));
        cart.add(pid("b"), "b".into(), Centimos::new(1));
        assert_eq!(cart.item_count(), 3);
    }

    proptest! {
        #[test]
        fn prop_repeated_add_caps_at_max(calls in 1usize..1200) {
            let mut cart = Cart::new();
            for _ in 0..calls {
                cart.add(pid("A"), "A".into(), Centimos::new(100));
            }
            prop_assert_eq!(cart.lines().len(), 1);
            let expected = u32::try_from(calls.min(MAX_QUANTITY as usize)).unwrap_or(MAX_QUANTITY);
            prop_assert_eq!(cart.get(&pid("A")).map(|l| l.quantity), Some(expected));
        }

        #[test]
        fn prop_decrement_never_below_one(start in 1i64..50, decs in 0usize..100) {
            let mut cart = Cart::new();
            cart.add(pid("A"), "A".into(), Centimos::new(1));
            cart.set_quantity(&pid("A"), start);
            for _ in 0..decs {
                cart.decrement(&pid("A"));
            }
            let qty = cart.get(&pid("A")).map(|l| l.quantity);
            prop_assert!(qty.is_some_and(|q| q >= MIN_QUANTITY));
        }

        #[test]
        fn prop_subtotal_is_exact_integer_sum(
            items in proptest::collection::vec((0u64..10_000_000, 1i64..=999), 0..20)
        ) {
            let mut cart = Cart::new();
            let mut expected: u64 = 0;
            for (i, (price, qty)) in items.iter().enumerate() {
                let id = pid(&i.to_string());
                cart.add(id.clone(), format!("p{i}"), Centimos::new(*price));
                cart.set_quantity(&id, *qty);
                expected += price * u64::try_from(*qty).unwrap_or(0);
            }
            prop_assert_eq!(cart.subtotal().get(), expected);
        }

        #[test]
        fn prop_snapshot_round_trip(
            items in proptest::collection::vec(("[a-z0-9]{1,6}", 0u64..1_000_000, 1i64..=999), 0..15)
        ) {
            let mut cart = Cart::new();
            for (id, price, qty) in &items {
                let id = pid(id);
                cart.add(id.clone(), "x".into(), Centimos::new(*price));
                cart.set_quantity(&id, *qty);
            }
            let json = serde_json::to_string(&cart).expect("serialize");
            let restored: Cart = serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(restored, cart);
        }
    }
}
