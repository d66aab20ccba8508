// src/cart.rs
// Cookie-backed cart state. The cookie only ever holds
// (id, sizeId, colorId, qty) tuples; display data is re-fetched from the
// catalog on load because prices and availability change server-side.

use serde::Serialize;

use crate::browser::{BrowserState, CART_COOKIE};
use crate::cookie::{decode_cart, encode_cart, CartCookieEntry};
use crate::hydrate::{CatalogClient, RemoteProduct};

/// One line in the cart. Identity key is (id, size_id, color_id) — the same
/// product in a different size or color is a separate line. Size/color ids
/// are empty strings when the option is not set, matching the cookie form.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub id: String,
    pub size_id: String,
    pub size_name: String,
    pub color_id: String,
    pub color_name: String,
    pub quantity: i32,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub category_id: String,
    pub category_name: String,
    pub seller_name: String,
}

/// What the UI hands over when the customer puts a product in the cart.
#[derive(Debug, Clone, Default)]
pub struct NewCartItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub image: String,
    pub category_id: String,
    pub category_name: String,
    pub seller_name: String,
    pub size_id: String,
    pub size_name: String,
    pub color_id: String,
    pub color_name: String,
}

/// New option values for [`CartStore::update_item_options`]. Omitted fields
/// keep the line's current value.
#[derive(Debug, Clone, Default)]
pub struct OptionChange {
    pub size_id: Option<String>,
    pub size_name: Option<String>,
    pub color_id: Option<String>,
    pub color_name: Option<String>,
}

/// One cart line in the shape the order endpoint expects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItem {
    pub product_id: String,
    pub quantity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_color_id: Option<String>,
}

/// In-flight hydration ticket. Carries the sequence number current when the
/// fetch started; a mutation in the meantime invalidates it.
#[derive(Debug)]
pub struct CartHydration {
    seq: u64,
    entries: Vec<CartCookieEntry>,
}

impl CartHydration {
    pub fn ids(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.id.clone()).collect()
    }
}

pub struct CartStore<B: BrowserState> {
    browser: B,
    items: Vec<CartLine>,
    is_loading: bool,
    seq: u64,
}

impl<B: BrowserState> CartStore<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser,
            items: Vec::new(),
            is_loading: true,
            seq: 0,
        }
    }

    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    /// True until the first hydration has been applied. Consumers render a
    /// loading state rather than an empty cart while this holds.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    /// Decode the cookie and start a hydration round. The returned ticket is
    /// only applicable while no further mutation or load happens.
    pub fn begin_load(&mut self) -> CartHydration {
        self.seq += 1;
        let raw = self.browser.cookie(CART_COOKIE).unwrap_or_default();
        CartHydration {
            seq: self.seq,
            entries: decode_cart(&raw),
        }
    }

    /// Apply a hydration result. Entries whose product did not resolve are
    /// dropped silently; size/color names are looked up in the product's
    /// option lists. A stale ticket is discarded and the state left alone.
    pub fn apply_load(&mut self, ticket: CartHydration, products: Vec<RemoteProduct>) -> bool {
        if ticket.seq != self.seq {
            log::debug!("discarding stale cart hydration (seq {} != {})", ticket.seq, self.seq);
            return false;
        }

        self.items = ticket
            .entries
            .into_iter()
            .filter_map(|e| {
                let product = products.iter().find(|p| p.id == e.id)?;
                let size_name = product
                    .sizes
                    .iter()
                    .find(|s| s.id == e.size_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                let color_name = product
                    .colors
                    .iter()
                    .find(|c| c.id == e.color_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                Some(CartLine {
                    id: e.id,
                    size_id: e.size_id,
                    size_name,
                    color_id: e.color_id,
                    color_name,
                    quantity: e.quantity,
                    name: product.name.clone(),
                    price: product.price,
                    image: product.first_image(),
                    category_id: product.category.id.clone(),
                    category_name: product.category.name.clone(),
                    seller_name: product.seller.name.clone(),
                })
            })
            .collect();
        self.is_loading = false;
        self.persist();
        true
    }

    pub async fn load(&mut self, client: &CatalogClient) {
        let ticket = self.begin_load();
        let products = client.fetch_by_ids(&ticket.ids()).await;
        self.apply_load(ticket, products);
    }

    /// Add `quantity` of an item. An existing line with the same
    /// (id, size, color) key absorbs the quantity instead of duplicating.
    /// Returns false without mutating when the item is missing its id or
    /// category data.
    pub fn add_to_cart(&mut self, item: NewCartItem, quantity: i32) -> bool {
        if item.id.is_empty() || item.category_id.is_empty() || item.category_name.is_empty() {
            log::warn!("rejecting cart add with incomplete product data (id: {:?})", item.id);
            return false;
        }
        let quantity = quantity.max(1);

        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.id == item.id && l.size_id == item.size_id && l.color_id == item.color_id)
        {
            line.quantity += quantity;
        } else {
            self.items.push(CartLine {
                id: item.id,
                size_id: item.size_id,
                size_name: item.size_name,
                color_id: item.color_id,
                color_name: item.color_name,
                quantity,
                name: item.name,
                price: item.price,
                image: item.image,
                category_id: item.category_id,
                category_name: item.category_name,
                seller_name: item.seller_name,
            });
        }
        self.touch();
        true
    }

    /// Remove the line matching the full identity key. No-op when absent.
    pub fn remove_from_cart(&mut self, id: &str, size_id: Option<&str>, color_id: Option<&str>) {
        let size_id = size_id.unwrap_or("");
        let color_id = color_id.unwrap_or("");
        self.items
            .retain(|l| !(l.id == id && l.size_id == size_id && l.color_id == color_id));
        self.touch();
    }

    /// Set the quantity on the line matching the full key; a quantity of zero
    /// or less removes it. Other lines of the same product are untouched.
    pub fn update_quantity(
        &mut self,
        id: &str,
        new_quantity: i32,
        size_id: Option<&str>,
        color_id: Option<&str>,
    ) {
        if new_quantity <= 0 {
            self.remove_from_cart(id, size_id, color_id);
            return;
        }
        let size_id = size_id.unwrap_or("");
        let color_id = color_id.unwrap_or("");
        if let Some(line) = self
            .items
            .iter_mut()
            .find(|l| l.id == id && l.size_id == size_id && l.color_id == color_id)
        {
            line.quantity = new_quantity;
            self.touch();
        }
    }

    /// Change the size/color of an existing line. If the new key collides
    /// with another line already in the cart, the quantities merge into that
    /// line and the original disappears; otherwise the line is renamed in
    /// place.
    pub fn update_item_options(
        &mut self,
        id: &str,
        current_size_id: Option<&str>,
        current_color_id: Option<&str>,
        change: OptionChange,
    ) {
        let current_size_id = current_size_id.unwrap_or("");
        let current_color_id = current_color_id.unwrap_or("");
        let Some(idx) = self.items.iter().position(|l| {
            l.id == id && l.size_id == current_size_id && l.color_id == current_color_id
        }) else {
            return;
        };

        let final_size_id = change
            .size_id
            .clone()
            .unwrap_or_else(|| self.items[idx].size_id.clone());
        let final_color_id = change
            .color_id
            .clone()
            .unwrap_or_else(|| self.items[idx].color_id.clone());

        let existing = self.items.iter().position(|l| {
            l.id == id && l.size_id == final_size_id && l.color_id == final_color_id
        });

        match existing {
            Some(target) if target != idx => {
                let moved = self.items.remove(idx);
                let target = if target > idx { target - 1 } else { target };
                self.items[target].quantity += moved.quantity;
            }
            _ => {
                let line = &mut self.items[idx];
                if let Some(size_id) = change.size_id {
                    line.size_id = size_id;
                    line.size_name = change.size_name.unwrap_or_default();
                }
                if let Some(color_id) = change.color_id {
                    line.color_id = color_id;
                    line.color_name = change.color_name.unwrap_or_default();
                }
            }
        }
        self.touch();
    }

    pub fn clear_cart(&mut self) {
        self.items.clear();
        self.touch();
    }

    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .map(|l| l.price * f64::from(l.quantity))
            .sum()
    }

    pub fn total_items(&self) -> i32 {
        self.items.iter().map(|l| l.quantity).sum()
    }

    /// Membership check on the product id alone, any size or color.
    pub fn is_in_cart(&self, id: &str) -> bool {
        self.items.iter().any(|l| l.id == id)
    }

    /// Snapshot of the cart in the shape the order endpoint takes. Empty
    /// option ids become nulls on the wire.
    pub fn checkout_items(&self) -> Vec<CheckoutItem> {
        self.items
            .iter()
            .map(|l| CheckoutItem {
                product_id: l.id.clone(),
                quantity: l.quantity,
                selected_size_id: (!l.size_id.is_empty()).then(|| l.size_id.clone()),
                selected_color_id: (!l.color_id.is_empty()).then(|| l.color_id.clone()),
            })
            .collect()
    }

    fn touch(&mut self) {
        self.seq += 1;
        self.persist();
    }

    // The cookie is only rewritten once the first hydration has landed;
    // before that the in-memory view is incomplete and would truncate it.
    fn persist(&mut self) {
        if self.is_loading {
            return;
        }
        let entries: Vec<CartCookieEntry> = self
            .items
            .iter()
            .map(|l| CartCookieEntry {
                id: l.id.clone(),
                size_id: l.size_id.clone(),
                color_id: l.color_id.clone(),
                quantity: l.quantity,
            })
            .collect();
        self.browser.set_cookie(CART_COOKIE, &encode_cart(&entries));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryBrowser;
    use crate::hydrate::{CategoryRef, SellerRef, SizeOption};

    fn item(id: &str, size_id: &str, color_id: &str) -> NewCartItem {
        NewCartItem {
            id: id.to_string(),
            name: format!("Product {}", id),
            price: 10.0,
            category_id: "cat1".to_string(),
            category_name: "Dresses".to_string(),
            seller_name: "Atelier".to_string(),
            size_id: size_id.to_string(),
            color_id: color_id.to_string(),
            ..Default::default()
        }
    }

    fn loaded_store() -> CartStore<MemoryBrowser> {
        let mut store = CartStore::new(MemoryBrowser::new());
        let ticket = store.begin_load();
        store.apply_load(ticket, vec![]);
        store
    }

    fn remote(id: &str) -> RemoteProduct {
        RemoteProduct {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            price: 25.0,
            images: vec!["img.jpg".to_string()],
            category: CategoryRef {
                id: "cat1".to_string(),
                name: "Dresses".to_string(),
            },
            seller: SellerRef {
                id: "sel1".to_string(),
                name: "Atelier".to_string(),
            },
            sizes: vec![SizeOption {
                id: "s1".to_string(),
                name: "M".to_string(),
            }],
            colors: vec![],
            average_rating: 5.0,
            review_count: 0,
            status: "ACTIVE".to_string(),
        }
    }

    #[test]
    fn adding_same_key_twice_merges_quantities() {
        let mut store = loaded_store();
        assert!(store.add_to_cart(item("p1", "s1", "c1"), 2));
        assert!(store.add_to_cart(item("p1", "s1", "c1"), 3));

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].quantity, 5);
    }

    #[test]
    fn different_options_make_distinct_lines() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 1);
        store.add_to_cart(item("p1", "s2", ""), 1);

        assert_eq!(store.items().len(), 2);
        assert!(store.is_in_cart("p1"));
    }

    #[test]
    fn rejects_item_without_category() {
        let mut store = loaded_store();
        let mut bad = item("p1", "", "");
        bad.category_name = String::new();

        assert!(!store.add_to_cart(bad, 1));
        assert!(store.items().is_empty());
    }

    #[test]
    fn remove_is_idempotent() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 1);

        store.remove_from_cart("p1", Some("s1"), None);
        store.remove_from_cart("p1", Some("s1"), None);
        assert!(store.items().is_empty());
    }

    #[test]
    fn update_quantity_needs_the_full_key() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 2);
        store.add_to_cart(item("p1", "s2", ""), 2);

        store.update_quantity("p1", 7, Some("s1"), None);

        assert_eq!(store.items()[0].quantity, 7);
        assert_eq!(store.items()[1].quantity, 2);
    }

    #[test]
    fn zero_quantity_removes_the_line() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 2);
        store.add_to_cart(item("p2", "", ""), 1);

        store.update_quantity("p1", 0, Some("s1"), None);

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.total_items(), 1);
    }

    #[test]
    fn option_change_onto_existing_variant_merges() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 2);
        store.add_to_cart(item("p1", "s2", ""), 3);

        store.update_item_options(
            "p1",
            Some("s1"),
            None,
            OptionChange {
                size_id: Some("s2".to_string()),
                size_name: Some("L".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(store.items().len(), 1);
        let line = &store.items()[0];
        assert_eq!(line.size_id, "s2");
        assert_eq!(line.quantity, 5);
    }

    #[test]
    fn option_change_without_collision_renames_in_place() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 2);

        store.update_item_options(
            "p1",
            Some("s1"),
            None,
            OptionChange {
                size_id: Some("s3".to_string()),
                size_name: Some("XL".to_string()),
                ..Default::default()
            },
        );

        assert_eq!(store.items().len(), 1);
        assert_eq!(store.items()[0].size_id, "s3");
        assert_eq!(store.items()[0].size_name, "XL");
        assert_eq!(store.items()[0].quantity, 2);
    }

    #[test]
    fn totals_fold_over_all_lines() {
        let mut store = loaded_store();
        let mut a = item("p1", "", "");
        a.price = 10.0;
        let mut b = item("p2", "", "");
        b.price = 4.5;
        store.add_to_cart(a, 2);
        store.add_to_cart(b, 3);

        assert_eq!(store.total_items(), 5);
        assert!((store.total_price() - 33.5).abs() < f64::EPSILON);
    }

    #[test]
    fn mutations_rewrite_the_cookie() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", "c1"), 2);

        assert_eq!(
            store.browser().cookie(CART_COOKIE).as_deref(),
            Some("p1:s1:c1:2")
        );

        store.clear_cart();
        assert_eq!(store.browser().cookie(CART_COOKIE).as_deref(), Some(""));
    }

    #[test]
    fn hydration_fills_names_and_drops_dead_products() {
        let browser = MemoryBrowser::new().with_cookie(CART_COOKIE, "p1:s1::2;gone:::1");
        let mut store = CartStore::new(browser);
        assert!(store.is_loading());

        let ticket = store.begin_load();
        assert!(store.apply_load(ticket, vec![remote("p1")]));

        assert!(!store.is_loading());
        assert_eq!(store.items().len(), 1);
        let line = &store.items()[0];
        assert_eq!(line.size_name, "M");
        assert_eq!(line.price, 25.0);
        // the dropped entry is gone from the cookie too
        assert_eq!(
            store.browser().cookie(CART_COOKIE).as_deref(),
            Some("p1:s1::2")
        );
    }

    #[test]
    fn stale_hydration_is_discarded() {
        let browser = MemoryBrowser::new().with_cookie(CART_COOKIE, "p1:s1::2");
        let mut store = CartStore::new(browser);

        let ticket = store.begin_load();
        let newer = store.begin_load();

        assert!(!store.apply_load(ticket, vec![remote("p1")]));
        assert!(store.is_loading());
        assert!(store.apply_load(newer, vec![remote("p1")]));
        assert!(!store.is_loading());
    }

    #[test]
    fn checkout_items_null_out_empty_options() {
        let mut store = loaded_store();
        store.add_to_cart(item("p1", "s1", ""), 2);

        let payload = store.checkout_items();
        assert_eq!(
            payload,
            vec![CheckoutItem {
                product_id: "p1".to_string(),
                quantity: 2,
                selected_size_id: Some("s1".to_string()),
                selected_color_id: None,
            }]
        );
    }
}
