// src/favorites.rs
// Cookie-backed favorites. Adds are optimistic: the entry lands in state and
// cookie immediately, then a background fetch of the canonical product either
// confirms it or rolls it back.

use crate::browser::{BrowserState, FAVORITES_COOKIE, LEGACY_FAVORITES_KEY};
use crate::cookie::{decode_id_list, encode_id_list};
use crate::hydrate::{CatalogClient, RemoteProduct};

#[derive(Debug)]
pub struct FavoritesHydration {
    seq: u64,
    ids: Vec<String>,
}

impl FavoritesHydration {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}

pub struct FavoritesStore<B: BrowserState> {
    browser: B,
    items: Vec<RemoteProduct>,
    is_loading: bool,
    seq: u64,
}

impl<B: BrowserState> FavoritesStore<B> {
    pub fn new(browser: B) -> Self {
        Self {
            browser,
            items: Vec::new(),
            is_loading: true,
            seq: 0,
        }
    }

    pub fn items(&self) -> &[RemoteProduct] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn browser(&self) -> &B {
        &self.browser
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.items.iter().any(|p| p.id == id)
    }

    /// Start a hydration round. If the cookie is empty but a legacy
    /// local-storage blob exists, its ids are migrated into the cookie first
    /// and the blob deleted — one time, one direction.
    pub fn begin_load(&mut self) -> FavoritesHydration {
        self.seq += 1;
        self.migrate_legacy_blob();
        let raw = self.browser.cookie(FAVORITES_COOKIE).unwrap_or_default();
        FavoritesHydration {
            seq: self.seq,
            ids: decode_id_list(&raw),
        }
    }

    /// Apply a hydration result, keeping the cookie's id order. Stale
    /// tickets are discarded.
    pub fn apply_load(&mut self, ticket: FavoritesHydration, products: Vec<RemoteProduct>) -> bool {
        if ticket.seq != self.seq {
            log::debug!(
                "discarding stale favorites hydration (seq {} != {})",
                ticket.seq,
                self.seq
            );
            return false;
        }
        self.items = ticket
            .ids
            .iter()
            .filter_map(|id| products.iter().find(|p| &p.id == id).cloned())
            .collect();
        self.is_loading = false;
        self.persist();
        true
    }

    pub async fn load(&mut self, client: &CatalogClient) {
        let ticket = self.begin_load();
        let products = client.fetch_by_ids(ticket.ids()).await;
        self.apply_load(ticket, products);
    }

    /// Phase one of the optimistic add: validate, append, persist. Returns
    /// false when the product is already a favorite or its data is
    /// incomplete.
    pub fn add_optimistic(&mut self, product: RemoteProduct) -> bool {
        if product.id.is_empty() || product.category.id.is_empty() || product.category.name.is_empty()
        {
            log::warn!(
                "rejecting favorites add with incomplete product data (id: {:?})",
                product.id
            );
            return false;
        }
        if self.is_favorite(&product.id) {
            return false;
        }
        self.items.push(product);
        self.touch();
        true
    }

    /// Phase two: compensate against the canonical record. Only called with
    /// an authoritative answer — a transport failure is not one, and leaves
    /// the optimistic entry standing. The rollback also checks the entry is
    /// still present, so a late answer after the user already removed it is
    /// ignored.
    pub fn reconcile(&mut self, id: &str, canonical: Option<&RemoteProduct>) {
        let still_there = self.is_favorite(id);
        let confirmed = canonical.map(|p| p.is_active()).unwrap_or(false);
        if still_there && !confirmed {
            log::info!("rolling back favorite {}: product inactive or gone", id);
            self.items.retain(|p| p.id != id);
            self.touch();
        }
    }

    /// Optimistic add followed by reconciliation against the catalog.
    /// Returns the phase-one result.
    pub async fn add_to_favorites(&mut self, product: RemoteProduct, client: &CatalogClient) -> bool {
        let id = product.id.clone();
        if !self.add_optimistic(product) {
            return false;
        }
        match client.try_fetch_by_ids(std::slice::from_ref(&id)).await {
            Ok(products) => self.reconcile(&id, products.iter().find(|p| p.id == id)),
            Err(e) => {
                log::warn!("favorites reconciliation for {} skipped: {:?}", id, e);
            }
        }
        true
    }

    /// Unconditional removal; returns whether anything was removed so the UI
    /// can raise its notification.
    pub fn remove_from_favorites(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        let removed = self.items.len() != before;
        if removed {
            self.touch();
        }
        removed
    }

    /// Add or remove depending on current membership. Returns whether the
    /// product is a favorite afterwards.
    pub async fn toggle_favorite(&mut self, product: RemoteProduct, client: &CatalogClient) -> bool {
        if self.is_favorite(&product.id) {
            self.remove_from_favorites(&product.id);
            false
        } else {
            self.add_to_favorites(product, client).await;
            true
        }
    }

    fn migrate_legacy_blob(&mut self) {
        let cookie_empty = self
            .browser
            .cookie(FAVORITES_COOKIE)
            .map(|c| c.is_empty())
            .unwrap_or(true);
        if !cookie_empty {
            return;
        }
        let Some(blob) = self.browser.local_item(LEGACY_FAVORITES_KEY) else {
            return;
        };

        let ids = legacy_blob_ids(&blob);
        if !ids.is_empty() {
            self.browser
                .set_cookie(FAVORITES_COOKIE, &encode_id_list(&ids));
        }
        self.browser.remove_local_item(LEGACY_FAVORITES_KEY);
    }

    fn touch(&mut self) {
        self.seq += 1;
        self.persist();
    }

    fn persist(&mut self) {
        if self.is_loading {
            return;
        }
        let ids: Vec<String> = self.items.iter().map(|p| p.id.clone()).collect();
        self.browser
            .set_cookie(FAVORITES_COOKIE, &encode_id_list(&ids));
    }
}

/// Ids out of the legacy blob: a JSON array of either id strings or objects
/// carrying an `id` field. Anything else yields nothing.
fn legacy_blob_ids(blob: &str) -> Vec<String> {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(blob) else {
        log::warn!("ignoring unreadable legacy favorites blob");
        return Vec::new();
    };
    let Some(entries) = value.as_array() else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|entry| {
            entry
                .as_str()
                .map(|s| s.to_string())
                .or_else(|| entry.get("id").and_then(|id| id.as_str()).map(|s| s.to_string()))
        })
        .filter(|id| !id.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MemoryBrowser;
    use crate::hydrate::{CategoryRef, SellerRef};

    fn product(id: &str, status: &str) -> RemoteProduct {
        RemoteProduct {
            id: id.to_string(),
            name: format!("Product {}", id),
            description: None,
            price: 19.0,
            images: vec![],
            category: CategoryRef {
                id: "cat1".to_string(),
                name: "Coats".to_string(),
            },
            seller: SellerRef {
                id: "sel1".to_string(),
                name: "Atelier".to_string(),
            },
            sizes: vec![],
            colors: vec![],
            average_rating: 5.0,
            review_count: 0,
            status: status.to_string(),
        }
    }

    fn loaded_store() -> FavoritesStore<MemoryBrowser> {
        let mut store = FavoritesStore::new(MemoryBrowser::new());
        let ticket = store.begin_load();
        store.apply_load(ticket, vec![]);
        store
    }

    #[test]
    fn optimistic_add_lands_in_state_and_cookie() {
        let mut store = loaded_store();
        assert!(store.add_optimistic(product("p1", "ACTIVE")));

        assert!(store.is_favorite("p1"));
        assert_eq!(
            store.browser().cookie(FAVORITES_COOKIE).as_deref(),
            Some("p1")
        );
    }

    #[test]
    fn adding_twice_is_a_no_op() {
        let mut store = loaded_store();
        assert!(store.add_optimistic(product("p1", "ACTIVE")));
        assert!(!store.add_optimistic(product("p1", "ACTIVE")));
        assert_eq!(store.items().len(), 1);
    }

    #[test]
    fn rejects_product_without_category() {
        let mut store = loaded_store();
        let mut bad = product("p1", "ACTIVE");
        bad.category.name = String::new();

        assert!(!store.add_optimistic(bad));
        assert!(store.items().is_empty());
    }

    #[test]
    fn reconcile_rolls_back_inactive_product() {
        let mut store = loaded_store();
        store.add_optimistic(product("p1", "ACTIVE"));

        let canonical = product("p1", "INACTIVE");
        store.reconcile("p1", Some(&canonical));

        assert!(!store.is_favorite("p1"));
        assert_eq!(store.browser().cookie(FAVORITES_COOKIE).as_deref(), Some(""));
    }

    #[test]
    fn reconcile_rolls_back_missing_product() {
        let mut store = loaded_store();
        store.add_optimistic(product("p1", "ACTIVE"));

        store.reconcile("p1", None);
        assert!(!store.is_favorite("p1"));
    }

    #[test]
    fn reconcile_keeps_confirmed_product() {
        let mut store = loaded_store();
        store.add_optimistic(product("p1", "ACTIVE"));

        let canonical = product("p1", "ACTIVE");
        store.reconcile("p1", Some(&canonical));
        assert!(store.is_favorite("p1"));
    }

    #[test]
    fn late_reconcile_after_user_removal_is_ignored() {
        let mut store = loaded_store();
        store.add_optimistic(product("p1", "ACTIVE"));
        assert!(store.remove_from_favorites("p1"));

        store.reconcile("p1", None);
        assert!(!store.is_favorite("p1"));
        assert!(store.items().is_empty());
    }

    #[test]
    fn remove_reports_whether_anything_happened() {
        let mut store = loaded_store();
        store.add_optimistic(product("p1", "ACTIVE"));

        assert!(store.remove_from_favorites("p1"));
        assert!(!store.remove_from_favorites("p1"));
    }

    #[test]
    fn legacy_blob_of_objects_migrates_into_the_cookie() {
        let browser = MemoryBrowser::new()
            .with_local_item(LEGACY_FAVORITES_KEY, r#"[{"id":"a","name":"x"},{"id":"b"}]"#);
        let mut store = FavoritesStore::new(browser);

        let ticket = store.begin_load();
        assert_eq!(ticket.ids(), ["a", "b"]);
        assert_eq!(store.browser().cookie(FAVORITES_COOKIE).as_deref(), Some("a,b"));
        assert!(store.browser().local_item(LEGACY_FAVORITES_KEY).is_none());
    }

    #[test]
    fn legacy_blob_of_strings_migrates_too() {
        let browser = MemoryBrowser::new().with_local_item(LEGACY_FAVORITES_KEY, r#"["a","b"]"#);
        let mut store = FavoritesStore::new(browser);

        let ticket = store.begin_load();
        assert_eq!(ticket.ids(), ["a", "b"]);
    }

    #[test]
    fn populated_cookie_wins_over_legacy_blob() {
        let browser = MemoryBrowser::new()
            .with_cookie(FAVORITES_COOKIE, "c")
            .with_local_item(LEGACY_FAVORITES_KEY, r#"["a"]"#);
        let mut store = FavoritesStore::new(browser);

        let ticket = store.begin_load();
        assert_eq!(ticket.ids(), ["c"]);
        // blob stays untouched: migration only runs against an empty cookie
        assert!(store.browser().local_item(LEGACY_FAVORITES_KEY).is_some());
    }

    #[test]
    fn hydration_preserves_cookie_order_and_drops_unknown_ids() {
        let browser = MemoryBrowser::new().with_cookie(FAVORITES_COOKIE, "b,gone,a");
        let mut store = FavoritesStore::new(browser);

        let ticket = store.begin_load();
        store.apply_load(ticket, vec![product("a", "ACTIVE"), product("b", "ACTIVE")]);

        let ids: Vec<&str> = store.items().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    #[test]
    fn stale_hydration_is_discarded() {
        let browser = MemoryBrowser::new().with_cookie(FAVORITES_COOKIE, "a");
        let mut store = FavoritesStore::new(browser);

        let ticket = store.begin_load();
        let newer = store.begin_load();

        assert!(!store.apply_load(ticket, vec![product("a", "ACTIVE")]));
        assert!(store.apply_load(newer, vec![product("a", "ACTIVE")]));
    }
}
