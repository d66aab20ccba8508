use std::collections::HashMap;

pub const CART_COOKIE: &str = "cart";
pub const FAVORITES_COOKIE: &str = "favorites";
pub const ORDERS_COOKIE: &str = "orders";

/// Key of the legacy local-storage favorites blob that predates the cookie.
pub const LEGACY_FAVORITES_KEY: &str = "favorites";

/// The slice of browser state the stores read and write. The UI shell backs
/// this with `document.cookie` and `localStorage`; tests use
/// [`MemoryBrowser`].
pub trait BrowserState {
    fn cookie(&self, name: &str) -> Option<String>;
    fn set_cookie(&mut self, name: &str, value: &str);
    fn local_item(&self, key: &str) -> Option<String>;
    fn remove_local_item(&mut self, key: &str);
}

/// In-memory implementation of [`BrowserState`].
#[derive(Debug, Default)]
pub struct MemoryBrowser {
    cookies: HashMap<String, String>,
    local: HashMap<String, String>,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_local_item(mut self, key: &str, value: &str) -> Self {
        self.local.insert(key.to_string(), value.to_string());
        self
    }
}

impl BrowserState for MemoryBrowser {
    fn cookie(&self, name: &str) -> Option<String> {
        self.cookies.get(name).cloned()
    }

    fn set_cookie(&mut self, name: &str, value: &str) {
        self.cookies.insert(name.to_string(), value.to_string());
    }

    fn local_item(&self, key: &str) -> Option<String> {
        self.local.get(key).cloned()
    }

    fn remove_local_item(&mut self, key: &str) {
        self.local.remove(key);
    }
}
