//! Client-side session state for the storefront: the cart and favorites
//! collections, their compact cookie encodings, and the hydration client
//! that turns persisted ids back into full product records.
//!
//! Cookies only ever hold ids, options and quantities. Prices, names and
//! availability are re-fetched from the catalog on every load — client
//! storage is never trusted for anything the server can change.

mod browser;
mod cart;
mod cookie;
mod favorites;
mod hydrate;
mod orders;

pub use browser::{
    BrowserState, MemoryBrowser, CART_COOKIE, FAVORITES_COOKIE, LEGACY_FAVORITES_KEY, ORDERS_COOKIE,
};
pub use cart::{
    CartHydration, CartLine, CartStore, CheckoutItem, NewCartItem, OptionChange,
};
pub use cookie::{decode_cart, decode_id_list, encode_cart, encode_id_list, CartCookieEntry};
pub use favorites::{FavoritesHydration, FavoritesStore};
pub use hydrate::{
    CatalogClient, CategoryRef, ColorOption, RemoteProduct, SellerRef, SizeOption,
};
pub use orders::{order_ids, remember_order};
