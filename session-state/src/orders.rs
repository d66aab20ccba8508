use crate::browser::{BrowserState, ORDERS_COOKIE};
use crate::cookie::{decode_id_list, encode_id_list};

/// Ids of the orders this browser has created, oldest first. The order
/// lookup endpoint echoes results back in this order.
pub fn order_ids<B: BrowserState>(browser: &B) -> Vec<String> {
    decode_id_list(&browser.cookie(ORDERS_COOKIE).unwrap_or_default())
}

/// Record a freshly created order id in the `orders` cookie.
pub fn remember_order<B: BrowserState>(browser: &mut B, order_id: &str) {
    if order_id.is_empty() {
        return;
    }
    let mut ids = order_ids(browser);
    if ids.iter().any(|id| id == order_id) {
        return;
    }
    ids.push(order_id.to_string());
    browser.set_cookie(ORDERS_COOKIE, &encode_id_list(&ids));
}
