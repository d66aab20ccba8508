// src/validate.rs
// Pure pieces of the order submission flow: request validation and the
// price-snapshotting step that turns cart lines into order items.

use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::catalog::CatalogProduct;
use crate::models::{CartItemPayload, CreateOrderRequest};

/// Everything needed to insert one order_items row. Built exclusively from
/// catalog data — the client payload contributes ids and quantities only.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub size_id: Option<Uuid>,
    pub size_name: Option<String>,
    pub color_id: Option<Uuid>,
    pub color_name: Option<String>,
}

/// Field-level checks; nothing is written when any of them fail.
pub fn validate_order_request(req: &CreateOrderRequest) -> Result<(), String> {
    if req.customer_name.trim().is_empty() {
        return Err("Customer name is required".to_string());
    }
    if req.customer_phone.trim().is_empty() {
        return Err("Customer phone is required".to_string());
    }
    if req.delivery_address.trim().is_empty() {
        return Err("Delivery address is required".to_string());
    }
    if req.cart_items.is_empty() {
        return Err("Cart is empty".to_string());
    }
    if req.cart_items.iter().any(|i| i.quantity < 1) {
        return Err("Item quantity must be at least 1".to_string());
    }
    Ok(())
}

pub fn requested_product_ids(items: &[CartItemPayload]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    items
        .iter()
        .map(|i| i.product_id)
        .filter(|id| seen.insert(*id))
        .collect()
}

/// Snapshot step. Rejects the whole order when any requested product is not
/// among the resolved ACTIVE ones — no partial orders. Prices and names come
/// from the catalog records at this moment, never from the client.
pub fn build_order_items(
    items: &[CartItemPayload],
    products: &[CatalogProduct],
) -> Result<Vec<NewOrderItem>, String> {
    let requested = requested_product_ids(items);
    let by_id: HashMap<Uuid, &CatalogProduct> = products.iter().map(|p| (p.id, p)).collect();

    if by_id.len() != requested.len() || requested.iter().any(|id| !by_id.contains_key(id)) {
        return Err("Some products in your cart are no longer available".to_string());
    }

    Ok(items
        .iter()
        .map(|item| {
            let product = by_id[&item.product_id];
            let size_name = item.selected_size_id.and_then(|id| {
                product.sizes.iter().find(|s| s.id == id).map(|s| s.name.clone())
            });
            let color_name = item.selected_color_id.and_then(|id| {
                product.colors.iter().find(|c| c.id == id).map(|c| c.name.clone())
            });
            NewOrderItem {
                product_id: item.product_id,
                product_name: product.name.clone(),
                quantity: item.quantity,
                price: product.price,
                size_id: item.selected_size_id,
                size_name,
                color_id: item.selected_color_id,
                color_name,
            }
        })
        .collect())
}
