use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "order_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Created,
    CourierWait,
    CourierPicked,
    Enroute,
    Delivered,
    Canceled,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    pub customer_comment: Option<String>,
    pub status: OrderStatus,
    pub cancel_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A line of an order. `price` and the name columns are snapshots taken at
/// submission time — a later price change on the product must not show up
/// here.
#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub size_id: Option<Uuid>,
    pub size_name: Option<String>,
    pub color_id: Option<Uuid>,
    pub color_name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub order_items: Vec<OrderItem>,
    pub total: f64,
}

pub fn order_total(items: &[OrderItem]) -> f64 {
    items.iter().map(|i| i.price * f64::from(i.quantity)).sum()
}

// -- requests ---------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItemPayload {
    pub product_id: Uuid,
    pub quantity: i32,
    #[serde(default)]
    pub selected_size_id: Option<Uuid>,
    #[serde(default)]
    pub selected_color_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub customer_name: String,
    pub customer_phone: String,
    pub delivery_address: String,
    #[serde(default)]
    pub customer_comment: Option<String>,
    pub cart_items: Vec<CartItemPayload>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLookupRequest {
    pub ids: Vec<String>,
}

/// POST /orders takes either a lookup by ids or a full creation payload,
/// distinguished by shape.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OrdersPostBody {
    Lookup(OrderLookupRequest),
    Create(CreateOrderRequest),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
    #[serde(default)]
    pub cancel_comment: Option<String>,
}
