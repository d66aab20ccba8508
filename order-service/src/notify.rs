// src/notify.rs
// Best-effort order notification to the messaging bot. A failure here is
// logged by the caller and never rolls back the order.

use std::env;
use thiserror::Error;

use crate::models::OrderView;

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("bot rejected notification with status {0}")]
    Bot(reqwest::StatusCode),
}

#[derive(Clone)]
pub struct OrderNotifier {
    bot_url: Option<String>,
    chat_id: String,
    http: reqwest::Client,
}

impl OrderNotifier {
    pub fn from_env() -> Self {
        let bot_url = env::var("NOTIFY_BOT_URL").ok();
        if bot_url.is_none() {
            eprintln!("⚠️ No NOTIFY_BOT_URL configured — order notifications disabled");
        }
        Self {
            bot_url,
            chat_id: env::var("NOTIFY_CHAT_ID").unwrap_or_default(),
            http: reqwest::Client::new(),
        }
    }

    pub async fn send_order(&self, order: &OrderView) -> Result<(), NotifyError> {
        let Some(bot_url) = &self.bot_url else {
            return Ok(());
        };

        let resp = self
            .http
            .post(bot_url)
            .json(&serde_json::json!({
                "chat_id": self.chat_id,
                "text": format_order_message(order),
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(NotifyError::Bot(resp.status()));
        }
        Ok(())
    }
}

/// Plain-text order summary for the bot channel.
pub fn format_order_message(order: &OrderView) -> String {
    let mut lines = vec![
        format!("New order {}", order.order.id),
        format!("Customer: {} ({})", order.order.customer_name, order.order.customer_phone),
        format!("Address: {}", order.order.delivery_address),
    ];
    if let Some(comment) = &order.order.customer_comment {
        lines.push(format!("Comment: {}", comment));
    }
    lines.push(String::new());
    for item in &order.order_items {
        let mut options = Vec::new();
        if let Some(size) = &item.size_name {
            options.push(size.clone());
        }
        if let Some(color) = &item.color_name {
            options.push(color.clone());
        }
        let options = if options.is_empty() {
            String::new()
        } else {
            format!(" ({})", options.join(", "))
        };
        lines.push(format!(
            "{}{} x{} — {:.2}",
            item.product_name, options, item.quantity, item.price
        ));
    }
    lines.push(String::new());
    lines.push(format!("Total: {:.2}", order.total));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderItem, OrderStatus};
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn message_lists_items_and_total() {
        let order_id = Uuid::new_v4();
        let order = OrderView {
            order: Order {
                id: order_id,
                customer_name: "Anna".to_string(),
                customer_phone: "+371 20000000".to_string(),
                delivery_address: "Riga, Brivibas 1".to_string(),
                customer_comment: Some("Call before delivery".to_string()),
                status: OrderStatus::Created,
                cancel_comment: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            },
            order_items: vec![OrderItem {
                id: Uuid::new_v4(),
                order_id,
                product_id: Uuid::new_v4(),
                product_name: "Linen shirt".to_string(),
                quantity: 2,
                price: 24.5,
                size_id: Some(Uuid::new_v4()),
                size_name: Some("M".to_string()),
                color_id: None,
                color_name: None,
            }],
            total: 49.0,
        };

        let text = format_order_message(&order);
        assert!(text.contains(&format!("New order {}", order_id)));
        assert!(text.contains("Anna"));
        assert!(text.contains("Call before delivery"));
        assert!(text.contains("Linen shirt (M) x2 — 24.50"));
        assert!(text.contains("Total: 49.00"));
    }
}
