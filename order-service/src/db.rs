use sqlx::{PgPool, Pool, Postgres};
use std::collections::HashMap;
use std::env;
use uuid::Uuid;

use crate::models::{order_total, Order, OrderItem, OrderStatus, OrderView};
use crate::validate::NewOrderItem;

pub async fn get_db_pool() -> Pool<Postgres> {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");
    sqlx::PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres")
}

#[derive(Clone)]
pub struct OrderRepo {
    pool: PgPool,
}

impl OrderRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the order and all of its items in one transaction. Either the
    /// whole order exists afterwards or none of it does.
    pub async fn create_order(
        &self,
        customer_name: &str,
        customer_phone: &str,
        delivery_address: &str,
        customer_comment: Option<&str>,
        items: &[NewOrderItem],
    ) -> Result<Uuid, sqlx::Error> {
        let mut tx = self.pool.begin().await?;
        let order_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO orders (id, customer_name, customer_phone, delivery_address, customer_comment, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order_id)
        .bind(customer_name)
        .bind(customer_phone)
        .bind(delivery_address)
        .bind(customer_comment)
        .bind(OrderStatus::Created)
        .execute(&mut *tx)
        .await?;

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO order_items (id, order_id, product_id, product_name, quantity, price, size_id, size_name, color_id, color_name)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(order_id)
            .bind(item.product_id)
            .bind(&item.product_name)
            .bind(item.quantity)
            .bind(item.price)
            .bind(item.size_id)
            .bind(item.size_name.as_deref())
            .bind(item.color_id)
            .bind(item.color_name.as_deref())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(order_id)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Option<OrderView>, sqlx::Error> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_name, customer_phone, delivery_address, customer_comment,
                   status, cancel_comment, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, price,
                   size_id, size_name, color_id, color_name
            FROM order_items
            WHERE order_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let total = order_total(&items);
        Ok(Some(OrderView {
            order,
            order_items: items,
            total,
        }))
    }

    /// Fetch the given orders, echoed back in the caller-supplied id order.
    /// Ids that resolve to nothing are simply absent from the result.
    pub async fn orders_by_ids(&self, ids: &[Uuid]) -> Result<Vec<OrderView>, sqlx::Error> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_name, customer_phone, delivery_address, customer_comment,
                   status, cancel_comment, created_at, updated_at
            FROM orders
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut views = self.attach_items(orders).await?;

        let mut by_id: HashMap<Uuid, OrderView> =
            views.drain(..).map(|v| (v.order.id, v)).collect();
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    pub async fn all_orders(&self) -> Result<Vec<OrderView>, sqlx::Error> {
        let orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT id, customer_name, customer_phone, delivery_address, customer_comment,
                   status, cancel_comment, created_at, updated_at
            FROM orders
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_items(orders).await
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: OrderStatus,
        cancel_comment: Option<&str>,
    ) -> Result<Order, sqlx::Error> {
        sqlx::query_as::<_, Order>(
            r#"
            UPDATE orders
            SET status = $1,
                cancel_comment = COALESCE($2, cancel_comment),
                updated_at = NOW()
            WHERE id = $3
            RETURNING id, customer_name, customer_phone, delivery_address, customer_comment,
                      status, cancel_comment, created_at, updated_at
            "#,
        )
        .bind(status)
        .bind(cancel_comment)
        .bind(id)
        .fetch_one(&self.pool)
        .await
    }

    async fn attach_items(&self, orders: Vec<Order>) -> Result<Vec<OrderView>, sqlx::Error> {
        if orders.is_empty() {
            return Ok(Vec::new());
        }
        let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();

        let mut items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT id, order_id, product_id, product_name, quantity, price,
                   size_id, size_name, color_id, color_name
            FROM order_items
            WHERE order_id = ANY($1)
            "#,
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<OrderItem>> = HashMap::new();
        for item in items.drain(..) {
            grouped.entry(item.order_id).or_default().push(item);
        }

        Ok(orders
            .into_iter()
            .map(|order| {
                let items = grouped.remove(&order.id).unwrap_or_default();
                let total = order_total(&items);
                OrderView {
                    order,
                    order_items: items,
                    total,
                }
            })
            .collect())
    }
}
