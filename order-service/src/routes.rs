use actix_web::{get, post, put, web, HttpResponse};
use serde_json::json;
use uuid::Uuid;

use crate::catalog::CatalogClient;
use crate::db::OrderRepo;
use crate::models::{CreateOrderRequest, OrderLookupRequest, OrdersPostBody, UpdateOrderStatusRequest};
use crate::notify::OrderNotifier;
use crate::validate::{build_order_items, requested_product_ids, validate_order_request};

// One endpoint, two payloads: a lookup by ids (the anonymous "my orders"
// view, driven by the orders cookie) or a full creation request.
#[post("/orders")]
pub async fn post_orders(
    repo: web::Data<OrderRepo>,
    catalog: web::Data<CatalogClient>,
    notifier: web::Data<OrderNotifier>,
    body: web::Json<OrdersPostBody>,
) -> HttpResponse {
    match body.into_inner() {
        OrdersPostBody::Lookup(req) => lookup_orders(&repo, req).await,
        OrdersPostBody::Create(req) => create_order(&repo, &catalog, &notifier, req).await,
    }
}

async fn lookup_orders(repo: &OrderRepo, req: OrderLookupRequest) -> HttpResponse {
    let ids: Vec<Uuid> = req
        .ids
        .iter()
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect();

    match repo.orders_by_ids(&ids).await {
        Ok(orders) => HttpResponse::Ok().json(json!({ "orders": orders })),
        Err(e) => {
            eprintln!("DB error looking up orders: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}

async fn create_order(
    repo: &OrderRepo,
    catalog: &CatalogClient,
    notifier: &OrderNotifier,
    req: CreateOrderRequest,
) -> HttpResponse {
    if let Err(msg) = validate_order_request(&req) {
        return HttpResponse::BadRequest().json(json!({"error": msg}));
    }

    // the whole requested set must resolve to ACTIVE products, or nothing
    // is written
    let requested = requested_product_ids(&req.cart_items);
    let products = match catalog.fetch_active(&requested).await {
        Ok(products) => products,
        Err(e) => {
            eprintln!("Catalog lookup failed during order creation: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to verify product availability"}));
        }
    };

    let items = match build_order_items(&req.cart_items, &products) {
        Ok(items) => items,
        Err(msg) => return HttpResponse::BadRequest().json(json!({"error": msg})),
    };

    let order_id = match repo
        .create_order(
            req.customer_name.trim(),
            req.customer_phone.trim(),
            req.delivery_address.trim(),
            req.customer_comment.as_deref(),
            &items,
        )
        .await
    {
        Ok(id) => id,
        Err(e) => {
            eprintln!("Error creating order: {:?}", e);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to create order"}));
        }
    };

    let order = match repo.get_order(order_id).await {
        Ok(Some(order)) => order,
        Ok(None) => {
            eprintln!("Order {} vanished right after creation", order_id);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to load created order"}));
        }
        Err(e) => {
            eprintln!("DB error reloading order {}: {:?}", order_id, e);
            return HttpResponse::InternalServerError()
                .json(json!({"error": "Failed to load created order"}));
        }
    };

    // best-effort: the order stands whether or not the bot hears about it
    if let Err(e) = notifier.send_order(&order).await {
        eprintln!("Order notification error ({}): {}", order_id, e);
    }

    HttpResponse::Created().json(json!({
        "success": true,
        "order": order,
        "message": "Order successfully created",
    }))
}

// Operator view: every order, newest first.
#[get("/orders")]
pub async fn get_orders(repo: web::Data<OrderRepo>) -> HttpResponse {
    match repo.all_orders().await {
        Ok(orders) => HttpResponse::Ok().json(orders),
        Err(e) => {
            eprintln!("DB error listing orders: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}

// Status transitions are driven by fulfillment, not by customers.
#[put("/orders/{id}/status")]
pub async fn update_status(
    repo: web::Data<OrderRepo>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateOrderStatusRequest>,
) -> HttpResponse {
    let order_id = path.into_inner();

    match repo
        .update_status(order_id, req.status, req.cancel_comment.as_deref())
        .await
    {
        Ok(order) => HttpResponse::Ok().json(json!({
            "message": "Order status updated",
            "order": order,
        })),
        Err(sqlx::Error::RowNotFound) => {
            HttpResponse::NotFound().json(json!({"error": "Order not found"}))
        }
        Err(e) => {
            eprintln!("DB error updating order {} status: {:?}", order_id, e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}
