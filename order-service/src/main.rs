mod catalog;
mod db;
mod models;
mod notify;
mod routes;
mod validate;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use std::env;

use crate::catalog::CatalogClient;
use crate::db::OrderRepo;
use crate::notify::OrderNotifier;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = env::var("PORT").unwrap_or_else(|_| "3002".to_string());
    let addr = format!("{}:{}", host, port);

    let pool = db::get_db_pool().await;
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations failed");

    let repo = web::Data::new(OrderRepo::new(pool));
    let catalog = web::Data::new(CatalogClient::from_env());
    let notifier = web::Data::new(OrderNotifier::from_env());

    println!("🚀 Order Service running at http://{}", addr);

    HttpServer::new(move || {
        App::new()
            .app_data(repo.clone())
            .app_data(catalog.clone())
            .app_data(notifier.clone())
            .service(routes::post_orders)
            .service(routes::get_orders)
            .service(routes::update_status)
    })
    .bind(addr)?
    .run()
    .await
}
