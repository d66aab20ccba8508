mod db;
mod handlers;
mod models;
mod ranking;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use sqlx::PgPool;
use std::env;

use crate::db::CatalogRepo;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let port = env::var("SERVICE_PORT").unwrap_or_else(|_| "3001".into()); // default 3001

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to Postgres");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Migrations failed");

    let repo = web::Data::new(CatalogRepo::new(pool));

    println!("Product Catalog Service running on localhost:{}", port);

    HttpServer::new(move || {
        App::new()
            .app_data(repo.clone())
            .route("/products", web::get().to(handlers::search_products))
            .route("/products", web::post().to(handlers::lookup_products))
            .route("/products/{id}/reviews", web::get().to(handlers::get_reviews))
            .route("/products/{id}/reviews", web::post().to(handlers::create_review))
            .route("/products/{id}/reviews", web::put().to(handlers::update_review))
            .route("/categories", web::get().to(handlers::list_categories))
    })
    .bind(format!("0.0.0.0:{}", port))?
    .run()
    .await
}
