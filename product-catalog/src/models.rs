use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "product_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductStatus {
    Active,
    Inactive,
}

/// Product joined with its category and seller names, as it comes out of the
/// search and batch-lookup queries.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64, // small convenience mapping, prices stay double precision
    pub category_id: Uuid,
    pub category_name: String,
    pub seller_id: Uuid,
    pub seller_name: String,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent_id: Option<Uuid>,
}

#[derive(Debug, Clone, FromRow)]
pub struct SizeRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ColorRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub name: String,
    pub color_code: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ImageRow {
    pub product_id: Uuid,
    pub url: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReviewRatingRow {
    pub product_id: Uuid,
    pub rating: i32,
}

#[derive(Debug, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub client_name: String,
    pub body: String,
    pub rating: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- view models ------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CategoryRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SellerRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct SizeView {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorView {
    pub id: Uuid,
    pub name: String,
    pub color_code: String,
}

/// What the storefront actually renders: the product row plus its option
/// lists, images and the derived rating fields.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub images: Vec<String>,
    pub category: CategoryRef,
    pub seller: SellerRef,
    pub sizes: Vec<SizeView>,
    pub colors: Vec<ColorView>,
    pub average_rating: f64,
    pub review_count: i64,
    pub status: ProductStatus,
}

// -- requests ---------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct BatchLookupRequest {
    pub ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub client_name: String,
    pub body: String,
    pub rating: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    pub review_id: Uuid,
    pub body: String,
    pub rating: i32,
}

/// Sort keys the search endpoint understands. `rating` cannot be expressed
/// at the query level (it depends on the computed average) and is re-sorted
/// in application code after retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Oldest,
    PriceLow,
    PriceHigh,
    Rating,
}

impl SortKey {
    pub fn parse(raw: Option<&str>) -> SortKey {
        match raw {
            Some("oldest") => SortKey::Oldest,
            Some("price_low") => SortKey::PriceLow,
            Some("price_high") => SortKey::PriceHigh,
            Some("rating") => SortKey::Rating,
            _ => SortKey::Newest,
        }
    }
}

/// Filters the database stage of the search pipeline can apply directly.
#[derive(Debug)]
pub struct SearchFilter {
    pub category_ids: Option<Vec<Uuid>>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub seller: Option<String>,
    pub sort: SortKey,
    pub limit: i64,
}
