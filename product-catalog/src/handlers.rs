use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::db::CatalogRepo;
use crate::models::{
    BatchLookupRequest, CategoryRef, ColorView, CreateReviewRequest, ProductRow, ProductView,
    SearchFilter, SellerRef, SizeView, SortKey, UpdateReviewRequest,
};
use crate::ranking;

const DEFAULT_LIMIT: i64 = 50;

pub async fn search_products(
    repo: web::Data<CatalogRepo>,
    query: web::Query<HashMap<String, String>>,
) -> impl Responder {
    let min_price = query.get("minPrice").and_then(|s| s.parse::<f64>().ok());
    let max_price = query.get("maxPrice").and_then(|s| s.parse::<f64>().ok());
    let min_rating = query.get("minRating").and_then(|s| s.parse::<f64>().ok());
    let search = query.get("search").cloned().filter(|s| !s.is_empty());
    let seller = query.get("seller").cloned().filter(|s| !s.is_empty());
    let sort = SortKey::parse(query.get("sortBy").map(String::as_str));
    let limit = query
        .get("limit")
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_LIMIT);

    // category scoping: an explicit id list wins over categoryId, which can
    // optionally be expanded to its direct subcategories
    let category_ids = if let Some(raw) = query.get("categories") {
        let ids: Vec<Uuid> = raw
            .split(',')
            .filter_map(|s| Uuid::parse_str(s.trim()).ok())
            .collect();
        if ids.is_empty() {
            None
        } else {
            Some(ids)
        }
    } else if let Some(category_id) = query.get("categoryId").and_then(|s| Uuid::parse_str(s).ok()) {
        let include_sub = query
            .get("includeSubcategories")
            .map(|v| v == "true")
            .unwrap_or(false);
        if include_sub {
            match repo.category_with_children(category_id).await {
                Ok(ids) => Some(ids),
                Err(e) => {
                    eprintln!("DB error expanding category {}: {:?}", category_id, e);
                    return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
                }
            }
        } else {
            Some(vec![category_id])
        }
    } else {
        None
    };

    let filter = SearchFilter {
        category_ids,
        min_price,
        max_price,
        search,
        seller,
        sort,
        limit,
    };

    let rows = match repo.search_products(&filter).await {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Search DB error: {:?}", e);
            return HttpResponse::InternalServerError().json(json!({"error": "Search error"}));
        }
    };

    let mut products = match assemble_views(&repo, rows).await {
        Ok(views) => views,
        Err(e) => {
            eprintln!("DB error assembling product views: {:?}", e);
            return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
        }
    };

    // application stage: derived rating field, then the filter and sort that
    // depend on it
    if let Some(min_rating) = min_rating {
        ranking::apply_min_rating(&mut products, min_rating);
    }
    if filter.sort == SortKey::Rating {
        ranking::sort_by_rating(&mut products);
    }

    HttpResponse::Ok().json(products)
}

pub async fn lookup_products(
    repo: web::Data<CatalogRepo>,
    req: web::Json<BatchLookupRequest>,
) -> impl Responder {
    // unparseable ids are dropped, not errors: the caller treats missing
    // products as removed
    let ids: Vec<Uuid> = req
        .ids
        .iter()
        .filter_map(|s| Uuid::parse_str(s).ok())
        .collect();
    if ids.is_empty() {
        return HttpResponse::Ok().json(Vec::<ProductView>::new());
    }

    let rows = match repo.products_by_ids(&ids).await {
        Ok(rows) => rows,
        Err(e) => {
            eprintln!("Batch lookup DB error: {:?}", e);
            return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
        }
    };

    match assemble_views(&repo, rows).await {
        Ok(views) => HttpResponse::Ok().json(views),
        Err(e) => {
            eprintln!("DB error assembling product views: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}

pub async fn list_categories(repo: web::Data<CatalogRepo>) -> impl Responder {
    match repo.list_categories().await {
        Ok(categories) => HttpResponse::Ok().json(categories),
        Err(e) => {
            eprintln!("DB error listing categories: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}

/// Stitch option lists, images and computed ratings onto the product rows,
/// preserving row order.
async fn assemble_views(
    repo: &CatalogRepo,
    rows: Vec<ProductRow>,
) -> Result<Vec<ProductView>, sqlx::Error> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

    let sizes = repo.sizes_for(&ids).await?;
    let colors = repo.colors_for(&ids).await?;
    let images = repo.images_for(&ids).await?;
    let rating_rows = repo.ratings_for(&ids).await?;
    let ratings = ranking::ratings_by_product(&rating_rows);

    let views = rows
        .into_iter()
        .map(|row| {
            let product_ratings = ratings.get(&row.id).map(Vec::as_slice).unwrap_or(&[]);
            ProductView {
                id: row.id,
                name: row.name,
                description: row.description,
                price: row.price,
                images: images
                    .iter()
                    .filter(|i| i.product_id == row.id)
                    .map(|i| i.url.clone())
                    .collect(),
                category: CategoryRef {
                    id: row.category_id,
                    name: row.category_name,
                },
                seller: SellerRef {
                    id: row.seller_id,
                    name: row.seller_name,
                },
                sizes: sizes
                    .iter()
                    .filter(|s| s.product_id == row.id)
                    .map(|s| SizeView { id: s.id, name: s.name.clone() })
                    .collect(),
                colors: colors
                    .iter()
                    .filter(|c| c.product_id == row.id)
                    .map(|c| ColorView {
                        id: c.id,
                        name: c.name.clone(),
                        color_code: c.color_code.clone(),
                    })
                    .collect(),
                average_rating: ranking::average_or_default(product_ratings),
                review_count: product_ratings.len() as i64,
                status: row.status,
            }
        })
        .collect();

    Ok(views)
}

// -- reviews ----------------------------------------------------------------

pub async fn get_reviews(repo: web::Data<CatalogRepo>, path: web::Path<Uuid>) -> impl Responder {
    let product_id = path.into_inner();

    match repo.product_exists(product_id).await {
        Ok(false) => return HttpResponse::NotFound().json(json!({"error": "Product not found"})),
        Ok(true) => {}
        Err(e) => {
            eprintln!("DB error checking product {}: {:?}", product_id, e);
            return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
        }
    }

    match repo.reviews_for_product(product_id).await {
        Ok(reviews) => HttpResponse::Ok().json(reviews),
        Err(e) => {
            eprintln!("DB error fetching reviews: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "DB error"}))
        }
    }
}

pub async fn create_review(
    repo: web::Data<CatalogRepo>,
    path: web::Path<Uuid>,
    req: web::Json<CreateReviewRequest>,
) -> impl Responder {
    let product_id = path.into_inner();
    let client_name = req.client_name.trim();

    if let Err(msg) = validate_review_fields(client_name, &req.body, req.rating) {
        return HttpResponse::BadRequest().json(json!({"error": msg}));
    }

    match repo.product_exists(product_id).await {
        Ok(false) => return HttpResponse::NotFound().json(json!({"error": "Product not found"})),
        Ok(true) => {}
        Err(e) => {
            eprintln!("DB error checking product {}: {:?}", product_id, e);
            return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
        }
    }

    // one review per (product, client name)
    match repo.find_review_by_author(product_id, client_name).await {
        Ok(Some(existing)) => {
            return HttpResponse::BadRequest().json(json!({
                "error": format!(
                    "You have already reviewed this product (review {}). Update it instead.",
                    existing.id
                )
            }));
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("DB error checking existing review: {:?}", e);
            return HttpResponse::InternalServerError().json(json!({"error": "DB error"}));
        }
    }

    match repo
        .create_review(product_id, client_name, req.body.trim(), req.rating)
        .await
    {
        Ok(review) => HttpResponse::Created().json(review),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
            HttpResponse::BadRequest()
                .json(json!({"error": "You have already reviewed this product"}))
        }
        Err(e) => {
            eprintln!("DB error creating review: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to create review"}))
        }
    }
}

pub async fn update_review(
    repo: web::Data<CatalogRepo>,
    path: web::Path<Uuid>,
    req: web::Json<UpdateReviewRequest>,
) -> impl Responder {
    let product_id = path.into_inner();

    if let Err(msg) = validate_review_body(&req.body, req.rating) {
        return HttpResponse::BadRequest().json(json!({"error": msg}));
    }

    match repo
        .update_review(req.review_id, product_id, req.body.trim(), req.rating)
        .await
    {
        Ok(review) => HttpResponse::Ok().json(review),
        Err(sqlx::Error::RowNotFound) => {
            HttpResponse::NotFound().json(json!({"error": "Review not found"}))
        }
        Err(e) => {
            eprintln!("DB error updating review: {:?}", e);
            HttpResponse::InternalServerError().json(json!({"error": "Failed to update review"}))
        }
    }
}

fn validate_review_fields(client_name: &str, body: &str, rating: i32) -> Result<(), String> {
    if client_name.is_empty() {
        return Err("Name is required".to_string());
    }
    validate_review_body(body, rating)
}

fn validate_review_body(body: &str, rating: i32) -> Result<(), String> {
    if body.trim().chars().count() < 10 {
        return Err("Review text must be at least 10 characters".to_string());
    }
    if !(1..=5).contains(&rating) {
        return Err("Rating must be between 1 and 5".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn review_needs_a_name() {
        assert!(validate_review_fields("", "long enough review text", 4).is_err());
        assert!(validate_review_fields("Anna", "long enough review text", 4).is_ok());
    }

    #[test]
    fn review_body_must_be_ten_chars() {
        assert!(validate_review_body("too short", 4).is_err());
        assert!(validate_review_body("this one is long enough", 4).is_ok());
    }

    #[test]
    fn rating_must_be_one_to_five() {
        assert!(validate_review_body("a perfectly fine review", 0).is_err());
        assert!(validate_review_body("a perfectly fine review", 6).is_err());
        for rating in 1..=5 {
            assert!(validate_review_body("a perfectly fine review", rating).is_ok());
        }
    }
}
