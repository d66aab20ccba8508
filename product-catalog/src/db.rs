use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{
    Category, ColorRow, ImageRow, ProductRow, Review, ReviewRatingRow, SearchFilter, SizeRow,
    SortKey,
};

#[derive(Clone)]
pub struct CatalogRepo {
    pool: PgPool,
}

impl CatalogRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_categories(&self) -> Result<Vec<Category>, sqlx::Error> {
        sqlx::query_as::<_, Category>(
            r#"
            SELECT id, name, parent_id
            FROM categories
            ORDER BY name
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }

    /// A category id plus the ids of its direct subcategories.
    pub async fn category_with_children(&self, id: Uuid) -> Result<Vec<Uuid>, sqlx::Error> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT id
            FROM categories
            WHERE id = $1 OR parent_id = $1
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    /// Database stage of the search pipeline. Only ACTIVE products; every
    /// sort key except rating is handled here, rating falls back to
    /// newest-first and is re-sorted by the caller.
    pub async fn search_products(&self, filter: &SearchFilter) -> Result<Vec<ProductRow>, sqlx::Error> {
        let order_by = match filter.sort {
            SortKey::Oldest => "p.created_at ASC",
            SortKey::PriceLow => "p.price ASC",
            SortKey::PriceHigh => "p.price DESC",
            SortKey::Newest | SortKey::Rating => "p.created_at DESC",
        };

        let sql = format!(
            r#"
            SELECT p.id, p.name, p.description, p.price,
                   p.category_id, c.name AS category_name,
                   p.seller_id, s.name AS seller_name,
                   p.status, p.created_at, p.updated_at
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN sellers s ON s.id = p.seller_id
            WHERE p.status = 'ACTIVE'
              AND ($1::uuid[] IS NULL OR p.category_id = ANY($1))
              AND ($2::double precision IS NULL OR p.price >= $2)
              AND ($3::double precision IS NULL OR p.price <= $3)
              AND ($4::text IS NULL
                   OR p.name ILIKE '%' || $4 || '%'
                   OR p.description ILIKE '%' || $4 || '%')
              AND ($5::text IS NULL OR s.name ILIKE '%' || $5 || '%')
            ORDER BY {order_by}
            LIMIT $6
            "#
        );

        sqlx::query_as::<_, ProductRow>(&sql)
            .bind(filter.category_ids.as_deref())
            .bind(filter.min_price)
            .bind(filter.max_price)
            .bind(filter.search.as_deref())
            .bind(filter.seller.as_deref())
            .bind(filter.limit)
            .fetch_all(&self.pool)
            .await
    }

    /// Batch lookup for cart/favorites hydration. ACTIVE only, unordered.
    pub async fn products_by_ids(&self, ids: &[Uuid]) -> Result<Vec<ProductRow>, sqlx::Error> {
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT p.id, p.name, p.description, p.price,
                   p.category_id, c.name AS category_name,
                   p.seller_id, s.name AS seller_name,
                   p.status, p.created_at, p.updated_at
            FROM products p
            JOIN categories c ON c.id = p.category_id
            JOIN sellers s ON s.id = p.seller_id
            WHERE p.status = 'ACTIVE' AND p.id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn sizes_for(&self, product_ids: &[Uuid]) -> Result<Vec<SizeRow>, sqlx::Error> {
        sqlx::query_as::<_, SizeRow>(
            r#"
            SELECT id, product_id, name
            FROM product_sizes
            WHERE product_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn colors_for(&self, product_ids: &[Uuid]) -> Result<Vec<ColorRow>, sqlx::Error> {
        sqlx::query_as::<_, ColorRow>(
            r#"
            SELECT id, product_id, name, color_code
            FROM product_colors
            WHERE product_id = ANY($1)
            ORDER BY name
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn images_for(&self, product_ids: &[Uuid]) -> Result<Vec<ImageRow>, sqlx::Error> {
        sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT product_id, url
            FROM product_images
            WHERE product_id = ANY($1)
            ORDER BY position
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
    }

    /// Raw review ratings for a set of products; the averages are computed
    /// in application code.
    pub async fn ratings_for(&self, product_ids: &[Uuid]) -> Result<Vec<ReviewRatingRow>, sqlx::Error> {
        sqlx::query_as::<_, ReviewRatingRow>(
            r#"
            SELECT product_id, rating
            FROM reviews
            WHERE product_id = ANY($1)
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn product_exists(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let row: (bool,) = sqlx::query_as(
            r#"SELECT EXISTS (SELECT 1 FROM products WHERE id = $1)"#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.0)
    }

    pub async fn reviews_for_product(&self, product_id: Uuid) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, product_id, client_name, body, rating, created_at, updated_at
            FROM reviews
            WHERE product_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await
    }

    pub async fn find_review_by_author(
        &self,
        product_id: Uuid,
        client_name: &str,
    ) -> Result<Option<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, product_id, client_name, body, rating, created_at, updated_at
            FROM reviews
            WHERE product_id = $1 AND client_name = $2
            "#,
        )
        .bind(product_id)
        .bind(client_name)
        .fetch_optional(&self.pool)
        .await
    }

    pub async fn create_review(
        &self,
        product_id: Uuid,
        client_name: &str,
        body: &str,
        rating: i32,
    ) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, product_id, client_name, body, rating)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, product_id, client_name, body, rating, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(client_name)
        .bind(body)
        .bind(rating)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn update_review(
        &self,
        review_id: Uuid,
        product_id: Uuid,
        body: &str,
        rating: i32,
    ) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET body = $1, rating = $2, updated_at = NOW()
            WHERE id = $3 AND product_id = $4
            RETURNING id, product_id, client_name, body, rating, created_at, updated_at
            "#,
        )
        .bind(body)
        .bind(rating)
        .bind(review_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
    }
}
