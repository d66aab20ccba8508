// src/ranking.rs
// Application stage of the search pipeline: the rating average is derived
// from review rows after retrieval, so the min-rating filter and the
// rating sort cannot live in the SQL stage.

use std::cmp::Ordering;
use std::collections::HashMap;

use uuid::Uuid;

use crate::models::{ProductView, ReviewRatingRow};

/// Displayed average for a product with no reviews yet.
pub const DEFAULT_RATING: f64 = 5.0;

/// Mean of the given ratings, or [`DEFAULT_RATING`] when there are none.
pub fn average_or_default(ratings: &[i32]) -> f64 {
    if ratings.is_empty() {
        return DEFAULT_RATING;
    }
    ratings.iter().map(|r| f64::from(*r)).sum::<f64>() / ratings.len() as f64
}

/// Group review ratings by product.
pub fn ratings_by_product(rows: &[ReviewRatingRow]) -> HashMap<Uuid, Vec<i32>> {
    let mut grouped: HashMap<Uuid, Vec<i32>> = HashMap::new();
    for row in rows {
        grouped.entry(row.product_id).or_default().push(row.rating);
    }
    grouped
}

/// Keep products whose displayed average meets the threshold.
pub fn apply_min_rating(products: &mut Vec<ProductView>, min_rating: f64) {
    products.retain(|p| p.average_rating >= min_rating);
}

/// Rating sort: reviewed products first, best average first; products
/// without reviews trail in their original relative order. Ties keep their
/// original order too (the sort is stable).
pub fn sort_by_rating(products: &mut [ProductView]) {
    products.sort_by(|a, b| match (a.review_count > 0, b.review_count > 0) {
        (true, true) => b
            .average_rating
            .partial_cmp(&a.average_rating)
            .unwrap_or(Ordering::Equal),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CategoryRef, ProductStatus, SellerRef};

    fn view(name: &str, average_rating: f64, review_count: i64) -> ProductView {
        ProductView {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            price: 10.0,
            images: vec![],
            category: CategoryRef {
                id: Uuid::new_v4(),
                name: "Dresses".to_string(),
            },
            seller: SellerRef {
                id: Uuid::new_v4(),
                name: "Atelier".to_string(),
            },
            sizes: vec![],
            colors: vec![],
            average_rating,
            review_count,
            status: ProductStatus::Active,
        }
    }

    #[test]
    fn no_reviews_defaults_to_five() {
        assert_eq!(average_or_default(&[]), 5.0);
    }

    #[test]
    fn average_is_the_plain_mean() {
        assert_eq!(average_or_default(&[4, 5]), 4.5);
        assert_eq!(average_or_default(&[1, 2, 3]), 2.0);
    }

    #[test]
    fn ratings_group_by_product() {
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        let rows = vec![
            ReviewRatingRow { product_id: p1, rating: 4 },
            ReviewRatingRow { product_id: p2, rating: 2 },
            ReviewRatingRow { product_id: p1, rating: 5 },
        ];

        let grouped = ratings_by_product(&rows);
        assert_eq!(grouped[&p1], vec![4, 5]);
        assert_eq!(grouped[&p2], vec![2]);
    }

    #[test]
    fn min_rating_filters_on_displayed_average() {
        let mut products = vec![
            view("low", 3.0, 4),
            view("fresh", DEFAULT_RATING, 0),
            view("high", 4.5, 2),
        ];
        apply_min_rating(&mut products, 4.0);

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        // a product with no reviews passes any threshold up to the default
        assert_eq!(names, ["fresh", "high"]);
    }

    #[test]
    fn reviewed_products_sort_first_by_average() {
        let mut products = vec![
            view("fresh-a", DEFAULT_RATING, 0),
            view("mid", 3.5, 2),
            view("fresh-b", DEFAULT_RATING, 0),
            view("top", 4.8, 12),
        ];
        sort_by_rating(&mut products);

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["top", "mid", "fresh-a", "fresh-b"]);
    }

    #[test]
    fn equal_averages_keep_their_original_order() {
        let mut products = vec![
            view("first", 4.0, 1),
            view("second", 4.0, 3),
            view("third", 4.0, 2),
        ];
        sort_by_rating(&mut products);

        let names: Vec<&str> = products.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["first", "second", "third"]);
    }
}
