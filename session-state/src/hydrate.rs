// src/hydrate.rs
// Resolves the ids persisted in cookies back into full product records via
// the catalog's batch lookup endpoint.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizeOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorOption {
    pub id: String,
    pub name: String,
    pub color_code: String,
}

/// A product as served by the catalog's batch lookup. This is the only
/// trusted source for prices and availability; cookies never carry any of
/// these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteProduct {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub images: Vec<String>,
    pub category: CategoryRef,
    pub seller: SellerRef,
    #[serde(default)]
    pub sizes: Vec<SizeOption>,
    #[serde(default)]
    pub colors: Vec<ColorOption>,
    #[serde(default = "default_rating")]
    pub average_rating: f64,
    #[serde(default)]
    pub review_count: i64,
    pub status: String,
}

fn default_rating() -> f64 {
    5.0
}

impl RemoteProduct {
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }

    pub fn first_image(&self) -> String {
        self.images.first().cloned().unwrap_or_default()
    }
}

/// Batched product lookup against the catalog service.
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }

    /// One batched lookup. Ids are deduplicated; ids the catalog no longer
    /// knows are simply absent from the result. Errors propagate so callers
    /// can tell "catalog said no" from "network said nothing".
    pub async fn try_fetch_by_ids(
        &self,
        ids: &[String],
    ) -> Result<Vec<RemoteProduct>, reqwest::Error> {
        let mut seen = HashSet::new();
        let unique: Vec<&String> = ids.iter().filter(|id| seen.insert(id.as_str())).collect();
        if unique.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/products", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "ids": unique }))
            .send()
            .await?
            .error_for_status()?;
        resp.json::<Vec<RemoteProduct>>().await
    }

    /// Lookup for hydration: transport failures are logged and collapse to
    /// "no data" so a dead catalog never takes the UI down with it.
    pub async fn fetch_by_ids(&self, ids: &[String]) -> Vec<RemoteProduct> {
        match self.try_fetch_by_ids(ids).await {
            Ok(products) => products,
            Err(e) => {
                log::warn!("product hydration failed, rendering without data: {:?}", e);
                Vec::new()
            }
        }
    }
}
