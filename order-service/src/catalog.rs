// src/catalog.rs
// Product availability and price lookups against the catalog service. The
// order flow never trusts client-sent prices; this is where the real ones
// come from.

use serde::Deserialize;
use std::env;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct OptionRef {
    pub id: Uuid,
    pub name: String,
}

/// The slice of the catalog's product view the order flow needs.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogProduct {
    pub id: Uuid,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub sizes: Vec<OptionRef>,
    #[serde(default)]
    pub colors: Vec<OptionRef>,
}

#[derive(Clone)]
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

    pub fn from_env() -> Self {
        let base_url =
            env::var("CATALOG_SERVICE_URL").unwrap_or_else(|_| "http://localhost:3001".into());
        Self::new(base_url)
    }

    /// Batch lookup of currently ACTIVE products. Ids the catalog does not
    /// return are unavailable; the caller decides what that means.
    pub async fn fetch_active(&self, ids: &[Uuid]) -> Result<Vec<CatalogProduct>, reqwest::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/products", self.base_url);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({ "ids": ids }))
            .send()
            .await?
            .error_for_status()?;
        resp.json::<Vec<CatalogProduct>>().await
    }
}
