use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

use crate::models::Product;

use super::{request_id, InferenceClient};

#[derive(Debug, Deserialize)]
struct ProductIndexResponse {
    index: u64,
}

impl InferenceClient {
    /// Highest-rated catalog entries, used to seed the browse view.
    pub async fn top_rated(&self, limit: u32) -> Result<Vec<Product>> {
        let rid = request_id();
        let url = format!("{}/top_rated", self.catalog_base);
        info!("[{rid}] GET {url} (limit: {limit})");

        let response = self
            .http
            .get(&url)
            .query(&[("limit", limit)])
            .send()
            .await
            .context("Failed to reach catalog service")?;

        if !response.status().is_success() {
            bail!("catalog service returned {}", response.status());
        }

        let products: Vec<Product> = response
            .json()
            .await
            .context("Failed to parse product list")?;

        info!("[{rid}] received {} products", products.len());
        Ok(products)
    }

    /// Resolves a product name to its row index in the catalog the
    /// recommender was fitted on. The index is only meaningful as input to
    /// [`InferenceClient::recommend`].
    pub async fn product_index(&self, name: &str) -> Result<u64> {
        let rid = request_id();
        let url = format!("{}/product_index", self.catalog_base);
        info!("[{rid}] GET {url} (name: {name:?})");

        let response = self
            .http
            .get(&url)
            .query(&[("name", name)])
            .send()
            .await
            .context("Failed to reach catalog service")?;

        if !response.status().is_success() {
            bail!("catalog service returned {}", response.status());
        }

        let body: ProductIndexResponse = response
            .json()
            .await
            .context("Failed to parse product index response")?;

        info!("[{rid}] resolved to index {}", body.index);
        Ok(body.index)
    }

    /// Nearest neighbors of the catalog entry at `index`, best match first.
    pub async fn recommend(&self, index: u64, k: u32) -> Result<Vec<Product>> {
        let rid = request_id();
        let url = format!("{}/recommend", self.catalog_base);
        info!("[{rid}] GET {url} (index: {index}, k: {k})");

        let response = self
            .http
            .get(&url)
            .query(&[("index", index)])
            .query(&[("k", k)])
            .send()
            .await
            .context("Failed to reach catalog service")?;

        if !response.status().is_success() {
            bail!("catalog service returned {}", response.status());
        }

        let products: Vec<Product> = response
            .json()
            .await
            .context("Failed to parse recommendations")?;

        info!("[{rid}] received {} recommendations", products.len());
        Ok(products)
    }
}
