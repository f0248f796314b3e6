// orderflow/src/catalog/http.rs

use super::{CatalogClient, CatalogError, CatalogResult};
use crate::config::CatalogConfig;
use crate::model::{Message, Product, ProductId};
use async_trait::async_trait;
use reqwest::header::ACCEPT_LANGUAGE;
use serde::Serialize;
use tracing::{debug, instrument, warn};

#[derive(Serialize)]
struct BulkUpdateProducts<'a> {
  products: &'a [Product],
}

/// `CatalogClient` over the product service's HTTP API.
///
/// - lookup: `GET {base_url}{product_path}/ids?product_ids=1&product_ids=2`
/// - bulk update: `POST {base_url}{product_path}/bulk` with `{"products": [...]}`
#[derive(Clone)]
pub struct HttpCatalogClient {
  client: reqwest::Client,
  lookup_url: String,
  bulk_url: String,
}

impl HttpCatalogClient {
  pub fn new(config: &CatalogConfig) -> CatalogResult<Self> {
    let client = reqwest::Client::builder().timeout(config.request_timeout).build()?;
    Ok(Self::with_client(client, config))
  }

  pub fn with_client(client: reqwest::Client, config: &CatalogConfig) -> Self {
    let base = format!("{}{}", config.base_url.trim_end_matches('/'), config.product_path);
    Self {
      client,
      lookup_url: format!("{}/ids", base),
      bulk_url: format!("{}/bulk", base),
    }
  }

  pub fn lookup_url(&self) -> &str {
    &self.lookup_url
  }

  pub fn bulk_url(&self) -> &str {
    &self.bulk_url
  }

  async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> CatalogResult<T> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
      warn!(status = status.as_u16(), "catalog returned non-success status");
      return Err(CatalogError::Status {
        status: status.as_u16(),
        body,
      });
    }
    Ok(serde_json::from_str(&body)?)
  }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
  #[instrument(name = "catalog::lookup", skip(self), fields(count = ids.len()), err)]
  async fn lookup(&self, ids: &[ProductId], language: &str) -> CatalogResult<Vec<Product>> {
    let query: Vec<(&str, ProductId)> = ids.iter().map(|id| ("product_ids", *id)).collect();
    let response = self
      .client
      .get(&self.lookup_url)
      .header(ACCEPT_LANGUAGE, language)
      .query(&query)
      .send()
      .await?;
    let products: Vec<Product> = Self::decode(response).await?;
    debug!(returned = products.len(), "catalog lookup finished");
    Ok(products)
  }

  #[instrument(name = "catalog::bulk_update", skip(self, products), fields(count = products.len()), err)]
  async fn bulk_update(&self, products: &[Product], language: &str) -> CatalogResult<Message> {
    let response = self
      .client
      .post(&self.bulk_url)
      .header(ACCEPT_LANGUAGE, language)
      .json(&BulkUpdateProducts { products })
      .send()
      .await?;
    Self::decode(response).await
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::time::Duration;

  #[test]
  fn endpoints_are_built_from_config() {
    let config = CatalogConfig {
      base_url: "http://catalog.local:8080/".to_string(),
      product_path: "/api/v1/products".to_string(),
      request_timeout: Duration::from_secs(5),
    };
    let client = HttpCatalogClient::with_client(reqwest::Client::new(), &config);
    assert_eq!(client.lookup_url(), "http://catalog.local:8080/api/v1/products/ids");
    assert_eq!(client.bulk_url(), "http://catalog.local:8080/api/v1/products/bulk");
  }

  #[test]
  fn bulk_body_wraps_products() {
    let products = vec![Product {
      id: 3,
      price: 2.5,
      available_stock: 4,
      ..Default::default()
    }];
    let body = serde_json::to_value(BulkUpdateProducts { products: &products }).unwrap();
    assert_eq!(body["products"][0]["id"], 3);
    assert_eq!(body["products"][0]["available_stock"], 4);
  }
}
