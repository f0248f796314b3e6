// orderflow/src/config.rs

use dotenvy::dotenv;
use std::env;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("Missing environment variable '{name}': {source}")]
  Missing {
    name: &'static str,
    #[source]
    source: env::VarError,
  },

  #[error("Invalid value for '{name}': {message}")]
  Invalid { name: &'static str, message: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Location of the product service.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
  pub base_url: String,
  pub product_path: String,
  pub request_timeout: Duration,
}

impl CatalogConfig {
  /// Reads `PRODUCT_SERVICE_URL` (required), `PRODUCT_SERVICE_PATH` and
  /// `PRODUCT_SERVICE_TIMEOUT_SECS`, after loading `.env` if one is present.
  pub fn from_env() -> ConfigResult<Self> {
    dotenv().ok();

    let get_env = |name: &'static str| env::var(name).map_err(|source| ConfigError::Missing { name, source });

    let base_url = get_env("PRODUCT_SERVICE_URL")?;
    let product_path = get_env("PRODUCT_SERVICE_PATH").unwrap_or_else(|_| "/products".to_string());
    let timeout_secs = get_env("PRODUCT_SERVICE_TIMEOUT_SECS")
      .unwrap_or_else(|_| "10".to_string())
      .parse::<u64>()
      .map_err(|e| ConfigError::Invalid {
        name: "PRODUCT_SERVICE_TIMEOUT_SECS",
        message: e.to_string(),
      })?;

    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
      return Err(ConfigError::Invalid {
        name: "PRODUCT_SERVICE_URL",
        message: format!("expected an http(s) URL, got '{}'", base_url),
      });
    }

    tracing::info!(%base_url, %product_path, timeout_secs, "Catalog configuration loaded.");
    Ok(Self {
      base_url,
      product_path,
      request_timeout: Duration::from_secs(timeout_secs),
    })
  }
}

/// Tuning knobs of the order workflow itself.
#[derive(Debug, Clone, Copy)]
pub struct WorkflowConfig {
  /// Enrichment worker count.
  pub workers: usize,
  /// Batch size handed to the order-line bulk upsert.
  pub bulk_batch_size: usize,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    Self {
      workers: crate::enrichment::default_worker_count(),
      bulk_batch_size: 100,
    }
  }
}

impl WorkflowConfig {
  /// Defaults, overridden by `ORDER_ENRICHMENT_WORKERS` / `ORDER_BULK_BATCH_SIZE`.
  pub fn from_env() -> ConfigResult<Self> {
    dotenv().ok();
    let mut config = Self::default();
    if let Ok(raw) = env::var("ORDER_ENRICHMENT_WORKERS") {
      config.workers = parse_positive("ORDER_ENRICHMENT_WORKERS", &raw)?;
    }
    if let Ok(raw) = env::var("ORDER_BULK_BATCH_SIZE") {
      config.bulk_batch_size = parse_positive("ORDER_BULK_BATCH_SIZE", &raw)?;
    }
    Ok(config)
  }
}

fn parse_positive(name: &'static str, raw: &str) -> ConfigResult<usize> {
  match raw.parse::<usize>() {
    Ok(0) => Err(ConfigError::Invalid {
      name,
      message: "must be greater than zero".to_string(),
    }),
    Ok(value) => Ok(value),
    Err(e) => Err(ConfigError::Invalid {
      name,
      message: e.to_string(),
    }),
  }
}
