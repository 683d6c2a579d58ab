//! Catalog loading.
//!
//! A catalog is a JSON object with one field holding an array of products:
//!
//! ```json
//! { "products": [ { "id": 1, "title": "...", "description": "...", "price": 9.99, "thumbnail": "..." } ] }
//! ```
//!
//! [`CatalogLoader`] implementations only fetch the raw body; parsing and
//! validation are shared in [`parse_catalog`].

pub mod file;
pub mod http;

use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::model::types::Product;

pub use file::FileCatalogLoader;
pub use http::HttpCatalogLoader;

pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com/products";
pub const DEFAULT_PRODUCTS_FIELD: &str = "products";

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no `{0}` array")]
    MissingField(String),

    #[error("invalid catalog: {0}")]
    Invalid(String),

    #[error("failed to build search index: {0}")]
    Index(#[from] crate::search::index::SearchError),
}

/// Source of a raw catalog body.
pub trait CatalogLoader {
    /// Human-readable location, used in logs.
    fn describe(&self) -> String;

    /// Fetch the raw catalog body. Called once per session.
    fn fetch_body(&self) -> impl Future<Output = Result<String, LoadError>> + Send;
}

/// Loader picked from a configured location string.
#[derive(Debug, Clone)]
pub enum CatalogSource {
    Http(HttpCatalogLoader),
    File(FileCatalogLoader),
}

impl CatalogSource {
    /// `http://` and `https://` locations go over the network; `file://`
    /// locations and bare paths are read from disk.
    pub fn from_location(location: &str, timeout: Option<Duration>) -> Result<Self, LoadError> {
        if location.starts_with("http://") || location.starts_with("https://") {
            Ok(Self::Http(HttpCatalogLoader::new(location, timeout)?))
        } else if let Some(path) = location.strip_prefix("file://") {
            Ok(Self::File(FileCatalogLoader::new(path)))
        } else {
            Ok(Self::File(FileCatalogLoader::new(location)))
        }
    }
}

impl CatalogLoader for CatalogSource {
    fn describe(&self) -> String {
        match self {
            Self::Http(loader) => loader.describe(),
            Self::File(loader) => loader.describe(),
        }
    }

    async fn fetch_body(&self) -> Result<String, LoadError> {
        match self {
            Self::Http(loader) => loader.fetch_body().await,
            Self::File(loader) => loader.fetch_body().await,
        }
    }
}

/// Fetch and parse a catalog.
#[tracing::instrument(skip_all, fields(source = %loader.describe()))]
pub async fn load_products<L: CatalogLoader>(
    loader: &L,
    products_field: &str,
) -> Result<Vec<Product>, LoadError> {
    let body = loader.fetch_body().await?;
    tracing::debug!(bytes = body.len(), "catalog body received");
    let products = parse_catalog(&body, products_field)?;
    tracing::info!(products = products.len(), "catalog loaded");
    Ok(products)
}

/// Parse a catalog body and validate the product invariants.
pub fn parse_catalog(body: &str, products_field: &str) -> Result<Vec<Product>, LoadError> {
    let mut root: serde_json::Value = serde_json::from_str(body)?;
    let raw = root
        .get_mut(products_field)
        .filter(|v| v.is_array())
        .map(serde_json::Value::take)
        .ok_or_else(|| LoadError::MissingField(products_field.to_string()))?;
    let products: Vec<Product> = serde_json::from_value(raw)?;
    validate_products(&products)?;
    Ok(products)
}

fn validate_products(products: &[Product]) -> Result<(), LoadError> {
    let mut seen = HashSet::with_capacity(products.len());
    for product in products {
        if !product.price.is_finite() || product.price < 0.0 {
            return Err(LoadError::Invalid(format!(
                "product {} has price {}",
                product.id, product.price
            )));
        }
        if !seen.insert(&product.id) {
            return Err(LoadError::Invalid(format!(
                "duplicate product id {}",
                product.id
            )));
        }
    }
    Ok(())
}
