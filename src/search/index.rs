//! The narrow contract between the filter engine and a full-text index.

use thiserror::Error;

use crate::model::types::ProductId;

#[derive(Error, Debug)]
pub enum SearchError {
    #[error("search backend error: {0}")]
    Backend(#[from] tantivy::TantivyError),

    #[error("schema missing field {0}")]
    Schema(String),
}

/// A full-text index over the catalog, keyed by product id.
pub trait SearchIndex {
    /// Ids of the documents matching `text`, best match first.
    ///
    /// Each query term also matches indexed terms it is a prefix of. Order
    /// among equally scored documents is unspecified.
    fn search(&self, text: &str) -> Result<Vec<ProductId>, SearchError>;
}
