use std::path::PathBuf;

use super::{CatalogLoader, LoadError};

/// Reads a catalog body from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileCatalogLoader {
    path: PathBuf,
}

impl FileCatalogLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogLoader for FileCatalogLoader {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch_body(&self) -> Result<String, LoadError> {
        tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Read {
                path: self.path.clone(),
                source,
            })
    }
}
