use std::time::Duration;

use super::{CatalogLoader, LoadError};

/// Issues a single GET against the catalog endpoint.
///
/// No retries and no auth headers. A timeout is only applied when one is
/// configured.
#[derive(Debug, Clone)]
pub struct HttpCatalogLoader {
    client: reqwest::Client,
    url: String,
}

impl HttpCatalogLoader {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LoadError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("product-finder/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl CatalogLoader for HttpCatalogLoader {
    fn describe(&self) -> String {
        self.url.clone()
    }

    async fn fetch_body(&self) -> Result<String, LoadError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        Ok(response.text().await?)
    }
}
