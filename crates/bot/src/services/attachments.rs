//! Stock file download.

use anyhow::{Result, bail};
use async_trait::async_trait;
use reqwest::Client;

/// Fetches the text body of an uploaded attachment.
#[async_trait]
pub trait StockFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

pub struct HttpStockFetcher {
    http: Client,
}

impl HttpStockFetcher {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }
}

impl Default for HttpStockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StockFetcher for HttpStockFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            bail!(
                "attachment download failed: {}",
                status.canonical_reason().unwrap_or("request failed")
            );
        }

        Ok(response.text().await?)
    }
}
