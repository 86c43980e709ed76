use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::catalog::CatalogSource;

const TVMAZE_BASE: &str = "https://api.tvmaze.com";

/// Secondary catalog source, used when the primary fails. Unauthenticated;
/// index pages are natively zero-based and search results arrive wrapped as
/// `{ score, show: { .. } }`.
#[derive(Debug, Clone, Default)]
pub struct TvMazeCatalog {
    client: Client,
}

impl TvMazeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_records(&self, url: &str) -> Result<Vec<Value>> {
        let res = self.client.get(url).send().await.context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        let parsed: Value = serde_json::from_str(&text).context("JSON parse failed")?;
        parsed
            .as_array()
            .cloned()
            .ok_or_else(|| anyhow!("expected a top-level array"))
    }
}

#[async_trait]
impl CatalogSource for TvMazeCatalog {
    fn name(&self) -> &'static str {
        "tvmaze"
    }

    async fn popular(&self, page: u32) -> Result<Vec<Value>> {
        let url = format!("{TVMAZE_BASE}/shows?page={page}");
        self.get_records(&url).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{TVMAZE_BASE}/search/shows?q={}",
            urlencoding::encode(term)
        );
        self.get_records(&url).await
    }
}
