use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::catalog::CatalogSource;

const TMDB_BASE: &str = "https://api.themoviedb.org/3";

/// Primary catalog source: API-key-authenticated, paginated popular listing
/// plus title search. Records come back under a `results` array.
#[derive(Debug, Clone)]
pub struct TmdbCatalog {
    client: Client,
    api_key: String,
}

impl TmdbCatalog {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
        }
    }

    async fn get_results(&self, url: &str) -> Result<Vec<Value>> {
        let res = self.client.get(url).send().await.context("request failed")?;
        let status = res.status();
        let text = res.text().await.context("reading body failed")?;
        if !status.is_success() {
            return Err(anyhow!("{} -> {}", url, text));
        }
        let parsed: Value = serde_json::from_str(&text).context("JSON parse failed")?;
        parsed
            .get("results")
            .and_then(Value::as_array)
            .cloned()
            .ok_or_else(|| anyhow!("response has no results array"))
    }
}

#[async_trait]
impl CatalogSource for TmdbCatalog {
    fn name(&self) -> &'static str {
        "tmdb"
    }

    async fn popular(&self, page: u32) -> Result<Vec<Value>> {
        // Upstream pages are one-based; callers hand us zero-based indexes.
        let url = format!(
            "{TMDB_BASE}/movie/popular?api_key={}&page={}",
            self.api_key,
            page + 1
        );
        self.get_results(&url).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Value>> {
        let url = format!(
            "{TMDB_BASE}/search/movie?api_key={}&query={}",
            self.api_key,
            urlencoding::encode(term)
        );
        self.get_results(&url).await
    }
}
