use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_BACKEND_BASE: &str = "http://localhost:8000";

/// Deployment-time constants: where the favorites backend lives and the key
/// for the primary catalog source. Both come from the environment (or a
/// `.env` file loaded by the binary).
#[derive(Debug, Clone)]
pub struct Config {
    pub backend_base_url: String,
    pub catalog_api_key: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let catalog_api_key = env::var("CATALOG_API_KEY").context("CATALOG_API_KEY not set")?;
        let backend_base_url =
            env::var("BACKEND_BASE_URL").unwrap_or_else(|_| DEFAULT_BACKEND_BASE.to_string());
        Ok(Self {
            backend_base_url,
            catalog_api_key,
        })
    }
}
