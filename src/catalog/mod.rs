use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

mod adapt;
mod text;
mod tmdb;
mod tvmaze;

pub use adapt::normalize_records;
pub use tmdb::TmdbCatalog;
pub use tvmaze::TvMazeCatalog;

/// A remote show listing service. Implementations return raw records in the
/// source's own shape; callers run every successful payload through
/// [`normalize_records`] so the rest of the app sees one uniform record
/// shape regardless of which source answered.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short source name for logs.
    fn name(&self) -> &'static str;

    /// One page of the default popular listing; `page` is the zero-based
    /// upstream page index.
    async fn popular(&self, page: u32) -> Result<Vec<Value>>;

    /// Full-text title search.
    async fn search(&self, term: &str) -> Result<Vec<Value>>;
}
