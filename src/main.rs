use anyhow::Result;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cineshelf::app::App;
use cineshelf::config::Config;
use cineshelf::ui::TracingUi;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn check_env() -> Result<()> {
    let required = ["CATALOG_API_KEY"];
    for key in required {
        if env::var(key).is_err() {
            anyhow::bail!("Missing required environment variable: {}", key);
        }
    }
    info!("All required environment variables are set");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    match dotenv() {
        Ok(path) => info!("Loaded environment from {:?}", path),
        Err(e) => warn!("No .env file loaded ({}) - relying on environment", e),
    }
    init_tracing();
    check_env()?;

    let config = Config::from_env()?;
    let app = App::from_config(&config, Arc::new(TracingUi))?;

    if app.check_session().await {
        let favorites = app.favorites.entries().await;
        info!("Favorites in collection: {}", favorites.len());
    } else {
        info!("No active session - browsing anonymously");
    }

    app.browser.go_to_page(1).await?;
    let visible = app.browser.visible().await;
    info!(
        "Loaded catalog page {} of {} ({} shows)",
        app.browser.page().await,
        cineshelf::browser::HOME_TOTAL_PAGES,
        visible.len()
    );
    for show in visible.iter().take(5) {
        info!(
            "  {} ({}) rating {}",
            show.title,
            show.release_info.as_deref().unwrap_or("unknown"),
            show.rating
        );
    }
    Ok(())
}
