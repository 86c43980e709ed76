use anyhow::Result;
use std::sync::Arc;

use crate::backend::{BackendClient, FavoritesApi};
use crate::browser::CatalogBrowser;
use crate::catalog::{CatalogSource, TmdbCatalog, TvMazeCatalog};
use crate::config::Config;
use crate::favorites::FavoritesManager;
use crate::models::{Credentials, User};
use crate::session::{AuthError, SessionController};
use crate::ui::Ui;

/// Wires the controllers to one backend, one source chain, and one front
/// end. All client state lives behind these handles; nothing is ambient.
#[derive(Clone)]
pub struct App {
    pub session: SessionController,
    pub browser: CatalogBrowser,
    pub favorites: FavoritesManager,
}

impl App {
    pub fn new(
        backend: Arc<dyn FavoritesApi>,
        primary: Arc<dyn CatalogSource>,
        secondary: Arc<dyn CatalogSource>,
        ui: Arc<dyn Ui>,
    ) -> Self {
        let session = SessionController::new(backend.clone());
        let browser = CatalogBrowser::new(primary, secondary);
        let favorites = FavoritesManager::new(backend, session.clone(), ui);
        Self {
            session,
            browser,
            favorites,
        }
    }

    pub fn from_config(config: &Config, ui: Arc<dyn Ui>) -> Result<Self> {
        let backend: Arc<dyn FavoritesApi> = Arc::new(BackendClient::new(&config.backend_base_url)?);
        let primary: Arc<dyn CatalogSource> =
            Arc::new(TmdbCatalog::new(config.catalog_api_key.clone()));
        let secondary: Arc<dyn CatalogSource> = Arc::new(TvMazeCatalog::new());
        Ok(Self::new(backend, primary, secondary, ui))
    }

    /// Probe for a live session. A confirmed identity pulls the favorites
    /// list; the probe completes before that fetch starts.
    pub async fn check_session(&self) -> bool {
        if self.session.check_session().await.is_some() {
            self.favorites.refresh().await;
            return true;
        }
        false
    }

    pub async fn register(&self, credentials: &Credentials) -> Result<(), AuthError> {
        self.session.register(credentials).await
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        let user = self.session.login(credentials).await?;
        self.favorites.refresh().await;
        Ok(user)
    }

    pub async fn logout(&self) {
        self.session.logout().await;
        self.favorites.clear().await;
    }
}
