use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::backend::FavoritesApi;
use crate::models::{FavoriteEntry, NewFavorite, Show};
use crate::session::SessionController;
use crate::ui::Ui;

/// Create/annotate/delete over the favorites collection. Every mutation is
/// gated on an authenticated session and ends with a mandatory full re-read
/// of the collection; the cache is only trusted after a confirmed re-fetch,
/// never patched locally.
#[derive(Clone)]
pub struct FavoritesManager {
    backend: Arc<dyn FavoritesApi>,
    session: SessionController,
    ui: Arc<dyn Ui>,
    entries: Arc<Mutex<Vec<FavoriteEntry>>>,
}

impl FavoritesManager {
    pub fn new(
        backend: Arc<dyn FavoritesApi>,
        session: SessionController,
        ui: Arc<dyn Ui>,
    ) -> Self {
        Self {
            backend,
            session,
            ui,
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// The cached collection as of the last confirmed re-read.
    pub async fn entries(&self) -> Vec<FavoriteEntry> {
        self.entries.lock().await.clone()
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    async fn require_session(&self) -> bool {
        if self.session.is_authenticated().await {
            return true;
        }
        self.ui.alert("Log in to manage your collection.").await;
        false
    }

    /// Replace the cache with the backend's current collection. On failure
    /// the previous list stays visible; the miss is only logged.
    pub async fn refresh(&self) {
        match self.backend.list_favorites().await {
            Ok(list) => *self.entries.lock().await = list,
            Err(e) => warn!("Favorites refresh failed, keeping previous list: {}", e),
        }
    }

    /// Save a snapshot of a catalog item. Conflicts (already saved) surface
    /// the same generic message as any other failure.
    pub async fn add_favorite(&self, show: &Show) {
        if !self.require_session().await {
            return;
        }
        match self
            .backend
            .create_favorite(&NewFavorite::from_show(show))
            .await
        {
            Ok(()) => {
                info!("Saved '{}' to the collection", show.title);
                self.ui.alert("Saved to your collection.").await;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Could not save '{}': {}", show.title, e);
                self.ui.alert("Could not save to your collection.").await;
            }
        }
    }

    /// Prompt for replacement note text, seeded with the current note when
    /// the entry has a real one. Cancelling is a no-op; submitting an empty
    /// string clears the note.
    pub async fn update_note(&self, entry_id: i64) {
        if !self.require_session().await {
            return;
        }
        let entry = {
            let entries = self.entries.lock().await;
            entries.iter().find(|e| e.id == entry_id).cloned()
        };
        let Some(entry) = entry else {
            self.ui
                .alert("That entry is no longer in your collection.")
                .await;
            return;
        };
        let (label, seed) = if entry.has_note() {
            ("Edit your note:", entry.notes.clone().unwrap_or_default())
        } else {
            ("Add a note:", String::new())
        };
        let Some(submitted) = self.ui.prompt(label, &seed).await else {
            return;
        };
        match self.backend.update_note(entry_id, submitted.trim()).await {
            Ok(()) => {
                info!("Updated note on '{}'", entry.title);
                self.ui.alert("Note updated.").await;
                self.refresh().await;
            }
            Err(e) => {
                warn!("Could not update note on '{}': {}", entry.title, e);
                self.ui.alert("Could not update the note.").await;
            }
        }
    }

    /// Remove an entry after confirmation. The entry is never removed
    /// locally ahead of the backend's answer.
    pub async fn delete_favorite(&self, entry_id: i64) {
        if !self.require_session().await {
            return;
        }
        if !self.ui.confirm("Remove from your collection?").await {
            return;
        }
        match self.backend.delete_favorite(entry_id).await {
            Ok(()) => {
                info!("Removed entry {}", entry_id);
                self.refresh().await;
            }
            Err(e) => {
                warn!("Could not remove entry {}: {}", entry_id, e);
                self.ui.alert("Could not remove the entry.").await;
            }
        }
    }
}
