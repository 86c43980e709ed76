use async_trait::async_trait;
use cineshelf::backend::{BackendError, FavoritesApi};
use cineshelf::favorites::FavoritesManager;
use cineshelf::models::{
    Credentials, FavoriteEntry, NewFavorite, Show, User, NO_NOTES_PLACEHOLDER,
};
use cineshelf::session::SessionController;
use cineshelf::ui::Ui;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

fn test_user() -> User {
    User {
        id: 1,
        name: "Tester".to_string(),
        email: "tester@example.com".to_string(),
    }
}

fn inception() -> Show {
    Show {
        id: 42,
        title: "Inception".to_string(),
        poster_url: Some("https://image.tmdb.org/t/p/w500/inception.jpg".to_string()),
        summary: None,
        genres: vec!["Science Fiction".to_string()],
        rating: 8.8,
        release_info: Some("2010-07-16".to_string()),
    }
}

#[derive(Default)]
struct FakeBackend {
    logged_in: AtomicBool,
    favorites: Mutex<Vec<FavoriteEntry>>,
    next_id: AtomicI64,
    fail_list: AtomicBool,
    events: Mutex<Vec<String>>,
}

impl FakeBackend {
    fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn stored(&self) -> Vec<FavoriteEntry> {
        self.favorites.lock().unwrap().clone()
    }
}

#[async_trait]
impl FavoritesApi for FakeBackend {
    async fn prime_csrf(&self) -> Result<(), BackendError> {
        self.record("csrf");
        Ok(())
    }

    async fn current_user(&self) -> Result<User, BackendError> {
        self.record("current_user");
        if self.logged_in.load(Ordering::SeqCst) {
            Ok(test_user())
        } else {
            Err(BackendError::Auth)
        }
    }

    async fn register(&self, _credentials: &Credentials) -> Result<(), BackendError> {
        self.record("register");
        Ok(())
    }

    async fn login(&self, _credentials: &Credentials) -> Result<(), BackendError> {
        self.record("login");
        self.logged_in.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn logout(&self) -> Result<(), BackendError> {
        self.record("logout");
        self.logged_in.store(false, Ordering::SeqCst);
        Ok(())
    }

    async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>, BackendError> {
        self.record("list");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(BackendError::Auth);
        }
        Ok(self.stored())
    }

    async fn create_favorite(&self, favorite: &NewFavorite) -> Result<(), BackendError> {
        self.record("create");
        let mut favorites = self.favorites.lock().unwrap();
        if favorites.iter().any(|f| f.source_id == favorite.tmdb_id) {
            return Err(BackendError::Conflict);
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        favorites.push(FavoriteEntry {
            id,
            source_id: favorite.tmdb_id,
            title: favorite.title.clone(),
            poster_url: favorite.poster_path.clone(),
            notes: None,
        });
        Ok(())
    }

    async fn update_note(&self, id: i64, notes: &str) -> Result<(), BackendError> {
        self.record("update");
        let mut favorites = self.favorites.lock().unwrap();
        match favorites.iter_mut().find(|f| f.id == id) {
            Some(entry) => {
                entry.notes = Some(notes.to_string());
                Ok(())
            }
            None => Err(BackendError::NotFound),
        }
    }

    async fn delete_favorite(&self, id: i64) -> Result<(), BackendError> {
        self.record("delete");
        let mut favorites = self.favorites.lock().unwrap();
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Err(BackendError::NotFound);
        }
        Ok(())
    }
}

#[derive(Default)]
struct ScriptedUi {
    alerts: Mutex<Vec<String>>,
    prompts_seen: Mutex<Vec<(String, String)>>,
    prompt_responses: Mutex<VecDeque<Option<String>>>,
    confirm: AtomicBool,
}

impl ScriptedUi {
    fn answer_prompt(&self, response: Option<&str>) {
        self.prompt_responses
            .lock()
            .unwrap()
            .push_back(response.map(str::to_string));
    }

    fn alerts(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Ui for ScriptedUi {
    async fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }

    async fn confirm(&self, _message: &str) -> bool {
        self.confirm.load(Ordering::SeqCst)
    }

    async fn prompt(&self, label: &str, initial: &str) -> Option<String> {
        self.prompts_seen
            .lock()
            .unwrap()
            .push((label.to_string(), initial.to_string()));
        self.prompt_responses
            .lock()
            .unwrap()
            .pop_front()
            .flatten()
    }
}

async fn authed_manager(
    backend: Arc<FakeBackend>,
    ui: Arc<ScriptedUi>,
) -> FavoritesManager {
    backend.logged_in.store(true, Ordering::SeqCst);
    let session = SessionController::new(backend.clone());
    session.check_session().await;
    FavoritesManager::new(backend, session, ui)
}

#[tokio::test]
async fn unauthenticated_save_prompts_login_and_writes_nothing() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let session = SessionController::new(backend.clone());
    let manager = FavoritesManager::new(backend.clone(), session, ui.clone());

    manager.add_favorite(&inception()).await;

    assert!(backend.stored().is_empty());
    assert!(!backend.events().contains(&"create".to_string()));
    let alerts = ui.alerts();
    assert_eq!(alerts.len(), 1);
    assert!(alerts[0].contains("Log in"));
}

#[tokio::test]
async fn saved_entry_snapshot_and_cache_match_backend() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui).await;

    manager.add_favorite(&inception()).await;

    let entries = manager.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].source_id, 42);
    assert_eq!(entries[0].title, "Inception");
    assert!(!entries[0].has_note());

    // The mutation strictly precedes the refresh it triggers.
    let events = backend.events();
    let create = events.iter().position(|e| e == "create").unwrap();
    let list = events.iter().rposition(|e| e == "list").unwrap();
    assert!(create < list);
}

#[tokio::test]
async fn duplicate_save_reports_failure_and_changes_nothing() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    manager.add_favorite(&inception()).await;

    assert_eq!(manager.entries().await.len(), 1);
    assert!(ui
        .alerts()
        .iter()
        .any(|a| a.contains("Could not save")));
}

#[tokio::test]
async fn note_update_roundtrip_marks_entry_as_annotated() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;

    ui.answer_prompt(Some("great movie"));
    manager.update_note(id).await;

    let entries = manager.entries().await;
    assert_eq!(entries[0].notes.as_deref(), Some("great movie"));
    assert!(entries[0].has_note());
}

#[tokio::test]
async fn empty_submission_clears_the_note() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;

    ui.answer_prompt(Some("great movie"));
    manager.update_note(id).await;
    ui.answer_prompt(Some(""));
    manager.update_note(id).await;

    let entries = manager.entries().await;
    assert_eq!(entries[0].notes.as_deref(), Some(""));
    assert!(!entries[0].has_note());
}

#[tokio::test]
async fn cancelled_prompt_changes_nothing() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;

    ui.answer_prompt(None);
    manager.update_note(id).await;

    assert!(!backend.events().contains(&"update".to_string()));
    assert!(manager.entries().await[0].notes.is_none());
}

#[tokio::test]
async fn prompt_seeded_with_real_note_but_not_placeholder() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;

    // Placeholder note counts as "no note": seed must be empty.
    backend.favorites.lock().unwrap()[0].notes = Some(NO_NOTES_PLACEHOLDER.to_string());
    manager.refresh().await;
    ui.answer_prompt(Some("a real note"));
    manager.update_note(id).await;

    ui.answer_prompt(None);
    manager.update_note(id).await;

    let prompts = ui.prompts_seen.lock().unwrap().clone();
    assert_eq!(prompts.len(), 2);
    assert_eq!(prompts[0].1, "");
    assert_eq!(prompts[1].1, "a real note");
}

#[tokio::test]
async fn delete_requires_confirmation() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;

    manager.delete_favorite(id).await;

    assert!(!backend.events().contains(&"delete".to_string()));
    assert_eq!(manager.entries().await.len(), 1);
}

#[tokio::test]
async fn deleting_missing_entry_fails_without_collateral_removal() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    ui.confirm.store(true, Ordering::SeqCst);

    manager.delete_favorite(999).await;

    assert_eq!(manager.entries().await.len(), 1);
    assert!(ui
        .alerts()
        .iter()
        .any(|a| a.contains("Could not remove")));
}

#[tokio::test]
async fn confirmed_delete_refreshes_to_match_backend() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;
    ui.confirm.store(true, Ordering::SeqCst);

    manager.delete_favorite(id).await;

    assert!(backend.stored().is_empty());
    assert!(manager.entries().await.is_empty());
}

#[tokio::test]
async fn failed_refresh_keeps_previous_list_visible() {
    let backend = Arc::new(FakeBackend::default());
    let ui = Arc::new(ScriptedUi::default());
    let manager = authed_manager(backend.clone(), ui.clone()).await;

    manager.add_favorite(&inception()).await;
    let id = manager.entries().await[0].id;
    ui.confirm.store(true, Ordering::SeqCst);
    backend.fail_list.store(true, Ordering::SeqCst);

    manager.delete_favorite(id).await;

    // The backend applied the delete but the re-read failed; the stale list
    // stays up rather than crashing or blanking.
    assert!(backend.stored().is_empty());
    assert_eq!(manager.entries().await.len(), 1);
}
