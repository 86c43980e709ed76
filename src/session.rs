use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, FavoritesApi};
use crate::models::{Credentials, User};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Identity state. A session exists only while `Authenticated`; logout or
/// any failed identity check lands back in `Anonymous`.
#[derive(Debug, Clone, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    PendingLogin,
    Authenticated(User),
}

/// Auth failures as shown to the user: the validation case is distinguished
/// (it never reached the network), everything else stays generic.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    PasswordTooShort,
    #[error("authentication failed")]
    Failed(#[source] BackendError),
}

/// Establishes and tears down the logged-in session and gates everything
/// that writes to the backend.
#[derive(Clone)]
pub struct SessionController {
    backend: Arc<dyn FavoritesApi>,
    state: Arc<Mutex<SessionState>>,
    csrf_primed: Arc<Mutex<bool>>,
}

impl SessionController {
    pub fn new(backend: Arc<dyn FavoritesApi>) -> Self {
        Self {
            backend,
            state: Arc::new(Mutex::new(SessionState::Anonymous)),
            csrf_primed: Arc::new(Mutex::new(false)),
        }
    }

    pub async fn state(&self) -> SessionState {
        self.state.lock().await.clone()
    }

    pub async fn current_user(&self) -> Option<User> {
        match &*self.state.lock().await {
            SessionState::Authenticated(user) => Some(user.clone()),
            _ => None,
        }
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current_user().await.is_some()
    }

    /// Silent session probe: success authenticates, any failure (transport
    /// or 401) lands in `Anonymous` without surfacing an error.
    pub async fn check_session(&self) -> Option<User> {
        match self.backend.current_user().await {
            Ok(user) => {
                info!("Session active for {}", user.email);
                *self.state.lock().await = SessionState::Authenticated(user.clone());
                Some(user)
            }
            Err(e) => {
                debug!("No active session: {}", e);
                *self.state.lock().await = SessionState::Anonymous;
                None
            }
        }
    }

    /// Prime the CSRF cookie once per controller lifetime, before the first
    /// state-changing call. A failed priming is not retried: the auth call
    /// that follows will fail with it and the two surface as one failure.
    async fn ensure_csrf(&self) {
        let mut primed = self.csrf_primed.lock().await;
        if *primed {
            return;
        }
        match self.backend.prime_csrf().await {
            Ok(()) => *primed = true,
            Err(e) => warn!("CSRF priming failed: {}", e),
        }
    }

    /// Register a new account. Does not authenticate on success; the caller
    /// moves the user to the login form and reports success there.
    pub async fn register(&self, credentials: &Credentials) -> Result<(), AuthError> {
        if credentials.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AuthError::PasswordTooShort);
        }
        self.ensure_csrf().await;
        self.backend
            .register(credentials)
            .await
            .map_err(AuthError::Failed)?;
        info!("Registered {}", credentials.email);
        Ok(())
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<User, AuthError> {
        *self.state.lock().await = SessionState::PendingLogin;
        self.ensure_csrf().await;
        if let Err(e) = self.backend.login(credentials).await {
            *self.state.lock().await = SessionState::Anonymous;
            return Err(AuthError::Failed(e));
        }
        // The identity check doubles as the post-login state transition.
        match self.check_session().await {
            Some(user) => Ok(user),
            None => Err(AuthError::Failed(BackendError::Auth)),
        }
    }

    /// Logout is always locally effective: identity is cleared even when
    /// the backend invalidation call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            warn!("Backend logout failed, clearing local session anyway: {}", e);
        }
        *self.state.lock().await = SessionState::Anonymous;
        info!("Logged out");
    }
}
