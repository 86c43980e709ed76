use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde_json::json;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;
use tracing::debug;

use crate::models::{Credentials, FavoriteEntry, NewFavorite, User};

const XSRF_COOKIE: &str = "XSRF-TOKEN";
const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Failure taxonomy for backend calls. Callers mostly collapse these into
/// one generic user-facing message; the variants exist so the session layer
/// can tell "not logged in" from everything else.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("not authenticated")]
    Auth,
    #[error("already in the collection")]
    Conflict,
    #[error("no such entry")]
    NotFound,
    #[error("backend returned {status}")]
    Upstream { status: StatusCode },
}

fn check(status: StatusCode) -> Result<(), BackendError> {
    if status.is_success() {
        return Ok(());
    }
    match status.as_u16() {
        401 | 419 => Err(BackendError::Auth),
        404 => Err(BackendError::NotFound),
        // The backend answers duplicates with either a plain conflict or a
        // validation rejection, depending on the endpoint.
        409 | 422 => Err(BackendError::Conflict),
        _ => Err(BackendError::Upstream { status }),
    }
}

/// The session-authenticated favorites backend.
#[async_trait]
pub trait FavoritesApi: Send + Sync {
    /// Fetch the CSRF cookie that state-changing calls must echo back.
    async fn prime_csrf(&self) -> Result<(), BackendError>;
    async fn current_user(&self) -> Result<User, BackendError>;
    async fn register(&self, credentials: &Credentials) -> Result<(), BackendError>;
    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError>;
    async fn logout(&self) -> Result<(), BackendError>;
    async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>, BackendError>;
    async fn create_favorite(&self, favorite: &NewFavorite) -> Result<(), BackendError>;
    async fn update_note(&self, id: i64, notes: &str) -> Result<(), BackendError>;
    async fn delete_favorite(&self, id: i64) -> Result<(), BackendError>;
}

/// HTTP client bound to the backend base URL. Holds the session cookie in a
/// cookie store and replays the decoded CSRF token as a header on every
/// state-changing request, which is what the backend's cookie-based CSRF
/// scheme expects.
pub struct BackendClient {
    client: Client,
    base_url: String,
    xsrf_token: Mutex<Option<String>>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        let client = Client::builder().cookie_store(true).build()?;
        let base_url: String = base_url.into();
        let base_url = base_url.trim_end_matches('/').to_string();
        Ok(Self {
            client,
            base_url,
            xsrf_token: Mutex::new(None),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn mutating(&self, method: Method, path: &str) -> RequestBuilder {
        let mut req = self.client.request(method, self.url(path));
        let token = self
            .xsrf_token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if let Some(token) = token {
            req = req.header(XSRF_HEADER, token);
        }
        req
    }
}

#[async_trait]
impl FavoritesApi for BackendClient {
    async fn prime_csrf(&self) -> Result<(), BackendError> {
        let res = self
            .client
            .get(self.url("/sanctum/csrf-cookie"))
            .send()
            .await?;
        check(res.status())?;
        let raw = res
            .cookies()
            .find(|c| c.name() == XSRF_COOKIE)
            .map(|c| c.value().to_string());
        if let Some(raw) = raw {
            // The cookie value arrives URL-encoded; the header wants it plain.
            let token = urlencoding::decode(&raw)
                .map(|d| d.into_owned())
                .unwrap_or(raw);
            *self
                .xsrf_token
                .lock()
                .unwrap_or_else(PoisonError::into_inner) = Some(token);
            debug!("CSRF token primed");
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<User, BackendError> {
        let res = self.client.get(self.url("/api/user")).send().await?;
        check(res.status())?;
        Ok(res.json().await?)
    }

    async fn register(&self, credentials: &Credentials) -> Result<(), BackendError> {
        let res = self
            .mutating(Method::POST, "/register")
            .json(credentials)
            .send()
            .await?;
        check(res.status())
    }

    async fn login(&self, credentials: &Credentials) -> Result<(), BackendError> {
        let res = self
            .mutating(Method::POST, "/login")
            .json(credentials)
            .send()
            .await?;
        check(res.status())
    }

    async fn logout(&self) -> Result<(), BackendError> {
        let res = self.mutating(Method::POST, "/logout").send().await?;
        check(res.status())
    }

    async fn list_favorites(&self) -> Result<Vec<FavoriteEntry>, BackendError> {
        let res = self.client.get(self.url("/api/movies")).send().await?;
        check(res.status())?;
        Ok(res.json().await?)
    }

    async fn create_favorite(&self, favorite: &NewFavorite) -> Result<(), BackendError> {
        let res = self
            .mutating(Method::POST, "/api/movies")
            .json(favorite)
            .send()
            .await?;
        check(res.status())
    }

    async fn update_note(&self, id: i64, notes: &str) -> Result<(), BackendError> {
        let res = self
            .mutating(Method::PUT, &format!("/api/movies/{id}"))
            .json(&json!({ "notes": notes }))
            .send()
            .await?;
        check(res.status())
    }

    async fn delete_favorite(&self, id: i64) -> Result<(), BackendError> {
        let res = self
            .mutating(Method::DELETE, &format!("/api/movies/{id}"))
            .send()
            .await?;
        check(res.status())
    }
}
