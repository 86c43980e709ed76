use serde::{Deserialize, Serialize};

/// Poster substituted at render time when a source carries no image at all.
pub const POSTER_PLACEHOLDER: &str = "https://via.placeholder.com/200x300?text=No+Image";

/// Rating recorded when a source omits one entirely. Keeps unrated items
/// below the trending cutoff.
pub const FALLBACK_RATING: f32 = 0.0;

/// Sentinel stored in `personal_notes` for entries saved without a note.
/// Compared verbatim when deciding whether an entry has real user content.
pub const NO_NOTES_PLACEHOLDER: &str = "No notes yet...";

/// A normalized catalog item. Sourced from a third-party listing service,
/// held only in memory for the current browsing session; `id` is unique
/// within one source's response set only.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Show {
    pub id: i64,
    pub title: String,
    pub poster_url: Option<String>,
    pub summary: Option<String>,
    pub genres: Vec<String>,
    pub rating: f32,
    pub release_info: Option<String>,
}

impl Show {
    pub fn poster_or_placeholder(&self) -> &str {
        self.poster_url.as_deref().unwrap_or(POSTER_PLACEHOLDER)
    }
}

/// A saved reference to a [`Show`], owned by the favorites backend. The
/// title/poster fields are a snapshot taken at the moment of favoriting and
/// are never re-synced with the catalog source.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FavoriteEntry {
    pub id: i64,
    #[serde(rename = "tmdb_id")]
    pub source_id: i64,
    pub title: String,
    #[serde(rename = "poster_path")]
    pub poster_url: Option<String>,
    #[serde(rename = "personal_notes")]
    pub notes: Option<String>,
}

impl FavoriteEntry {
    /// Whether the entry carries a real note, as opposed to nothing, blank
    /// text, or the backend's placeholder sentinel.
    pub fn has_note(&self) -> bool {
        self.notes
            .as_deref()
            .map(str::trim)
            .is_some_and(|n| !n.is_empty() && n != NO_NOTES_PLACEHOLDER)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Login/registration form data. `name` is only sent when present, so the
/// same payload works for both endpoints.
#[derive(Debug, Serialize, Clone)]
pub struct Credentials {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub email: String,
    pub password: String,
}

/// Snapshot submitted when favoriting a catalog item.
#[derive(Debug, Serialize, Clone)]
pub struct NewFavorite {
    pub tmdb_id: i64,
    pub title: String,
    pub poster_path: Option<String>,
}

impl NewFavorite {
    pub fn from_show(show: &Show) -> Self {
        Self {
            tmdb_id: show.id,
            title: show.title.clone(),
            poster_path: show.poster_url.clone(),
        }
    }
}
