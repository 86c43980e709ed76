use anyhow::{anyhow, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::catalog::{normalize_records, CatalogSource};
use crate::debounce::Debouncer;
use crate::models::Show;

pub const PAGE_SIZE: usize = 20;
/// The primary source caps plain browsing at this many pages and reports no
/// usable total, so home mode advertises the cap directly.
pub const HOME_TOTAL_PAGES: u32 = 500;
pub const TRENDING_MIN_RATING: f32 = 7.5;
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);
/// Catch-all option in the genre picker.
pub const ALL_GENRES: &str = "All";
/// Numbered pages shown on each side of the current one.
const PAGE_WINDOW: u32 = 2;

/// One element of the numbered-page strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page(u32),
    Ellipsis,
}

#[derive(Debug)]
struct BrowserState {
    shows: Vec<Show>,
    /// One-based UI page.
    page: u32,
    search_term: String,
    /// `None` is the catch-all.
    genre: Option<String>,
    trending_only: bool,
    /// Bumped on every keystroke; completions carrying an older value are
    /// dropped so a slow search cannot overwrite a newer one.
    generation: u64,
}

impl Default for BrowserState {
    fn default() -> Self {
        Self {
            shows: Vec::new(),
            page: 1,
            search_term: String::new(),
            genre: None,
            trending_only: false,
            generation: 0,
        }
    }
}

/// Maintains the currently displayed page of shows under three independent
/// filter axes (search term, genre, trending cutoff) plus page navigation.
/// Fetches go through a primary/secondary fallback chain and every
/// successful payload is normalized before being stored.
#[derive(Clone)]
pub struct CatalogBrowser {
    primary: Arc<dyn CatalogSource>,
    secondary: Arc<dyn CatalogSource>,
    state: Arc<Mutex<BrowserState>>,
    debouncer: Arc<Debouncer>,
}

impl CatalogBrowser {
    pub fn new(primary: Arc<dyn CatalogSource>, secondary: Arc<dyn CatalogSource>) -> Self {
        Self {
            primary,
            secondary,
            state: Arc::new(Mutex::new(BrowserState::default())),
            debouncer: Arc::new(Debouncer::new()),
        }
    }

    async fn fetch_popular(&self, upstream_page: u32) -> Result<Vec<Show>> {
        match self.primary.popular(upstream_page).await {
            Ok(records) => Ok(normalize_records(&records)),
            Err(primary_err) => {
                warn!(
                    "{} listing failed, falling back to {}: {}",
                    self.primary.name(),
                    self.secondary.name(),
                    primary_err
                );
                match self.secondary.popular(upstream_page).await {
                    Ok(records) => Ok(normalize_records(&records)),
                    Err(secondary_err) => Err(anyhow!(
                        "both catalog sources failed: {primary_err}; {secondary_err}"
                    )),
                }
            }
        }
    }

    async fn fetch_search(&self, term: &str) -> Result<Vec<Show>> {
        match self.primary.search(term).await {
            Ok(records) => Ok(normalize_records(&records)),
            Err(primary_err) => {
                warn!(
                    "{} search failed, falling back to {}: {}",
                    self.primary.name(),
                    self.secondary.name(),
                    primary_err
                );
                match self.secondary.search(term).await {
                    Ok(records) => Ok(normalize_records(&records)),
                    Err(secondary_err) => Err(anyhow!(
                        "both catalog sources failed: {primary_err}; {secondary_err}"
                    )),
                }
            }
        }
    }

    fn is_filtered(state: &BrowserState) -> bool {
        !state.search_term.is_empty() || state.genre.is_some() || state.trending_only
    }

    fn matches(state: &BrowserState, show: &Show) -> bool {
        if let Some(genre) = &state.genre {
            if !show.genres.iter().any(|g| g.eq_ignore_ascii_case(genre)) {
                return false;
            }
        }
        if state.trending_only && show.rating < TRENDING_MIN_RATING {
            return false;
        }
        true
    }

    fn filtered(state: &BrowserState) -> Vec<Show> {
        state
            .shows
            .iter()
            .filter(|s| Self::matches(state, s))
            .cloned()
            .collect()
    }

    fn total_pages_of(state: &BrowserState) -> u32 {
        if Self::is_filtered(state) {
            let count = Self::filtered(state).len();
            (count.div_ceil(PAGE_SIZE) as u32).max(1)
        } else {
            HOME_TOTAL_PAGES
        }
    }

    /// The shows for the current page after filtering. Home mode shows the
    /// remote page as-is; filtered modes slice the in-memory filtered set.
    pub async fn visible(&self) -> Vec<Show> {
        let state = self.state.lock().await;
        let filtered = Self::filtered(&state);
        if Self::is_filtered(&state) {
            let start = (state.page.saturating_sub(1) as usize) * PAGE_SIZE;
            filtered.into_iter().skip(start).take(PAGE_SIZE).collect()
        } else {
            filtered
        }
    }

    pub async fn page(&self) -> u32 {
        self.state.lock().await.page
    }

    pub async fn total_pages(&self) -> u32 {
        Self::total_pages_of(&*self.state.lock().await)
    }

    pub async fn search_term(&self) -> String {
        self.state.lock().await.search_term.clone()
    }

    /// Genre picker options derived from the loaded shows, catch-all first.
    pub async fn genre_options(&self) -> Vec<String> {
        let state = self.state.lock().await;
        let mut genres: Vec<String> = state
            .shows
            .iter()
            .flat_map(|s| s.genres.iter().cloned())
            .collect();
        genres.sort();
        genres.dedup();
        genres.insert(0, ALL_GENRES.to_string());
        genres
    }

    /// Navigate to a UI page, clamped to `[1, total]`. Only the unfiltered
    /// home mode refetches: each UI page maps to a distinct zero-based
    /// upstream page. Filtered modes repage over already-downloaded data.
    pub async fn go_to_page(&self, ui_page: u32) -> Result<()> {
        let (home_mode, total) = {
            let state = self.state.lock().await;
            (!Self::is_filtered(&state), Self::total_pages_of(&state))
        };
        let page = ui_page.clamp(1, total);
        if home_mode {
            let shows = self.fetch_popular(page - 1).await?;
            let mut state = self.state.lock().await;
            state.shows = shows;
            state.page = page;
        } else {
            self.state.lock().await.page = page;
        }
        Ok(())
    }

    pub async fn first_page(&self) -> Result<()> {
        self.go_to_page(1).await
    }

    pub async fn prev_page(&self) -> Result<()> {
        let page = self.page().await;
        self.go_to_page(page.saturating_sub(1)).await
    }

    pub async fn next_page(&self) -> Result<()> {
        let page = self.page().await;
        self.go_to_page(page + 1).await
    }

    pub async fn last_page(&self) -> Result<()> {
        let total = self.total_pages().await;
        self.go_to_page(total).await
    }

    /// The numbered-page strip for the current state.
    pub async fn page_links(&self) -> Vec<PageLink> {
        let state = self.state.lock().await;
        page_links(state.page, Self::total_pages_of(&state))
    }

    /// Select a genre; anything but the catch-all resets pagination.
    pub async fn set_genre(&self, genre: Option<&str>) {
        let mut state = self.state.lock().await;
        let normalized = genre
            .map(str::trim)
            .filter(|g| !g.is_empty() && !g.eq_ignore_ascii_case(ALL_GENRES))
            .map(str::to_string);
        if normalized.is_some() {
            state.page = 1;
        }
        state.genre = normalized;
    }

    pub async fn set_trending(&self, enabled: bool) {
        self.state.lock().await.trending_only = enabled;
    }

    /// Record a keystroke. The remote query fires once input pauses for
    /// [`SEARCH_DEBOUNCE`]; an earlier pending query is cancelled. An empty
    /// term reverts to the default paginated listing.
    pub async fn on_search_input(&self, term: &str) {
        let term = term.trim().to_string();
        let generation = {
            let mut state = self.state.lock().await;
            state.search_term = term.clone();
            state.generation += 1;
            state.generation
        };
        let browser = self.clone();
        self.debouncer.schedule(SEARCH_DEBOUNCE, async move {
            if let Err(e) = browser.run_search_generation(&term, generation).await {
                warn!("Search for '{}' failed: {}", term, e);
            }
        });
    }

    /// Execute a search (or the home reset for an empty term) immediately,
    /// bypassing the debounce delay.
    pub async fn run_search(&self, term: &str) -> Result<()> {
        let term = term.trim().to_string();
        let generation = {
            let mut state = self.state.lock().await;
            state.search_term = term.clone();
            state.generation += 1;
            state.generation
        };
        self.run_search_generation(&term, generation).await
    }

    async fn run_search_generation(&self, term: &str, generation: u64) -> Result<()> {
        let shows = if term.is_empty() {
            self.fetch_popular(0).await?
        } else {
            self.fetch_search(term).await?
        };
        let mut state = self.state.lock().await;
        if state.generation != generation {
            debug!("Dropping superseded results for '{}'", term);
            return Ok(());
        }
        state.shows = shows;
        state.page = 1;
        Ok(())
    }
}

/// Numbered-page strip: first and last pages always shown, a bounded window
/// around the current page, ellipses for the skipped ranges.
pub fn page_links(current: u32, total: u32) -> Vec<PageLink> {
    let mut links = Vec::new();
    let mut last_shown = 0u32;
    for page in 1..=total {
        let edge = page == 1 || page == total;
        let near = page.abs_diff(current) <= PAGE_WINDOW;
        if edge || near {
            if last_shown != 0 && page - last_shown > 1 {
                links.push(PageLink::Ellipsis);
            }
            links.push(PageLink::Page(page));
            last_shown = page;
        }
    }
    links
}
