//! The list view shared by every admin entity.
//!
//! A list moves `Idle → Loading → Loaded | Error` on mount, on search or
//! filter changes, on page changes and after every successful row action.
//! The whole [`ListQuery`] is re-sent on each reload; nothing is cached.
//!
//! Reloads can overlap (a slow search followed by a quick page change).
//! Each reload takes a ticket from a counter and only the response holding
//! the newest ticket is applied. Older responses are dropped.

use std::sync::{Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use tsirushka_client::api::with_query;
use tsirushka_client::{ApiError, AppState, Confirm, RequestOptions};
use tsirushka_core::{ListQuery, Page};

use crate::error::AdminError;

// =============================================================================
// Entity description
// =============================================================================

/// One kind of row managed from the admin console.
pub trait AdminEntity: Send + Sync + 'static {
    /// A list row as the backend sends it.
    type Row: DeserializeOwned + Clone + Send + 'static;
    /// The aggregate panel above the list.
    type Stats: DeserializeOwned + Clone + Send + 'static;

    /// Lower-case noun used in logs and messages.
    const LABEL: &'static str;
    /// Collection path, e.g. `/admin/categorias`.
    const PATH: &'static str;
    /// `false` when the collection is a plain JSON array.
    const PAGINATED: bool = true;
    /// `false` when there is no `{PATH}/stats` endpoint.
    const HAS_STATS: bool = true;

    /// Query parameters sent for `query`.
    fn list_pairs(query: &ListQuery) -> Vec<(&'static str, String)> {
        query.to_pairs()
    }

    /// Filtering applied to the fetched page before it is shown.
    fn post_filter(_query: &ListQuery, page: Page<Self::Row>) -> Page<Self::Row> {
        page
    }
}

// =============================================================================
// List state
// =============================================================================

/// What the list area shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ListState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(Page<T>),
    Error(String),
}

impl<T> ListState<T> {
    #[must_use]
    pub const fn page(&self) -> Option<&Page<T>> {
        match self {
            Self::Loaded(page) => Some(page),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

struct Inner<E: AdminEntity> {
    query: ListQuery,
    list: ListState<E::Row>,
    stats: Option<E::Stats>,
    list_ticket: u64,
    stats_ticket: u64,
}

// =============================================================================
// Controller
// =============================================================================

/// Filter, pagination and result state for one admin list.
///
/// Methods take `&self`; the state sits behind a mutex that is never held
/// across a request, so overlapping reloads are possible and resolved by
/// ticket.
pub struct ListController<E: AdminEntity> {
    state: AppState,
    inner: Mutex<Inner<E>>,
}

impl<E: AdminEntity> std::fmt::Debug for ListController<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("ListController")
            .field("entity", &E::LABEL)
            .field("query", &inner.query)
            .field("list_ticket", &inner.list_ticket)
            .finish_non_exhaustive()
    }
}

impl<E: AdminEntity> ListController<E> {
    /// A controller on the first page with the configured page size.
    #[must_use]
    pub fn new(state: AppState) -> Self {
        let size = state.config().admin_page_size;
        Self {
            state,
            inner: Mutex::new(Inner {
                query: ListQuery::with_size(size),
                list: ListState::Idle,
                stats: None,
                list_ticket: 0,
                stats_ticket: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<E>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn app(&self) -> &AppState {
        &self.state
    }

    #[must_use]
    pub fn query(&self) -> ListQuery {
        self.lock().query.clone()
    }

    #[must_use]
    pub fn list_state(&self) -> ListState<E::Row> {
        self.lock().list.clone()
    }

    /// The last stats that loaded; `None` shows the panel as unavailable.
    #[must_use]
    pub fn stats(&self) -> Option<E::Stats> {
        self.lock().stats.clone()
    }

    /// Rows of the loaded page, empty otherwise.
    #[must_use]
    pub fn rows(&self) -> Vec<E::Row> {
        self.lock()
            .list
            .page()
            .map(|p| p.items.clone())
            .unwrap_or_default()
    }

    /// First load of the view: list and stats together.
    pub async fn mount(&self) -> ListState<E::Row> {
        let (list, ()) = tokio::join!(self.reload(), self.refresh_stats());
        list
    }

    /// Search by free text. Resets to the first page.
    pub async fn search(&self, q: &str) -> ListState<E::Row> {
        self.update_query(|query| query.q = non_blank(q));
        self.reload().await
    }

    /// Filter by status (`estado`); `None` clears. Resets to the first page.
    pub async fn filter_status(&self, status: Option<&str>) -> ListState<E::Row> {
        self.update_query(|query| query.status = status.and_then(non_blank));
        self.reload().await
    }

    /// Filter by category; `None` clears. Resets to the first page.
    pub async fn filter_category(&self, category: Option<&str>) -> ListState<E::Row> {
        self.update_query(|query| query.category = category.and_then(non_blank));
        self.reload().await
    }

    /// Set search, filters and a zero-based page without loading.
    ///
    /// Used when a view opens on a known query; call [`Self::mount`] next.
    pub fn preset(&self, q: Option<&str>, status: Option<&str>, category: Option<&str>, page: u32) {
        let mut inner = self.lock();
        inner.query.q = q.and_then(non_blank);
        inner.query.status = status.and_then(non_blank);
        inner.query.category = category.and_then(non_blank);
        inner.query.page = page;
    }

    fn update_query(&self, change: impl FnOnce(&mut ListQuery)) {
        let mut inner = self.lock();
        change(&mut inner.query);
        inner.query.page = 0;
    }

    /// Go to the next page if the loaded page has one.
    ///
    /// Returns `None` without a request when already on the last page.
    pub async fn next_page(&self) -> Option<ListState<E::Row>> {
        let target = {
            let inner = self.lock();
            let page = inner.list.page()?;
            page.has_next().then(|| inner.query.page + 1)?
        };
        self.load_page(target).await
    }

    /// Go to the previous page.
    ///
    /// Returns `None` without a request when already on the first page.
    pub async fn prev_page(&self) -> Option<ListState<E::Row>> {
        let target = {
            let inner = self.lock();
            inner.query.page.checked_sub(1)?
        };
        self.load_page(target).await
    }

    /// Jump to a zero-based page.
    ///
    /// Returns `None` without a request when the page is out of range for
    /// the loaded result.
    pub async fn goto_page(&self, page: u32) -> Option<ListState<E::Row>> {
        let in_range = {
            let inner = self.lock();
            inner
                .list
                .page()
                .is_some_and(|p| u64::from(page) < p.total_pages().max(1))
        };
        if !in_range {
            return None;
        }
        self.load_page(page).await
    }

    async fn load_page(&self, page: u32) -> Option<ListState<E::Row>> {
        self.lock().query.page = page;
        Some(self.reload().await)
    }

    /// Fetch the list for the current query.
    ///
    /// Returns the state after this call. When a newer reload was issued
    /// meanwhile, this response is dropped and the returned state is
    /// whatever the newer one left.
    #[instrument(skip(self), fields(entity = E::LABEL))]
    pub async fn reload(&self) -> ListState<E::Row> {
        let (ticket, query) = {
            let mut inner = self.lock();
            inner.list_ticket += 1;
            inner.list = ListState::Loading;
            (inner.list_ticket, inner.query.clone())
        };

        let result = self.fetch(&query).await;

        let mut inner = self.lock();
        if ticket < inner.list_ticket {
            debug!(ticket, latest = inner.list_ticket, "Discarding stale list response");
            return inner.list.clone();
        }
        inner.list = match result {
            Ok(page) => ListState::Loaded(E::post_filter(&query, page)),
            Err(e) => {
                warn!(error = %e, "Failed to load list");
                ListState::Error(e.to_string())
            }
        };
        inner.list.clone()
    }

    async fn fetch(&self, query: &ListQuery) -> Result<Page<E::Row>, ApiError> {
        let api = self.state.api();
        if E::PAGINATED {
            let pairs = E::list_pairs(query).into_iter().map(|(k, v)| (k, Some(v)));
            api.get_json(&with_query(E::PATH, pairs), true).await
        } else {
            let rows: Vec<E::Row> = api.get_json(E::PATH, true).await?;
            Ok(Page::single(rows))
        }
    }

    /// Fetch the stats panel. A failure leaves the panel unavailable and
    /// does not touch the list.
    #[instrument(skip(self), fields(entity = E::LABEL))]
    pub async fn refresh_stats(&self) {
        if !E::HAS_STATS {
            return;
        }
        let ticket = {
            let mut inner = self.lock();
            inner.stats_ticket += 1;
            inner.stats_ticket
        };

        let path = format!("{}/stats", E::PATH);
        let result = self.state.api().get_json::<E::Stats>(&path, true).await;

        let mut inner = self.lock();
        if ticket < inner.stats_ticket {
            debug!(ticket, latest = inner.stats_ticket, "Discarding stale stats response");
            return;
        }
        inner.stats = match result {
            Ok(stats) => Some(stats),
            Err(e) => {
                warn!(error = %e, "Failed to load stats");
                None
            }
        };
    }

    /// Reload list and stats after a successful mutation.
    pub async fn refresh_all(&self) {
        tokio::join!(self.reload(), self.refresh_stats());
    }

    /// Run a row action and refresh the view when it succeeds.
    ///
    /// # Errors
    ///
    /// Returns the action's error; the view is left as it was.
    pub async fn mutate<T, F>(&self, action: F) -> Result<T, AdminError>
    where
        F: Future<Output = Result<T, ApiError>>,
    {
        let value = action.await?;
        self.refresh_all().await;
        Ok(value)
    }

    /// Send a bodiless row action (`DELETE`, status `PATCH`es) and refresh.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn action(&self, method: Method, path: &str) -> Result<(), AdminError> {
        let api = self.state.api();
        self.mutate(api.send_unit(method, path, None, true)).await
    }

    /// Send a row action with a JSON body and refresh. The reply body is
    /// ignored.
    ///
    /// # Errors
    ///
    /// Returns the API failure.
    pub async fn action_with<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), AdminError> {
        let options = RequestOptions::new(method).auth().json(body)?;
        let api = self.state.api();
        self.mutate(async { api.request(path, options).await.map(|_| ()) })
            .await
    }
}

/// Ask before a destructive action.
///
/// # Errors
///
/// Returns `AdminError::Cancelled` when the user declines.
pub fn confirm_or_cancel(confirm: &dyn Confirm, prompt: &str) -> Result<(), AdminError> {
    if confirm.confirm(prompt) {
        Ok(())
    } else {
        debug!(prompt, "Action declined");
        Err(AdminError::Cancelled)
    }
}

/// `{PATH}/{id}` with the id percent-encoded.
#[must_use]
pub fn item_path(base: &str, id: &str) -> String {
    format!("{base}/{}", urlencoding::encode(id))
}

fn non_blank(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_owned())
}
