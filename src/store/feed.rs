use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::api::ApiClient;
use crate::domain::{FeedFilter, Short};
use crate::store::tracking::{lock_state, Loadable, LoadingGuard};

/// Page-token pagination state of the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Cursor {
    /// Nothing fetched yet for the active filter.
    #[default]
    Start,
    /// More pages are available from this server-issued token.
    Next(String),
    /// The last response carried no token.
    Exhausted,
}

impl Cursor {
    fn from_token(token: Option<String>) -> Self {
        match token {
            Some(token) if !token.is_empty() => Cursor::Next(token),
            _ => Cursor::Exhausted,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Cursor::Next(token) => Some(token),
            _ => None,
        }
    }

    pub fn has_more(&self) -> bool {
        !matches!(self, Cursor::Exhausted)
    }
}

/// Point-in-time copy of the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    pub items: Vec<Short>,
    pub cursor: Cursor,
    pub is_loading: bool,
    pub filter: FeedFilter,
    pub is_muted: bool,
    pub error: Option<String>,
}

impl FeedState {
    pub fn has_more(&self) -> bool {
        self.cursor.has_more()
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            cursor: Cursor::Start,
            is_loading: false,
            filter: FeedFilter::default(),
            is_muted: true,
            error: None,
        }
    }
}

#[derive(Default)]
struct Inner {
    feed: FeedState,
    generation: u64,
}

impl Loadable for Inner {
    fn generation_mut(&mut self) -> &mut u64 {
        &mut self.generation
    }

    fn set_loading(&mut self, loading: bool) {
        self.feed.is_loading = loading;
    }
}

#[derive(Debug, Default, Deserialize)]
struct TokenMeta {
    next_page_token: Option<String>,
}

/// The vertically scrolling shorts feed.
pub struct FeedStore {
    client: ApiClient,
    state: Mutex<Inner>,
}

impl FeedStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            state: Mutex::new(Inner::default()),
        }
    }

    pub fn snapshot(&self) -> FeedState {
        lock_state(&self.state).feed.clone()
    }

    pub fn items(&self) -> Vec<Short> {
        lock_state(&self.state).feed.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).feed.is_loading
    }

    pub fn has_more(&self) -> bool {
        lock_state(&self.state).feed.has_more()
    }

    pub fn is_muted(&self) -> bool {
        lock_state(&self.state).feed.is_muted
    }

    pub fn set_muted(&self, muted: bool) {
        lock_state(&self.state).feed.is_muted = muted;
    }

    /// Load the next page for `filter`.
    ///
    /// A new filter or `refresh` starts over from an empty feed and supersedes
    /// any request in flight. Otherwise this is a "load more" and does nothing
    /// while a request is in flight or once the feed is exhausted.
    pub async fn fetch(&self, filter: FeedFilter, refresh: bool) {
        let (loading, query) = {
            let mut inner = lock_state(&self.state);
            let feed = &mut inner.feed;

            if refresh || feed.filter != filter {
                feed.filter = filter;
                feed.items.clear();
                feed.cursor = Cursor::Start;
            } else if feed.is_loading {
                tracing::debug!("Feed fetch already in flight, ignoring");
                return;
            } else if !feed.has_more() {
                return;
            }

            feed.error = None;
            let mut query = feed.filter.query();
            if let Some(token) = feed.cursor.token() {
                query.push(("page_token".to_string(), token.to_string()));
            }
            (LoadingGuard::start(&self.state, &mut inner), query)
        };

        let result = self
            .client
            .get("/shorts", query)
            .await
            .and_then(|envelope| {
                Ok((
                    envelope.data::<Vec<Short>>()?,
                    envelope.meta::<TokenMeta>()?,
                ))
            });

        let mut inner = lock_state(&self.state);
        if !loading.is_current(&mut inner) {
            tracing::debug!(
                "Discarding superseded feed response (request {})",
                loading.generation()
            );
            return;
        }

        match result {
            Ok((shorts, meta)) => {
                let feed = &mut inner.feed;
                if refresh || feed.items.is_empty() {
                    feed.items = shorts;
                } else {
                    feed.items.extend(shorts);
                }
                feed.cursor = Cursor::from_token(meta.next_page_token);
            }
            Err(e) => {
                tracing::error!("Failed to load shorts: {}", e);
                inner.feed.error = Some(e.user_message("Failed to load shorts"));
            }
        }
    }

    /// Toggle a favorite and apply the server-confirmed flag to loaded items.
    ///
    /// Returns whether the server call succeeded, even when the item is not
    /// currently loaded.
    pub async fn toggle_favorite(&self, video_id: &str) -> bool {
        let path = format!("/favorites/{}", video_id);
        match self.client.post_empty(&path).await {
            Ok(envelope) => {
                match envelope.flag("is_favorited") {
                    Some(favorited) => {
                        let mut inner = lock_state(&self.state);
                        for short in inner
                            .feed
                            .items
                            .iter_mut()
                            .filter(|s| s.youtube_video_id == video_id)
                        {
                            short.is_favorited = favorited;
                        }
                    }
                    None => {
                        tracing::warn!("Favorite response for {} had no is_favorited", video_id)
                    }
                }
                true
            }
            Err(e) => {
                tracing::error!("Failed to toggle favorite {}: {}", video_id, e);
                lock_state(&self.state).feed.error =
                    Some(e.user_message("Failed to update favorite"));
                false
            }
        }
    }

    /// Admin: add a short, then reload the active filter from the top.
    pub async fn create<P: Serialize + Sync + ?Sized>(&self, payload: &P) -> bool {
        match self.client.post("/admin/shorts", payload).await {
            Ok(_) => {
                let filter = lock_state(&self.state).feed.filter.clone();
                self.fetch(filter, true).await;
                true
            }
            Err(e) => {
                tracing::error!("Failed to create short: {}", e);
                lock_state(&self.state).feed.error = Some(e.user_message("Failed to create short"));
                false
            }
        }
    }

    /// Admin: delete a short and drop it from the loaded feed.
    pub async fn delete(&self, id: i64) -> bool {
        match self.client.delete(&format!("/admin/shorts/{}", id)).await {
            Ok(_) => {
                lock_state(&self.state)
                    .feed
                    .items
                    .retain(|s| s.id != Some(id));
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete short {}: {}", id, e);
                lock_state(&self.state).feed.error = Some(e.user_message("Failed to delete short"));
                false
            }
        }
    }

    /// Forget per-user favorite flags after the session ends.
    pub fn clear_favorites(&self) {
        for short in lock_state(&self.state).feed.items.iter_mut() {
            short.is_favorited = false;
        }
    }
}
