use std::sync::Mutex;

use serde::{Deserialize, Deserializer, Serialize};

use crate::api::{ApiClient, Envelope};
use crate::app::Result;
use crate::domain::Resource;
use crate::store::tracking::{lock_state, Loadable, LoadingGuard};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Point-in-time copy of a list store.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState<R> {
    pub items: Vec<R>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub query: String,
    /// 1-based, as last reported by the server.
    pub current_page: u32,
    pub total_pages: u32,
    pub page_size: u32,
}

struct Inner<R> {
    list: ListState<R>,
    generation: u64,
    reading: bool,
    /// Admin writes in flight. They count as loading but never supersede reads.
    writes: u32,
}

impl<R> Inner<R> {
    fn refresh_loading(&mut self) {
        self.list.is_loading = self.reading || self.writes > 0;
    }
}

impl<R> Loadable for Inner<R> {
    fn generation_mut(&mut self) -> &mut u64 {
        &mut self.generation
    }

    fn set_loading(&mut self, loading: bool) {
        self.reading = loading;
        self.refresh_loading();
    }
}

/// Marks one admin write as in flight until dropped.
struct WriteGuard<'a, R> {
    state: &'a Mutex<Inner<R>>,
}

impl<'a, R> WriteGuard<'a, R> {
    fn start(state: &'a Mutex<Inner<R>>) -> Self {
        let mut inner = lock_state(state);
        inner.writes += 1;
        inner.refresh_loading();
        Self { state }
    }
}

impl<R> Drop for WriteGuard<'_, R> {
    fn drop(&mut self) {
        let mut inner = lock_state(self.state);
        inner.writes = inner.writes.saturating_sub(1);
        inner.refresh_loading();
    }
}

/// Offset pagination metadata. Some endpoints send the page numbers as strings.
#[derive(Debug, Default, Deserialize)]
struct PageMeta {
    #[serde(default, deserialize_with = "lenient_page")]
    total_pages: Option<u32>,
    #[serde(default, deserialize_with = "lenient_page")]
    current_page: Option<u32>,
}

fn lenient_page<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<u32>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Page {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Page>::deserialize(deserializer)? {
        Some(Page::Number(n)) => Some(n),
        Some(Page::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// One server collection (categories, channels, hashtags) with its paging
/// and search state.
///
/// Unpaged resources are fetched once and served from memory until a refresh.
/// Overlapping fetches are resolved by generation: only the most recently
/// issued request may update the list.
pub struct ListStore<R: Resource> {
    client: ApiClient,
    state: Mutex<Inner<R>>,
}

impl<R: Resource> ListStore<R> {
    pub fn new(client: ApiClient) -> Self {
        Self::with_page_size(client, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(client: ApiClient, page_size: u32) -> Self {
        Self {
            client,
            state: Mutex::new(Inner {
                list: ListState {
                    items: Vec::new(),
                    is_loading: false,
                    error: None,
                    query: String::new(),
                    current_page: 1,
                    total_pages: 1,
                    page_size: page_size.max(1),
                },
                generation: 0,
                reading: false,
                writes: 0,
            }),
        }
    }

    pub fn snapshot(&self) -> ListState<R> {
        lock_state(&self.state).list.clone()
    }

    pub fn items(&self) -> Vec<R> {
        lock_state(&self.state).list.items.clone()
    }

    pub fn is_loading(&self) -> bool {
        lock_state(&self.state).list.is_loading
    }

    pub fn error(&self) -> Option<String> {
        lock_state(&self.state).list.error.clone()
    }

    /// Load the current page, or page 1 when `refresh` is set.
    pub async fn fetch(&self, refresh: bool) {
        let page = {
            let inner = lock_state(&self.state);
            if !R::PAGINATED && !refresh && !inner.list.items.is_empty() {
                return;
            }
            if refresh {
                1
            } else {
                inner.list.current_page
            }
        };
        self.load(page).await;
    }

    /// Change the search query and reload from page 1.
    pub async fn set_search(&self, query: impl Into<String>) {
        lock_state(&self.state).list.query = query.into();
        self.fetch(true).await;
    }

    /// Load `page` with the current query.
    pub async fn set_page(&self, page: u32) {
        self.load(page.max(1)).await;
    }

    pub async fn create<P: Serialize + Sync + ?Sized>(&self, payload: &P) -> bool {
        let _writing = WriteGuard::start(&self.state);
        let result = self.client.post(R::ADMIN_PATH, payload).await;
        self.finish_write(result, &format!("Failed to create {}", R::LABEL))
            .await
    }

    pub async fn update<P: Serialize + Sync + ?Sized>(&self, id: i64, payload: &P) -> bool {
        let _writing = WriteGuard::start(&self.state);
        let path = format!("{}/{}", R::ADMIN_PATH, id);
        let result = self.client.put(&path, payload).await;
        self.finish_write(result, &format!("Failed to update {}", R::LABEL))
            .await
    }

    /// Delete on the server, then drop the record locally without reloading.
    pub async fn delete(&self, id: i64) -> bool {
        let path = format!("{}/{}", R::ADMIN_PATH, id);
        match self.client.delete(&path).await {
            Ok(_) => {
                lock_state(&self.state)
                    .list
                    .items
                    .retain(|record| record.id() != id);
                true
            }
            Err(e) => {
                tracing::error!("Failed to delete {} {}: {}", R::LABEL, id, e);
                lock_state(&self.state).list.error =
                    Some(e.user_message(&format!("Failed to delete {}", R::LABEL)));
                false
            }
        }
    }

    async fn finish_write(&self, result: Result<Envelope>, fallback: &str) -> bool {
        match result {
            Ok(_) => {
                self.fetch(true).await;
                true
            }
            Err(e) => {
                tracing::error!("{}: {}", fallback, e);
                lock_state(&self.state).list.error = Some(e.user_message(fallback));
                false
            }
        }
    }

    fn query_params(&self, list: &ListState<R>, page: u32) -> Vec<(String, String)> {
        if R::PAGINATED {
            vec![
                ("page".to_string(), page.to_string()),
                ("limit".to_string(), list.page_size.to_string()),
                ("search".to_string(), list.query.clone()),
            ]
        } else if list.query.is_empty() {
            Vec::new()
        } else {
            vec![("search".to_string(), list.query.clone())]
        }
    }

    async fn load(&self, page: u32) {
        let (loading, query) = {
            let mut inner = lock_state(&self.state);
            let query = self.query_params(&inner.list, page);
            (LoadingGuard::start(&self.state, &mut inner), query)
        };

        let result = self
            .client
            .get(R::PATH, query)
            .await
            .and_then(|envelope| Ok((envelope.data::<Vec<R>>()?, envelope.meta::<PageMeta>()?)));

        let mut inner = lock_state(&self.state);
        if !loading.is_current(&mut inner) {
            tracing::debug!(
                "Discarding stale {} response (request {})",
                R::NAME,
                loading.generation()
            );
            return;
        }

        match result {
            Ok((items, meta)) => {
                let list = &mut inner.list;
                list.items = items;
                list.total_pages = meta.total_pages.unwrap_or(1).max(1);
                list.current_page = meta.current_page.unwrap_or(page).max(1);
                list.error = None;
            }
            Err(e) => {
                tracing::error!("Failed to load {}: {}", R::NAME, e);
                inner.list.error = Some(e.user_message(&format!("Failed to load {}", R::NAME)));
            }
        }
    }
}
