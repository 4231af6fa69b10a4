use std::sync::{Arc, Mutex};

use crate::api::ApiClient;
use crate::session::SessionStore;
use crate::store::tracking::{lock_state, Loadable, LoadingGuard};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionState {
    /// Subscribed channel ids, unique, in server order.
    pub channel_ids: Vec<String>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    subscriptions: SubscriptionState,
    generation: u64,
}

impl Loadable for Inner {
    fn generation_mut(&mut self) -> &mut u64 {
        &mut self.generation
    }

    fn set_loading(&mut self, loading: bool) {
        self.subscriptions.is_loading = loading;
    }
}

/// Channel subscriptions of the signed-in user.
pub struct SubscriptionStore {
    client: ApiClient,
    session: Arc<SessionStore>,
    state: Mutex<Inner>,
}

impl SubscriptionStore {
    pub fn new(client: ApiClient, session: Arc<SessionStore>) -> Self {
        Self {
            client,
            session,
            state: Mutex::new(Inner::default()),
        }
    }

    pub fn snapshot(&self) -> SubscriptionState {
        lock_state(&self.state).subscriptions.clone()
    }

    pub fn channel_ids(&self) -> Vec<String> {
        lock_state(&self.state).subscriptions.channel_ids.clone()
    }

    pub fn is_subscribed(&self, channel_id: &str) -> bool {
        lock_state(&self.state)
            .subscriptions
            .channel_ids
            .iter()
            .any(|id| id == channel_id)
    }

    pub async fn fetch(&self) {
        if !self.session.is_authenticated() {
            return;
        }

        let loading = {
            let mut inner = lock_state(&self.state);
            LoadingGuard::start(&self.state, &mut inner)
        };

        let result = self.client.get("/subscriptions", Vec::new()).await;

        let mut inner = lock_state(&self.state);
        if !loading.is_current(&mut inner) {
            return;
        }

        match result.and_then(|envelope| {
            envelope
                .is_success()
                .then(|| envelope.data::<Vec<String>>())
                .transpose()
        }) {
            Ok(Some(mut ids)) => {
                dedup_in_order(&mut ids);
                inner.subscriptions.channel_ids = ids;
                inner.subscriptions.error = None;
            }
            Ok(None) => {
                tracing::warn!("Subscriptions response was not successful, keeping current set")
            }
            Err(e) => {
                tracing::error!("Failed to fetch subscriptions: {}", e);
                inner.subscriptions.error = Some(e.user_message("Failed to fetch subscriptions"));
            }
        }
    }

    /// Toggle membership on the server and apply the returned state.
    ///
    /// Returns whether the call succeeded; use [`is_subscribed`](Self::is_subscribed)
    /// for the resulting membership.
    pub async fn toggle(&self, channel_id: &str) -> bool {
        if !self.session.is_authenticated() {
            return false;
        }

        let path = format!("/subscriptions/toggle/{}", channel_id);
        let envelope = match self.client.post_empty(&path).await {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!("Failed to toggle subscription {}: {}", channel_id, e);
                lock_state(&self.state).subscriptions.error =
                    Some(e.user_message("Failed to update subscription"));
                return false;
            }
        };

        let subscribed = match envelope.flag("is_subscribed") {
            Some(subscribed) if envelope.is_success() => subscribed,
            _ => return false,
        };

        let mut inner = lock_state(&self.state);
        let ids = &mut inner.subscriptions.channel_ids;
        if subscribed {
            if !ids.iter().any(|id| id == channel_id) {
                ids.push(channel_id.to_string());
            }
        } else {
            ids.retain(|id| id != channel_id);
        }
        true
    }

    /// Drop the set after the session ends.
    pub fn clear(&self) {
        let mut inner = lock_state(&self.state);
        // Invalidate any fetch still in flight for the old session.
        inner.generation += 1;
        inner.subscriptions = SubscriptionState::default();
    }
}

fn dedup_in_order(ids: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    ids.retain(|id| seen.insert(id.clone()));
}
