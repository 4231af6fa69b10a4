//! Session store: credential token and current user.

pub mod token;

use std::sync::{Arc, Mutex};

use serde::Serialize;

use crate::api::ApiClient;
use crate::app::Result;
use crate::domain::{AuthPayload, Credentials, Profile, Registration};
use crate::store::tracking::{lock_state, Loadable, LoadingGuard};

pub use token::{FileTokenStorage, MemoryTokenStorage, TokenHandle, TokenStorage};

/// Point-in-time copy of the session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub token: Option<String>,
    pub user: Option<Profile>,
    pub is_loading: bool,
    pub error: Option<String>,
}

#[derive(Default)]
struct Inner {
    user: Option<Profile>,
    is_loading: bool,
    error: Option<String>,
    generation: u64,
}

impl Loadable for Inner {
    fn generation_mut(&mut self) -> &mut u64 {
        &mut self.generation
    }

    fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }
}

pub struct SessionStore {
    client: ApiClient,
    storage: Arc<dyn TokenStorage + Send + Sync>,
    state: Mutex<Inner>,
}

impl SessionStore {
    /// Restore any persisted token into the client's token handle.
    pub fn new(client: ApiClient, storage: Arc<dyn TokenStorage + Send + Sync>) -> Result<Self> {
        client.token().set(storage.load()?);
        Ok(Self {
            client,
            storage,
            state: Mutex::new(Inner::default()),
        })
    }

    pub fn is_authenticated(&self) -> bool {
        self.client.token().is_present()
    }

    pub fn is_admin(&self) -> bool {
        lock_state(&self.state)
            .user
            .as_ref()
            .is_some_and(Profile::is_admin)
    }

    pub fn token(&self) -> Option<String> {
        self.client.token().get()
    }

    pub fn user(&self) -> Option<Profile> {
        lock_state(&self.state).user.clone()
    }

    pub fn error(&self) -> Option<String> {
        lock_state(&self.state).error.clone()
    }

    pub fn snapshot(&self) -> SessionState {
        let token = self.token();
        let inner = lock_state(&self.state);
        SessionState {
            token,
            user: inner.user.clone(),
            is_loading: inner.is_loading,
            error: inner.error.clone(),
        }
    }

    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.authenticate("/login", credentials, "Login failed").await
    }

    pub async fn register(&self, details: &Registration) -> bool {
        self.authenticate("/register", details, "Registration failed")
            .await
    }

    /// Invalidate server-side when possible, then always drop the local session.
    pub async fn logout(&self) {
        if self.is_authenticated() {
            if let Err(e) = self.client.post_empty("/logout").await {
                tracing::warn!("Server-side logout failed: {}", e);
            }
        }
        self.clear_local();
    }

    /// Refresh the profile. Any failure is treated as an expired token.
    pub async fn fetch_current_user(&self) {
        let Some(token) = self.token() else {
            return;
        };

        let result = self
            .client
            .get("/user", Vec::new())
            .await
            .and_then(|envelope| envelope.data::<Profile>());

        if self.token().as_deref() != Some(token.as_str()) {
            tracing::debug!("Session changed while fetching user, discarding result");
            return;
        }

        match result {
            Ok(user) => {
                lock_state(&self.state).user = Some(user);
            }
            Err(e) => {
                tracing::warn!("Could not fetch current user, clearing session: {}", e);
                self.clear_local();
            }
        }
    }

    async fn authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> bool {
        let _loading = {
            let mut inner = lock_state(&self.state);
            inner.error = None;
            LoadingGuard::start(&self.state, &mut inner)
        };

        let result = self
            .client
            .post(path, body)
            .await
            .and_then(|envelope| envelope.data::<AuthPayload>());

        match result {
            Ok(AuthPayload { token, user }) => {
                if let Err(e) = self.storage.save(&token) {
                    tracing::warn!("Failed to persist session token: {}", e);
                }
                self.client.token().set(Some(token));
                lock_state(&self.state).user = Some(user);
                true
            }
            Err(e) => {
                tracing::error!("{} ({})", fallback, e);
                lock_state(&self.state).error = Some(e.user_message(fallback));
                false
            }
        }
    }

    fn clear_local(&self) {
        lock_state(&self.state).user = None;
        self.client.token().set(None);
        if let Err(e) = self.storage.clear() {
            tracing::warn!("Failed to remove stored session token: {}", e);
        }
    }
}
