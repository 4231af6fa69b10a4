use std::sync::Arc;

use crate::api::{ApiClient, HttpTransport, Transport};
use crate::app::Result;
use crate::config::Config;
use crate::session::{FileTokenStorage, SessionStore, TokenHandle, TokenStorage};
use crate::store::{CategoryStore, ChannelStore, FeedStore, HashtagStore, SubscriptionStore};

/// Every store, wired to one API client and one session.
pub struct AppContext {
    pub config: Config,
    pub client: ApiClient,
    pub session: Arc<SessionStore>,
    pub categories: CategoryStore,
    pub channels: ChannelStore,
    pub hashtags: HashtagStore,
    pub feed: FeedStore,
    pub subscriptions: SubscriptionStore,
}

impl AppContext {
    pub fn new(config: Config) -> Result<Self> {
        let transport: Arc<dyn Transport + Send + Sync> =
            Arc::new(HttpTransport::new(&config.api)?);

        let token_path = match &config.storage.token_path {
            Some(p) => p.clone(),
            None => FileTokenStorage::default_path()?,
        };
        let storage: Arc<dyn TokenStorage + Send + Sync> =
            Arc::new(FileTokenStorage::new(token_path));

        Self::with_parts(config, transport, storage)
    }

    pub fn with_parts(
        config: Config,
        transport: Arc<dyn Transport + Send + Sync>,
        storage: Arc<dyn TokenStorage + Send + Sync>,
    ) -> Result<Self> {
        let client = ApiClient::new(transport, TokenHandle::default());
        let session = Arc::new(SessionStore::new(client.clone(), storage)?);
        let page_size = config.stores.page_size;

        Ok(Self {
            categories: CategoryStore::with_page_size(client.clone(), page_size),
            channels: ChannelStore::with_page_size(client.clone(), page_size),
            hashtags: HashtagStore::with_page_size(client.clone(), page_size),
            feed: FeedStore::new(client.clone()),
            subscriptions: SubscriptionStore::new(client.clone(), session.clone()),
            session,
            client,
            config,
        })
    }

    /// Validate a stored session, then load what every screen needs.
    pub async fn bootstrap(&self) {
        self.session.fetch_current_user().await;
        futures::join!(self.categories.fetch(false), self.subscriptions.fetch());
    }

    /// Log out and drop everything tied to the old session.
    pub async fn logout(&self) {
        self.session.logout().await;
        self.teardown_session();
    }

    pub fn teardown_session(&self) {
        self.subscriptions.clear();
        self.feed.clear_favorites();
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::Envelope;
    use crate::domain::FeedFilter;
    use crate::session::MemoryTokenStorage;

    fn context(storage: MemoryTokenStorage) -> (Arc<MockTransport>, AppContext) {
        let transport = Arc::new(MockTransport::new());
        let ctx =
            AppContext::with_parts(Config::default(), transport.clone(), Arc::new(storage))
                .unwrap();
        (transport, ctx)
    }

    #[tokio::test]
    async fn test_stores_share_session_token() {
        let (transport, ctx) = context(MemoryTokenStorage::new());
        transport.push_data(json!({ "id": 1, "name": "Ada", "token": "t1" }));
        transport.push_data(json!([]));

        let credentials = crate::domain::Credentials {
            email: "ada@example.com".into(),
            password: "pw".into(),
        };
        assert!(ctx.session.login(&credentials).await);
        ctx.categories.fetch(false).await;

        assert_eq!(transport.last_request().unwrap().bearer.as_deref(), Some("t1"));
    }

    #[tokio::test]
    async fn test_bootstrap_without_session_loads_public_data_only() {
        let (transport, ctx) = context(MemoryTokenStorage::new());
        transport.push_data(json!([{ "id": 1, "name": "Music" }]));

        ctx.bootstrap().await;

        assert_eq!(transport.request_count(), 1);
        assert_eq!(ctx.categories.items().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_tears_down_session_data() {
        let (transport, ctx) = context(MemoryTokenStorage::with_token("tok"));
        let subscribed: Envelope =
            serde_json::from_value(json!({ "status": "success", "data": ["UC1"] })).unwrap();
        transport.push_ok(subscribed);
        let mut page =
            Envelope::with_data(json!([{ "youtube_video_id": "v1", "is_favorited": true }]));
        page.meta = Some(json!({ "next_page_token": null }));
        transport.push_ok(page);
        transport.push_ok(Envelope::default());

        ctx.subscriptions.fetch().await;
        ctx.feed.fetch(FeedFilter::default(), false).await;
        ctx.logout().await;

        assert!(!ctx.session.is_authenticated());
        assert!(ctx.subscriptions.channel_ids().is_empty());
        let items = ctx.feed.items();
        assert_eq!(items.len(), 1);
        assert!(!items[0].is_favorited);
    }
}
