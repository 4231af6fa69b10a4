use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A server-side collection managed through a [`ListStore`](crate::store::ListStore).
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Plural name used in messages ("categories").
    const NAME: &'static str;
    /// Singular name used in messages ("category").
    const LABEL: &'static str;
    /// Public listing endpoint.
    const PATH: &'static str;
    /// Admin endpoint for create/update/delete.
    const ADMIN_PATH: &'static str;
    /// Whether the listing is offset-paginated. Unpaged lists are cached.
    const PAGINATED: bool;

    fn id(&self) -> i64;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl Resource for Category {
    const NAME: &'static str = "categories";
    const LABEL: &'static str = "category";
    const PATH: &'static str = "/categories";
    const ADMIN_PATH: &'static str = "/admin/categories";
    const PAGINATED: bool = false;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub youtube_channel_id: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Resource for Channel {
    const NAME: &'static str = "channels";
    const LABEL: &'static str = "channel";
    const PATH: &'static str = "/channels";
    const ADMIN_PATH: &'static str = "/admin/channels";
    const PAGINATED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub shorts_count: Option<u64>,
}

impl Resource for Hashtag {
    const NAME: &'static str = "hashtags";
    const LABEL: &'static str = "hashtag";
    const PATH: &'static str = "/hashtags";
    const ADMIN_PATH: &'static str = "/admin/hashtags";
    const PAGINATED: bool = true;

    fn id(&self) -> i64 {
        self.id
    }
}
