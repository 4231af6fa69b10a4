use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Short {
    /// Database id, used by the admin endpoints.
    #[serde(default)]
    pub id: Option<i64>,
    pub youtube_video_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub channel_title: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_favorited: bool,
}

impl Short {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    pub fn watch_url(&self) -> String {
        format!("https://www.youtube.com/shorts/{}", self.youtube_video_id)
    }
}

/// Active feed filter. Two filters are equal only when both parts match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedFilter {
    pub hashtag: Option<String>,
    pub channel_id: Option<String>,
}

impl FeedFilter {
    pub fn hashtag(tag: impl Into<String>) -> Self {
        Self {
            hashtag: Some(tag.into()),
            channel_id: None,
        }
    }

    pub fn channel(channel_id: impl Into<String>) -> Self {
        Self {
            hashtag: None,
            channel_id: Some(channel_id.into()),
        }
    }

    pub(crate) fn query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(tag) = self.hashtag.as_deref().filter(|t| !t.is_empty()) {
            query.push(("hashtag".to_string(), tag.to_string()));
        }
        if let Some(channel) = self.channel_id.as_deref().filter(|c| !c.is_empty()) {
            query.push(("channelId".to_string(), channel.to_string()));
        }
        query
    }
}
