pub mod feed;
pub mod list;
pub mod subscriptions;
pub(crate) mod tracking;

use crate::domain::{Category, Channel, Hashtag};

pub use feed::{Cursor, FeedState, FeedStore};
pub use list::{ListState, ListStore, DEFAULT_PAGE_SIZE};
pub use subscriptions::{SubscriptionState, SubscriptionStore};

pub type CategoryStore = ListStore<Category>;
pub type ChannelStore = ListStore<Channel>;
pub type HashtagStore = ListStore<Hashtag>;
