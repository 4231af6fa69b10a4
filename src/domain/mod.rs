pub mod resource;
pub mod short;
pub mod user;

pub use resource::{Category, Channel, Hashtag, Resource};
pub use short::{FeedFilter, Short};
pub use user::{AuthPayload, Credentials, Profile, Registration};
