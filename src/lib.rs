//! # Shortline
//!
//! Client library and command-line front end for a short-video feed API.
//!
//! ## Architecture
//!
//! ```text
//! Command → Store action → ApiClient → Transport → Store state
//! ```
//!
//! - [`api`]: HTTP adapter with bearer credentials and a normalized envelope
//! - [`session`]: Session token and current user
//! - [`store`]: Category/channel/hashtag lists, the shorts feed, subscriptions
//! - [`router`]: Route table and auth guard
//!
//! ## Quick Start
//!
//! ```bash
//! shortline login --email ada@example.com --password hunter2
//! shortline feed --hashtag music --pages 2
//! shortline favorite dQw4w9WgXcQ
//! shortline admin categories create --json '{"name":"Music"}'
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the API client,
/// the session and every store.
pub mod app;

/// HTTP adapter.
///
/// - [`Transport`](api::Transport): Async trait for sending API requests
/// - [`HttpTransport`](api::HttpTransport): reqwest-based implementation
/// - [`ApiClient`](api::ApiClient): Attaches the session token
pub mod api;

/// Command-line interface using clap.
pub mod cli;

/// Configuration loaded from `~/.config/shortline/config.toml`.
pub mod config;

/// Domain models returned by the API.
pub mod domain;

/// Route table and navigation guard.
pub mod router;

/// Session store and durable token storage.
pub mod session;

/// Client-side stores over the API's collections.
///
/// - [`ListStore`](store::ListStore): Paginated or cached resource lists
/// - [`FeedStore`](store::FeedStore): Page-token shorts feed
/// - [`SubscriptionStore`](store::SubscriptionStore): Subscribed channels
pub mod store;
