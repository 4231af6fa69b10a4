//! Route table and navigation guard.

use crate::session::SessionStore;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";
/// Where signed-in users land when they open a guest-only page.
pub const SIGNED_IN_PATH: &str = "/favorites";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub name: &'static str,
    pub path: &'static str,
    pub requires_auth: bool,
    pub requires_admin: bool,
    pub guest_only: bool,
}

impl Route {
    const fn public(name: &'static str, path: &'static str) -> Self {
        Self {
            name,
            path,
            requires_auth: false,
            requires_admin: false,
            guest_only: false,
        }
    }

    const fn authenticated(name: &'static str, path: &'static str) -> Self {
        Self {
            requires_auth: true,
            ..Self::public(name, path)
        }
    }

    const fn admin(name: &'static str, path: &'static str) -> Self {
        Self {
            requires_auth: true,
            requires_admin: true,
            ..Self::public(name, path)
        }
    }

    const fn guest(name: &'static str, path: &'static str) -> Self {
        Self {
            guest_only: true,
            ..Self::public(name, path)
        }
    }
}

pub const ROUTES: &[Route] = &[
    Route::public("home", "/"),
    Route::public("categories", "/categories"),
    Route::authenticated("favorites", "/favorites"),
    Route::guest("login", "/login"),
    Route::guest("register", "/register"),
    Route::admin("admin-shorts", "/admin/shorts"),
    Route::admin("admin-categories", "/admin/categories"),
    Route::admin("admin-channels", "/admin/channels"),
    Route::admin("admin-hashtags", "/admin/hashtags"),
];

pub fn find(name: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| r.name == name)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether `route` may be entered with the current session.
///
/// A stored token without a loaded profile is validated first, which also
/// clears an expired session.
pub async fn guard(session: &SessionStore, route: &Route) -> Navigation {
    if session.user().is_none() && session.is_authenticated() {
        session.fetch_current_user().await;
    }

    if route.requires_auth && !session.is_authenticated() {
        Navigation::Redirect(LOGIN_PATH)
    } else if route.requires_admin && !session.is_admin() {
        Navigation::Redirect(HOME_PATH)
    } else if route.guest_only && session.is_authenticated() {
        Navigation::Redirect(SIGNED_IN_PATH)
    } else {
        Navigation::Proceed
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;

    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::ApiClient;
    use crate::session::{MemoryTokenStorage, TokenHandle};

    fn session(token: Option<&str>) -> (Arc<MockTransport>, SessionStore) {
        let transport = Arc::new(MockTransport::new());
        let client = ApiClient::new(transport.clone(), TokenHandle::default());
        let storage = match token {
            Some(token) => MemoryTokenStorage::with_token(token),
            None => MemoryTokenStorage::new(),
        };
        (transport, SessionStore::new(client, Arc::new(storage)).unwrap())
    }

    fn route(name: &str) -> &'static Route {
        find(name).unwrap()
    }

    #[tokio::test]
    async fn test_guest_is_sent_to_login() {
        let (transport, session) = session(None);
        assert_eq!(
            guard(&session, route("favorites")).await,
            Navigation::Redirect("/login")
        );
        assert_eq!(
            guard(&session, route("admin-shorts")).await,
            Navigation::Redirect("/login")
        );
        assert_eq!(guard(&session, route("home")).await, Navigation::Proceed);
        assert_eq!(guard(&session, route("login")).await, Navigation::Proceed);
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_token_without_user_loads_profile_first() {
        let (transport, session) = session(Some("tok"));
        transport.push_data(json!({ "id": 1, "name": "Ada", "role": "admin" }));

        assert_eq!(
            guard(&session, route("admin-categories")).await,
            Navigation::Proceed
        );
        assert_eq!(transport.last_request().unwrap().path, "/user");

        // Profile is cached now.
        assert_eq!(guard(&session, route("admin-shorts")).await, Navigation::Proceed);
        assert_eq!(transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_non_admin_is_sent_home() {
        let (transport, session) = session(Some("tok"));
        transport.push_data(json!({ "id": 2, "name": "Bo", "role": "user" }));

        assert_eq!(
            guard(&session, route("admin-shorts")).await,
            Navigation::Redirect("/")
        );
        assert_eq!(guard(&session, route("favorites")).await, Navigation::Proceed);
    }

    #[tokio::test]
    async fn test_signed_in_user_skips_guest_pages() {
        let (transport, session) = session(Some("tok"));
        transport.push_data(json!({ "id": 2, "name": "Bo" }));

        assert_eq!(
            guard(&session, route("login")).await,
            Navigation::Redirect("/favorites")
        );
    }

    #[tokio::test]
    async fn test_expired_token_is_treated_as_guest() {
        let (transport, session) = session(Some("expired"));
        transport.push_err(401, Some("Unauthenticated."));

        assert_eq!(
            guard(&session, route("favorites")).await,
            Navigation::Redirect("/login")
        );
        assert!(!session.is_authenticated());
    }
}
