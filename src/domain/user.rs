use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

pub const ADMIN_ROLE: &str = "admin";

/// Current user as returned by `GET /user` and the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    /// Any further profile fields the server sends.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some(ADMIN_ROLE)
    }
}

/// `data` of a login/register response: the profile with the token inlined.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    #[serde(flatten)]
    pub user: Profile,
}

#[derive(Debug, Clone, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Registration {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_auth_payload_splits_token_from_profile() {
        let payload: AuthPayload = serde_json::from_value(json!({
            "id": 7,
            "name": "Ada",
            "email": "ada@example.com",
            "role": "admin",
            "token": "t0k3n",
            "avatar": "a.png"
        }))
        .unwrap();

        assert_eq!(payload.token, "t0k3n");
        assert_eq!(payload.user.id, 7);
        assert!(payload.user.is_admin());
        assert!(!payload.user.extra.contains_key("token"));
        assert_eq!(payload.user.extra.get("avatar"), Some(&json!("a.png")));
    }

    #[test]
    fn test_profile_without_role_is_not_admin() {
        let profile: Profile = serde_json::from_value(json!({ "id": 1, "name": "Bo" })).unwrap();
        assert!(!profile.is_admin());
    }
}
