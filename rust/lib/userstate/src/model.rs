//! Value types owned by the boards server and referenced by the user state.

use serde::{Deserialize, Serialize};

/// A boards user as returned by `GET /users/me` and the workspace load.
///
/// Only `id` and `username` are interpreted here; the rest is carried
/// through for presentation. Missing fields default, so a record without
/// an `id` is accepted and indexed under the empty string.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nickname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub firstname: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub lastname: String,
    #[serde(skip_serializing_if = "serde_json::Map::is_empty")]
    pub props: serde_json::Map<String, serde_json::Value>,
    pub create_at: i64,
    pub update_at: i64,
    pub is_bot: bool,
}

impl User {
    /// Minimal user with just an id and a username.
    pub fn new(id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            ..Default::default()
        }
    }
}

/// The current user follows updates to block `block_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSubscription {
    pub block_id: String,
}

impl BlockSubscription {
    pub fn new(block_id: impl Into<String>) -> Self {
        Self {
            block_id: block_id.into(),
        }
    }
}

/// Result of the workspace initial load, as far as user state cares.
///
/// The full payload also carries boards, views and the workspace itself;
/// those fields are ignored on decode.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InitialLoadPayload {
    pub workspace_users: Vec<User>,
    pub user_card_subscriptions: Vec<BlockSubscription>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_decodes_server_fields() {
        let json = r#"{
            "id": "u1",
            "username": "alice",
            "email": "alice@example.com",
            "props": {"theme": "dark"},
            "create_at": 1700000000000,
            "update_at": 1700000000001,
            "is_bot": false
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.props.get("theme").and_then(|v| v.as_str()), Some("dark"));
        assert_eq!(user.create_at, 1_700_000_000_000);
        assert!(!user.is_bot);
    }

    #[test]
    fn user_without_id_is_accepted() {
        let user: User = serde_json::from_str(r#"{"username": "ghost"}"#).unwrap();
        assert_eq!(user.id, "");
        assert_eq!(user.username, "ghost");
    }

    #[test]
    fn user_skips_empty_profile_fields() {
        let json = serde_json::to_value(User::new("u1", "alice")).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("props").is_none());
        assert_eq!(json["username"], "alice");
    }

    #[test]
    fn block_subscription_uses_camel_case() {
        let json = serde_json::to_string(&BlockSubscription::new("b1")).unwrap();
        assert_eq!(json, r#"{"blockId":"b1"}"#);

        let sub: BlockSubscription = serde_json::from_str(r#"{"blockId":"b2"}"#).unwrap();
        assert_eq!(sub.block_id, "b2");
    }

    #[test]
    fn initial_load_ignores_unrelated_fields() {
        let json = r#"{
            "workspace": {"id": "w1"},
            "boards": [],
            "workspaceUsers": [{"id": "u1", "username": "alice"}],
            "userCardSubscriptions": [{"blockId": "x"}]
        }"#;
        let payload: InitialLoadPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.workspace_users.len(), 1);
        assert_eq!(payload.user_card_subscriptions, vec![BlockSubscription::new("x")]);
    }

    #[test]
    fn initial_load_missing_lists_default_empty() {
        let payload: InitialLoadPayload = serde_json::from_str("{}").unwrap();
        assert!(payload.workspace_users.is_empty());
        assert!(payload.user_card_subscriptions.is_empty());
    }
}
