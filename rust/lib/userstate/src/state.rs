//! The user state slice.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::model::{BlockSubscription, User};

/// Workspace users keyed by user id.
///
/// Held behind an `Arc` so that reducers which leave the map alone keep
/// its identity; the sorted-list selector memoizes on that identity.
pub type WorkspaceUsers = Arc<HashMap<String, User>>;

/// Whether the current user is logged in.
///
/// `Unknown` until the first fetch of the current user resolves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LoginStatus {
    #[default]
    Unknown,
    LoggedIn,
    LoggedOut,
}

impl LoginStatus {
    /// `None` while unknown, otherwise whether a user is logged in.
    pub fn as_option(self) -> Option<bool> {
        match self {
            LoginStatus::Unknown => None,
            LoginStatus::LoggedIn => Some(true),
            LoginStatus::LoggedOut => Some(false),
        }
    }
}

impl Serialize for LoginStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

/// Current user, workspace users, login status and block subscriptions.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserState {
    pub me: Option<User>,
    pub workspace_users: WorkspaceUsers,
    pub logged_in: LoginStatus,
    pub block_subscriptions: Vec<BlockSubscription>,
}

impl UserState {
    /// Empty state as created at application start.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Index users by id. Later entries win on duplicate ids.
pub fn index_by_id(users: Vec<User>) -> WorkspaceUsers {
    let mut map = HashMap::with_capacity(users.len());
    for user in users {
        map.insert(user.id.clone(), user);
    }
    Arc::new(map)
}
