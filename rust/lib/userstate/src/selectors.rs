//! Read-only views over [`UserState`].

use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use crate::collate::Collator;
use crate::model::User;
use crate::state::{UserState, WorkspaceUsers};

pub fn get_me(state: &UserState) -> Option<&User> {
    state.me.as_ref()
}

/// `None` until the first fetch of the current user resolves.
pub fn get_logged_in(state: &UserState) -> Option<bool> {
    state.logged_in.as_option()
}

pub fn get_workspace_users(state: &UserState) -> &WorkspaceUsers {
    &state.workspace_users
}

pub fn get_user<'a>(state: &'a UserState, user_id: &str) -> Option<&'a User> {
    state.workspace_users.get(user_id)
}

/// Curried form of [`get_user`], for callers that hold on to a selector.
pub fn user_selector(user_id: impl Into<String>) -> impl Fn(&UserState) -> Option<User> {
    let user_id = user_id.into();
    move |state: &UserState| get_user(state, &user_id).cloned()
}

/// Workspace users sorted by username, memoized on the identity of the
/// user map.
///
/// The cached list is returned as long as the state carries the same
/// `Arc` it was computed from. Replacing the map, even with equal
/// contents, recomputes.
#[derive(Debug, Default)]
pub struct WorkspaceUsersList {
    collator: Collator,
    cache: Mutex<Option<Cached>>,
}

#[derive(Debug)]
struct Cached {
    source: WorkspaceUsers,
    sorted: Arc<Vec<User>>,
}

impl WorkspaceUsersList {
    pub fn new(collator: Collator) -> Self {
        Self {
            collator,
            cache: Mutex::new(None),
        }
    }

    pub fn select(&self, state: &UserState) -> Arc<Vec<User>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = cache.as_ref() {
            if Arc::ptr_eq(&cached.source, &state.workspace_users) {
                return Arc::clone(&cached.sorted);
            }
        }

        trace!(users = state.workspace_users.len(), "sorting workspace users");
        let mut users: Vec<User> = state.workspace_users.values().cloned().collect();
        self.collator.sort_by_key(&mut users, |u| u.username.as_str());
        let sorted = Arc::new(users);

        *cache = Some(Cached {
            source: Arc::clone(&state.workspace_users),
            sorted: Arc::clone(&sorted),
        });
        sorted
    }
}
