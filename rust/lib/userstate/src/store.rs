use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, trace};

use crate::action::UserAction;
use crate::collate::Collator;
use crate::model::{BlockSubscription, User};
use crate::reducer::reduce;
use crate::selectors::{self, WorkspaceUsersList};
use crate::state::{UserState, WorkspaceUsers};

/// Callback type for state change notifications: `(action_path, new_state)`.
pub type ChangeHandler = Arc<dyn Fn(&str, &UserState) + Send + Sync>;

/// Unique handle for a subscription, returned by `UserStore::subscribe()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Owner of the user state and its single dispatch point.
///
/// - `dispatch(action)` reduces under the write lock, swaps the snapshot,
///   then notifies subscribers whose pattern matches the action path.
/// - `state()` returns the current snapshot (Arc clone, cheap).
/// - `subscribe(pattern, handler)` / `unsubscribe(id)` manage observers.
///
/// Patterns use `/`-separated segments with MQTT-style wildcards:
/// `users/followBlock`, `users/fetchMe/+`, `users/#`, `#`.
pub struct UserStore {
    state: RwLock<Arc<UserState>>,
    handlers: RwLock<Vec<HandlerEntry>>,
    next_id: AtomicU64,
    users_list: WorkspaceUsersList,
}

struct HandlerEntry {
    id: SubscriptionId,
    pattern: String,
    handler: ChangeHandler,
}

impl UserStore {
    /// Create a store holding the initial (empty) state.
    pub fn new() -> Self {
        Self::with_collator(Collator::default())
    }

    /// Create a store whose sorted user list uses `collator`.
    pub fn with_collator(collator: Collator) -> Self {
        Self {
            state: RwLock::new(Arc::new(UserState::new())),
            handlers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            users_list: WorkspaceUsersList::new(collator),
        }
    }

    /// Apply an action and return the resulting snapshot.
    ///
    /// Dispatches are serialized by the write lock; no reader or other
    /// dispatch observes a partially applied update. Subscribers run after
    /// the lock is released and may read the store.
    pub fn dispatch(&self, action: UserAction) -> Arc<UserState> {
        let path = action.path();
        let completion = action.is_completion();
        let next = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            let next = Arc::new(reduce(&state, action));
            *state = Arc::clone(&next);
            next
        };
        if completion {
            debug!(action = path, "user state updated by completion");
        } else {
            trace!(action = path, "user state updated");
        }

        let matched: Vec<ChangeHandler> = {
            let handlers = self.handlers.read().unwrap_or_else(PoisonError::into_inner);
            handlers
                .iter()
                .filter(|entry| pattern_matches(&entry.pattern, path))
                .map(|entry| Arc::clone(&entry.handler))
                .collect()
        };
        for handler in matched {
            handler(path, &next);
        }
        next
    }

    /// Current state snapshot.
    pub fn state(&self) -> Arc<UserState> {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*state)
    }

    // ====================================================================
    // Selectors over the current snapshot
    // ====================================================================

    pub fn me(&self) -> Option<User> {
        selectors::get_me(&self.state()).cloned()
    }

    pub fn logged_in(&self) -> Option<bool> {
        selectors::get_logged_in(&self.state())
    }

    pub fn workspace_users(&self) -> WorkspaceUsers {
        Arc::clone(selectors::get_workspace_users(&self.state()))
    }

    /// Sorted by username; the same `Arc` is returned until the user map
    /// is replaced.
    pub fn workspace_users_list(&self) -> Arc<Vec<User>> {
        self.users_list.select(&self.state())
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        selectors::get_user(&self.state(), user_id).cloned()
    }

    pub fn block_subscriptions(&self) -> Vec<BlockSubscription> {
        self.state().block_subscriptions.clone()
    }

    // ====================================================================
    // Subscriptions
    // ====================================================================

    /// Observe dispatches whose action path matches `pattern`.
    ///
    /// The handler runs synchronously on the dispatching thread.
    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &UserState) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        handlers.push(HandlerEntry {
            id,
            pattern: pattern.to_string(),
            handler: Arc::new(handler),
        });
        id
    }

    /// Remove a subscription. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.write().unwrap_or_else(PoisonError::into_inner);
        let before = handlers.len();
        handlers.retain(|entry| entry.id != id);
        handlers.len() < before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.read().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for UserStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStore")
            .field("state", &self.state())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// `+` matches one segment, a trailing `#` matches zero or more.
fn pattern_matches(pattern: &str, path: &str) -> bool {
    let mut pattern = pattern.split('/');
    let mut path = path.split('/');
    loop {
        match (pattern.next(), path.next()) {
            (Some("#"), _) => return true,
            (Some("+"), Some(_)) => continue,
            (Some(p), Some(s)) if p == s => continue,
            (None, None) => return true,
            _ => return false,
        }
    }
}
