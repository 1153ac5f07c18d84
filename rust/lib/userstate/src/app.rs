use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::action::UserAction;
use crate::client::{UserClient, WorkspaceLoader};
use crate::config::UserStateConfig;
use crate::error::UserStateError;
use crate::model::{BlockSubscription, User};
use crate::state::{UserState, WorkspaceUsers};
use crate::store::{SubscriptionId, UserStore};

/// Front door to the user state.
///
/// Local actions and the completions of the external async operations
/// are posted as [`UserAction`]s onto one FIFO queue. The paired
/// [`ActionLoop`] applies them to the [`UserStore`] one at a time, so an
/// async completion never interleaves with a local action mid-update.
///
/// # Examples
///
/// ```ignore
/// let (app, actions) = UserStateApp::new(&UserStateConfig::default());
/// tokio::spawn(actions.run());
///
/// app.spawn_fetch_me(client.clone());
/// app.spawn_initial_load(client);
/// app.follow_block("card-1")?;
///
/// let users = app.workspace_users_list();
/// ```
#[derive(Clone)]
pub struct UserStateApp {
    store: Arc<UserStore>,
    tx: mpsc::UnboundedSender<UserAction>,
}

/// Consumer side of the action queue.
///
/// The queue closes once every [`UserStateApp`] clone is dropped.
pub struct ActionLoop {
    store: Arc<UserStore>,
    rx: mpsc::UnboundedReceiver<UserAction>,
}

impl UserStateApp {
    /// Create the app with empty state and its action loop.
    pub fn new(config: &UserStateConfig) -> (Self, ActionLoop) {
        Self::with_store(Arc::new(UserStore::with_collator(config.collator())))
    }

    /// Wrap an existing store, e.g. one shared with other readers.
    pub fn with_store(store: Arc<UserStore>) -> (Self, ActionLoop) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Self {
            store: Arc::clone(&store),
            tx,
        };
        (app, ActionLoop { store, rx })
    }

    /// Post an action to the queue.
    pub fn post(&self, action: UserAction) -> Result<(), UserStateError> {
        self.tx.send(action).map_err(|_| UserStateError::QueueClosed)
    }

    // ====================================================================
    // Local actions
    // ====================================================================

    pub fn set_me(&self, user: User) -> Result<(), UserStateError> {
        self.post(UserAction::SetMe(user))
    }

    pub fn set_workspace_users(&self, users: Vec<User>) -> Result<(), UserStateError> {
        self.post(UserAction::SetWorkspaceUsers(users))
    }

    pub fn follow_block(&self, block_id: impl Into<String>) -> Result<(), UserStateError> {
        self.post(UserAction::FollowBlock(block_id.into()))
    }

    pub fn unfollow_block(&self, block_id: impl Into<String>) -> Result<(), UserStateError> {
        self.post(UserAction::UnfollowBlock(block_id.into()))
    }

    // ====================================================================
    // External async operations
    // ====================================================================

    /// Fetch the current user and post the outcome.
    ///
    /// Any error collapses to `users/fetchMe/rejected`; only a closed
    /// queue is reported back.
    pub async fn fetch_me<C>(&self, client: &C) -> Result<(), UserStateError>
    where
        C: UserClient + ?Sized,
    {
        match client.get_me().await {
            Ok(user) => self.post(UserAction::FetchMeFulfilled(user)),
            Err(e) => {
                debug!(error = %e, "fetch of current user failed");
                self.post(UserAction::FetchMeRejected {
                    error: e.to_string(),
                })
            }
        }
    }

    /// Run the workspace initial load and post the outcome.
    ///
    /// On failure nothing is posted and the error is returned; the load
    /// flow's error handling lives with its owner.
    pub async fn initial_load<L>(&self, loader: &L) -> Result<(), UserStateError>
    where
        L: WorkspaceLoader + ?Sized,
    {
        match loader.initial_load().await {
            Ok(payload) => self.post(UserAction::InitialLoadFulfilled(payload)),
            Err(e) => {
                warn!(error = %e, "workspace initial load failed");
                Err(e.into())
            }
        }
    }

    /// [`fetch_me`](Self::fetch_me) on a spawned task.
    pub fn spawn_fetch_me<C>(&self, client: Arc<C>) -> JoinHandle<Result<(), UserStateError>>
    where
        C: UserClient + ?Sized,
    {
        let app = self.clone();
        tokio::spawn(async move { app.fetch_me(client.as_ref()).await })
    }

    /// [`initial_load`](Self::initial_load) on a spawned task.
    pub fn spawn_initial_load<L>(&self, loader: Arc<L>) -> JoinHandle<Result<(), UserStateError>>
    where
        L: WorkspaceLoader + ?Sized,
    {
        let app = self.clone();
        tokio::spawn(async move { app.initial_load(loader.as_ref()).await })
    }

    // ====================================================================
    // Reads
    // ====================================================================

    pub fn state(&self) -> Arc<UserState> {
        self.store.state()
    }

    pub fn me(&self) -> Option<User> {
        self.store.me()
    }

    pub fn logged_in(&self) -> Option<bool> {
        self.store.logged_in()
    }

    pub fn workspace_users(&self) -> WorkspaceUsers {
        self.store.workspace_users()
    }

    pub fn workspace_users_list(&self) -> Arc<Vec<User>> {
        self.store.workspace_users_list()
    }

    pub fn user(&self, user_id: &str) -> Option<User> {
        self.store.user(user_id)
    }

    pub fn block_subscriptions(&self) -> Vec<BlockSubscription> {
        self.store.block_subscriptions()
    }

    pub fn subscribe<F>(&self, pattern: &str, handler: F) -> SubscriptionId
    where
        F: Fn(&str, &UserState) + Send + Sync + 'static,
    {
        self.store.subscribe(pattern, handler)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.unsubscribe(id)
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }
}

impl ActionLoop {
    /// Apply queued actions in order until the queue closes.
    ///
    /// Returns the number of actions applied.
    pub async fn run(mut self) -> usize {
        let mut applied = 0;
        while let Some(action) = self.rx.recv().await {
            self.store.dispatch(action);
            applied += 1;
        }
        debug!(applied, "user action queue closed");
        applied
    }

    /// Apply whatever is queued right now without waiting.
    pub fn drain(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(action) = self.rx.try_recv() {
            self.store.dispatch(action);
            applied += 1;
        }
        applied
    }

    pub fn store(&self) -> &Arc<UserStore> {
        &self.store
    }
}

impl std::fmt::Debug for UserStateApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserStateApp")
            .field("store", &self.store)
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use crate::model::InitialLoadPayload;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Mutex;

    struct StaticClient {
        me: Result<Option<User>, ClientError>,
        load: Result<InitialLoadPayload, ClientError>,
    }

    #[async_trait::async_trait]
    impl UserClient for StaticClient {
        async fn get_me(&self) -> Result<Option<User>, ClientError> {
            self.me.clone()
        }
    }

    #[async_trait::async_trait]
    impl WorkspaceLoader for StaticClient {
        async fn initial_load(&self) -> Result<InitialLoadPayload, ClientError> {
            self.load.clone()
        }
    }

    fn new_app() -> (UserStateApp, ActionLoop) {
        UserStateApp::new(&UserStateConfig::default())
    }

    // ========================================================================
    // Local actions
    // ========================================================================

    #[test]
    fn actions_apply_only_when_drained() {
        let (app, mut actions) = new_app();
        app.follow_block("a").unwrap();
        app.follow_block("b").unwrap();
        assert!(app.block_subscriptions().is_empty());

        assert_eq!(actions.drain(), 2);
        assert_eq!(
            app.block_subscriptions(),
            vec![BlockSubscription::new("a"), BlockSubscription::new("b")]
        );
    }

    #[test]
    fn actions_apply_in_post_order() {
        let (app, mut actions) = new_app();
        app.follow_block("a").unwrap();
        app.unfollow_block("a").unwrap();
        app.follow_block("a").unwrap();
        actions.drain();
        assert_eq!(app.block_subscriptions(), vec![BlockSubscription::new("a")]);
    }

    #[test]
    fn set_me_and_workspace_users() {
        let (app, mut actions) = new_app();
        app.set_me(User::new("u1", "alice")).unwrap();
        app.set_workspace_users(vec![User::new("u1", "alice"), User::new("u2", "bob")])
            .unwrap();
        actions.drain();

        assert_eq!(app.me().map(|u| u.id), Some("u1".to_string()));
        assert_eq!(app.logged_in(), None);
        assert_eq!(app.workspace_users().len(), 2);
        assert_eq!(app.user("u2").map(|u| u.username), Some("bob".to_string()));
    }

    #[test]
    fn post_after_loop_dropped_fails() {
        let (app, actions) = new_app();
        drop(actions);
        let err = app.follow_block("a").unwrap_err();
        assert!(matches!(err, UserStateError::QueueClosed));
    }

    // ========================================================================
    // Async completions
    // ========================================================================

    #[tokio::test]
    async fn fetch_me_success_logs_in() {
        let (app, mut actions) = new_app();
        let client = StaticClient {
            me: Ok(Some(User::new("u1", "alice"))),
            load: Ok(InitialLoadPayload::default()),
        };

        app.fetch_me(&client).await.unwrap();
        actions.drain();

        assert_eq!(app.me().map(|u| u.username), Some("alice".to_string()));
        assert_eq!(app.logged_in(), Some(true));
    }

    #[tokio::test]
    async fn fetch_me_without_user_logs_out() {
        let (app, mut actions) = new_app();
        let client = StaticClient {
            me: Ok(None),
            load: Ok(InitialLoadPayload::default()),
        };

        app.fetch_me(&client).await.unwrap();
        actions.drain();

        assert!(app.me().is_none());
        assert_eq!(app.logged_in(), Some(false));
    }

    #[tokio::test]
    async fn fetch_me_error_collapses_to_logged_out() {
        for error in [
            ClientError::Network("reset".into()),
            ClientError::Unauthorized("expired".into()),
            ClientError::Decode("bad json".into()),
        ] {
            let (app, mut actions) = new_app();
            app.set_me(User::new("u1", "alice")).unwrap();
            let client = StaticClient {
                me: Err(error),
                load: Ok(InitialLoadPayload::default()),
            };

            app.fetch_me(&client).await.unwrap();
            actions.drain();

            assert!(app.me().is_none());
            assert_eq!(app.logged_in(), Some(false));
        }
    }

    #[tokio::test]
    async fn initial_load_failure_leaves_state() {
        let (app, mut actions) = new_app();
        app.follow_block("keep").unwrap();
        actions.drain();

        let client = StaticClient {
            me: Ok(None),
            load: Err(ClientError::Server {
                status: 500,
                message: "boom".into(),
            }),
        };
        let err = app.initial_load(&client).await.unwrap_err();
        assert!(matches!(err, UserStateError::Client(ClientError::Server { status: 500, .. })));

        assert_eq!(actions.drain(), 0);
        assert_eq!(app.block_subscriptions(), vec![BlockSubscription::new("keep")]);
    }

    #[tokio::test]
    async fn initial_load_replaces_wholesale() {
        let (app, mut actions) = new_app();
        app.follow_block("old").unwrap();
        app.set_workspace_users(vec![User::new("z", "zed")]).unwrap();
        actions.drain();

        let client = StaticClient {
            me: Ok(None),
            load: Ok(InitialLoadPayload {
                workspace_users: vec![User::new("a", "ann"), User::new("b", "ben")],
                user_card_subscriptions: vec![BlockSubscription::new("x")],
            }),
        };
        app.initial_load(&client).await.unwrap();
        actions.drain();

        let mut ids: Vec<String> = app.workspace_users().keys().cloned().collect();
        ids.sort();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(app.block_subscriptions(), vec![BlockSubscription::new("x")]);
    }

    // ========================================================================
    // Action loop
    // ========================================================================

    #[tokio::test]
    async fn run_applies_until_all_senders_dropped() {
        let (app, actions) = new_app();
        let handle = tokio::spawn(actions.run());

        let client = Arc::new(StaticClient {
            me: Ok(Some(User::new("u1", "alice"))),
            load: Ok(InitialLoadPayload {
                workspace_users: vec![User::new("u1", "alice")],
                user_card_subscriptions: vec![],
            }),
        });
        app.spawn_fetch_me(client.clone()).await.unwrap().unwrap();
        app.spawn_initial_load(client).await.unwrap().unwrap();
        app.follow_block("b1").unwrap();

        let reader = app.store().clone();
        drop(app);
        let applied = handle.await.unwrap();

        assert_eq!(applied, 3);
        assert_eq!(reader.logged_in(), Some(true));
        assert_eq!(reader.workspace_users_list().len(), 1);
        assert_eq!(reader.block_subscriptions(), vec![BlockSubscription::new("b1")]);
    }

    #[tokio::test]
    async fn later_completion_wins() {
        let (app, mut actions) = new_app();
        let ok = StaticClient {
            me: Ok(Some(User::new("u1", "alice"))),
            load: Ok(InitialLoadPayload::default()),
        };
        let failing = StaticClient {
            me: Err(ClientError::Network("offline".into())),
            load: Ok(InitialLoadPayload::default()),
        };

        app.fetch_me(&ok).await.unwrap();
        app.fetch_me(&failing).await.unwrap();
        actions.drain();
        assert_eq!(app.logged_in(), Some(false));

        app.fetch_me(&ok).await.unwrap();
        actions.drain();
        assert_eq!(app.logged_in(), Some(true));
    }

    #[tokio::test]
    async fn subscribers_see_completions_in_order() {
        let (app, mut actions) = new_app();
        let paths = Arc::new(Mutex::new(Vec::<String>::new()));
        let p = paths.clone();
        app.subscribe("#", move |path, _| {
            p.lock().unwrap().push(path.to_string());
        });

        let client = StaticClient {
            me: Err(ClientError::Unauthorized("no session".into())),
            load: Ok(InitialLoadPayload::default()),
        };
        app.follow_block("a").unwrap();
        app.fetch_me(&client).await.unwrap();
        app.initial_load(&client).await.unwrap();
        actions.drain();

        assert_eq!(
            *paths.lock().unwrap(),
            vec![
                "users/followBlock",
                "users/fetchMe/rejected",
                "initialLoad/fulfilled"
            ]
        );
    }

    #[test]
    fn unsubscribe_through_app() {
        let (app, mut actions) = new_app();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let id = app.subscribe("users/#", move |_, _| {
            c.fetch_add(1, Ordering::Relaxed);
        });

        app.follow_block("a").unwrap();
        actions.drain();
        assert!(app.unsubscribe(id));
        app.follow_block("b").unwrap();
        actions.drain();

        assert_eq!(count.load(Ordering::Relaxed), 1);
    }

    fn _assert_app_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}
        assert_send::<UserStateApp>();
        assert_sync::<UserStateApp>();
        assert_send::<ActionLoop>();
    }
}
