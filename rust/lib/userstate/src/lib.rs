//! User state: client-side state for a collaborative boards workspace.
//!
//! Holds the authenticated user (`me`), the workspace users, a tri-state
//! login flag, and the blocks the current user follows. Rust owns the
//! state; the presentation layer only reads it.
//!
//! # Pieces
//!
//! - [`UserState`]: the state itself, serializable for hosts that render
//!   from JSON snapshots
//! - [`UserAction`] + [`reduce`]: every transition is a typed action
//!   applied by a pure reducer
//! - [`UserStore`]: single owner and dispatch point, with change
//!   subscriptions keyed by action path (`users/#`, `users/fetchMe/+`)
//! - [`UserStateApp`] + [`ActionLoop`]: FIFO queue through which local
//!   actions and completions of the external fetch/load calls are applied
//! - [`selectors`]: read accessors, including the memoized sorted list
//!
//! # Example
//!
//! ```ignore
//! use openerp_userstate::{UserStateApp, UserStateConfig};
//!
//! let (app, actions) = UserStateApp::new(&UserStateConfig::default());
//! tokio::spawn(actions.run());
//!
//! app.fetch_me(&client).await?;
//! app.initial_load(&client).await?;
//! app.follow_block("card-1")?;
//!
//! for user in app.workspace_users_list().iter() {
//!     println!("{}", user.username);
//! }
//! ```

pub mod action;
pub mod app;
pub mod client;
pub mod collate;
pub mod config;
pub mod error;
pub mod fixture;
pub mod model;
pub mod reducer;
pub mod selectors;
pub mod state;
pub mod store;

pub use action::UserAction;
pub use app::{ActionLoop, UserStateApp};
pub use client::{UserClient, WorkspaceLoader};
pub use collate::{CaseFirst, CollationConfig, Collator};
pub use config::UserStateConfig;
pub use error::{ClientError, UserStateError};
pub use model::{BlockSubscription, InitialLoadPayload, User};
pub use reducer::reduce;
pub use state::{LoginStatus, UserState, WorkspaceUsers};
pub use store::{ChangeHandler, SubscriptionId, UserStore};
