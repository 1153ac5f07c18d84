//! Actions accepted by the user state.
//!
//! Local UI actions and the completions of the two external async
//! operations share one enum, so they travel through the same queue and
//! are applied by the same reducer.

use crate::model::{InitialLoadPayload, User};

/// Stable action paths, `/`-separated.
pub mod path {
    pub const SET_ME: &str = "users/setMe";
    pub const SET_WORKSPACE_USERS: &str = "users/setWorkspaceUsers";
    pub const FOLLOW_BLOCK: &str = "users/followBlock";
    pub const UNFOLLOW_BLOCK: &str = "users/unfollowBlock";
    pub const FETCH_ME_FULFILLED: &str = "users/fetchMe/fulfilled";
    pub const FETCH_ME_REJECTED: &str = "users/fetchMe/rejected";
    pub const INITIAL_LOAD_FULFILLED: &str = "initialLoad/fulfilled";
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    /// Replace `me` unconditionally.
    SetMe(User),
    /// Replace the workspace users with these, indexed by id.
    SetWorkspaceUsers(Vec<User>),
    /// Append a subscription to the block. Duplicates are kept.
    FollowBlock(String),
    /// Drop every subscription to the block.
    UnfollowBlock(String),
    /// Fetch of the current user resolved; `None` means nobody is logged in.
    FetchMeFulfilled(Option<User>),
    /// Fetch of the current user failed. The message is for diagnostics only.
    FetchMeRejected { error: String },
    /// Workspace initial load resolved.
    InitialLoadFulfilled(InitialLoadPayload),
}

impl UserAction {
    pub fn path(&self) -> &'static str {
        match self {
            UserAction::SetMe(_) => path::SET_ME,
            UserAction::SetWorkspaceUsers(_) => path::SET_WORKSPACE_USERS,
            UserAction::FollowBlock(_) => path::FOLLOW_BLOCK,
            UserAction::UnfollowBlock(_) => path::UNFOLLOW_BLOCK,
            UserAction::FetchMeFulfilled(_) => path::FETCH_ME_FULFILLED,
            UserAction::FetchMeRejected { .. } => path::FETCH_ME_REJECTED,
            UserAction::InitialLoadFulfilled(_) => path::INITIAL_LOAD_FULFILLED,
        }
    }

    /// True for completions of external async operations.
    pub fn is_completion(&self) -> bool {
        matches!(
            self,
            UserAction::FetchMeFulfilled(_)
                | UserAction::FetchMeRejected { .. }
                | UserAction::InitialLoadFulfilled(_)
        )
    }
}
