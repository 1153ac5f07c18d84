//! Pure state transitions.

use crate::action::UserAction;
use crate::model::BlockSubscription;
use crate::state::{LoginStatus, UserState, index_by_id};

/// Apply `action` to `state` and return the next state.
///
/// No I/O. Fields the action does not touch are carried over; in
/// particular `workspace_users` keeps its `Arc` unless replaced.
pub fn reduce(state: &UserState, action: UserAction) -> UserState {
    let mut next = state.clone();
    match action {
        UserAction::SetMe(user) => {
            next.me = Some(user);
        }
        UserAction::SetWorkspaceUsers(users) => {
            next.workspace_users = index_by_id(users);
        }
        UserAction::FollowBlock(block_id) => {
            next.block_subscriptions.push(BlockSubscription { block_id });
        }
        UserAction::UnfollowBlock(block_id) => {
            next.block_subscriptions.retain(|s| s.block_id != block_id);
        }
        UserAction::FetchMeFulfilled(user) => {
            next.me = user;
            next.logged_in = if next.me.is_some() {
                LoginStatus::LoggedIn
            } else {
                LoginStatus::LoggedOut
            };
        }
        UserAction::FetchMeRejected { .. } => {
            next.me = None;
            next.logged_in = LoginStatus::LoggedOut;
        }
        UserAction::InitialLoadFulfilled(payload) => {
            next.workspace_users = index_by_id(payload.workspace_users);
            next.block_subscriptions = payload.user_card_subscriptions;
        }
    }
    next
}
