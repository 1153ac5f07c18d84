//! External async capabilities the user state reacts to.
//!
//! Implementations own transport, auth, retries and timeouts. The user
//! state only sees the terminal outcome of each call.

use std::sync::Arc;

use crate::error::ClientError;
use crate::model::{InitialLoadPayload, User};

/// Fetches the currently authenticated user.
#[async_trait::async_trait]
pub trait UserClient: Send + Sync + 'static {
    /// `Ok(None)` when the server answers but nobody is logged in.
    async fn get_me(&self) -> Result<Option<User>, ClientError>;
}

/// Loads the workspace data needed at startup.
#[async_trait::async_trait]
pub trait WorkspaceLoader: Send + Sync + 'static {
    async fn initial_load(&self) -> Result<InitialLoadPayload, ClientError>;
}

#[async_trait::async_trait]
impl<T: UserClient + ?Sized> UserClient for Arc<T> {
    async fn get_me(&self) -> Result<Option<User>, ClientError> {
        (**self).get_me().await
    }
}

#[async_trait::async_trait]
impl<T: WorkspaceLoader + ?Sized> WorkspaceLoader for Arc<T> {
    async fn initial_load(&self) -> Result<InitialLoadPayload, ClientError> {
        (**self).initial_load().await
    }
}
