//! File-backed collaborator for replaying a workspace snapshot.
//!
//! The fixture is the JSON the boards server would hand out, collapsed
//! into one document:
//!
//! ```json
//! {
//!   "me": {"id": "u1", "username": "alice"},
//!   "workspaceUsers": [{"id": "u1", "username": "alice"}],
//!   "userCardSubscriptions": [{"blockId": "card-1"}]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::client::{UserClient, WorkspaceLoader};
use crate::error::ClientError;
use crate::model::{BlockSubscription, InitialLoadPayload, User};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Fixture {
    pub me: Option<User>,
    pub workspace_users: Vec<User>,
    pub user_card_subscriptions: Vec<BlockSubscription>,
}

/// Serves `get_me` and `initial_load` from a fixture file.
///
/// The file is re-read on every call, so edits between calls are seen.
#[derive(Debug, Clone)]
pub struct FixtureClient {
    path: PathBuf,
    reject_me: bool,
}

impl FixtureClient {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reject_me: false,
        }
    }

    /// Make `get_me` fail as an expired session would.
    pub fn reject_me(mut self, reject: bool) -> Self {
        self.reject_me = reject;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read(&self) -> Result<Fixture, ClientError> {
        let content = tokio::fs::read_to_string(&self.path).await?;
        let fixture: Fixture = serde_json::from_str(&content)?;
        debug!(
            path = %self.path.display(),
            users = fixture.workspace_users.len(),
            subscriptions = fixture.user_card_subscriptions.len(),
            "read workspace fixture"
        );
        Ok(fixture)
    }
}

#[async_trait::async_trait]
impl UserClient for FixtureClient {
    async fn get_me(&self) -> Result<Option<User>, ClientError> {
        if self.reject_me {
            return Err(ClientError::Unauthorized("session rejected".into()));
        }
        Ok(self.read().await?.me)
    }
}

#[async_trait::async_trait]
impl WorkspaceLoader for FixtureClient {
    async fn initial_load(&self) -> Result<InitialLoadPayload, ClientError> {
        let fixture = self.read().await?;
        Ok(InitialLoadPayload {
            workspace_users: fixture.workspace_users,
            user_card_subscriptions: fixture.user_card_subscriptions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_fixture(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("workspace.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[tokio::test]
    async fn serves_me_and_initial_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(
            &dir,
            r#"{
                "me": {"id": "u1", "username": "alice"},
                "workspaceUsers": [
                    {"id": "u1", "username": "alice"},
                    {"id": "u2", "username": "bob"}
                ],
                "userCardSubscriptions": [{"blockId": "card-1"}]
            }"#,
        );
        let client = FixtureClient::new(&path);

        let me = client.get_me().await.unwrap();
        assert_eq!(me.map(|u| u.id), Some("u1".to_string()));

        let payload = client.initial_load().await.unwrap();
        assert_eq!(payload.workspace_users.len(), 2);
        assert_eq!(payload.user_card_subscriptions, vec![BlockSubscription::new("card-1")]);
    }

    #[tokio::test]
    async fn missing_me_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, r#"{"workspaceUsers": []}"#);
        assert_eq!(FixtureClient::new(path).get_me().await.unwrap(), None);
    }

    #[tokio::test]
    async fn rejected_me_is_unauthorized() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, r#"{"me": {"id": "u1", "username": "alice"}}"#);
        let err = FixtureClient::new(path).reject_me(true).get_me().await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let client = FixtureClient::new(dir.path().join("absent.json"));
        assert!(matches!(client.initial_load().await, Err(ClientError::Io(_))));
    }

    #[tokio::test]
    async fn malformed_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_fixture(&dir, "{not json");
        assert!(matches!(
            FixtureClient::new(path).get_me().await,
            Err(ClientError::Decode(_))
        ));
    }
}
