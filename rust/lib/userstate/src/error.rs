use thiserror::Error;

/// Failure reported by an external collaborator (user fetch, workspace load).
///
/// The user state never branches on the variant: a failed fetch of the
/// current user always means "not logged in".
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("network: {0}")]
    Network(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("decode: {0}")]
    Decode(String),

    #[error("io: {0}")]
    Io(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Decode(error.to_string())
    }
}

impl From<std::io::Error> for ClientError {
    fn from(error: std::io::Error) -> Self {
        ClientError::Io(error.to_string())
    }
}

#[derive(Error, Debug)]
pub enum UserStateError {
    /// The action loop has stopped; nothing will apply further actions.
    #[error("action queue is closed")]
    QueueClosed,

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Client(#[from] ClientError),
}
