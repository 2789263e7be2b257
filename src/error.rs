use thiserror::Error;

/// Failure classes of the subscription flow.
///
/// `InvalidPhone` and `MissingToken` are detected locally, before any request
/// is issued. The remaining variants carry the human-readable reason reported
/// by the backend or the transport layer.
#[derive(Error, Debug)]
pub enum SubscribeError {
    #[error("invalid phone number: {0:?}")]
    InvalidPhone(String),
    #[error("no session token available")]
    MissingToken,
    #[error("registration rejected: {0}")]
    Registration(String),
    #[error("payment initiation failed: {0}")]
    Initiation(String),
    #[error("status check failed: {0}")]
    Status(String),
    #[error("transport error: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for SubscribeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SubscribeError>;
