use thiserror::Error;

/// Failures raised by a transport implementation.
///
/// Everything here is transient from the engine's point of view: the
/// pollers pause and retry, they never abort.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Failures from a user-initiated action request.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Terminal, user-visible rejection. The local state is left
    /// untouched so the user can retry.
    #[error("action rejected: {message}")]
    Rejected { message: String },
    #[error(transparent)]
    Transport(#[from] TransportError),
}
