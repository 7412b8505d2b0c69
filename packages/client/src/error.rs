//! Error types for the chat client.

use thiserror::Error;

/// Failure of a single REST call.
///
/// Cloneable so it can be carried inside [`State`](crate::domain::State)
/// values published to several subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connection refused, timeout)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The backend rejected the access token
    #[error("Unauthorized")]
    Unauthorized,

    /// The backend answered with a non-success status code
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ApiError::Decode(error.to_string())
        } else {
            ApiError::Transport(error.to_string())
        }
    }
}

/// Errors of the server-sent event stream
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SseError {
    /// The subscription request was rejected because of missing or expired credentials
    #[error("Event stream subscription unauthorized")]
    Unauthorized,

    /// The subscription request failed
    #[error("Event stream connection error: {0}")]
    Connect(ApiError),

    /// Reading from an established stream failed
    #[error("Event stream read error: {0}")]
    Read(String),

    /// The server ended the stream
    #[error("Event stream closed by server")]
    Closed,
}

/// Client-level errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid command-line or environment configuration
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Sse(#[from] SseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The line editor could not be started
    #[error("Readline error: {0}")]
    Readline(String),
}
