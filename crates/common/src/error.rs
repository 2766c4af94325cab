use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("WebSocket error: {0}")]
    WebSocket(String),

    #[error("Broker error: {0}")]
    Broker(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Timed out after {0}s waiting for the broker")]
    Timeout(u64),

    #[error("Protocol state error: {0}")]
    Protocol(String),
}

impl Error {
    /// Failures of the broker connection itself, as opposed to local bugs.
    /// A transport failure still consumes the session period; a local error
    /// does not.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::WebSocket(_) | Error::Broker(_) | Error::Timeout(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
