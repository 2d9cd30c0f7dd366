use thiserror::Error;

/// Everything that can go wrong while fetching the Pokemon list.
///
/// Errors are stored in signals and query state, so they own their messages
/// and are cheap to clone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a body.
    #[error("network error: {0}")]
    Network(String),
    /// The body was not the JSON document we expected.
    #[error("invalid response body: {0}")]
    Body(String),
    /// Injected on purpose to exercise error rendering.
    #[error("{0}")]
    Synthetic(String),
}

impl FetchError {
    /// A synthetic failure with the given message.
    pub fn synthetic(message: impl Into<String>) -> Self {
        FetchError::Synthetic(message.into())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Body(err.to_string())
    }
}
