use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    /// Non-2xx response; `message` is the server's `{ message }` or an operation fallback.
    #[error("{message}")]
    Request { status: u16, message: String },
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("{0}")]
    Identity(String),
    #[error("request key is not ready")]
    NotReady,
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Request { status, .. } => Some(*status),
            _ => None,
        }
    }
}
