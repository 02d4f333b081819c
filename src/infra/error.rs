use std::net::SocketAddr;

use thiserror::Error;

use crate::application::identity::AuthError;

/// Startup failures of the server's adapters.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("database `{url}` unavailable: {source}")]
    Database {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("identity provider client could not be built: {0}")]
    Identity(#[source] AuthError),
    #[error("upload storage at `{directory}` unusable: {source}")]
    Storage {
        directory: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
}

impl InfraError {
    pub fn database(url: &str, source: sqlx::Error) -> Self {
        Self::Database {
            url: url.to_string(),
            source,
        }
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
