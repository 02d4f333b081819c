use async_trait::async_trait;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

const BEARER_PREFIX: &str = "Bearer ";

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing access token")]
    Missing,
    #[error("{0}")]
    Invalid(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

/// The verified caller behind an admin request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub subject: String,
    pub email: Option<String>,
}

impl Identity {
    /// Label used in logs for actions taken by this identity.
    pub fn actor(&self) -> &str {
        self.email.as_deref().unwrap_or(&self.subject)
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}

/// Pulls the access token out of an `Authorization` header value.
///
/// The raw value is the token; a `Bearer ` prefix is accepted and stripped.
pub fn extract_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim_start).unwrap_or_default();
    let token = value.strip_prefix(BEARER_PREFIX).unwrap_or(value).trim();
    if token.is_empty() || token == BEARER_PREFIX.trim_end() {
        return Err(AuthError::Missing);
    }
    Ok(token)
}

/// Verifies tokens against a fixed set configured at startup.
pub struct StaticTokenIdentity {
    digests: Vec<[u8; 32]>,
}

impl StaticTokenIdentity {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let digests = tokens
            .into_iter()
            .filter(|token| !token.as_ref().is_empty())
            .map(|token| hash_token(token.as_ref()))
            .collect();
        Self { digests }
    }

    pub fn is_empty(&self) -> bool {
        self.digests.is_empty()
    }
}

#[async_trait]
impl IdentityProvider for StaticTokenIdentity {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let candidate = hash_token(token);
        let matched = self
            .digests
            .iter()
            .position(|digest| bool::from(digest.ct_eq(&candidate)));

        match matched {
            Some(index) => Ok(Identity {
                subject: format!("static-token-{index}"),
                email: None,
            }),
            None => Err(AuthError::Invalid("invalid access token".to_string())),
        }
    }
}

fn hash_token(token: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    let mut digest = [0u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}
