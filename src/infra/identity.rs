//! Remote identity provider adapter.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::application::identity::{AuthError, Identity, IdentityProvider};

const USER_ENDPOINT: &str = "auth/v1/user";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    msg: Option<String>,
    error_description: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ProviderErrorBody {
    /// The most descriptive message present; providers mix `msg`, `error_description` and `error`.
    fn into_message(self) -> Option<String> {
        [self.msg, self.error_description, self.message, self.error]
            .into_iter()
            .flatten()
            .find(|message| !message.trim().is_empty())
    }
}

/// Verifies access tokens by asking the hosted provider who they belong to.
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    user_url: Url,
    api_key: String,
}

impl RemoteIdentityProvider {
    pub fn new(base_url: &Url, api_key: impl Into<String>) -> Result<Self, AuthError> {
        let user_url = join_path(base_url, USER_ENDPOINT)?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;

        Ok(Self {
            client,
            user_url,
            api_key: api_key.into(),
        })
    }
}

fn join_path(base: &Url, path: &str) -> Result<Url, AuthError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let with_slash = format!("{}/", base.path());
        base.set_path(&with_slash);
    }
    base.join(path)
        .map_err(|err| AuthError::Unavailable(format!("invalid provider url: {err}")))
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let response = self
            .client
            .get(self.user_url.clone())
            .bearer_auth(token)
            .header("apikey", &self.api_key)
            .send()
            .await
            .map_err(|err| AuthError::Unavailable(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let user: UserResponse = response
                .json()
                .await
                .map_err(|err| AuthError::Unavailable(err.to_string()))?;
            return Ok(Identity {
                subject: user.id,
                email: user.email,
            });
        }

        let message = response
            .json::<ProviderErrorBody>()
            .await
            .ok()
            .and_then(ProviderErrorBody::into_message);

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::BAD_REQUEST => Err(
                AuthError::Invalid(message.unwrap_or_else(|| "invalid access token".to_string())),
            ),
            other => Err(AuthError::Unavailable(format!(
                "provider responded with {other}"
            ))),
        }
    }
}
