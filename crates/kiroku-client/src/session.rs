//! Session tracking against the hosted identity provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{info, warn};
use url::Url;

use crate::error::ClientError;

const SIGN_IN_FAILED: &str = "ログインに失敗しました";
const SIGN_UP_FAILED: &str = "登録に失敗しました";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Provider-issued expiry; `None` for tokens that never expire on the client side.
    #[serde(default, with = "time::serde::timestamp::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub user: SessionUser,
}

impl Session {
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

/// Where the current session comes from.
#[async_trait]
pub trait SessionSource: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, ClientError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Not loaded yet.
    #[default]
    Unknown,
    Guest,
    Authenticated(Session),
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Authenticated(session) => Some(session.access_token.as_str()),
            _ => None,
        }
    }
}

/// Holds the last observed session; call [`SessionProvider::refresh`] on every navigation.
pub struct SessionProvider<S> {
    source: S,
    state: RwLock<SessionState>,
}

impl<S: SessionSource> SessionProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: RwLock::new(SessionState::Unknown),
        }
    }

    pub async fn refresh(&self) -> Result<SessionState, ClientError> {
        let next = match self.source.current_session().await {
            Ok(Some(session)) if !session.is_expired(OffsetDateTime::now_utc()) => {
                SessionState::Authenticated(session)
            }
            Ok(_) => SessionState::Guest,
            Err(err) => {
                warn!(
                    target = "kiroku_client::session",
                    error = %err,
                    "failed to load session"
                );
                *self.state.write().await = SessionState::Guest;
                return Err(err);
            }
        };
        *self.state.write().await = next.clone();
        Ok(next)
    }

    pub async fn state(&self) -> SessionState {
        self.state.read().await.clone()
    }

    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token().map(str::to_string)
    }

    pub async fn is_loading(&self) -> bool {
        matches!(*self.state.read().await, SessionState::Unknown)
    }
}

/// A fixed token, e.g. read from a key file or the environment.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    token: Option<String>,
}

impl StaticSession {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|token| !token.trim().is_empty()),
        }
    }
}

#[async_trait]
impl SessionSource for StaticSession {
    async fn current_session(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.token.as_ref().map(|token| Session {
            access_token: token.clone(),
            refresh_token: None,
            expires_at: None,
            user: SessionUser {
                id: "static".to_string(),
                email: None,
            },
        }))
    }
}

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
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

/// Password sign-in, sign-up and sign-out against the identity provider.
pub struct IdentityClient {
    http: Client,
    base: Url,
    api_key: String,
    session: RwLock<Option<Session>>,
}

impl IdentityClient {
    pub fn new(auth_url: &str, api_key: impl Into<String>) -> Result<Self, ClientError> {
        let base = Url::parse(auth_url)?.join("/")?;
        Ok(Self {
            http: Client::builder().build()?,
            base,
            api_key: api_key.into(),
            session: RwLock::new(None),
        })
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, ClientError> {
        let mut url = self.base.join("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response, SIGN_IN_FAILED).await);
        }

        let session: Session = response
            .json()
            .await
            .map_err(|err| ClientError::Decode(err.to_string()))?;
        info!(
            target = "kiroku_client::session",
            user = %session.user.id,
            "signed in"
        );
        *self.session.write().await = Some(session.clone());
        Ok(session)
    }

    /// Registers an account; the provider mails a confirmation link pointing at `redirect_to`.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        redirect_to: &str,
    ) -> Result<(), ClientError> {
        let mut url = self.base.join("auth/v1/signup")?;
        url.query_pairs_mut().append_pair("redirect_to", redirect_to);

        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .json(&Credentials { email, password })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(provider_error(response, SIGN_UP_FAILED).await);
        }
        Ok(())
    }

    pub async fn sign_out(&self) -> Result<(), ClientError> {
        let previous = self.session.write().await.take();
        let Some(session) = previous else {
            return Ok(());
        };

        let url = self.base.join("auth/v1/logout")?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&session.access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            warn!(
                target = "kiroku_client::session",
                status = response.status().as_u16(),
                "provider rejected sign-out; local session cleared anyway"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl SessionSource for IdentityClient {
    async fn current_session(&self) -> Result<Option<Session>, ClientError> {
        Ok(self.session.read().await.clone())
    }
}

async fn provider_error(response: reqwest::Response, fallback: &str) -> ClientError {
    let message = response
        .json::<ProviderErrorBody>()
        .await
        .ok()
        .and_then(ProviderErrorBody::into_message)
        .unwrap_or_else(|| fallback.to_string());
    ClientError::Identity(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    struct FailingSource;

    #[async_trait]
    impl SessionSource for FailingSource {
        async fn current_session(&self) -> Result<Option<Session>, ClientError> {
            Err(ClientError::Identity("offline".into()))
        }
    }

    #[tokio::test]
    async fn provider_starts_unknown_and_resolves_on_refresh() {
        let provider = SessionProvider::new(StaticSession::new(Some("tok".into())));
        assert!(provider.is_loading().await);
        assert_eq!(provider.token().await, None);

        provider.refresh().await.expect("refresh");
        assert!(!provider.is_loading().await);
        assert_eq!(provider.token().await.as_deref(), Some("tok"));
    }

    #[tokio::test]
    async fn blank_static_token_is_a_guest() {
        let provider = SessionProvider::new(StaticSession::new(Some("  ".into())));
        assert_eq!(provider.refresh().await.expect("refresh"), SessionState::Guest);
        assert_eq!(provider.token().await, None);
    }

    struct ExpiredSource;

    #[async_trait]
    impl SessionSource for ExpiredSource {
        async fn current_session(&self) -> Result<Option<Session>, ClientError> {
            Ok(Some(Session {
                access_token: "old".into(),
                refresh_token: None,
                expires_at: Some(OffsetDateTime::UNIX_EPOCH),
                user: SessionUser {
                    id: "u1".into(),
                    email: None,
                },
            }))
        }
    }

    #[tokio::test]
    async fn expired_session_counts_as_guest() {
        let provider = SessionProvider::new(ExpiredSource);
        assert_eq!(provider.refresh().await.expect("refresh"), SessionState::Guest);
        assert_eq!(provider.token().await, None);
    }

    #[tokio::test]
    async fn failed_refresh_falls_back_to_guest() {
        let provider = SessionProvider::new(FailingSource);
        assert!(provider.refresh().await.is_err());
        assert_eq!(provider.state().await, SessionState::Guest);
    }

    #[tokio::test]
    async fn sign_in_stores_session_for_later_reads() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/v1/token")
                .query_param("grant_type", "password")
                .header("apikey", "anon")
                .json_body(json!({ "email": "a@example.com", "password": "pw" }));
            then.status(200).json_body(json!({
                "access_token": "jwt",
                "refresh_token": "r",
                "expires_at": 4102444800_i64,
                "user": { "id": "u1", "email": "a@example.com" }
            }));
        });

        let client = IdentityClient::new(&server.base_url(), "anon").expect("client");
        let session = client.sign_in("a@example.com", "pw").await.expect("sign in");
        mock.assert();
        assert_eq!(
            session.expires_at.map(OffsetDateTime::unix_timestamp),
            Some(4_102_444_800)
        );

        let provider = SessionProvider::new(client);
        provider.refresh().await.expect("refresh");
        assert_eq!(provider.token().await.as_deref(), Some("jwt"));
    }

    #[tokio::test]
    async fn sign_in_failure_surfaces_provider_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/auth/v1/token");
            then.status(400).json_body(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            }));
        });

        let client = IdentityClient::new(&server.base_url(), "anon").expect("client");
        let err = client.sign_in("a@example.com", "bad").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid login credentials");
        assert_eq!(client.current_session().await.expect("session"), None);
    }

    #[tokio::test]
    async fn sign_up_passes_redirect_target() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/auth/v1/signup")
                .query_param("redirect_to", "http://localhost:3000/login");
            then.status(200).json_body(json!({}));
        });

        let client = IdentityClient::new(&server.base_url(), "anon").expect("client");
        client
            .sign_up("a@example.com", "pw", "http://localhost:3000/login")
            .await
            .expect("sign up");
        mock.assert();
    }
}
