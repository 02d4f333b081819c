//! Authorized JSON request client.

use kiroku_api_types::MessageResponse;
use reqwest::{Client, Method, Response, header::AUTHORIZATION};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;
use url::Url;

use crate::error::ClientError;

pub const PUBLIC_POSTS: &str = "/api/posts";
pub const ADMIN_POSTS: &str = "/api/admin/posts";
pub const ADMIN_CATEGORIES: &str = "/api/admin/categories";

/// What a request was trying to do; picks the fallback error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Create,
    Update,
    Delete,
}

impl Operation {
    pub fn fallback_message(self, status: u16) -> String {
        let verb = match self {
            Self::Fetch => "取得",
            Self::Create => "作成",
            Self::Update => "更新",
            Self::Delete => "削除",
        };
        format!("{verb}に失敗しました ({status})")
    }
}

/// Sends JSON requests relative to a site base URL. Each call makes exactly one attempt.
#[derive(Clone, Debug)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(site: &str) -> Result<Self, ClientError> {
        let base = Url::parse(site)?.join("/")?;
        let http = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { http, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("kiroku-client/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Relative paths resolve against the base; absolute URLs are used as-is.
    pub fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base.join(path).map_err(ClientError::Url)
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let response = self
            .send::<()>(Method::GET, path, token, None, Operation::Fetch)
            .await?;
        decode(response).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .send(Method::POST, path, token, Some(body), Operation::Create)
            .await?;
        decode(response).await
    }

    /// POST whose response body is not needed.
    pub async fn post_discard<B: Serialize + ?Sized>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<(), ClientError> {
        self.send(Method::POST, path, token, Some(body), Operation::Create)
            .await?;
        Ok(())
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self
            .send(Method::PUT, path, token, Some(body), Operation::Update)
            .await?;
        decode(response).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, ClientError> {
        let response = self
            .send::<()>(Method::DELETE, path, token, None, Operation::Delete)
            .await?;
        decode(response).await
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&str>,
        body: Option<&B>,
        operation: Operation,
    ) -> Result<Response, ClientError> {
        let url = self.url(path)?;
        debug!(target = "kiroku_client::request", %method, %url, "sending request");

        let mut request = self.http.request(method, url);
        if let Some(token) = token {
            // The server accepts the raw token with or without a `Bearer ` prefix.
            request = request.header(AUTHORIZATION, token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let status = status.as_u16();
        let message = response
            .json::<MessageResponse>()
            .await
            .ok()
            .map(|body| body.message)
            .unwrap_or_else(|| operation.fallback_message(status));
        Err(ClientError::Request { status, message })
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|err| ClientError::Decode(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use kiroku_api_types::{CategoryWriteRequest, CreatedResponse};
    use serde_json::json;

    fn client(server: &MockServer) -> ApiClient {
        ApiClient::new(&server.base_url()).expect("client")
    }

    #[tokio::test]
    async fn sends_raw_token_in_authorization() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/admin/categories")
                .header("authorization", "tok-1")
                .json_body(json!({ "name": "Rust" }));
            then.status(201).json_body(json!({ "id": 4 }));
        });

        let created: CreatedResponse = client(&server)
            .post(
                "/api/admin/categories",
                Some("tok-1"),
                &CategoryWriteRequest {
                    name: "Rust".into(),
                },
            )
            .await
            .expect("created");
        mock.assert();
        assert_eq!(created.id, 4);
    }

    #[tokio::test]
    async fn server_message_wins_over_fallback() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/admin/posts/9");
            then.status(404)
                .json_body(json!({ "message": "記事が見つかりません。" }));
        });

        let err = client(&server)
            .get::<serde_json::Value>("/api/admin/posts/9", Some("t"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "記事が見つかりません。");
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn fallback_message_names_operation_and_status() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(DELETE).path("/api/admin/categories/1");
            then.status(502).body("bad gateway");
        });

        let err = client(&server)
            .delete::<serde_json::Value>("/api/admin/categories/1", Some("t"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "削除に失敗しました (502)");
        // no retry
        mock.assert_calls(1);
    }

    #[test]
    fn fallback_messages_per_operation() {
        assert_eq!(Operation::Fetch.fallback_message(500), "取得に失敗しました (500)");
        assert_eq!(Operation::Create.fallback_message(400), "作成に失敗しました (400)");
        assert_eq!(Operation::Update.fallback_message(401), "更新に失敗しました (401)");
    }
}
