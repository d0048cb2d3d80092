//! Authenticated REST client for the storefront API.
//!
//! Every request carries the current access token as a bearer token. A 401
//! on a first attempt triggers one token refresh and one retry; a retried
//! request never refreshes again. When the API still rejects the session
//! after that, the session is cleared.

pub mod endpoints;
pub mod types;

use std::sync::Arc;

use pocketshop_core::AuthTokens;
use reqwest::{Method, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use crate::config::ClientConfig;
use crate::session::AuthSession;

use types::{ErrorPayload, RefreshResponse};

/// Errors from API requests.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, timeout, TLS).
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Status {
        status: StatusCode,
        /// `message` or `error` field of the response body.
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid request URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A 401 could not be recovered because the refresh call failed.
    #[error("Token refresh failed: {0}")]
    RefreshFailed(Box<ApiError>),
}

impl ApiError {
    /// The API-reported message if there is one, `fallback` otherwise.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status {
                message: Some(message),
                ..
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }

    /// HTTP status for API-reported errors.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The session is no longer accepted by the API.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Status { status, .. } => *status == StatusCode::UNAUTHORIZED,
            // A refresh that never reached the API says nothing about the session
            Self::RefreshFailed(inner) => matches!(**inner, Self::Status { .. }),
            _ => false,
        }
    }
}

/// Query parameters and JSON body for a request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub params: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl RequestOptions {
    /// Options carrying only query parameters.
    #[must_use]
    pub fn with_params<K, V>(params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            params: params
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            body: None,
        }
    }

    /// Options carrying only a JSON body.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Decode` if `body` cannot be serialized.
    pub fn with_body<B: Serialize + ?Sized>(body: &B) -> Result<Self, ApiError> {
        Ok(Self {
            params: Vec::new(),
            body: Some(serde_json::to_value(body)?),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Attempt {
    Initial,
    Retried,
}

/// Storefront REST client.
///
/// Cheap to clone; clones share the HTTP connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: Arc<AuthSession>,
    /// Held while a refresh is in flight so concurrent 401s refresh once.
    refresh_lock: Mutex<()>,
}

impl ApiClient {
    /// Create a client for the configured API.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Transport` if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig, session: Arc<AuthSession>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_base_url.clone(),
                session,
                refresh_lock: Mutex::new(()),
            }),
        })
    }

    /// The session this client authenticates with.
    #[must_use]
    pub fn session(&self) -> &Arc<AuthSession> {
        &self.inner.session
    }

    /// `GET path` with query parameters.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let options = RequestOptions::with_params(params.iter().map(|(k, v)| (*k, v.clone())));
        self.request(Method::GET, path, options).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::request`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(Method::POST, path, RequestOptions::with_body(body)?)
            .await
    }

    /// Send a request and decode the JSON response.
    ///
    /// An empty success body decodes as JSON `null`, so acknowledgement-only
    /// endpoints can use `serde::de::IgnoredAny` or `()`.
    ///
    /// # Errors
    ///
    /// - `ApiError::Status` for non-success responses, including a 401 that
    ///   survived one refresh
    /// - `ApiError::RefreshFailed` if the refresh call itself failed
    /// - `ApiError::Transport` on network failures
    /// - `ApiError::Decode` if the body does not match `T`
    #[instrument(skip_all, fields(method = %method, path = %path))]
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ApiError> {
        let url = self.url_for(path, &options.params)?;
        let mut attempt = Attempt::Initial;

        loop {
            let access_token = self.inner.session.access_token();
            let response = self
                .send(method.clone(), url.clone(), options.body.as_ref(), access_token.as_deref())
                .await?;

            if response.status() == StatusCode::UNAUTHORIZED {
                match attempt {
                    Attempt::Initial => {
                        if let Some(tokens) =
                            self.inner.session.tokens().filter(AuthTokens::can_refresh)
                        {
                            tracing::debug!("Access token rejected, refreshing");
                            if let Err(e) = self.refresh(&tokens, access_token.as_deref()).await {
                                let err = ApiError::RefreshFailed(Box::new(e));
                                if err.is_unauthorized() {
                                    self.expire_session().await;
                                }
                                return Err(err);
                            }
                            attempt = Attempt::Retried;
                            continue;
                        }
                    }
                    Attempt::Retried => self.expire_session().await,
                }
            }

            return decode(response).await;
        }
    }

    async fn send(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        access_token: Option<&str>,
    ) -> Result<reqwest::Response, ApiError> {
        let mut request = self.inner.client.request(method, url);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        Ok(request.send().await?)
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Skips the call when another request already refreshed since
    /// `rejected_access` was sent.
    #[instrument(skip_all)]
    async fn refresh(&self, tokens: &AuthTokens, rejected_access: Option<&str>) -> Result<(), ApiError> {
        let _guard = self.inner.refresh_lock.lock().await;

        let current = self.inner.session.access_token();
        if current.is_some() && current.as_deref() != rejected_access {
            tracing::debug!("Access token already refreshed by a concurrent request");
            return Ok(());
        }

        let url = self.url_for(&endpoints::refresh(&tokens.refresh_token), &[])?;
        let response = self.send(Method::GET, url, None, None).await?;
        let refreshed: RefreshResponse = decode(response).await?;

        if self
            .inner
            .session
            .store_refreshed_access_token(&tokens.refresh_token, refreshed.access_token)
            .await
        {
            tracing::info!("Access token refreshed");
        }
        Ok(())
    }

    /// The API rejected the session even after a refresh attempt.
    async fn expire_session(&self) {
        tracing::warn!("Session expired, signing out");
        self.inner.session.clear().await;
        crate::telemetry::clear_sentry_user();
    }

    fn url_for(&self, path: &str, params: &[(String, String)]) -> Result<Url, ApiError> {
        let base = self.inner.base_url.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{path}"))?;
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .finish_non_exhaustive()
    }
}

async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorPayload>(&bytes)
            .ok()
            .and_then(ErrorPayload::into_message);
        tracing::debug!(%status, "API request failed");
        return Err(ApiError::Status { status, message });
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use httpmock::prelude::*;
    use serde::de::IgnoredAny;
    use serde_json::json;

    use super::*;
    use crate::storage::MemoryStore;
    use crate::test_support::{authenticated_session, config_for};

    fn client(server: &MockServer, session: Arc<AuthSession>) -> ApiClient {
        ApiClient::new(&config_for(server), session).unwrap()
    }

    fn anonymous_session() -> Arc<AuthSession> {
        Arc::new(AuthSession::new(Arc::new(MemoryStore::new()), "auth-storage"))
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/category/get-all")
                    .header("authorization", "Bearer access-1");
                then.status(200).json_body(json!([]));
            })
            .await;

        let api = client(&server, authenticated_session("access-1", "refresh-1").await);
        let categories: Vec<serde_json::Value> = api.get(endpoints::CATEGORIES, &[]).await.unwrap();
        assert!(categories.is_empty());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_anonymous_requests_have_no_auth_header() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/banner/get-all")
                    .header_missing("authorization");
                then.status(200).json_body(json!([]));
            })
            .await;

        let api = client(&server, anonymous_session());
        let _: IgnoredAny = api.get(endpoints::BANNERS, &[]).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_refreshes_once_and_retries() {
        let server = MockServer::start_async().await;
        let rejected = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product/popular")
                    .header("authorization", "Bearer stale");
                then.status(401).json_body(json!({"message": "jwt expired"}));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/user/refresh/refresh-1")
                    .header_missing("authorization");
                then.status(200).json_body(json!({"accessToken": "fresh"}));
            })
            .await;
        let accepted = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product/popular")
                    .header("authorization", "Bearer fresh");
                then.status(200).json_body(json!([{"ok": true}]));
            })
            .await;

        let session = authenticated_session("stale", "refresh-1").await;
        let api = client(&server, session.clone());
        let body: serde_json::Value = api.get(endpoints::POPULAR_PRODUCTS, &[]).await.unwrap();

        assert_eq!(body, json!([{"ok": true}]));
        rejected.assert_calls_async(1).await;
        refresh.assert_calls_async(1).await;
        accepted.assert_calls_async(1).await;
        assert_eq!(session.tokens(), Some(AuthTokens::new("fresh", "refresh-1")));
    }

    #[tokio::test]
    async fn test_retried_401_is_returned_without_second_refresh() {
        let server = MockServer::start_async().await;
        let rejected = server
            .mock_async(|when, then| {
                when.method(GET).path("/product/popular");
                then.status(401).json_body(json!({"message": "Not authorized"}));
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(GET).path("/user/refresh/refresh-1");
                then.status(200).json_body(json!({"accessToken": "fresh"}));
            })
            .await;

        let session = authenticated_session("stale", "refresh-1").await;
        let api = client(&server, session.clone());
        let err = api
            .get::<IgnoredAny>(endpoints::POPULAR_PRODUCTS, &[])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        assert!(err.is_unauthorized());
        rejected.assert_calls_async(2).await;
        refresh.assert_calls_async(1).await;
        assert!(!session.snapshot().is_authenticated());
        assert_eq!(session.tokens(), None);
    }

    #[tokio::test]
    async fn test_no_refresh_without_refresh_token() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/product/popular");
                then.status(401);
            })
            .await;
        let refresh = server
            .mock_async(|when, then| {
                when.method(GET).path_includes("/user/refresh/");
                then.status(200).json_body(json!({"accessToken": "fresh"}));
            })
            .await;

        let api = client(&server, authenticated_session("stale", "").await);
        let err = api
            .get::<IgnoredAny>(endpoints::POPULAR_PRODUCTS, &[])
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
        refresh.assert_calls_async(0).await;
    }

    #[tokio::test]
    async fn test_failed_refresh_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/product/popular");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user/refresh/refresh-1");
                then.status(403).json_body(json!({"message": "refresh expired"}));
            })
            .await;

        let session = authenticated_session("stale", "refresh-1").await;
        let api = client(&server, session.clone());
        let err = api
            .get::<IgnoredAny>(endpoints::POPULAR_PRODUCTS, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::RefreshFailed(_)));
        assert!(err.is_unauthorized());
        assert!(!session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_undecodable_refresh_keeps_session() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/product/popular");
                then.status(401);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/user/refresh/refresh-1");
                then.status(200).body("not json");
            })
            .await;

        let session = authenticated_session("stale", "refresh-1").await;
        let api = client(&server, session.clone());
        let err = api
            .get::<IgnoredAny>(endpoints::POPULAR_PRODUCTS, &[])
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::RefreshFailed(_)));
        assert!(!err.is_unauthorized());
        assert!(session.snapshot().is_authenticated());
    }

    #[tokio::test]
    async fn test_error_payload_message_is_extracted() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/user/login");
                then.status(400).json_body(json!({"message": "Invalid credentials"}));
            })
            .await;

        let api = client(&server, anonymous_session());
        let err = api
            .post::<_, IgnoredAny>(endpoints::LOGIN, &json!({"phone": "1"}))
            .await
            .unwrap_err();

        assert_eq!(err.user_message("Login failed."), "Invalid credentials");
    }

    #[tokio::test]
    async fn test_sends_query_params_and_body() {
        let server = MockServer::start_async().await;
        let listing = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/product/query")
                    .query_param("page", "2")
                    .query_param("search", "red shoes");
                then.status(200).json_body(json!({"products": []}));
            })
            .await;
        let forgot = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/user/forgotpassword")
                    .json_body(json!({"phone": "+15550100"}));
                then.status(204);
            })
            .await;

        let api = client(&server, anonymous_session());
        let params = [("page", "2".to_string()), ("search", "red shoes".to_string())];
        let _: IgnoredAny = api.get(endpoints::PRODUCT_QUERY, &params).await.unwrap();
        let _: IgnoredAny = api
            .post(endpoints::FORGOT_PASSWORD, &json!({"phone": "+15550100"}))
            .await
            .unwrap();

        listing.assert_async().await;
        forgot.assert_async().await;
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::Status {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(err.user_message("Try again."), "Try again.");
        assert!(!err.is_unauthorized());
    }
}
