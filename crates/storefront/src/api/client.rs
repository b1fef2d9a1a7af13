//! Request dispatch with bearer injection and one-shot token refresh.

use std::sync::Arc;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use super::ApiError;
use super::types::RefreshResponse;
use crate::config::ApiConfig;
use crate::session::Session;
use crate::validation::FieldErrors;

/// Longest slice of an error body kept in logs and error messages.
const ERROR_BODY_LIMIT: usize = 200;

const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// ApiRequest
// =============================================================================

/// A request relative to the API base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    body: Option<Value>,
    authenticated: bool,
}

impl ApiRequest {
    /// An authenticated `GET`. `path` is relative, e.g. `"cart/"`.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            path: path.into(),
            query: Vec::new(),
            body: None,
            authenticated: true,
        }
    }

    /// An authenticated `POST` with a JSON body.
    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::POST,
            path: path.into(),
            query: Vec::new(),
            body: Some(body),
            authenticated: true,
        }
    }

    /// Send without a bearer token and without refresh handling.
    #[must_use]
    pub const fn public(mut self) -> Self {
        self.authenticated = false;
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

// =============================================================================
// ApiResponse
// =============================================================================

/// A successful response with its body read to text.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Parse`] if the body does not decode as `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_str(&self.body).map_err(|e| {
            error!(
                error = %e,
                body = %truncate(&self.body, 500),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Map a non-success status to its error.
    fn into_result(self, path: &str) -> Result<Self, ApiError> {
        let status = self.status;
        if status.is_success() {
            return Ok(self);
        }
        match status {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string())),
            StatusCode::BAD_REQUEST => Err(ApiError::BadRequest(
                FieldErrors::from_response_body(&self.body),
            )),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            _ => {
                error!(
                    status = %status,
                    body = %truncate(&self.body, 500),
                    "API returned non-success status"
                );
                Err(ApiError::Server {
                    status: status.as_u16(),
                    message: truncate(&self.body, ERROR_BODY_LIMIT),
                })
            }
        }
    }
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the storefront REST API.
///
/// Cheap to clone; clones share the connection pool and the session.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    session: Session,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `config.base_url` using `session` for credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ApiConfig, session: Session) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.clone(),
                session,
            }),
        })
    }

    /// The session whose credential this client sends.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Send a request, refreshing the access token once on a 401.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Unauthorized`] when the credential is rejected and no
    ///   refresh token is held
    /// - [`ApiError::AuthExpired`] when the refresh or the retry fails; the
    ///   session is cleared
    /// - [`ApiError::NotFound`], [`ApiError::BadRequest`] and
    ///   [`ApiError::Server`] for other non-success statuses
    /// - [`ApiError::Http`] when the request cannot be completed
    #[instrument(
        skip(self, request),
        fields(method = %request.method, path = %request.path, request_id)
    )]
    pub async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let url = self.url_for(request)?;

        if !request.authenticated {
            return self
                .dispatch(request, &url, None)
                .await?
                .into_result(&request.path);
        }

        let access_token = self.inner.session.access_token();
        let response = self
            .dispatch(request, &url, access_token.as_deref())
            .await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return response.into_result(&request.path);
        }

        let Some(refresh_token) = self.inner.session.refresh_token() else {
            debug!("Credential rejected and no refresh token held");
            return Err(ApiError::Unauthorized);
        };

        let access_token = match self.refresh_access_token(&refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Token refresh failed");
                self.expire_session();
                return Err(ApiError::AuthExpired);
            }
        };

        let retried = self.dispatch(request, &url, Some(&access_token)).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            warn!("Request rejected again after token refresh");
            self.expire_session();
            return Err(ApiError::AuthExpired);
        }
        retried.into_result(&request.path)
    }

    /// Send a request and decode the JSON response body.
    ///
    /// # Errors
    ///
    /// Same as [`send`](Self::send), plus [`ApiError::Parse`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    /// Exchange the refresh token for a new access token and store it.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, ApiError> {
        let request = ApiRequest::post("token/refresh/", json!({ "refresh": refresh_token })).public();
        let url = self.url_for(&request)?;
        let renewed: RefreshResponse = self
            .dispatch(&request, &url, None)
            .await?
            .into_result(&request.path)?
            .json()?;

        if !self
            .inner
            .session
            .renew(renewed.access.clone(), renewed.refresh)?
        {
            // Signed out while the refresh was in flight.
            return Err(ApiError::Unauthorized);
        }
        info!("Access token refreshed");
        Ok(renewed.access)
    }

    fn expire_session(&self) {
        if let Err(e) = self.inner.session.clear() {
            error!(error = %e, "Failed to clear expired session");
        }
    }

    fn url_for(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let mut url = self
            .inner
            .base_url
            .join(request.path.trim_start_matches('/'))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// One HTTP round-trip. Reads the whole body regardless of status.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        url: &Url,
        bearer: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let request_id = Uuid::new_v4();
        tracing::Span::current().record("request_id", tracing::field::display(request_id));

        let mut builder = self
            .inner
            .client
            .request(request.method.clone(), url.clone())
            .header(REQUEST_ID_HEADER, request_id.to_string());
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        debug!(%url, %request_id, authenticated = bearer.is_some(), "Dispatching request");
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(status = %status, %request_id, "Received response");

        Ok(ApiResponse { status, body })
    }
}
