//! HTTP client adapter.
//!
//! One [`ApiClient`] is shared by every resource call. It owns the
//! connection pool, the injected origin and the injected session. Failures
//! are logged once here and returned unchanged: no retry, no backoff, no
//! transformation.

use std::sync::Arc;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument};

use crate::endpoint::ApiOrigin;
use crate::error::ApiError;
use crate::session::Session;

/// Paths that never carry the bearer credential.
pub const PUBLIC_PATHS: [&str; 7] = [
    "/users/login/",
    "/users/signup/",
    "/payments/stripe-config/",
    "/users/verify-email/",
    "/users/resend-verification/",
    "/users/forgot-password/",
    "/users/reset-password/",
];

/// Header that lets requests through the tunnel's browser interstitial.
pub const TUNNEL_BYPASS_HEADER: &str = "ngrok-skip-browser-warning";

const JSON_CONTENT_TYPE: &str = "application/json";

/// Whether `path` falls under a public endpoint.
///
/// Matching is by substring, so `/users/verify-email/abc/` and paths with a
/// query string are public too.
#[must_use]
pub fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.iter().any(|public| path.contains(public))
}

/// Request body.
#[derive(Debug)]
pub enum Body {
    /// No body; still sent with the JSON content type.
    Empty,
    /// JSON document.
    Json(Value),
    /// Multipart form; the transport sets the boundary-bearing content type.
    Multipart(reqwest::multipart::Form),
}

/// A successful response with its decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// Discard the status and keep the body.
    pub fn into_data(self) -> T {
        self.data
    }
}

/// Shared HTTP client adapter.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    http: reqwest::Client,
    origin: ApiOrigin,
    session: Session,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("origin", &self.inner.origin)
            .field("session", &self.inner.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client for `origin` reading credentials from `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the HTTP client fails to build.
    pub fn new(origin: ApiOrigin, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build HTTP client: {e}")))?;
        Ok(Self::with_http_client(http, origin, session))
    }

    /// Create a client around an existing `reqwest::Client`.
    #[must_use]
    pub fn with_http_client(http: reqwest::Client, origin: ApiOrigin, session: Session) -> Self {
        Self {
            inner: Arc::new(ApiClientInner {
                http,
                origin,
                session,
            }),
        }
    }

    /// The origin requests are sent to.
    #[must_use]
    pub fn origin(&self) -> &ApiOrigin {
        &self.inner.origin
    }

    /// The session credentials are read from.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    /// Build the outgoing request without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidRequest`] if the URL or headers are invalid.
    pub async fn build_request(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<reqwest::Request, ApiError> {
        let url = self
            .inner
            .origin
            .url_for(path)
            .map_err(|e| ApiError::InvalidRequest(format!("invalid request path {path:?}: {e}")))?;

        let mut builder = self.inner.http.request(method, url);

        if self.inner.origin.is_tunnel() {
            builder = builder.header(TUNNEL_BYPASS_HEADER, HeaderValue::from_static("true"));
        }

        if !is_public_path(path)
            && let Some(token) = self.inner.session.token().await
        {
            builder = builder.bearer_auth(token.expose_secret());
        }

        builder = match body {
            Body::Empty => builder.header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE)),
            Body::Json(value) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| ApiError::InvalidRequest(format!("invalid JSON body: {e}")))?;
                builder
                    .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
                    .body(bytes)
            }
            Body::Multipart(form) => builder.multipart(form),
        };

        builder
            .build()
            .map_err(|e| ApiError::InvalidRequest(format!("failed to build request: {e}")))
    }

    /// Send a request and decode the success body as `T`.
    ///
    /// Empty success bodies (e.g. `204 No Content`) decode as JSON `null`, so
    /// `T = ()` accepts them.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Transport`] when no response arrives
    /// - [`ApiError::Status`] for non-2xx responses
    /// - [`ApiError::Decode`] when the body does not match `T`
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Body,
    ) -> Result<ApiResponse<T>, ApiError> {
        let request = self.build_request(method, path, body).await?;
        let url = request.url().to_string();

        let response = match self.inner.http.execute(request).await {
            Ok(response) => response,
            Err(source) => {
                error!(url = %url, error = %source, "Network error");
                return Err(ApiError::Transport { url, source });
            }
        };

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let body = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));
            error!(
                status = status.as_u16(),
                body = %body,
                url = %url,
                "Server error"
            );
            return Err(ApiError::Status { status, url, body });
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(source) => {
                error!(url = %url, error = %source, "Failed to read response body");
                return Err(ApiError::Transport { url, source });
            }
        };

        let decoded = if bytes.trim_ascii().is_empty() {
            serde_json::from_value(Value::Null)
        } else {
            serde_json::from_slice(&bytes)
        };
        let data = decoded.map_err(|source| {
            error!(url = %url, error = %source, "Unexpected response body");
            ApiError::Decode {
                url: url.clone(),
                source,
            }
        })?;

        debug!(status = status.as_u16(), "Request succeeded");
        Ok(ApiResponse { status, data })
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::GET, path, Body::Empty).await
    }

    /// `POST path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::POST, path, Body::Json(body)).await
    }

    /// `PUT path` with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn put_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: Value,
    ) -> Result<ApiResponse<T>, ApiError> {
        self.send(Method::PUT, path, Body::Json(body)).await
    }

    /// `DELETE path`.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::send`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse<()>, ApiError> {
        self.send(Method::DELETE, path, Body::Empty).await
    }
}
