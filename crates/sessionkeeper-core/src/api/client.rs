//! API client for the identity backend.
//!
//! This module provides the `ApiClient` struct for the auth endpoints the
//! session layer needs, plus a generic `get` helper for everything else. Credentials travel as cookies in the client's cookie store; every
//! failed response is routed through the `HttpErrorInterceptor` when one is
//! attached.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::{debug, warn};

use super::{ApiError, AuthBackend, HttpErrorInterceptor};
use crate::models::UserIdentity;

// ============================================================================
// Constants
// ============================================================================

/// Identity check for the current session
pub const CURRENT_USER_ENDPOINT: &str = "/users/me";

pub const LOGIN_ENDPOINT: &str = "/auth/login";

pub const LOGOUT_ENDPOINT: &str = "/auth/logout";

pub const GOOGLE_AUTH_ENDPOINT: &str = "/auth/google/login";

/// HTTP request timeout in seconds.
/// The session layer imposes no timeout of its own; this is the transport's.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

#[derive(Debug, Deserialize)]
struct OAuthAuthorizationResponse {
    authorization_url: String,
}

/// API client for the identity backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    interceptor: Option<Arc<HttpErrorInterceptor>>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .cookie_store(true)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interceptor: None,
        })
    }

    /// Create a new ApiClient that reports failures to `interceptor`,
    /// sharing the connection pool and cookie store.
    pub fn with_interceptor(&self, interceptor: Arc<HttpErrorInterceptor>) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            interceptor: Some(interceptor),
        }
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    fn intercept(&self, url: &str, error: ApiError) -> ApiError {
        match self.interceptor {
            Some(ref interceptor) => interceptor.intercept(url, error),
            None => error,
        }
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit (should retry),
    /// or Err for other errors.
    async fn check_response_for_retry(
        &self,
        url: &str,
        response: Response,
    ) -> Result<Option<Response>, ApiError> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(self.intercept(url, ApiError::from_status(status, &body)))
        }
    }

    /// Send a request, retrying with exponential backoff while rate limited
    async fn execute(
        &self,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<Response, ApiError> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .header(header::ACCEPT, "application/json")
                .send()
                .await?;

            match self.check_response_for_retry(url, response).await? {
                Some(response) => return Ok(response),
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited);
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn parse_json<T: DeserializeOwned>(url: &str, response: Response) -> Result<T, ApiError> {
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            debug!(url = url, error = %e, "Failed to parse JSON response");
            ApiError::InvalidResponse(format!("{}: {}", url, e))
        })
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.url(path);
        let response = self.execute(&url, || self.client.get(&url)).await?;
        Self::parse_json(&url, response).await
    }

    /// POST without a body, ignoring whatever comes back on success
    pub async fn post_empty(&self, path: &str) -> Result<(), ApiError> {
        let url = self.url(path);
        self.execute(&url, || self.client.post(&url)).await?;
        Ok(())
    }
}

#[async_trait]
impl AuthBackend for ApiClient {
    async fn current_user(&self) -> Result<UserIdentity, ApiError> {
        self.get(CURRENT_USER_ENDPOINT).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.post_empty(LOGOUT_ENDPOINT).await
    }

    async fn google_auth_url(&self) -> Result<String, ApiError> {
        let response: OAuthAuthorizationResponse = self.get(GOOGLE_AUTH_ENDPOINT).await?;
        Ok(response.authorization_url)
    }
}
