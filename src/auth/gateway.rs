//! Authenticated Request Gateway
//! Mission: Attach the current bearer token to every protected call and own the expiry path

use crate::auth::models::ApiErrorBody;
use crate::auth::signal::SessionSignal;
use crate::auth::store::TokenStore;
use anyhow::{Context, Result};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Gateway failure modes callers branch on
#[derive(Debug)]
pub enum GatewayError {
    /// Backend rejected the bearer token; stored credentials were cleared
    /// and the session signal has already fired
    SessionExpired,
    /// Non-auth API rejection, carrying the backend's message when present
    Api { status: StatusCode, message: String },
    /// Transport-level failure; stored credentials were left untouched
    Network(reqwest::Error),
}

impl std::fmt::Display for GatewayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GatewayError::SessionExpired => write!(f, "Session expired, log in again"),
            GatewayError::Api { status, message } => write!(f, "API error ({}): {}", status, message),
            GatewayError::Network(e) => write!(f, "Network error: {}", e),
        }
    }
}

impl std::error::Error for GatewayError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GatewayError::Network(e) => Some(e),
            _ => None,
        }
    }
}

/// HTTP front door for the admin API.
///
/// Reads the access token through the [`TokenStore`] at call time, so a
/// fetch issued right after `set_tokens` always carries the fresh token.
#[derive(Clone)]
pub struct ApiGateway {
    client: Client,
    base_url: String,
    store: Arc<TokenStore>,
    signal: SessionSignal,
}

impl ApiGateway {
    pub fn new(base_url: &str, store: Arc<TokenStore>, signal: SessionSignal) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build API client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            store,
            signal,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Builds a protected request with `Authorization` merged in when a
    /// token is held. A missing token still goes out as-is; the backend
    /// answers 401 and the expiry path takes over.
    fn build(&self, method: Method, path: &str) -> RequestBuilder {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = self.store.get_access_token() {
            request = request.header(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token),
            );
        }
        request
    }

    /// GET a protected endpoint, deserializing the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GatewayError> {
        let response = self.dispatch(self.build(Method::GET, path)).await?;
        response.json().await.map_err(GatewayError::Network)
    }

    /// POST to a protected endpoint, ignoring the response body.
    pub async fn post_empty(&self, path: &str) -> Result<(), GatewayError> {
        self.dispatch(self.build(Method::POST, path)).await?;
        Ok(())
    }

    /// POST to a pre-authentication endpoint (login, signup): no bearer is
    /// attached and a 401/403 here means "bad input", never session death.
    pub async fn post_json_public<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(GatewayError::Network)?;
        let response = Self::reject_non_success(response).await?;
        response.json().await.map_err(GatewayError::Network)
    }

    /// As [`post_json_public`](Self::post_json_public), discarding the body.
    pub async fn post_public<B: Serialize>(&self, path: &str, body: &B) -> Result<(), GatewayError> {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(GatewayError::Network)?;
        Self::reject_non_success(response).await?;
        Ok(())
    }

    /// Sends a protected request. A 401/403 is the single point where the
    /// session tears down: credentials are cleared and the signal fires
    /// before the error is returned, so all observers converge without a
    /// caller having to remember to.
    async fn dispatch(&self, request: RequestBuilder) -> Result<Response, GatewayError> {
        let response = request.send().await.map_err(GatewayError::Network)?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("❌ Backend rejected the session ({}), tearing it down", status);
            if let Err(e) = self.store.clear_tokens() {
                warn!("Failed to clear tokens after rejection: {:#}", e);
            }
            self.signal.emit_expired();
            return Err(GatewayError::SessionExpired);
        }

        Self::reject_non_success(response).await
    }

    async fn reject_non_success(response: Response) -> Result<Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = match response.json::<ApiErrorBody>().await {
            Ok(body) => body.message.unwrap_or_else(|| status.to_string()),
            Err(_) => status.to_string(),
        };
        debug!("API call rejected: {} ({})", message, status);
        Err(GatewayError::Api { status, message })
    }
}
