//! reqwest-backed [`SessionGateway`] against the identity service's REST API.
//!
//! The ambient credential is whatever cookie the service sets on login; the
//! client keeps it in its own cookie store and presents it automatically, so
//! nothing here ever reads or persists a token.
//!
//! Status mapping is pure (`classify_*`) for testability.

#[cfg(test)]
#[path = "http_test.rs"]
mod http_test;

use std::time::Duration;

use secrecy::ExposeSecret;

use super::wire::{LoginRequest, parse_identity};
use super::{Credentials, GatewayError, SessionGateway, TransportError};
use crate::config::SessionConfig;
use crate::identity::Identity;

// =============================================================================
// CLIENT
// =============================================================================

pub struct HttpGateway {
    http: reqwest::Client,
    me_url: String,
    login_url: String,
    logout_url: String,
}

impl HttpGateway {
    /// Build a gateway with a cookie-enabled HTTP client.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Request`] if the HTTP client cannot be built.
    pub fn new(config: &SessionConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| TransportError::Request(format!("http client build failed: {e}")))?;
        Ok(Self::with_client(http, config))
    }

    /// Use a caller-built client, e.g. one sharing a cookie jar with other
    /// components. The client must keep cookies for sessions to persist.
    #[must_use]
    pub fn with_client(http: reqwest::Client, config: &SessionConfig) -> Self {
        Self {
            http,
            me_url: config.url(&config.endpoints.me),
            login_url: config.url(&config.endpoints.login),
            logout_url: config.url(&config.endpoints.logout),
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder, url: &str) -> Result<(u16, String), TransportError> {
        let response = request.send().await.map_err(|e| {
            tracing::debug!(%url, error = %e, "identity service unreachable");
            TransportError::Request(e.to_string())
        })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        tracing::debug!(%url, status, "identity service responded");
        Ok((status, body))
    }
}

#[async_trait::async_trait]
impl SessionGateway for HttpGateway {
    async fn resolve_current_identity(&self) -> Result<Identity, GatewayError> {
        let (status, body) = self.send(self.http.get(&self.me_url), &self.me_url).await?;
        classify_me(status, &body)
    }

    async fn login(&self, credentials: &Credentials) -> Result<Identity, GatewayError> {
        let request = LoginRequest { email: credentials.email(), password: credentials.password().expose_secret() };
        let (status, body) = self
            .send(self.http.post(&self.login_url).json(&request), &self.login_url)
            .await?;
        classify_login(status, &body)
    }

    async fn logout(&self) -> Result<(), GatewayError> {
        let (status, _body) = self.send(self.http.post(&self.logout_url), &self.logout_url).await?;
        classify_logout(status)
    }
}

// =============================================================================
// STATUS MAPPING
// =============================================================================

/// 200 carries the identity; 401 is a confirmed "no session".
fn classify_me(status: u16, body: &str) -> Result<Identity, GatewayError> {
    match status {
        200 => Ok(parse_identity(body)?),
        401 => Err(GatewayError::Unauthenticated),
        other => Err(TransportError::Status(other).into()),
    }
}

/// 200/201 carry the new identity; 401 is a rejected credential pair.
fn classify_login(status: u16, body: &str) -> Result<Identity, GatewayError> {
    match status {
        200 | 201 => Ok(parse_identity(body)?),
        401 => Err(GatewayError::InvalidCredentials),
        other => Err(TransportError::Status(other).into()),
    }
}

fn classify_logout(status: u16) -> Result<(), GatewayError> {
    if (200..300).contains(&status) {
        Ok(())
    } else {
        Err(TransportError::Status(status).into())
    }
}
