//! Bearer token acquisition

use super::client::{describe_transport_error, CatalogClient};
use super::models::TokenResponse;
use crate::config::{secret_string, CatalogConfig, SecretString};
use crate::domain::{body_snippet, CatalogError, Result};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// A short-lived bearer credential
#[derive(Debug, Clone)]
pub struct AccessToken {
    /// Token value sent as `Authorization: Bearer ...`
    pub token: SecretString,
    /// Lifetime reported by the token endpoint
    pub expires_in: Duration,
}

impl AccessToken {
    /// Header value for bearer auth
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token.expose_secret().as_ref())
    }
}

/// Source of bearer tokens
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Fetch a fresh token
    ///
    /// # Errors
    ///
    /// Any failure is reported as [`CatalogError::Authentication`].
    async fn acquire(&self) -> Result<AccessToken>;
}

/// Client-credentials token provider using HTTP Basic auth
pub struct BasicAuthTokenProvider {
    client: CatalogClient,
    token_url: Url,
    username: String,
    password: SecretString,
    timeout: Duration,
}

impl BasicAuthTokenProvider {
    /// Create a provider for the configured token endpoint
    pub fn new(client: CatalogClient, config: &CatalogConfig) -> Result<Self> {
        let token_url = client.endpoint(&config.token_path)?;
        Ok(Self {
            client,
            token_url,
            username: config.username.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.token_timeout_seconds),
        })
    }
}

#[async_trait]
impl TokenProvider for BasicAuthTokenProvider {
    async fn acquire(&self) -> Result<AccessToken> {
        tracing::debug!(url = %self.token_url, "Requesting access token");

        let response = self
            .client
            .http()
            .post(self.token_url.clone())
            .basic_auth(&self.username, Some(self.password.expose_secret().as_ref()))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                CatalogError::Authentication(format!(
                    "token request {}",
                    describe_transport_error(&e)
                ))
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            CatalogError::Authentication(format!(
                "failed to read token response: {}",
                describe_transport_error(&e)
            ))
        })?;

        if !status.is_success() {
            return Err(CatalogError::Authentication(format!(
                "token endpoint returned {}: {}",
                status.as_u16(),
                body_snippet(&body)
            )));
        }

        let parsed: TokenResponse = serde_json::from_slice(&body).map_err(|e| {
            CatalogError::Authentication(format!("token response is not usable: {e}"))
        })?;

        if parsed.access_token.is_empty() {
            return Err(CatalogError::Authentication(
                "token endpoint returned an empty access_token".to_string(),
            ));
        }

        tracing::debug!(expires_in = parsed.expires_in, "Access token acquired");

        Ok(AccessToken {
            token: secret_string(parsed.access_token),
            expires_in: Duration::from_secs(parsed.expires_in),
        })
    }
}
