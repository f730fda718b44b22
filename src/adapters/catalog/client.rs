//! Shared HTTP plumbing for the catalog API

use crate::config::CatalogConfig;
use crate::domain::{CatalogError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use url::Url;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client plus the resolved API root
///
/// Request timeouts are applied per call by the adapters, since token,
/// export and download requests each have their own budget.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    http: Client,
    root: Url,
}

impl CatalogClient {
    /// Build a client from catalog configuration
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Configuration`] if the root URL is invalid or
    /// the HTTP client cannot be constructed.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        let root = config.root().map_err(CatalogError::Configuration)?;

        let mut builder = ClientBuilder::new()
            .connect_timeout(CONNECT_TIMEOUT)
            .user_agent(concat!("catalog-export/", env!("CARGO_PKG_VERSION")));

        if !config.tls_verify {
            tracing::warn!("TLS certificate verification is disabled for the catalog API");
            builder = builder.danger_accept_invalid_certs(true);
        }

        let http = builder.build().map_err(|e| {
            CatalogError::Configuration(format!("Failed to build HTTP client: {e}"))
        })?;

        Ok(Self { http, root })
    }

    /// Underlying reqwest client
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// API root, always ending in `/`
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Resolve an endpoint path relative to the API root
    ///
    /// ```
    /// use catalog_export::adapters::catalog::CatalogClient;
    /// use catalog_export::config::CatalogConfig;
    ///
    /// let config: CatalogConfig = toml::from_str(
    ///     r#"
    ///     root_url = "https://catalog.example.edu/iii/sierra-api/v6"
    ///     username = "key"
    ///     password = "secret"
    ///     "#,
    /// )
    /// .unwrap();
    /// let client = CatalogClient::new(&config).unwrap();
    /// assert_eq!(
    ///     client.endpoint("bibs/marc").unwrap().as_str(),
    ///     "https://catalog.example.edu/iii/sierra-api/v6/bibs/marc"
    /// );
    /// ```
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.root.join(path.trim_start_matches('/')).map_err(|e| {
            CatalogError::Configuration(format!("Invalid endpoint path '{path}': {e}"))
        })
    }
}

/// Render a reqwest error with the failing URL and whether it timed out
pub(crate) fn describe_transport_error(err: &reqwest::Error) -> String {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    match err.url() {
        Some(url) => format!("{kind} for {url}: {err}"),
        None => format!("{kind}: {err}"),
    }
}
