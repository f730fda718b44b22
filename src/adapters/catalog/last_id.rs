//! Discovery of the highest record ID
//!
//! Two strategies are available: read it from a lookup document, or scan the
//! listing of recently created records until a short page is returned.

use super::client::{describe_transport_error, CatalogClient};
use super::models::RecordListing;
use super::token::TokenProvider;
use crate::config::{CatalogExportConfig, LastIdStrategy};
use crate::domain::{body_snippet, CatalogError, Result};
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Page size of the listing endpoint; a shorter page means the end was reached
pub const SCAN_PAGE_SIZE: u64 = 2000;

/// Provider of the current highest record ID
#[async_trait]
pub trait LastIdSource: Send + Sync {
    /// Return the highest record ID currently known to the catalog
    async fn last_id(&self) -> Result<u64>;
}

/// Build the configured last-ID source
pub fn last_id_source(
    config: &CatalogExportConfig,
    client: CatalogClient,
    tokens: Arc<dyn TokenProvider>,
) -> Result<Box<dyn LastIdSource>> {
    let timeout = Duration::from_secs(config.catalog.export_timeout_seconds);
    match config.last_id.strategy {
        LastIdStrategy::Url => {
            let url = config.last_id.url.as_deref().ok_or_else(|| {
                CatalogError::Configuration("last_id.url is not set".to_string())
            })?;
            let url = Url::parse(url).map_err(|e| {
                CatalogError::Configuration(format!("last_id.url is not a valid URL: {e}"))
            })?;
            Ok(Box::new(UrlLastIdSource::new(client, url, timeout)))
        }
        LastIdStrategy::Scan => {
            let listing_url = client.endpoint(&config.last_id.scan_path)?;
            Ok(Box::new(ScanLastIdSource::new(
                client,
                tokens,
                listing_url,
                config.last_id.scan_lookback_days,
                timeout,
            )))
        }
    }
}

async fn get_listing(request: reqwest::RequestBuilder, what: &str) -> Result<RecordListing> {
    let response = request.send().await.map_err(|e| {
        CatalogError::UpstreamUnavailable(format!("{what} {}", describe_transport_error(&e)))
    })?;

    let status = response.status();
    let body = response.bytes().await.map_err(|e| {
        CatalogError::UpstreamUnavailable(format!(
            "failed to read {what} response: {}",
            describe_transport_error(&e)
        ))
    })?;

    if !status.is_success() {
        return Err(CatalogError::UpstreamUnavailable(format!(
            "{what} returned {}: {}",
            status.as_u16(),
            body_snippet(&body)
        )));
    }

    serde_json::from_slice(&body).map_err(|e| {
        CatalogError::UpstreamUnavailable(format!("{what} response is not usable: {e}"))
    })
}

/// Reads `entries[0].id` from a fixed lookup URL
pub struct UrlLastIdSource {
    client: CatalogClient,
    url: Url,
    timeout: Duration,
}

impl UrlLastIdSource {
    pub fn new(client: CatalogClient, url: Url, timeout: Duration) -> Self {
        Self {
            client,
            url,
            timeout,
        }
    }
}

#[async_trait]
impl LastIdSource for UrlLastIdSource {
    async fn last_id(&self) -> Result<u64> {
        tracing::debug!(url = %self.url, "Fetching last record ID lookup");

        let request = self
            .client
            .http()
            .get(self.url.clone())
            .timeout(self.timeout);
        let listing = get_listing(request, "last-ID lookup").await?;

        listing.entries.first().map(|e| e.id).ok_or_else(|| {
            CatalogError::UpstreamUnavailable("last-ID lookup has no entries".to_string())
        })
    }
}

/// Pages through records created in the last few days
///
/// Each page after the first starts at the last ID of the previous page.
/// The walk ends at the first page reporting fewer than [`SCAN_PAGE_SIZE`]
/// results, and the last ID on that page is the answer.
pub struct ScanLastIdSource {
    client: CatalogClient,
    tokens: Arc<dyn TokenProvider>,
    listing_url: Url,
    lookback_days: u32,
    timeout: Duration,
}

impl ScanLastIdSource {
    pub fn new(
        client: CatalogClient,
        tokens: Arc<dyn TokenProvider>,
        listing_url: Url,
        lookback_days: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            tokens,
            listing_url,
            lookback_days,
            timeout,
        }
    }

    fn page_url(&self, since: NaiveDate, cursor: Option<u64>) -> Url {
        let mut url = self.listing_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("limit", &SCAN_PAGE_SIZE.to_string())
                .append_pair("suppressed", "false")
                .append_pair("fields", "id")
                .append_pair("createdDate", &format!("[{since}T00:00:00Z,]"));
            if let Some(cursor) = cursor {
                pairs.append_pair("id", &format!("[{cursor},]"));
            }
        }
        url
    }
}

#[async_trait]
impl LastIdSource for ScanLastIdSource {
    async fn last_id(&self) -> Result<u64> {
        let token = self.tokens.acquire().await?;
        let since = Utc::now()
            .date_naive()
            .checked_sub_days(Days::new(u64::from(self.lookback_days)))
            .ok_or_else(|| {
                CatalogError::Configuration("last_id.scan_lookback_days is too large".to_string())
            })?;

        let mut cursor: Option<u64> = None;
        let mut page = 0u32;
        loop {
            page += 1;
            let url = self.page_url(since, cursor);
            tracing::debug!(page, cursor = ?cursor, "Scanning record listing");

            let request = self
                .client
                .http()
                .get(url)
                .header(reqwest::header::AUTHORIZATION, token.bearer())
                .timeout(self.timeout);
            let listing = get_listing(request, "record listing").await?;

            let last = listing.entries.last().map(|e| e.id).ok_or_else(|| {
                CatalogError::UpstreamUnavailable(format!(
                    "record listing page {page} returned no entries"
                ))
            })?;

            if listing.total < SCAN_PAGE_SIZE {
                tracing::info!(last_id = last, pages = page, "Record listing scan finished");
                return Ok(last);
            }

            if cursor.is_some_and(|c| last <= c) {
                return Err(CatalogError::UpstreamUnavailable(format!(
                    "record listing did not advance past ID {last} on page {page}"
                )));
            }
            cursor = Some(last);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::catalog::token::AccessToken;
    use crate::config::{secret_string, CatalogConfig};
    use mockito::{Matcher, Server};

    struct StaticToken;

    #[async_trait]
    impl TokenProvider for StaticToken {
        async fn acquire(&self) -> Result<AccessToken> {
            Ok(AccessToken {
                token: secret_string("tok".to_string()),
                expires_in: Duration::from_secs(3600),
            })
        }
    }

    fn client(root: &str) -> CatalogClient {
        let config: CatalogConfig = toml::from_str(&format!(
            "root_url = \"{root}\"\nusername = \"k\"\npassword = \"s\"\n"
        ))
        .unwrap();
        CatalogClient::new(&config).unwrap()
    }

    fn scan_source(root: &str) -> ScanLastIdSource {
        let client = client(root);
        let listing_url = client.endpoint("bibs/").unwrap();
        ScanLastIdSource::new(
            client,
            Arc::new(StaticToken),
            listing_url,
            7,
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_url_source_numeric_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lastbib.json")
            .with_status(200)
            .with_body(r#"{"total": 1, "entries": [{"id": 1004000}]}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/lastbib.json", server.url())).unwrap();
        let source = UrlLastIdSource::new(client(&server.url()), url, Duration::from_secs(5));
        assert_eq!(source.last_id().await.unwrap(), 1_004_000);
    }

    #[tokio::test]
    async fn test_url_source_string_id() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lastbib.json")
            .with_status(200)
            .with_body(r#"{"entries": [{"id": "1004000", "deleted": false}]}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/lastbib.json", server.url())).unwrap();
        let source = UrlLastIdSource::new(client(&server.url()), url, Duration::from_secs(5));
        assert_eq!(source.last_id().await.unwrap(), 1_004_000);
    }

    #[tokio::test]
    async fn test_url_source_empty_entries() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lastbib.json")
            .with_status(200)
            .with_body(r#"{"entries": []}"#)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/lastbib.json", server.url())).unwrap();
        let source = UrlLastIdSource::new(client(&server.url()), url, Duration::from_secs(5));
        assert!(matches!(
            source.last_id().await,
            Err(CatalogError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_url_source_server_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lastbib.json")
            .with_status(503)
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/lastbib.json", server.url())).unwrap();
        let source = UrlLastIdSource::new(client(&server.url()), url, Duration::from_secs(5));
        let err = source.last_id().await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }

    #[tokio::test]
    async fn test_scan_follows_pages() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/bibs/")
            .match_query(Matcher::Regex(
                r"^limit=2000&suppressed=false&fields=id&createdDate=[^&]+$".to_string(),
            ))
            .match_header("authorization", "Bearer tok")
            .with_status(200)
            .with_body(r#"{"total": 2000, "entries": [{"id": "1002000"}, {"id": "1003999"}]}"#)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/bibs/")
            .match_query(Matcher::UrlEncoded("id".into(), "[1003999,]".into()))
            .with_status(200)
            .with_body(r#"{"total": 2, "entries": [{"id": "1003999"}, {"id": "1004000"}]}"#)
            .expect(1)
            .create_async()
            .await;

        assert_eq!(scan_source(&server.url()).last_id().await.unwrap(), 1_004_000);
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_scan_empty_page_is_upstream_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bibs/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total": 0, "entries": []}"#)
            .create_async()
            .await;

        assert!(matches!(
            scan_source(&server.url()).last_id().await,
            Err(CatalogError::UpstreamUnavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_scan_stalled_cursor_is_upstream_unavailable() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bibs/")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"total": 2000, "entries": [{"id": "1003999"}]}"#)
            .create_async()
            .await;

        let err = scan_source(&server.url()).last_id().await.unwrap_err();
        assert!(err.to_string().contains("did not advance"));
    }

    #[test]
    fn test_page_url_query() {
        let source = scan_source("https://catalog.example.edu/api/v6");
        let since = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();

        let first = source.page_url(since, None);
        assert_eq!(first.path(), "/api/v6/bibs/");
        let pairs: Vec<(String, String)> = first.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("createdDate".into(), "[2025-03-01T00:00:00Z,]".into())));
        assert!(!pairs.iter().any(|(k, _)| k == "id"));

        let next = source.page_url(since, Some(42));
        assert!(next
            .query_pairs()
            .any(|(k, v)| k == "id" && v == "[42,]"));
    }
}
