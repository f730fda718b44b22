//! Per-batch export: request, classify, persist the artifact

use super::artifact::{ArtifactRecord, ArtifactStore};
use super::classify::{classify_response, Classification, SoftReason};
use crate::adapters::catalog::client::describe_transport_error;
use crate::adapters::catalog::{AccessToken, CatalogClient, TokenProvider};
use crate::config::CatalogConfig;
use crate::core::checkpoint::Batch;
use crate::domain::{body_snippet, HardFailure, HardFailureKind, IdRange, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Terminal-successful result of fetching one batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The artifact was downloaded
    Success { artifact: ArtifactRecord },
    /// The remote's response body was kept as the artifact; nothing to download
    SoftSuccess {
        reason: SoftReason,
        artifact: ArtifactRecord,
    },
}

impl FetchOutcome {
    pub fn artifact(&self) -> &ArtifactRecord {
        match self {
            FetchOutcome::Success { artifact } | FetchOutcome::SoftSuccess { artifact, .. } => {
                artifact
            }
        }
    }

    /// Short label for logs and summaries
    pub fn label(&self) -> &'static str {
        match self {
            FetchOutcome::Success { .. } => "success",
            FetchOutcome::SoftSuccess { reason, .. } => reason.as_str(),
        }
    }
}

/// Something that can process one batch
#[async_trait]
pub trait BatchFetcher: Send + Sync {
    /// Fetch one batch and persist its artifact
    ///
    /// # Errors
    ///
    /// - [`CatalogError::Authentication`](crate::domain::CatalogError::Authentication) if no token could be obtained
    /// - [`CatalogError::Fetch`](crate::domain::CatalogError::Fetch) for every remote or transport failure
    /// - [`CatalogError::Io`](crate::domain::CatalogError::Io) if the artifact cannot be written
    async fn fetch(&self, batch: &Batch) -> Result<FetchOutcome>;
}

/// Fetches batches from the catalog's range-export endpoint
pub struct ExportFetcher {
    client: CatalogClient,
    tokens: Arc<dyn TokenProvider>,
    store: ArtifactStore,
    export_url: Url,
    mapping: String,
    export_timeout: Duration,
    download_timeout: Duration,
}

impl ExportFetcher {
    pub fn new(
        client: CatalogClient,
        tokens: Arc<dyn TokenProvider>,
        store: ArtifactStore,
        config: &CatalogConfig,
    ) -> Result<Self> {
        let export_url = client.endpoint(&config.export_path)?;
        Ok(Self {
            client,
            tokens,
            store,
            export_url,
            mapping: config.mapping.clone(),
            export_timeout: Duration::from_secs(config.export_timeout_seconds),
            download_timeout: Duration::from_secs(config.download_timeout_seconds),
        })
    }

    /// Range-export URL for a batch
    ///
    /// The endpoint takes inclusive bounds, so the half-open range is sent as
    /// `id=[start,end-1]` with `limit = end - start`.
    pub fn request_url(&self, range: IdRange) -> Url {
        let mut url = self.export_url.clone();
        url.query_pairs_mut()
            .append_pair("id", &range.to_query_filter())
            .append_pair("limit", &range.width().to_string())
            .append_pair("mapping", &self.mapping);
        url
    }

    fn resolve_file_url(&self, range: IdRange, file_url: &str) -> Result<Url> {
        Url::parse(file_url)
            .or_else(|_| self.client.root().join(file_url))
            .map_err(|e| {
                HardFailure::new(
                    range,
                    HardFailureKind::MalformedResponse {
                        status: 200,
                        reason: format!("file URL '{file_url}' is not usable: {e}"),
                    },
                )
                .into()
            })
    }

    async fn download(
        &self,
        batch: &Batch,
        token: &AccessToken,
        file_url: Url,
    ) -> Result<ArtifactRecord> {
        let range = batch.range();
        let transport = |e: reqwest::Error| {
            HardFailure::new(range, HardFailureKind::Transport(describe_transport_error(&e)))
        };

        tracing::debug!(range = %range, url = %file_url, "Downloading artifact");

        let response = self
            .client
            .http()
            .get(file_url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .timeout(self.download_timeout)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = match response.bytes().await {
                Ok(bytes) => body_snippet(&bytes),
                Err(e) => {
                    let reason = describe_transport_error(&e);
                    tracing::warn!(
                        range = %range,
                        status = status.as_u16(),
                        error = %reason,
                        "Could not read download error body"
                    );
                    format!("<unreadable body: {reason}>")
                }
            };
            return Err(HardFailure::new(
                range,
                HardFailureKind::DownloadFailed {
                    status: status.as_u16(),
                    body,
                },
            )
            .into());
        }

        let mut writer = self.store.begin(&batch.artifact_name).await?;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let written = match chunk {
                Ok(bytes) => writer.write_chunk(&bytes).await,
                Err(e) => Err(transport(e).into()),
            };
            if let Err(e) = written {
                writer.abort().await;
                return Err(e);
            }
        }

        writer.finish().await
    }
}

#[async_trait]
impl BatchFetcher for ExportFetcher {
    async fn fetch(&self, batch: &Batch) -> Result<FetchOutcome> {
        let range = batch.range();
        let token = self.tokens.acquire().await?;

        let url = self.request_url(range);
        tracing::debug!(range = %range, url = %url, "Requesting range export");

        let response = self
            .client
            .http()
            .get(url)
            .header(reqwest::header::AUTHORIZATION, token.bearer())
            .timeout(self.export_timeout)
            .send()
            .await
            .map_err(|e| {
                HardFailure::new(range, HardFailureKind::Transport(describe_transport_error(&e)))
            })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| {
            HardFailure::new(range, HardFailureKind::Transport(describe_transport_error(&e)))
        })?;

        match classify_response(status, &body) {
            Classification::Download { file_url } => {
                let file_url = self.resolve_file_url(range, &file_url)?;
                let artifact = self.download(batch, &token, file_url).await?;
                tracing::info!(
                    range = %range,
                    artifact = %artifact.name,
                    bytes = artifact.bytes,
                    sha256 = %artifact.sha256,
                    "Artifact downloaded"
                );
                Ok(FetchOutcome::Success { artifact })
            }
            Classification::Soft(reason) => {
                let artifact = self.store.write_bytes(&batch.artifact_name, &body).await?;
                tracing::warn!(
                    range = %range,
                    status,
                    reason = %reason,
                    artifact = %artifact.name,
                    sha256 = %artifact.sha256,
                    "Batch completed without records; response body saved"
                );
                Ok(FetchOutcome::SoftSuccess { reason, artifact })
            }
            Classification::Hard(kind) => {
                let failure = HardFailure::new(range, kind);
                tracing::debug!(range = %range, status, "Response classified as hard failure");
                Err(failure.into())
            }
        }
    }
}
