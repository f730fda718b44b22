//! End-to-end export runs against a mock catalog
//!
//! These tests wire the real token provider, last-ID lookup, fetcher and
//! file checkpoint through `build_scheduler` and verify:
//! - A fresh run plans once and drains every batch
//! - Soft successes save the raw response body as the artifact
//! - The rate limit halts the run and the next run resumes at the same batch
//! - Deadline and shutdown stop the loop between batches
//! - A checkpoint left by an earlier run is resumed without re-planning

use catalog_export::cli::commands::export::{build_scheduler, exit_code_for_error, exit_code_for_stop};
use catalog_export::config::{parse_config, CatalogExportConfig};
use catalog_export::core::checkpoint::{Batch, Checkpoint, CheckpointStorage, FileCheckpointStorage};
use catalog_export::core::export::StopReason;
use catalog_export::core::verification::marc::build_record;
use catalog_export::domain::{CatalogError, HardFailureKind, IdRange};
use chrono::Utc;
use mockito::{Matcher, Mock, Server, ServerGuard};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;

const RATE_LIMIT_BODY: &str = r#"{"code": 132, "name": "Rate exceeded for endpoint"}"#;
const EXTERNAL_FAILURE_BODY: &str = r#"{"code": 109, "name": "External Process Failed"}"#;
const EMPTY_RANGE_BODY: &str = r#"{"outputRecords": 0}"#;

fn config_for(server: &ServerGuard, dir: &TempDir) -> CatalogExportConfig {
    let toml = format!(
        r#"
[catalog]
root_url = "{root}"
username = "key"
password = "secret"

[last_id]
url = "{root}/last"

[export]
range_start = 1000
chunk_size = 2
download_dir = "{downloads}"

[checkpoint]
path = "{checkpoint}"
"#,
        root = server.url(),
        downloads = dir.path().join("downloads").display(),
        checkpoint = dir.path().join("tracker.json").display(),
    );
    parse_config(&toml, |_| None).unwrap()
}

const GENEROUS_BUDGET: Duration = Duration::from_secs(300);

fn marc_fixture(id: &str) -> Vec<u8> {
    build_record(&[("001", id.as_bytes()), ("245", b"10\x1faA title")])
}

async fn mock_token(server: &mut ServerGuard) -> Mock {
    server
        .mock("POST", "/token")
        .match_header("authorization", "Basic a2V5OnNlY3JldA==")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token": "tok", "expires_in": 3600}"#)
        .create_async()
        .await
}

async fn mock_last_id(server: &mut ServerGuard, id: u64, hits: usize) -> Mock {
    server
        .mock("GET", "/last")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(format!(r#"{{"total": 1, "entries": [{{"id": "{id}"}}]}}"#))
        .expect(hits)
        .create_async()
        .await
}

fn batch_query(start: u64, last: u64) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("id".into(), format!("[{start},{last}]")),
        Matcher::UrlEncoded("limit".into(), (last - start + 1).to_string()),
        Matcher::UrlEncoded("mapping".into(), "toc".into()),
    ])
}

async fn mock_export(
    server: &mut ServerGuard,
    start: u64,
    last: u64,
    status: usize,
    body: &str,
    hits: usize,
) -> Mock {
    server
        .mock("GET", "/bibs/marc")
        .match_query(batch_query(start, last))
        .match_header("authorization", "Bearer tok")
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

/// Export response pointing at `/files/{name}` plus the file itself
async fn mock_export_with_file(
    server: &mut ServerGuard,
    start: u64,
    last: u64,
    name: &str,
    contents: &[u8],
) -> (Mock, Mock) {
    let body = format!(
        r#"{{"outputRecords": 2, "file": "{}/files/{name}"}}"#,
        server.url()
    );
    let export = mock_export(server, start, last, 200, &body, 1).await;
    let file = server
        .mock("GET", format!("/files/{name}").as_str())
        .match_header("authorization", "Bearer tok")
        .with_status(200)
        .with_body(contents)
        .expect(1)
        .create_async()
        .await;
    (export, file)
}

async fn stored_checkpoint(path: &Path) -> Checkpoint {
    FileCheckpointStorage::new(path)
        .read()
        .await
        .unwrap()
        .expect("checkpoint should exist")
}

#[tokio::test]
async fn test_fresh_run_drains_all_batches() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _token = mock_token(&mut server).await;
    let last_id = mock_last_id(&mut server, 1005, 1).await;
    let first = marc_fixture("b1000");
    let (export_1, file_1) = mock_export_with_file(&mut server, 1000, 1001, "b1", &first).await;
    let export_2 = mock_export(&mut server, 1002, 1003, 200, EMPTY_RANGE_BODY, 1).await;
    let export_3 = mock_export(&mut server, 1004, 1005, 500, EXTERNAL_FAILURE_BODY, 1).await;

    let (_tx, rx) = watch::channel(false);
    let scheduler = build_scheduler(&config, rx).unwrap();
    let summary = scheduler.run(GENEROUS_BUDGET).await.unwrap();

    assert!(matches!(summary.stop_reason, StopReason::Drained));
    assert_eq!(exit_code_for_stop(&summary.stop_reason), 0);
    assert_eq!(summary.total_batches, 3);
    assert_eq!(summary.batches_completed, 3);
    assert_eq!(summary.soft_successes, 2);
    assert_eq!(summary.pending, 0);

    let downloads = &config.export.download_dir;
    assert_eq!(
        std::fs::read(downloads.join("catalog_export_0001.mrc")).unwrap(),
        first
    );
    assert_eq!(
        std::fs::read_to_string(downloads.join("catalog_export_0002.mrc")).unwrap(),
        EMPTY_RANGE_BODY
    );
    assert_eq!(
        std::fs::read_to_string(downloads.join("catalog_export_0003.mrc")).unwrap(),
        EXTERNAL_FAILURE_BODY
    );

    let checkpoint = stored_checkpoint(&config.checkpoint.path).await;
    assert_eq!(checkpoint.last_known_id, Some(1005));
    assert!(checkpoint.is_drained());
    let starts: Vec<u64> = checkpoint.batches.iter().map(|b| b.range_start).collect();
    assert_eq!(starts, vec![1000, 1002, 1004]);

    for mock in [&last_id, &export_1, &file_1, &export_2, &export_3] {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_rate_limit_halts_then_next_run_resumes() {
    let dir = TempDir::new().unwrap();

    // First run: batch 2 hits the throttle
    {
        let mut server = Server::new_async().await;
        let config = config_for(&server, &dir);

        let _token = mock_token(&mut server).await;
        let _last_id = mock_last_id(&mut server, 1005, 1).await;
        let (_export_1, _file_1) =
            mock_export_with_file(&mut server, 1000, 1001, "b1", &marc_fixture("b1000")).await;
        let export_2 = mock_export(&mut server, 1002, 1003, 500, RATE_LIMIT_BODY, 1).await;
        let export_3 = mock_export(&mut server, 1004, 1005, 200, EMPTY_RANGE_BODY, 0).await;

        let (_tx, rx) = watch::channel(false);
        let summary = build_scheduler(&config, rx)
            .unwrap()
            .run(GENEROUS_BUDGET)
            .await
            .unwrap();

        match &summary.stop_reason {
            StopReason::Halted(failure) => {
                assert_eq!(failure.range, IdRange::new(1002, 1004));
                assert!(matches!(failure.kind, HardFailureKind::RateLimited { .. }));
            }
            other => panic!("expected halt, got {other}"),
        }
        assert_eq!(exit_code_for_stop(&summary.stop_reason), 3);
        assert_eq!(summary.batches_completed, 1);
        assert_eq!(summary.pending, 2);
        assert!(!config
            .export
            .download_dir
            .join("catalog_export_0002.mrc")
            .exists());

        export_2.assert_async().await;
        export_3.assert_async().await;
    }

    // Second run against a fresh server: no re-planning, batch 1 skipped
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _token = mock_token(&mut server).await;
    let last_id = mock_last_id(&mut server, 9999, 0).await;
    let export_1 = mock_export(&mut server, 1000, 1001, 200, EMPTY_RANGE_BODY, 0).await;
    let export_2 = mock_export(&mut server, 1002, 1003, 200, EMPTY_RANGE_BODY, 1).await;
    let export_3 = mock_export(&mut server, 1004, 1005, 200, EMPTY_RANGE_BODY, 1).await;

    let (_tx, rx) = watch::channel(false);
    let summary = build_scheduler(&config, rx)
        .unwrap()
        .run(GENEROUS_BUDGET)
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::Drained));
    assert_eq!(summary.batches_completed, 2);

    let checkpoint = stored_checkpoint(&config.checkpoint.path).await;
    assert_eq!(checkpoint.last_known_id, Some(1005));
    assert_eq!(checkpoint.batches.len(), 3);
    assert!(checkpoint.is_drained());

    for mock in [&last_id, &export_1, &export_2, &export_3] {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_expired_deadline_plans_but_fetches_nothing() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _token = mock_token(&mut server).await;
    let last_id = mock_last_id(&mut server, 1005, 1).await;
    let export = server
        .mock("GET", "/bibs/marc")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (_tx, rx) = watch::channel(false);
    let summary = build_scheduler(&config, rx)
        .unwrap()
        .run(Duration::ZERO)
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::DeadlineReached));
    assert_eq!(summary.batches_attempted, 0);
    assert_eq!(summary.pending, 3);

    let checkpoint = stored_checkpoint(&config.checkpoint.path).await;
    assert_eq!(checkpoint.batches.len(), 3);
    assert_eq!(checkpoint.completed_count(), 0);

    last_id.assert_async().await;
    export.assert_async().await;
}

#[tokio::test]
async fn test_shutdown_signal_stops_before_first_batch() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _token = mock_token(&mut server).await;
    let _last_id = mock_last_id(&mut server, 1005, 1).await;
    let export = server
        .mock("GET", "/bibs/marc")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let (tx, rx) = watch::channel(false);
    tx.send(true).unwrap();

    let summary = build_scheduler(&config, rx)
        .unwrap()
        .run(GENEROUS_BUDGET)
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::Interrupted));
    assert_eq!(exit_code_for_stop(&summary.stop_reason), 130);
    export.assert_async().await;
}

#[tokio::test]
async fn test_resume_from_existing_checkpoint() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    // State left by a run that died after finishing batch 1
    let mut checkpoint = Checkpoint::empty();
    checkpoint.last_known_id = Some(1005);
    let mut done = Batch::new(IdRange::new(1000, 1002), "catalog_export_0001.mrc");
    done.completed_at = Some(Utc::now());
    checkpoint.batches = vec![
        done,
        Batch::new(IdRange::new(1002, 1004), "catalog_export_0002.mrc"),
        Batch::new(IdRange::new(1004, 1006), "catalog_export_0003.mrc"),
    ];
    FileCheckpointStorage::new(&config.checkpoint.path)
        .replace(&checkpoint)
        .await
        .unwrap();

    let _token = mock_token(&mut server).await;
    let last_id = mock_last_id(&mut server, 1005, 0).await;
    let export_1 = mock_export(&mut server, 1000, 1001, 200, EMPTY_RANGE_BODY, 0).await;
    let export_2 = mock_export(&mut server, 1002, 1003, 200, EMPTY_RANGE_BODY, 1).await;
    let export_3 = mock_export(&mut server, 1004, 1005, 200, EMPTY_RANGE_BODY, 1).await;

    let (_tx, rx) = watch::channel(false);
    let summary = build_scheduler(&config, rx)
        .unwrap()
        .run(GENEROUS_BUDGET)
        .await
        .unwrap();

    assert!(matches!(summary.stop_reason, StopReason::Drained));
    assert_eq!(summary.batches_attempted, 2);

    let stored = stored_checkpoint(&config.checkpoint.path).await;
    assert_eq!(stored.batches[0].completed_at, checkpoint.batches[0].completed_at);

    for mock in [&last_id, &export_1, &export_2, &export_3] {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_token_failure_stops_run() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _token = server
        .mock("POST", "/token")
        .with_status(401)
        .with_body(r#"{"name": "Unauthorized"}"#)
        .create_async()
        .await;
    let _last_id = mock_last_id(&mut server, 1005, 1).await;

    let (_tx, rx) = watch::channel(false);
    let summary = build_scheduler(&config, rx)
        .unwrap()
        .run(GENEROUS_BUDGET)
        .await
        .unwrap();

    assert!(matches!(
        summary.stop_reason,
        StopReason::Failed(CatalogError::Authentication(_))
    ));
    assert_eq!(exit_code_for_stop(&summary.stop_reason), 4);
    assert_eq!(summary.pending, 3);
}

#[tokio::test]
async fn test_unavailable_last_id_aborts_before_planning() {
    let dir = TempDir::new().unwrap();
    let mut server = Server::new_async().await;
    let config = config_for(&server, &dir);

    let _last_id = server
        .mock("GET", "/last")
        .with_status(503)
        .create_async()
        .await;

    let (_tx, rx) = watch::channel(false);
    let result = build_scheduler(&config, rx)
        .unwrap()
        .run(GENEROUS_BUDGET)
        .await;

    let error = result.unwrap_err();
    assert!(matches!(error, CatalogError::UpstreamUnavailable(_)));
    assert_eq!(exit_code_for_error(&error), 4);

    let checkpoint = stored_checkpoint(&config.checkpoint.path).await;
    assert!(checkpoint.last_known_id.is_none());
    assert!(checkpoint.batches.is_empty());
}
