use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use httpmock::prelude::*;
use httpmock::Mock;
use mlhub_archive::progress::{ProgressBarOpts, StyleOptions};
use mlhub_archive::{Fetcher, FetcherBuilder, Progress, ProgressObserver};
use serde_json::json;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

// Common test constants
pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_IDENTIFIER: &str = "sn1_AOI_1_RIO";
pub const UNKNOWN_IDENTIFIER: &str = "does_not_exist";

/// Installs a test subscriber once; `RUST_LOG=mlhub_archive=debug` shows the fetch steps.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Creates a temporary directory for testing purposes
pub fn create_temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temporary directory")
}

/// Creates a temporary file with the given content
pub fn create_temp_file(dir: &Path, filename: &str, content: &[u8]) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).expect("Failed to write temporary file");
    file_path
}

/// Creates a sparse file of the given length
pub fn create_sparse_file(dir: &Path, filename: &str, len: u64) -> PathBuf {
    let file_path = dir.join(filename);
    let file = fs::File::create(&file_path).expect("Failed to create sparse file");
    file.set_len(len).expect("Failed to extend sparse file");
    file_path
}

/// Creates test file content of specified size
pub fn create_test_content(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// Asserts that a file has the expected size
pub fn assert_file_size(path: &Path, expected_size: u64) {
    let metadata = fs::metadata(path).expect("Failed to get file metadata");
    assert_eq!(
        metadata.len(),
        expected_size,
        "File size mismatch at path: {:?}",
        path
    );
}

/// Path of the archive metadata endpoint
pub fn info_path(identifier: &str) -> String {
    format!("/archive/{}/info", identifier)
}

/// Path of the archive data endpoint
pub fn archive_path(identifier: &str) -> String {
    format!("/archive/{}", identifier)
}

/// Creates hidden style options for testing
pub fn create_disabled_style_options() -> StyleOptions {
    StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden())
}

/// Creates a fetcher builder pointed at the mock server
pub fn create_test_fetcher_builder(server: &MockServer) -> FetcherBuilder {
    FetcherBuilder::hidden()
        .root_url(server.base_url())
        .api_key(TEST_API_KEY)
        .retries(0)
}

/// Creates a fetcher pointed at the mock server
pub fn create_test_fetcher(server: &MockServer) -> Fetcher {
    create_test_fetcher_builder(server)
        .build()
        .expect("Failed to build fetcher")
}

/// Mocks the metadata endpoint of an archive with the given size
pub async fn mock_archive_info<'a>(server: &'a MockServer, identifier: &str, size: u64) -> Mock<'a> {
    let path = info_path(identifier);
    let body = json!({
        "collection": identifier,
        "dataset": "test_dataset",
        "size": size,
    });
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("key", TEST_API_KEY);
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        })
        .await
}

/// Mocks an unknown archive
pub async fn mock_unknown_archive<'a>(server: &'a MockServer, identifier: &str) -> Mock<'a> {
    let path = info_path(identifier);
    server
        .mock_async(|when, then| {
            when.method(GET).path(path);
            then.status(404)
                .header("content-type", "application/json")
                .json_body(json!({ "detail": "Not Found" }));
        })
        .await
}

/// Mocks a full (non ranged) archive download
pub async fn mock_archive_body<'a>(server: &'a MockServer, identifier: &str, body: &[u8]) -> Mock<'a> {
    let path = archive_path(identifier);
    let body = body.to_vec();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("key", TEST_API_KEY);
            then.status(200)
                .header("content-type", "application/gzip")
                .body(body);
        })
        .await
}

/// Mocks a ranged archive download starting at `offset`
pub async fn mock_archive_range<'a>(
    server: &'a MockServer,
    identifier: &str,
    full: &[u8],
    offset: usize,
) -> Mock<'a> {
    let path = archive_path(identifier);
    let range = format!("bytes={}-", offset);
    let content_range = format!("bytes {}-{}/{}", offset, full.len() - 1, full.len());
    let body = full[offset..].to_vec();
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path(path)
                .query_param("key", TEST_API_KEY)
                .header("range", range);
            then.status(206)
                .header("content-type", "application/gzip")
                .header("content-range", content_range)
                .body(body);
        })
        .await
}

/// Serves an archive over raw TCP, cutting full downloads off after `cut` bytes.
///
/// The metadata endpoint answers normally and ranged requests are served in
/// full, so a fetch interrupted by the cut can be resumed. Returns the base URL
/// and the head of every request received.
pub async fn spawn_truncating_server(
    identifier: &str,
    full: Vec<u8>,
    cut: usize,
) -> (String, Arc<Mutex<Vec<String>>>) {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read listener address");
    let requests = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let info = json!({
        "collection": identifier,
        "dataset": "test_dataset",
        "size": full.len(),
    })
    .to_string();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let head = read_request_head(&mut socket).await;
            log.lock().unwrap().push(head.clone());

            let head = head.to_ascii_lowercase();
            let request_line = head.lines().next().unwrap_or_default();
            let response = if request_line.contains("/info") {
                raw_response("200 OK", "content-type: application/json\r\n", info.as_bytes(), info.len())
            } else if let Some(offset) = requested_offset(&head) {
                let content_range = format!(
                    "content-range: bytes {}-{}/{}\r\n",
                    offset,
                    full.len() - 1,
                    full.len()
                );
                raw_response("206 Partial Content", &content_range, &full[offset..], full.len() - offset)
            } else {
                // Announce the whole archive but close after `cut` bytes.
                raw_response("200 OK", "", &full[..cut], full.len())
            };

            let _ = socket.write_all(&response).await;
            let _ = socket.shutdown().await;
        }
    });

    (format!("http://{}", addr), requests)
}

async fn read_request_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(n) => head.extend_from_slice(&buf[..n]),
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn requested_offset(head: &str) -> Option<usize> {
    head.lines()
        .find_map(|line| line.strip_prefix("range: bytes="))
        .and_then(|range| range.split('-').next())
        .and_then(|start| start.trim().parse().ok())
}

fn raw_response(status: &str, extra_headers: &str, body: &[u8], content_length: usize) -> Vec<u8> {
    let mut response = format!(
        "HTTP/1.1 {}\r\n{}content-length: {}\r\nconnection: close\r\n\r\n",
        status, extra_headers, content_length
    )
    .into_bytes();
    response.extend_from_slice(body);
    response
}

/// Observer recording every notification it receives
#[derive(Clone, Default)]
pub struct RecordingObserver {
    pub starts: Arc<Mutex<Vec<(String, u64, u64)>>>,
    pub chunks: Arc<Mutex<Vec<(String, u64)>>>,
    pub finished: Arc<Mutex<Vec<String>>>,
}

impl RecordingObserver {
    /// Transferred counts reported for `identifier`, in order
    pub fn positions(&self, identifier: &str) -> Vec<u64> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|(id, _)| id == identifier)
            .map(|(_, transferred)| *transferred)
            .collect()
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_start(&self, progress: &Progress<'_>) {
        self.starts.lock().unwrap().push((
            progress.identifier.to_string(),
            progress.transferred,
            progress.total,
        ));
    }

    fn on_chunk(&self, progress: &Progress<'_>) {
        self.chunks
            .lock()
            .unwrap()
            .push((progress.identifier.to_string(), progress.transferred));
    }

    fn on_finish(&self, identifier: &str) {
        self.finished.lock().unwrap().push(identifier.to_string());
    }
}
