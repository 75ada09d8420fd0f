//! Configuration structures and defaults for the fetcher.
//!
//! [`FetcherConfig`] is filled in by [`FetcherBuilder`](super::FetcherBuilder).
//! Everything a fetcher talks to (root URL, API key, proxy) lives here rather
//! than in process-wide state, so fetchers pointed at different endpoints can
//! coexist.
//!
//! # Examples
//!
//! ```rust
//! use mlhub_archive::fetcher::FetchCallback;
//! use mlhub_archive::archive::{Status, Summary};
//!
//! let callback: FetchCallback = Box::new(|summary: &Summary| {
//!     match summary.status() {
//!         Status::Fail(msg) => eprintln!("✗ {}: {}", summary.identifier(), msg),
//!         _ => println!("✓ {}", summary.path().display()),
//!     }
//! });
//! ```

use crate::archive::Summary;
use crate::progress::{ProgressObserver, StyleOptions};

use reqwest::header::HeaderMap;
use std::sync::Arc;

/// Root of the catalog API used when none is configured.
pub const DEFAULT_ROOT_URL: &str = "https://api.radiant.earth/mlhub/v1/";

/// Largest slice written to disk between two progress notifications.
pub const DEFAULT_CHUNK_SIZE: usize = 1024 * 1024;

/// Callback type for archive completion events
pub type FetchCallback = Box<dyn Fn(&Summary) + Send + Sync>;

/// Configuration structure for the fetcher
#[derive(Clone)]
pub struct FetcherConfig {
    /// Root URL of the catalog API.
    pub root_url: String,
    /// API key sent as the `key` query parameter.
    pub api_key: Option<String>,
    /// Number of retries per HTTP request.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<reqwest::Proxy>,
    /// Custom HTTP headers.
    pub headers: Option<HeaderMap>,
    /// Largest slice written between two progress notifications.
    pub chunk_size: usize,
    /// Number of archives fetched at once by `fetch_all`.
    pub concurrent_fetches: usize,
    /// Progress bar style options, used when no observer is set.
    pub style_options: StyleOptions,
    /// Observer receiving progress notifications instead of progress bars.
    pub observer: Option<Arc<dyn ProgressObserver>>,
    /// Callback for when each archive of `fetch_all` completes.
    pub on_complete: Option<Arc<FetchCallback>>,
}

impl std::fmt::Debug for FetcherConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherConfig")
            .field("root_url", &self.root_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("retries", &self.retries)
            .field("proxy", &self.proxy)
            .field("headers", &self.headers)
            .field("chunk_size", &self.chunk_size)
            .field("concurrent_fetches", &self.concurrent_fetches)
            .field("style_options", &self.style_options)
            .field("observer", &self.observer.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            root_url: DEFAULT_ROOT_URL.to_string(),
            api_key: None,
            retries: 3,
            proxy: None,
            headers: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
            concurrent_fetches: 4,
            style_options: StyleOptions::default(),
            observer: None,
            on_complete: None,
        }
    }
}
