//! Builder pattern implementation for creating Fetcher instances.
//!
//! # Examples
//!
//! ## Basic Builder Usage
//!
//! ```rust
//! use mlhub_archive::FetcherBuilder;
//!
//! # fn example() -> mlhub_archive::Result<()> {
//! let fetcher = FetcherBuilder::new()
//!     .api_key("my-api-key")
//!     .retries(5)
//!     .build()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Another Endpoint with Callbacks
//!
//! ```rust
//! use mlhub_archive::FetcherBuilder;
//! use mlhub_archive::archive::Status;
//!
//! # fn example() -> mlhub_archive::Result<()> {
//! let fetcher = FetcherBuilder::hidden()
//!     .root_url("http://localhost:8080/mlhub/v1/")
//!     .concurrent_fetches(2)
//!     .on_complete(|summary| {
//!         if let Status::Fail(msg) = summary.status() {
//!             eprintln!("{} failed: {}", summary.identifier(), msg);
//!         }
//!     })
//!     .build()?;
//! # Ok(())
//! # }
//! ```

use super::{config::FetcherConfig, fetcher::Fetcher};
use crate::archive::Summary;
use crate::error::Result;
use crate::progress::{ProgressBarOpts, ProgressObserver, StyleOptions};

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName};
use std::sync::Arc;

/// A builder used to create a [`Fetcher`].
#[derive(Default)]
pub struct FetcherBuilder {
    config: FetcherConfig,
}

impl FetcherBuilder {
    /// Creates a builder with the default options.
    pub fn new() -> Self {
        FetcherBuilder::default()
    }

    /// Convenience function to hide the progress bars.
    pub fn hidden() -> Self {
        let mut builder = FetcherBuilder::default();
        builder.config.style_options =
            StyleOptions::new(ProgressBarOpts::hidden(), ProgressBarOpts::hidden());
        builder
    }

    /// Sets the root URL of the catalog API.
    pub fn root_url(mut self, root_url: impl Into<String>) -> Self {
        self.config.root_url = root_url.into();
        self
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    /// Set the number of retries per HTTP request.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Route requests through a proxy.
    pub fn proxy(mut self, proxy: reqwest::Proxy) -> Self {
        self.config.proxy = Some(proxy);
        self
    }

    /// Set the largest slice written between two progress notifications.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.config.chunk_size = chunk_size.max(1);
        self
    }

    /// Set the number of archives `fetch_all` transfers at once.
    pub fn concurrent_fetches(mut self, concurrent_fetches: usize) -> Self {
        self.config.concurrent_fetches = concurrent_fetches.max(1);
        self
    }

    /// Set the progress bar style options.
    pub fn style_options(mut self, style_options: StyleOptions) -> Self {
        self.config.style_options = style_options;
        self
    }

    /// Report progress to `observer` instead of drawing progress bars.
    pub fn observer<O>(mut self, observer: O) -> Self
    where
        O: ProgressObserver + 'static,
    {
        self.config.observer = Some(Arc::new(observer));
        self
    }

    /// Set callback for when each archive of `fetch_all` completes.
    ///
    /// The callback runs as soon as an archive finishes, regardless of
    /// whether other archives are still transferring.
    pub fn on_complete<F>(mut self, callback: F) -> Self
    where
        F: Fn(&Summary) + Send + Sync + 'static,
    {
        self.config.on_complete = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Helper method to get or create a new HeaderMap.
    fn new_header(&self) -> HeaderMap {
        match self.config.headers {
            Some(ref h) => h.to_owned(),
            _ => HeaderMap::new(),
        }
    }

    /// Add http headers sent with every request.
    ///
    /// You can call `.headers()` multiple times and all `HeaderMap` will be merged into a single one.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        let mut new = self.new_header();
        new.extend(headers);

        self.config.headers = Some(new);
        self
    }

    /// Add a single http header sent with every request.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        let mut new = self.new_header();

        new.insert(name, value);

        self.config.headers = Some(new);
        self
    }

    /// Create the [`Fetcher`] with the specified options.
    ///
    /// Fails when the root URL cannot be parsed or the HTTP client cannot be
    /// constructed.
    pub fn build(self) -> Result<Fetcher> {
        Fetcher::new(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use reqwest::header::USER_AGENT;

    #[test]
    fn test_builder_defaults() {
        let fetcher = FetcherBuilder::new().build().unwrap();

        assert_eq!(fetcher.root_url().as_str(), "https://api.radiant.earth/mlhub/v1/");
        assert_eq!(fetcher.retries(), 3);
        assert_eq!(fetcher.concurrent_fetches(), 4);
        assert_eq!(fetcher.chunk_size(), 1024 * 1024);
        assert!(!fetcher.has_api_key());
    }

    #[test]
    fn test_builder_clamps_zero() {
        let fetcher = FetcherBuilder::hidden()
            .chunk_size(0)
            .concurrent_fetches(0)
            .build()
            .unwrap();

        assert_eq!(fetcher.chunk_size(), 1);
        assert_eq!(fetcher.concurrent_fetches(), 1);
    }

    #[test]
    fn test_root_url_gets_trailing_slash() {
        let fetcher = FetcherBuilder::hidden()
            .root_url("http://localhost:1234/mlhub/v1")
            .build()
            .unwrap();
        assert_eq!(fetcher.root_url().as_str(), "http://localhost:1234/mlhub/v1/");
    }

    #[test]
    fn test_invalid_root_url() {
        let err = FetcherBuilder::hidden().root_url("not a url").build().unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
    }

    #[test]
    fn test_headers_merge() {
        let builder = FetcherBuilder::new()
            .header(USER_AGENT, HeaderValue::from_static("a"))
            .headers(HeaderMap::from_iter([(
                reqwest::header::ACCEPT,
                HeaderValue::from_static("*/*"),
            )]));

        let headers = builder.config.headers.as_ref().unwrap();
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let fetcher = FetcherBuilder::hidden().api_key("secret-key").build().unwrap();
        let debug_str = format!("{:?}", fetcher);

        assert!(debug_str.contains("Fetcher"));
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("secret-key"));
        assert!(fetcher.has_api_key());
    }
}
