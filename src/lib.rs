//! Fetch collection archives from the Radiant MLHub catalog API.
//!
//! Every collection hosted by the catalog can be downloaded as a single
//! gzipped tarball. This crate resolves an archive identifier, compares the
//! remote length with whatever is already on disk, and downloads or resumes
//! the archive with ranged requests.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mlhub_archive::{FetcherBuilder, IfExists};
//! use std::path::Path;
//!
//! # #[tokio::main]
//! # async fn main() -> mlhub_archive::Result<()> {
//! let fetcher = FetcherBuilder::new().api_key("my-api-key").build()?;
//! let path = fetcher
//!     .fetch("ref_african_crops_kenya_02_labels", Path::new("output"), IfExists::Resume)
//!     .await?;
//! assert!(path.ends_with("ref_african_crops_kenya_02_labels.tar.gz"));
//! # Ok(())
//! # }
//! ```
//!
//! # Module Organization
//!
//! - [`archive`] - archive references, transfer state, policies and summaries
//! - [`fetcher`] - the [`Fetcher`] and [`FetcherBuilder`]
//! - [`error`] - the [`Error`] enum
//! - [`http`] - HTTP client construction
//! - [`progress`] - progress observers and progress bar styling
//! - [`utils`] - `Content-Range` helpers

pub mod archive;
pub mod error;
pub mod fetcher;
pub mod http;
pub mod progress;
pub mod utils;

pub use archive::{ArchiveInfo, ArchiveReference, IfExists, Status, Summary, TransferState};
pub use error::{Error, Result};
pub use fetcher::{Fetcher, FetcherBuilder};
pub use http::{create_http_client, HttpClientConfig};
pub use progress::{NoProgress, Progress, ProgressBarObserver, ProgressObserver, StyleOptions};
