//! The archive fetcher, its builder and configuration.
//!
//! - `fetcher` - [`Fetcher`] with the resolve/compare/transfer logic
//! - `builder` - [`FetcherBuilder`] for configuring a fetcher
//! - `config` - [`FetcherConfig`], defaults and callback types
//!
//! # Examples
//!
//! ```rust,no_run
//! use mlhub_archive::{FetcherBuilder, IfExists, Status};
//! use std::path::Path;
//!
//! # async fn example() -> mlhub_archive::Result<()> {
//! let fetcher = FetcherBuilder::new().api_key("my-api-key").build()?;
//! let summaries = fetcher
//!     .fetch_all(
//!         &["bigearthnet_v1_source", "bigearthnet_v1_labels"],
//!         Path::new("./archives"),
//!         IfExists::Resume,
//!     )
//!     .await;
//!
//! for summary in summaries {
//!     if let Status::Fail(msg) = summary.status() {
//!         eprintln!("{}: {}", summary.identifier(), msg);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod config;
pub mod fetcher;

pub use builder::FetcherBuilder;
pub use config::{FetchCallback, FetcherConfig, DEFAULT_CHUNK_SIZE, DEFAULT_ROOT_URL};
pub use fetcher::Fetcher;
