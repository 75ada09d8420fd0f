//! Progress reporting.
//!
//! - `observer` - the [`ProgressObserver`] trait and the [`Progress`] snapshot it receives
//! - `display` - [`ProgressBarObserver`], terminal bars built on `indicatif`
//! - `style` - bar templates and visibility options
//!
//! # Examples
//!
//! ## Recording progress instead of drawing it
//!
//! ```rust
//! use mlhub_archive::progress::{Progress, ProgressObserver};
//! use std::sync::Mutex;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<u64>>);
//!
//! impl ProgressObserver for Recorder {
//!     fn on_chunk(&self, progress: &Progress<'_>) {
//!         self.0.lock().unwrap().push(progress.transferred);
//!     }
//! }
//! ```
//!
//! ## Hidden progress bars
//!
//! ```rust
//! use mlhub_archive::FetcherBuilder;
//!
//! let fetcher = FetcherBuilder::hidden().build();
//! ```

pub(crate) mod display;
pub(crate) mod observer;
pub(crate) mod style;

pub use display::ProgressBarObserver;
pub use observer::{NoProgress, Progress, ProgressObserver};
pub use style::{ProgressBarOpts, StyleOptions};
