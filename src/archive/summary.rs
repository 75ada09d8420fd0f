//! Fetch summaries.
//!
//! [`Fetcher::fetch_all`](crate::Fetcher::fetch_all) reports one [`Summary`]
//! per archive instead of stopping at the first error, so each one records how
//! the local file was obtained or why it could not be.
//!
//! ```rust
//! use mlhub_archive::archive::{Status, Summary};
//! use std::path::PathBuf;
//!
//! let summary = Summary::new("sn1_AOI_1_RIO", PathBuf::from("sn1_AOI_1_RIO.tar.gz"), 1024)
//!     .with_status(Status::Fetched);
//!
//! match summary.status() {
//!     Status::Fetched | Status::Resumed => println!("transferred {}", summary.identifier()),
//!     Status::AlreadyComplete | Status::Skipped => println!("nothing to do"),
//!     Status::Fail(msg) => println!("failed: {}", msg),
//!     Status::NotStarted => unreachable!(),
//! }
//! ```

use std::path::{Path, PathBuf};

/// Outcome of one archive fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    /// Fetch not yet attempted.
    NotStarted,
    /// Downloaded from byte 0.
    Fetched,
    /// Continued from an existing partial file.
    Resumed,
    /// The local file already had the remote length.
    AlreadyComplete,
    /// The local file existed and [`IfExists::Skip`](crate::IfExists::Skip) was requested.
    Skipped,
    /// Fetch failed with error message.
    Fail(String),
}

/// Represents an archive fetch summary.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Archive identifier.
    identifier: String,
    /// Local archive path.
    path: PathBuf,
    /// Local file length once the fetch returned.
    size: u64,
    /// Status.
    status: Status,
}

impl Summary {
    /// Create a new [`Summary`].
    pub fn new(identifier: &str, path: PathBuf, size: u64) -> Self {
        Self {
            identifier: identifier.to_string(),
            path,
            size,
            status: Status::NotStarted,
        }
    }

    /// Attach a status to a [`Summary`].
    pub fn with_status(self, status: Status) -> Self {
        Self { status, ..self }
    }

    /// Get the archive identifier.
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Get the local archive path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the local file length.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Get a reference to the summary's status.
    pub fn status(&self) -> &Status {
        &self.status
    }

    /// Whether the archive is complete on disk (or was skipped on request).
    pub fn is_success(&self) -> bool {
        !matches!(self.status, Status::Fail(_) | Status::NotStarted)
    }

    /// Mark the summary as failed with a message.
    pub fn fail(self, msg: impl std::fmt::Display) -> Self {
        Self {
            status: Status::Fail(format!("{}", msg)),
            ..self
        }
    }
}
