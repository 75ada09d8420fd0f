//! Error handling for archive fetching.
//!
//! Every failure a fetch can run into is one variant of [`Error`]. The variants
//! are kept distinct so a caller can tell a transient failure (worth another
//! `fetch` with [`IfExists::Resume`](crate::IfExists::Resume)) from a fatal one.

use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can happen while resolving or fetching an archive.
#[derive(Error, Debug)]
pub enum Error {
    /// The service does not know the requested identifier.
    ///
    /// Never retried. No local file is created when this is returned from the
    /// metadata lookup.
    #[error("Archive not found: {identifier}")]
    ResourceNotFound { identifier: String },

    /// The service rejected the API key (401 or 403).
    #[error("Access to {identifier} denied with HTTP {status}, check the API key")]
    Unauthorized { identifier: String, status: u16 },

    /// Network or HTTP level failure, including one that happened mid-stream.
    ///
    /// Any partial file is left in place so the transfer can be resumed. The
    /// request URL is stripped from the source since it carries the API key.
    #[error("Transfer error: {source}")]
    Transfer {
        #[source]
        source: reqwest_middleware::Error,
    },

    /// The body ended without a network error but the file on disk does not
    /// have the expected length.
    #[error("Incomplete transfer of {path:?}: expected {expected} bytes, got {actual}")]
    IncompleteTransfer {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },

    /// Local filesystem failure. Fatal, the transfer is aborted immediately.
    #[error("Storage error on {path:?}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The identifier cannot name an archive file.
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// The configured root URL cannot be used to build request URLs.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The service answered with something that cannot be interpreted.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl Error {
    /// Build a [`Error::Storage`] for `path`.
    pub(crate) fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            source,
        }
    }

    /// Return `true` when calling `fetch` again may succeed.
    ///
    /// Connection failures, broken bodies, short transfers and 5xx, 408 or 429
    /// answers are transient. Other HTTP statuses, unknown identifiers, denied
    /// keys, storage failures and malformed input are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transfer {
                source: reqwest_middleware::Error::Reqwest(e),
            } => e.status().map_or(true, is_transient_status),
            Error::Transfer { .. } | Error::IncompleteTransfer { .. } => true,
            _ => false,
        }
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::REQUEST_TIMEOUT
        || status == StatusCode::TOO_MANY_REQUESTS
}

impl From<reqwest_middleware::Error> for Error {
    fn from(source: reqwest_middleware::Error) -> Self {
        let source = match source {
            reqwest_middleware::Error::Reqwest(e) => reqwest_middleware::Error::Reqwest(e.without_url()),
            other => other,
        };
        Error::Transfer { source }
    }
}

impl From<reqwest::Error> for Error {
    fn from(source: reqwest::Error) -> Self {
        reqwest_middleware::Error::Reqwest(source).into()
    }
}

/// Result type alias for operations that can fail with an archive [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
