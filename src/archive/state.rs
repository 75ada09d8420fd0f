//! Local transfer state and the policy applied to existing files.

use crate::error::{Error, Result};

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// What to do when the archive file already exists at the destination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IfExists {
    /// Compare lengths: return complete files, continue partial ones with a
    /// ranged request, restart oversized ones.
    #[default]
    Resume,
    /// Return the existing file untouched, whatever its length.
    Skip,
    /// Discard the existing file and download from byte 0.
    Overwrite,
}

/// Classification of a local archive file against the remote length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferState {
    /// No local file.
    NotStarted,
    /// The local file holds the first `local` bytes.
    Partial { local: u64 },
    /// The local file has exactly the remote length.
    Complete,
    /// The local file is longer than the remote archive and cannot be trusted.
    Oversized { local: u64 },
}

impl TransferState {
    /// Classify a local length (`None` when the file is missing).
    pub fn classify(local: Option<u64>, remote: u64) -> Self {
        match local {
            None => TransferState::NotStarted,
            Some(local) if local == remote => TransferState::Complete,
            Some(local) if local < remote => TransferState::Partial { local },
            Some(local) => TransferState::Oversized { local },
        }
    }

    /// Byte offset a [`IfExists::Resume`] transfer starts from.
    pub fn resume_offset(&self) -> u64 {
        match self {
            TransferState::Partial { local } => *local,
            _ => 0,
        }
    }
}

/// Length of the file at `path`, or `None` when it does not exist.
pub async fn local_length(path: &Path) -> Result<Option<u64>> {
    match fs::metadata(path).await {
        Ok(metadata) => Ok(Some(metadata.len())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::storage(path, e)),
    }
}
