//! Archive-related types.
//!
//! - [`reference`] - resolved remote archives and the on-disk naming convention
//! - [`state`] - transfer state classification and the existing-file policy
//! - [`summary`] - per-archive outcome reporting
//!
//! # Examples
//!
//! ```rust
//! use mlhub_archive::archive::{IfExists, TransferState};
//!
//! let state = TransferState::classify(Some(1_000_000), 3_496_900_000);
//! assert_eq!(state, TransferState::Partial { local: 1_000_000 });
//! assert_eq!(state.resume_offset(), 1_000_000);
//! assert_eq!(IfExists::default(), IfExists::Resume);
//! ```

pub mod reference;
pub mod state;
pub mod summary;

pub use reference::{
    archive_filename, validate_identifier, ArchiveInfo, ArchiveReference, ARCHIVE_EXTENSION,
};
pub use state::{local_length, IfExists, TransferState};
pub use summary::{Status, Summary};
