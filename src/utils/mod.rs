//! Shared utility functions.
//!
//! The utils module currently contains:
//!
//! - [`content_length`] - `Content-Range` parsing for resumed transfers
//!
//! # Examples
//!
//! ```rust
//! use mlhub_archive::utils::{parse_content_range_start, parse_content_range_total};
//!
//! let header_value = "bytes 1024-2047/2048";
//! assert_eq!(parse_content_range_start(header_value), Some(1024));
//! assert_eq!(parse_content_range_total(header_value), Some(2048));
//! ```

pub mod content_length;

pub use content_length::{
    content_range_start, content_range_total, parse_content_range_start, parse_content_range_total,
};
