//! Content-Range parsing utilities.
//!
//! A resumed transfer must start exactly where the local file ends. These
//! helpers read the `Content-Range` header of a `206 Partial Content` response
//! so the fetcher can check the start offset and the announced archive length
//! before appending anything.

use reqwest::{header::CONTENT_RANGE, Response};

/// Parse Content-Range header to extract total size.
///
/// Content-Range header format: "bytes start-end/total"
///
/// # Example
///
/// ```rust
/// use mlhub_archive::utils::parse_content_range_total;
///
/// let total = parse_content_range_total("bytes 0-1023/2048");
/// assert_eq!(total, Some(2048));
/// ```
pub fn parse_content_range_total(content_range: &str) -> Option<u64> {
    content_range
        .split('/')
        .nth(1)
        .and_then(|size| size.trim().parse::<u64>().ok())
}

/// Parse Content-Range header to extract the first byte position.
///
/// # Example
///
/// ```rust
/// use mlhub_archive::utils::parse_content_range_start;
///
/// assert_eq!(parse_content_range_start("bytes 1000000-3496899999/3496900000"), Some(1_000_000));
/// assert_eq!(parse_content_range_start("bytes */2048"), None);
/// ```
pub fn parse_content_range_start(content_range: &str) -> Option<u64> {
    content_range
        .trim()
        .strip_prefix("bytes")?
        .trim_start()
        .split('-')
        .next()
        .and_then(|start| start.trim().parse::<u64>().ok())
}

/// Read the first byte position announced by a partial response, if any.
pub fn content_range_start(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_start)
}

/// Read the complete length announced by a partial response, if any.
pub fn content_range_total(response: &Response) -> Option<u64> {
    response
        .headers()
        .get(CONTENT_RANGE)
        .and_then(|value| value.to_str().ok())
        .and_then(parse_content_range_total)
}
