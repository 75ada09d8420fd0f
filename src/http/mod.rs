//! HTTP client construction.
//!
//! - [`client`] - client creation and middleware configuration
//! - [`api_key`] - the middleware appending the API key to every request

pub mod api_key;
pub mod client;

pub use api_key::{ApiKeyMiddleware, API_KEY_PARAM};
pub use client::{create_http_client, HttpClientConfig, USER_AGENT};
