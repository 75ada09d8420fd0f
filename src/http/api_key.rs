//! API key injection.
//!
//! The catalog expects the key as a `key` query parameter on every request.
//! [`ApiKeyMiddleware`] sits innermost in the middleware stack, so the key is
//! appended after the tracing span has recorded the URL and is re-applied on
//! every retry attempt.

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next};
use std::fmt;

/// Name of the query parameter carrying the API key.
pub const API_KEY_PARAM: &str = "key";

/// Middleware appending the API key to each request URL.
#[derive(Clone)]
pub struct ApiKeyMiddleware {
    key: String,
}

impl ApiKeyMiddleware {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl fmt::Debug for ApiKeyMiddleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyMiddleware")
            .field("key", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl Middleware for ApiKeyMiddleware {
    async fn handle(
        &self,
        mut req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> reqwest_middleware::Result<Response> {
        req.url_mut()
            .query_pairs_mut()
            .append_pair(API_KEY_PARAM, &self.key);
        next.run(req, extensions).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_key() {
        let middleware = ApiKeyMiddleware::new("secret-key");
        let debug_str = format!("{:?}", middleware);
        assert!(debug_str.contains("<redacted>"));
        assert!(!debug_str.contains("secret-key"));
    }
}
