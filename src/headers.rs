use axum::http::HeaderValue;
use http::header::{CACHE_CONTROL, PRAGMA};

/// Forbid caching of a response carrying token material.
/// RFC 6749 Section 5.1 requires `Cache-Control: no-store` and
/// `Pragma: no-cache` on successful token responses; we apply the same
/// headers to token-endpoint error responses as well.
pub fn no_store<B>(response: &mut axum::response::Response<B>) {
    let headers = response.headers_mut();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
}
