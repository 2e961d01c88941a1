//! HTTP transport types.
//!
//! # Design
//! Requests and responses are plain data. `Client` builds an `HttpRequest`,
//! a `Transport` turns it into an `HttpResponse`, and the client interprets
//! the response. Nothing in this module touches the network.

use url::{form_urlencoded, Url};

use crate::error::ApiError;

pub use ureq::http::Method;

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Append `key=value` to the query string. `None` and empty values are
    /// skipped entirely rather than sent as `key=`.
    pub fn append_query(&mut self, key: &str, value: Option<&str>) -> &mut Self {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            self.url.query_pairs_mut().append_pair(key, value);
        }
        self
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Convenience constructor for canned responses.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}

pub(crate) fn parse_method(method: &str) -> Result<Method, ApiError> {
    Method::from_bytes(method.as_bytes()).map_err(|_| ApiError::InvalidMethod(method.to_string()))
}

/// Reject `%` not followed by two hex digits. `Url::join` would otherwise
/// pass such escapes through untouched.
pub(crate) fn check_escapes(path: &str) -> Result<(), ApiError> {
    let bytes = path.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            i += 1;
            continue;
        }
        let valid = bytes
            .get(i + 1..i + 3)
            .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !valid {
            let end = (i + 3).min(bytes.len());
            let escape = path.get(i..end).unwrap_or("%");
            return Err(ApiError::InvalidPath {
                path: path.to_string(),
                reason: format!("invalid URL escape {escape:?}"),
            });
        }
        i += 3;
    }
    Ok(())
}

/// Percent-encode `segment` so it stays a single path segment. Reserved
/// characters such as `/`, `?` and `#` are escaped; an empty segment and the
/// dot segments are rejected.
pub(crate) fn path_segment(segment: &str) -> Result<String, ApiError> {
    if matches!(segment, "" | "." | "..") {
        return Err(ApiError::InvalidPath {
            path: segment.to_string(),
            reason: "empty or relative path segment".to_string(),
        });
    }
    // Form encoding writes a space as `+` and a literal `+` as `%2B`.
    let encoded: String = form_urlencoded::byte_serialize(segment.as_bytes()).collect();
    Ok(encoded.replace('+', "%20"))
}
