//! The slice of an incoming request signature verification needs.

use crate::query::QueryString;

/// Read-only view of a request: its path and decoded query pairs.
pub trait RequestView {
    /// Request path as received (still percent-encoded), without query or
    /// fragment.
    fn path(&self) -> &str;

    /// Decoded query pairs in the order they appeared.
    fn query(&self) -> QueryString;
}

/// A request reconstructed from a URL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    path: String,
    query: QueryString,
}

impl ParsedRequest {
    pub fn new(path: impl Into<String>, query: QueryString) -> Self {
        Self {
            path: path.into(),
            query,
        }
    }

    /// Split a URL into path and query.
    ///
    /// Accepts absolute (`https://host/p?q`), protocol-relative
    /// (`//host/p?q`) and path-only (`/p?q`) forms. The fragment is dropped.
    pub fn from_url(url: &str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (location, raw_query) = url.split_once('?').unwrap_or((url, ""));

        let without_scheme = match location.split_once("://") {
            Some((_, rest)) => Some(rest),
            None => location.strip_prefix("//"),
        };
        let path = match without_scheme {
            Some(rest) => rest.find('/').map_or("/", |i| &rest[i..]),
            None => location,
        };

        Self {
            path: if path.is_empty() { "/".into() } else { path.into() },
            query: QueryString::parse(raw_query),
        }
    }
}

impl RequestView for ParsedRequest {
    fn path(&self) -> &str {
        &self.path
    }

    fn query(&self) -> QueryString {
        self.query.clone()
    }
}
