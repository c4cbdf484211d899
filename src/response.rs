//! Response values produced by the engine.
//!
//! The engine never writes to a transport. Short-circuiting filters,
//! interceptors, OPTIONS synthesis and exception mappers hand a [`Response`]
//! back to the caller, which owns serialization and the status line.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names are `Arc<str>` so repeated names (`Allow`, `Content-Type`)
/// clone in O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// Look up a header by name (case-insensitive per RFC 7230)
#[inline]
#[must_use]
pub fn get_header<'a>(headers: &'a HeaderVec, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Replace any header called `name`, then append the new value.
pub fn set_header(headers: &mut HeaderVec, name: &str, value: String) {
    headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
    headers.push((Arc::from(name), value));
}

/// A response decided by the engine or one of its providers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    /// HTTP status code
    pub status: u16,
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Body as JSON; `Value::Null` for an empty body
    pub body: Value,
}

impl Response {
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Status only, no headers or body
    #[must_use]
    pub fn empty(status: u16) -> Self {
        Self::new(status, HeaderVec::new(), Value::Null)
    }

    /// JSON body with a `content-type: application/json` header
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self::new(status, headers, body)
    }

    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        get_header(&self.headers, name)
    }

    pub fn set_header(&mut self, name: &str, value: String) {
        set_header(&mut self.headers, name, value);
    }
}

/// Result of a stage that may end processing early.
///
/// Filters and interceptors return `ShortCircuit` with the response to send
/// instead of unwinding.
#[derive(Debug, Clone, PartialEq)]
pub enum Flow<T> {
    Continue(T),
    ShortCircuit(Response),
}

impl<T> Flow<T> {
    #[must_use]
    pub fn is_short_circuit(&self) -> bool {
        matches!(self, Flow::ShortCircuit(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Flow<U> {
        match self {
            Flow::Continue(value) => Flow::Continue(f(value)),
            Flow::ShortCircuit(response) => Flow::ShortCircuit(response),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = Response::json(200, json!({"ok": true}));
        res.set_header("Content-Type", "text/plain".to_string());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("content-type"), Some("text/plain"));
    }

    #[test]
    fn test_empty_response() {
        let res = Response::empty(204);
        assert_eq!(res.status, 204);
        assert!(res.headers.is_empty());
        assert_eq!(res.body, Value::Null);
    }
}
