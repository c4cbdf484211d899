use http::Method;

use crate::media_type::{parse_accept, MediaType};

/// The parts of an incoming request the dispatcher looks at.
///
/// `accept` of `None` means the request sent no `Accept` header and is
/// treated as `*/*`. `Some(vec![])` means every entry was refused (`q=0`)
/// or malformed, so nothing can be produced for it.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub method: Method,
    pub path: String,
    pub accept: Option<Vec<MediaType>>,
    pub content_type: Option<MediaType>,
    /// Whether the request carries a body; `consumes` is only checked when set
    pub has_entity: bool,
}

impl DispatchRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            accept: None,
            content_type: None,
            has_entity: false,
        }
    }

    /// Parse a raw `Accept` header; a blank header counts as absent
    #[must_use]
    pub fn with_accept_header(mut self, header: &str) -> Self {
        self.accept = if header.trim().is_empty() {
            None
        } else {
            Some(parse_accept(header))
        };
        self
    }

    /// Acceptable media types, most preferred first
    #[must_use]
    pub fn with_accept(mut self, accept: Vec<MediaType>) -> Self {
        self.accept = Some(accept);
        self
    }

    /// Declare a body of the given media type
    #[must_use]
    pub fn with_content_type(mut self, content_type: MediaType) -> Self {
        self.content_type = Some(content_type);
        self.has_entity = true;
        self
    }

    /// Declare a body without a `Content-Type`
    #[must_use]
    pub fn with_entity(mut self) -> Self {
        self.has_entity = true;
        self
    }
}
