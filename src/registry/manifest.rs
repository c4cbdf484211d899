use std::sync::Arc;

use http::Method;

use crate::error::TemplateError;
use crate::media_type::MediaType;
use crate::template::PathPattern;

/// The immutable descriptor of one endpoint.
///
/// `consumes` / `produces` of `None` accept any media type. `priority` is the
/// declaration index assigned when the manifest is registered; lower comes
/// first.
#[derive(Debug, Clone)]
pub struct ResourceManifest {
    method: Method,
    pattern: PathPattern,
    consumes: Option<Vec<MediaType>>,
    produces: Option<Vec<MediaType>>,
    handler_name: Arc<str>,
    priority: usize,
}

impl ResourceManifest {
    /// Compile `path` and describe an endpoint served by `handler_name`.
    ///
    /// # Errors
    ///
    /// `InvalidTemplate` when the path template does not compile.
    pub fn new(method: Method, path: &str, handler_name: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            method,
            pattern: PathPattern::compile(path)?,
            consumes: None,
            produces: None,
            handler_name: Arc::from(handler_name),
            priority: 0,
        })
    }

    #[must_use]
    pub fn with_consumes(mut self, media_types: Vec<MediaType>) -> Self {
        self.consumes = Some(media_types);
        self
    }

    #[must_use]
    pub fn with_produces(mut self, media_types: Vec<MediaType>) -> Self {
        self.produces = Some(media_types);
        self
    }

    pub(crate) fn with_priority(mut self, priority: usize) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn path_template(&self) -> &str {
        self.pattern.template()
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    #[must_use]
    pub fn consumes(&self) -> Option<&[MediaType]> {
        self.consumes.as_deref()
    }

    #[must_use]
    pub fn produces(&self) -> Option<&[MediaType]> {
        self.produces.as_deref()
    }

    #[must_use]
    pub fn handler_name(&self) -> &str {
        &self.handler_name
    }

    #[must_use]
    pub fn priority(&self) -> usize {
        self.priority
    }
}
