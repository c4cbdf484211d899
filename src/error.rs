//! Error taxonomy for template building, media-type parsing, provider lookup
//! and interceptor chains.
//!
//! Negotiation failures are not errors: media-type merging returns `None` and
//! the dispatcher reports [`Condition::NotFound`] / [`Condition::NotAcceptable`]
//! as ordinary outcomes. The enums here cover the cases where the caller
//! handed the engine something it cannot work with.

use thiserror::Error;

/// Classified outcome codes handed to the response-building collaborator.
///
/// The engine never writes a status line itself; [`Condition::suggested_status`]
/// is only a hint for the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// No manifest path matched the request path
    NotFound,
    /// A manifest path matched but no media type could be negotiated
    NotAcceptable,
    /// No manifest is registered for the method and no HEAD→GET fallback applies
    MethodNotFound,
    /// A URI template could not be parsed
    MalformedTemplate,
    /// A build call left a placeholder unbound
    MissingParameter,
}

impl Condition {
    /// Status code a response builder would typically emit for this condition.
    #[must_use]
    pub fn suggested_status(self) -> u16 {
        match self {
            Condition::NotFound => 404,
            Condition::NotAcceptable => 406,
            Condition::MethodNotFound => 405,
            Condition::MalformedTemplate | Condition::MissingParameter => 500,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Condition::NotFound => "NOT_FOUND",
            Condition::NotAcceptable => "NOT_ACCEPTABLE",
            Condition::MethodNotFound => "METHOD_NOT_FOUND",
            Condition::MalformedTemplate => "MALFORMED_TEMPLATE",
            Condition::MissingParameter => "MISSING_PARAMETER",
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure while parsing or building a URI template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    /// Malformed template text; fatal to the operation
    #[error("Invalid uri template: {template} ({reason})")]
    InvalidTemplate { template: String, reason: &'static str },
    /// A builder argument was rejected (e.g. an empty host)
    #[error("Invalid {name} parameter: {value}")]
    InvalidParameter { name: &'static str, value: String },
    /// A named placeholder had no value in the parameter map
    #[error("Path parameter {name} is not provided by the parameter map")]
    MissingTemplateParameter { name: String },
    /// Positional values ran out before every placeholder was bound
    #[error("Too few template values: {name} needs value #{needed} but only {supplied} supplied")]
    TooFewValues {
        name: String,
        needed: usize,
        supplied: usize,
    },
}

impl TemplateError {
    pub(crate) fn invalid(template: &str, reason: &'static str) -> Self {
        TemplateError::InvalidTemplate {
            template: template.to_string(),
            reason,
        }
    }

    #[must_use]
    pub fn condition(&self) -> Condition {
        match self {
            TemplateError::InvalidTemplate { .. } | TemplateError::InvalidParameter { .. } => {
                Condition::MalformedTemplate
            }
            TemplateError::MissingTemplateParameter { .. } | TemplateError::TooFewValues { .. } => {
                Condition::MissingParameter
            }
        }
    }
}

/// Failure while parsing a media-type expression.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MediaTypeError {
    #[error("Malformed media type '{input}': {reason}")]
    Malformed { input: String, reason: &'static str },
}

/// Which provider sequence a lookup walked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Reader,
    Writer,
    ExceptionMapper,
    ParamConverter,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ProviderKind::Reader => "entity reader",
            ProviderKind::Writer => "entity writer",
            ProviderKind::ExceptionMapper => "exception mapper",
            ProviderKind::ParamConverter => "param converter",
        };
        f.write_str(s)
    }
}

/// Registry lookup miss, escalated by the caller (usually to a 500).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Could not find {kind} for type {type_name} and media type {media_type}")]
    NoProviderFound {
        kind: ProviderKind,
        type_name: &'static str,
        media_type: String,
    },
}

/// Failure reported by a codec (an external body reader or writer).
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("entity stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("entity of type {type_name} is not supported by this codec")]
    Unsupported { type_name: &'static str },
    #[error("{0}")]
    Message(String),
}

/// Failure while running a reader or writer interceptor chain.
#[derive(Debug, Error)]
pub enum ChainError {
    /// An interceptor called `proceed()` more than once in the same pass
    #[error("interceptor #{index} called proceed() more than once")]
    ProceedCalledTwice { index: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}
