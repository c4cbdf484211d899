//! # Template Module
//!
//! URI templates in two shapes:
//!
//! - [`UriTemplate`] is a mutable builder over the components of a URI
//!   (scheme, authority, path, matrix, query, fragment). Each component may
//!   carry `{name}` or `{name:regex}` placeholders, bound later by position or
//!   by name when [`UriTemplate::build`] renders the final string.
//! - [`PathPattern`] is a path template compiled into an anchored regex, used
//!   by the dispatcher to match request paths and extract [`ParamVec`]
//!   parameters.
//!
//! ## Encoding
//!
//! Values are percent-encoded with a profile per component ([`Encoding`]):
//! `/` survives in whole paths but is escaped inside a single segment or a
//! matrix parameter, and `&`, `=` and `+` are escaped in query parameters.
//! Template text itself is encoded without touching placeholders or existing
//! `%XX` escapes.
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::template::{PathPattern, UriTemplate};
//!
//! let pattern = PathPattern::compile("/pets/{id}").unwrap();
//! let params = pattern.captures("/pets/42").unwrap();
//! assert_eq!(params[0].1, "42");
//!
//! let mut uri = UriTemplate::parse("/pets").unwrap();
//! uri.segment(&["{id}"]).matrix_param("v", &[&2]);
//! assert_eq!(uri.build(&[&"a/b"]).unwrap(), "/pets/a%2Fb;v=2");
//! ```

mod bind;
mod core;
mod encode;
mod pattern;

pub use core::UriTemplate;
pub use encode::Encoding;
pub use pattern::{get_param, ParamVec, PathPattern, MAX_INLINE_PARAMS};
