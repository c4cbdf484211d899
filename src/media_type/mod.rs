//! # Media Type Module
//!
//! Parsing and merging of media-type expressions (`type/subtype;name=value`).
//!
//! The dispatcher negotiates a response type by merging each `Accept` range
//! with each type a resource produces; [`compatible`] returns the merged,
//! most specific type or `None`. Provider lookup uses the same merge to match
//! codecs against the negotiated type.
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::media_type::{parse_accept, MediaType};
//!
//! let ranges = parse_accept("text/html;q=0.5, application/json");
//! assert_eq!(ranges[0], MediaType::new("application", "json"));
//! assert!(ranges[1].is_compatible(&"text/*".parse().unwrap()));
//! ```

mod accept;
mod compat;
mod core;
#[cfg(test)]
mod tests;

pub use accept::parse_accept;
pub use compat::compatible;
pub use core::MediaType;
