//! # Dispatcher Module
//!
//! Selects which declared endpoint handles a request and which representation
//! it produces.
//!
//! ## Overview
//!
//! Each dispatch walks a small state machine:
//!
//! 1. **Filters** - every [`RequestFilter::pre_match`] may abort the request
//! 2. **Route by method** - manifests registered for the method; `HEAD` falls
//!    back to `GET` when no `HEAD` manifest exists
//! 3. **Match path and media type** - each candidate, in declaration order,
//!    must match the path, consume the request `Content-Type` (bodies only)
//!    and produce something the `Accept` header allows
//! 4. **Outcome** - the surviving candidates as a ranked list, a synthesized
//!    `OPTIONS` answer, or a classified miss
//!
//! The first surviving candidate is the selected one. Declaration order is
//! the only tie-break, so the registry builder's order is significant.
//!
//! ## Outcomes
//!
//! - [`DispatchOutcome::Matched`] - at least one candidate survived
//! - [`DispatchOutcome::Options`] - `OPTIONS` with no declared handler; carries
//!   the `Allow` methods of every manifest matching the path
//! - [`DispatchOutcome::NotFound`] - no candidate matched the path
//! - [`DispatchOutcome::NotAcceptable`] - the path matched but media-type
//!   negotiation rejected every candidate
//! - [`DispatchOutcome::MethodNotFound`] - nothing is registered for the method
//! - [`DispatchOutcome::Aborted`] - a filter short-circuited
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtdispatch::dispatcher::{DispatchRequest, Dispatcher};
//! use brrtdispatch::media_type::MediaType;
//! use brrtdispatch::registry::{ResourceManifest, ResourceRegistry};
//! use brrtdispatch::runtime_config::RuntimeConfig;
//! use http::Method;
//!
//! let json = MediaType::new("application", "json");
//! let registry = ResourceRegistry::new(vec![
//!     ResourceManifest::new(Method::GET, "/pets/{id}", "get_pet")
//!         .unwrap()
//!         .with_produces(vec![json]),
//! ]);
//! let dispatcher = Dispatcher::new(Arc::new(registry), RuntimeConfig::default());
//!
//! let request = DispatchRequest::new(Method::GET, "/pets/7").with_accept_header("*/*");
//! let outcome = dispatcher.dispatch(&request);
//! let selected = outcome.selected().unwrap();
//! assert_eq!(selected.handler_name(), "get_pet");
//! assert_eq!(selected.get_path_param("id"), Some("7"));
//! assert_eq!(selected.negotiated.to_string(), "application/json");
//! ```

mod core;
mod filter;
mod outcome;
mod request;

pub use core::Dispatcher;
pub use filter::RequestFilter;
pub use outcome::{DispatchOutcome, MatchResult, OptionsResponse};
pub use request::DispatchRequest;
