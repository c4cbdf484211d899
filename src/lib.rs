//! # brrtdispatch
//!
//! **brrtdispatch** is the content negotiation and resource dispatch engine of a
//! resource-oriented HTTP framework. Given a request's method, path, `Accept`
//! and `Content-Type`, plus registries built at startup, it decides which
//! endpoint handles the request, which representation it produces, and which
//! body reader or writer (wrapped in interceptors) processes the entity.
//!
//! ## Overview
//!
//! The engine owns no transport. It consumes an explicit, ordered list of
//! endpoint manifests and providers handed over by a discovery collaborator,
//! and returns classified outcomes that a response-building collaborator
//! turns into status codes and bodies.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - **[`template`]** - URI template parsing/building and compiled path patterns
//! - **[`media_type`]** - media-type parsing, `Accept` ranking and the
//!   compatibility merge
//! - **[`providers`]** - specificity-ordered readers, writers, exception
//!   mappers and parameter converters
//! - **[`registry`]** - immutable endpoint manifests by method, loadable from
//!   YAML/JSON
//! - **[`dispatcher`]** - route by method, match path and media type, synthesize
//!   `OPTIONS`
//! - **[`interceptor`]** - resumable reader/writer chains around the codec
//! - **[`cli`]** - the `brrtdispatch` binary's commands
//! - **[`context`]** - the built-once [`RuntimeContext`](context::RuntimeContext)
//!   threaded through all of the above
//!
//! Ambient pieces: [`error`] (typed errors and condition codes), [`response`]
//! (engine-built responses and the `Continue | ShortCircuit` flow),
//! [`runtime_config`] (`BRRTR_*` switches) and [`logging`] (tracing setup).
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Caller as Transport collaborator
//!     participant Ctx as RuntimeContext
//!     participant Disp as Dispatcher
//!     participant Reg as ResourceRegistry
//!     participant MT as media_type::compatible
//!     participant Chain as interceptor chain
//!
//!     Caller->>Ctx: dispatch(DispatchRequest)
//!     Ctx->>Disp: dispatch
//!     Disp->>Disp: RequestFilter::pre_match
//!     Disp->>Reg: for_method (HEAD falls back to GET)
//!     loop each candidate, declaration order
//!         Disp->>Disp: PathPattern::captures
//!         Disp->>MT: consumes vs Content-Type
//!         Disp->>MT: Accept vs produces
//!     end
//!     Disp-->>Ctx: Matched / Options / NotFound / NotAcceptable
//!     Caller->>Ctx: read_entity(type, media type, stream)
//!     Ctx->>Chain: interceptors, then EntityReader
//!     Chain-->>Caller: Flow<Entity>
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use brrtdispatch::context::RuntimeContext;
//! use brrtdispatch::dispatcher::{DispatchOutcome, DispatchRequest};
//! use brrtdispatch::media_type::MediaType;
//! use brrtdispatch::registry::{ResourceManifest, ResourceRegistry};
//! use http::Method;
//!
//! let json = MediaType::new("application", "json");
//! let xml = MediaType::new("application", "xml");
//!
//! let mut builder = RuntimeContext::builder();
//! builder.resources(ResourceRegistry::new(vec![
//!     ResourceManifest::new(Method::GET, "/a", "as_json").unwrap().with_produces(vec![json]),
//!     ResourceManifest::new(Method::GET, "/a", "as_xml").unwrap().with_produces(vec![xml]),
//!     ResourceManifest::new(Method::POST, "/a", "create").unwrap(),
//! ]));
//! let context = builder.build();
//!
//! let request = DispatchRequest::new(Method::GET, "/a").with_accept_header("application/xml");
//! assert_eq!(context.dispatch(&request).selected().unwrap().handler_name(), "as_xml");
//!
//! match context.dispatch(&DispatchRequest::new(Method::OPTIONS, "/a")) {
//!     DispatchOutcome::Options(options) => assert_eq!(options.allow_header(), "GET,POST"),
//!     other => panic!("unexpected {other:?}"),
//! }
//! ```
//!
//! ## Concurrency
//!
//! Registries and the context are immutable after build and shared freely
//! across threads. `UriTemplate` builders, match results and interceptor
//! contexts are per-request values; clone a template before reusing it
//! elsewhere.

pub mod cli;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod interceptor;
pub mod logging;
pub mod media_type;
pub mod providers;
pub mod registry;
pub mod response;
pub mod runtime_config;
pub mod template;

pub use context::RuntimeContext;
pub use dispatcher::{DispatchOutcome, DispatchRequest, Dispatcher, MatchResult};
pub use error::Condition;
pub use media_type::MediaType;
pub use template::UriTemplate;
