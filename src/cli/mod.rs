//! # CLI Module
//!
//! Command-line access to the dispatch engine, for checking manifest files and
//! negotiation decisions by hand.
//!
//! ## Commands
//!
//! ### `route`
//!
//! Dispatch one request against a manifest declaration file:
//!
//! ```bash
//! brrtdispatch route --manifests api.yaml --method GET --path /api/pets/7 \
//!     --accept 'application/xml;q=0.9, */*;q=0.1'
//! ```
//!
//! Prints the ranked matches (`rank template -> handler [negotiated] params`),
//! the synthesized `Allow` header for `OPTIONS`, or the condition code.
//!
//! ### `routes`
//!
//! List every declared route as `METHOD /path -> handler`.
//!
//! ### `expand`
//!
//! ```bash
//! brrtdispatch expand --template 'http://example.com/pets/{id}' --param id=a/b
//! # http://example.com/pets/a%2Fb
//! ```
//!
//! `--keep-slash` leaves `/` in path values as is. Without `--param` the
//! template is printed back in normalized form.
//!
//! ### `negotiate`
//!
//! ```bash
//! brrtdispatch negotiate 'application/*+json' 'application/hal+json'
//! # application/json
//! ```

mod commands;

pub use commands::{run, run_cli, Cli, Commands};
