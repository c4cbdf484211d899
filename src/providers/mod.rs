//! # Providers Module
//!
//! Registry of the pluggable pieces around an entity: body readers, body
//! writers, exception mappers and parameter converters, plus the reader and
//! writer interceptors that wrap them.
//!
//! ## Ordering
//!
//! Every provider is bound to a [`TypeKey`]. Each sequence is sorted once when
//! the registry is built: a provider bound to a subtype comes before one bound
//! to its supertype, and providers bound to the same type are ordered by
//! ascending priority. A lookup walks the sequence and returns the first
//! applicable provider, so the most specific one wins regardless of priority.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use brrtdispatch::providers::{
//!     ExceptionMapper, HttpError, HttpErrorMapper, ProviderDescriptor, ProviderRegistry, TypeKey,
//! };
//!
//! let http_error = TypeKey::of::<HttpError>();
//! let mapper: Arc<dyn ExceptionMapper> = Arc::new(HttpErrorMapper::new(true));
//! let mut builder = ProviderRegistry::builder();
//! builder.register_exception_mapper(ProviderDescriptor::singleton(http_error.clone(), mapper));
//! let registry = builder.build();
//!
//! let response = registry.map_error(&http_error, &HttpError::new(404)).unwrap();
//! assert_eq!(response.body, serde_json::json!({"status": 404, "message": "Not Found"}));
//! ```

mod descriptor;
mod http_error;
mod registry;
mod traits;
mod type_key;

pub use descriptor::{ProviderDescriptor, ProviderFactory, DEFAULT_PRIORITY};
pub use http_error::{HttpError, HttpErrorMapper};
pub use registry::{ProviderRegistry, ProviderRegistryBuilder};
pub use traits::{Entity, EntityReader, EntityWriter, ExceptionMapper, ParamConverter};
pub use type_key::TypeKey;
