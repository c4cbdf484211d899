//! # Runtime Context Module
//!
//! [`RuntimeContext`] bundles everything a request needs from startup: the
//! resource registry, the provider registry, the runtime configuration and a
//! ready [`Dispatcher`]. It is built once, never mutated, and passed
//! explicitly (usually behind an `Arc`) to whatever handles requests.
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::context::RuntimeContext;
//! use brrtdispatch::dispatcher::DispatchRequest;
//! use brrtdispatch::providers::{HttpError, TypeKey};
//! use brrtdispatch::registry::{ResourceManifest, ResourceRegistry};
//! use http::Method;
//!
//! let mut builder = RuntimeContext::builder();
//! builder.resources(ResourceRegistry::new(vec![
//!     ResourceManifest::new(Method::GET, "/health", "health").unwrap(),
//! ]));
//! let context = builder.build();
//!
//! let outcome = context.dispatch(&DispatchRequest::new(Method::GET, "/health"));
//! assert_eq!(outcome.selected().unwrap().handler_name(), "health");
//!
//! // the built-in HttpError mapper is always present
//! let response = context
//!     .map_error(&TypeKey::of::<HttpError>(), &HttpError::new(503))
//!     .unwrap();
//! assert_eq!(response.status, 503);
//! ```

use std::error::Error;
use std::sync::Arc;

use tracing::info;

use crate::dispatcher::{DispatchOutcome, DispatchRequest, Dispatcher, RequestFilter};
use crate::error::ChainError;
use crate::interceptor::{self, EntityInput, EntityOutput};
use crate::media_type::MediaType;
use crate::providers::{
    Entity, ExceptionMapper, HttpError, HttpErrorMapper, ProviderDescriptor, ProviderRegistry,
    ProviderRegistryBuilder, TypeKey,
};
use crate::registry::ResourceRegistry;
use crate::response::{Flow, HeaderVec, Response};
use crate::runtime_config::RuntimeConfig;

/// Immutable per-process state threaded through dispatch, entity I/O and
/// error mapping.
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    resources: Arc<ResourceRegistry>,
    providers: Arc<ProviderRegistry>,
    config: RuntimeConfig,
    dispatcher: Dispatcher,
}

impl RuntimeContext {
    #[must_use]
    pub fn builder() -> RuntimeContextBuilder {
        RuntimeContextBuilder::default()
    }

    /// Assemble a context from registries that are already built.
    ///
    /// Unlike [`RuntimeContextBuilder::build`] this adds no providers.
    #[must_use]
    pub fn new(
        resources: Arc<ResourceRegistry>,
        providers: Arc<ProviderRegistry>,
        config: RuntimeConfig,
    ) -> Self {
        let dispatcher = Dispatcher::new(Arc::clone(&resources), config.clone());
        Self {
            resources,
            providers,
            config,
            dispatcher,
        }
    }

    #[must_use]
    pub fn resources(&self) -> &ResourceRegistry {
        &self.resources
    }

    #[must_use]
    pub fn providers(&self) -> &ProviderRegistry {
        &self.providers
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    #[must_use]
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchOutcome {
        self.dispatcher.dispatch(request)
    }

    /// See [`interceptor::read_entity`].
    ///
    /// # Errors
    ///
    /// No reader for `ty` and `media_type`, or an interceptor/codec failure.
    pub fn read_entity(
        &self,
        ty: &TypeKey,
        media_type: &MediaType,
        headers: &mut HeaderVec,
        input: EntityInput,
    ) -> Result<Flow<Entity>, ChainError> {
        interceptor::read_entity(&self.providers, ty, media_type, headers, input)
    }

    /// See [`interceptor::write_entity`].
    ///
    /// # Errors
    ///
    /// No writer for `ty` and `media_type`, or an interceptor/codec failure.
    pub fn write_entity(
        &self,
        entity: Entity,
        ty: &TypeKey,
        media_type: &MediaType,
        headers: &mut HeaderVec,
        output: EntityOutput,
    ) -> Result<Flow<()>, ChainError> {
        interceptor::write_entity(&self.providers, entity, ty, media_type, headers, output)
    }

    #[must_use]
    pub fn map_error(&self, ty: &TypeKey, error: &(dyn Error + 'static)) -> Option<Response> {
        self.providers.map_error(ty, error)
    }
}

/// Collects the pieces of a [`RuntimeContext`].
pub struct RuntimeContextBuilder {
    resources: ResourceRegistry,
    providers: ProviderRegistryBuilder,
    config: RuntimeConfig,
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl Default for RuntimeContextBuilder {
    fn default() -> Self {
        Self {
            resources: ResourceRegistry::default(),
            providers: ProviderRegistryBuilder::default(),
            config: RuntimeConfig::from_env(),
            filters: Vec::new(),
        }
    }
}

impl RuntimeContextBuilder {
    pub fn resources(&mut self, resources: ResourceRegistry) -> &mut Self {
        self.resources = resources;
        self
    }

    /// Provider registrations; sorted when the context is built
    pub fn providers(&mut self) -> &mut ProviderRegistryBuilder {
        &mut self.providers
    }

    /// Replaces the configuration read from the environment
    pub fn config(&mut self, config: RuntimeConfig) -> &mut Self {
        self.config = config;
        self
    }

    pub fn filter(&mut self, filter: Arc<dyn RequestFilter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Sort providers, append the fallback [`HttpErrorMapper`] and build the
    /// dispatcher.
    #[must_use]
    pub fn build(self) -> RuntimeContext {
        let Self {
            resources,
            mut providers,
            config,
            filters,
        } = self;

        let fallback: Arc<dyn ExceptionMapper> = Arc::new(HttpErrorMapper::new(config.error_verbose));
        providers.register_exception_mapper(
            ProviderDescriptor::singleton(TypeKey::of::<HttpError>(), fallback).with_priority(i32::MAX),
        );

        let mut context = RuntimeContext::new(Arc::new(resources), Arc::new(providers.build()), config);
        for filter in filters {
            context.dispatcher.add_filter(filter);
        }
        info!(
            manifests_count = context.resources.manifests().len(),
            base_path = %context.dispatcher.base_path(),
            error_verbose = context.config.error_verbose,
            synthesize_options = context.config.synthesize_options,
            head_fallback = context.config.head_fallback,
            "Runtime context built"
        );
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Method;

    use crate::registry::ResourceManifest;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_context_is_send_sync() {
        assert_send_sync::<RuntimeContext>();
    }

    #[test]
    fn test_fallback_mapper_honours_verbose_flag() {
        let mut builder = RuntimeContext::builder();
        builder.config(RuntimeConfig {
            error_verbose: false,
            ..RuntimeConfig::default()
        });
        let context = builder.build();
        let response = context
            .map_error(&TypeKey::of::<HttpError>(), &HttpError::with_message(400, "bad id"))
            .unwrap();
        assert_eq!(response.body, serde_json::json!({"status": 400}));
    }

    #[test]
    fn test_registered_mapper_beats_fallback() {
        struct Teapot;
        impl ExceptionMapper for Teapot {
            fn to_response(&self, _error: &(dyn Error + 'static)) -> Response {
                Response::empty(418)
            }
        }

        let mut builder = RuntimeContext::builder();
        builder.config(RuntimeConfig::default());
        let teapot: Arc<dyn ExceptionMapper> = Arc::new(Teapot);
        builder
            .providers()
            .register_exception_mapper(ProviderDescriptor::singleton(TypeKey::of::<HttpError>(), teapot));
        let context = builder.build();
        let response = context
            .map_error(&TypeKey::of::<HttpError>(), &HttpError::new(500))
            .unwrap();
        assert_eq!(response.status, 418);
    }

    #[test]
    fn test_builder_threads_filters_and_config() {
        struct Closed;
        impl RequestFilter for Closed {
            fn pre_match(&self, _request: &DispatchRequest) -> Flow<()> {
                Flow::ShortCircuit(Response::empty(503))
            }
        }

        let mut builder = RuntimeContext::builder();
        builder
            .config(RuntimeConfig {
                base_path: "/api".to_string(),
                ..RuntimeConfig::default()
            })
            .resources(ResourceRegistry::new(vec![
                ResourceManifest::new(Method::GET, "/x", "x").unwrap(),
            ]))
            .filter(Arc::new(Closed));
        let context = builder.build();
        assert_eq!(context.dispatcher().base_path(), "/api");
        let outcome = context.dispatch(&DispatchRequest::new(Method::GET, "/api/x"));
        assert!(matches!(outcome, DispatchOutcome::Aborted(ref r) if r.status == 503));
    }
}
