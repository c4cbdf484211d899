use std::fmt;
use std::sync::Arc;

use super::TypeKey;
use crate::media_type::MediaType;

/// Priority given to descriptors that do not set one (lower wins ties)
pub const DEFAULT_PRIORITY: i32 = 5000;

/// How the registry obtains a provider instance.
pub enum ProviderFactory<P: ?Sized> {
    /// One shared instance for every request
    Singleton(Arc<P>),
    /// A fresh instance per lookup
    PerCall(Arc<dyn Fn() -> Arc<P> + Send + Sync>),
}

impl<P: ?Sized> ProviderFactory<P> {
    #[must_use]
    pub fn instance(&self) -> Arc<P> {
        match self {
            ProviderFactory::Singleton(provider) => Arc::clone(provider),
            ProviderFactory::PerCall(factory) => factory(),
        }
    }
}

impl<P: ?Sized> Clone for ProviderFactory<P> {
    fn clone(&self) -> Self {
        match self {
            ProviderFactory::Singleton(p) => ProviderFactory::Singleton(Arc::clone(p)),
            ProviderFactory::PerCall(f) => ProviderFactory::PerCall(Arc::clone(f)),
        }
    }
}

impl<P: ?Sized> fmt::Debug for ProviderFactory<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderFactory::Singleton(_) => f.write_str("Singleton"),
            ProviderFactory::PerCall(_) => f.write_str("PerCall"),
        }
    }
}

/// A provider registration: the type it is bound to, its priority, the media
/// types it handles (empty means any) and how to get an instance.
pub struct ProviderDescriptor<P: ?Sized> {
    bound: TypeKey,
    priority: i32,
    media_types: Vec<MediaType>,
    factory: ProviderFactory<P>,
}

impl<P: ?Sized> ProviderDescriptor<P> {
    #[must_use]
    pub fn new(bound: TypeKey, factory: ProviderFactory<P>) -> Self {
        Self {
            bound,
            priority: DEFAULT_PRIORITY,
            media_types: Vec::new(),
            factory,
        }
    }

    #[must_use]
    pub fn singleton(bound: TypeKey, provider: Arc<P>) -> Self {
        Self::new(bound, ProviderFactory::Singleton(provider))
    }

    #[must_use]
    pub fn per_call<F>(bound: TypeKey, factory: F) -> Self
    where
        F: Fn() -> Arc<P> + Send + Sync + 'static,
    {
        Self::new(bound, ProviderFactory::PerCall(Arc::new(factory)))
    }

    #[must_use]
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_media_types(mut self, media_types: Vec<MediaType>) -> Self {
        self.media_types = media_types;
        self
    }

    #[must_use]
    pub fn bound(&self) -> &TypeKey {
        &self.bound
    }

    #[must_use]
    pub fn priority(&self) -> i32 {
        self.priority
    }

    #[must_use]
    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    #[must_use]
    pub fn instance(&self) -> Arc<P> {
        self.factory.instance()
    }

    /// `true` when this provider declares no media types or one of them
    /// merges with `media_type`.
    #[must_use]
    pub fn supports(&self, media_type: &MediaType) -> bool {
        self.media_types.is_empty()
            || self
                .media_types
                .iter()
                .any(|declared| declared.is_compatible(media_type))
    }
}

impl<P: ?Sized> Clone for ProviderDescriptor<P> {
    fn clone(&self) -> Self {
        Self {
            bound: self.bound.clone(),
            priority: self.priority,
            media_types: self.media_types.clone(),
            factory: self.factory.clone(),
        }
    }
}

impl<P: ?Sized> fmt::Debug for ProviderDescriptor<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("bound", &self.bound)
            .field("priority", &self.priority)
            .field("media_types", &self.media_types)
            .field("factory", &self.factory)
            .finish()
    }
}

/// Sort most specific bound type first, then ascending priority.
///
/// A supertype is always shallower than its subtypes, so deeper-first puts
/// every subtype ahead of its parents. The sort is stable, so equal keys keep
/// registration order.
pub(crate) fn sort_by_specificity<P: ?Sized>(descriptors: &mut [ProviderDescriptor<P>]) {
    descriptors.sort_by(|a, b| {
        b.bound
            .depth()
            .cmp(&a.bound.depth())
            .then(a.priority.cmp(&b.priority))
    });
}
