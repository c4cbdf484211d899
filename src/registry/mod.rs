//! # Registry Module
//!
//! The immutable table of declared endpoints ([`ResourceManifest`]) keyed by
//! HTTP method, in registration order.
//!
//! Endpoint discovery is not done here. A collaborator hands over an explicit,
//! ordered list of manifests, either built in code through
//! [`ResourceRegistryBuilder`] or read from a YAML/JSON declaration file with
//! [`load_manifests`]. Registration order is the dispatch tie-break, so it is
//! preserved exactly.
//!
//! ## Example
//!
//! ```rust
//! use brrtdispatch::registry::{ResourceManifest, ResourceRegistry};
//! use http::Method;
//!
//! let mut builder = ResourceRegistry::builder();
//! builder
//!     .base_path("/api")
//!     .register(ResourceManifest::new(Method::GET, "/pets/{id}", "get_pet").unwrap());
//! let registry = builder.build();
//!
//! assert_eq!(registry.for_method(&Method::GET).len(), 1);
//! assert_eq!(registry.relative_path("/api/pets/1"), Some("/pets/1"));
//! ```

mod load;
mod manifest;

use std::collections::HashMap;
use std::sync::Arc;

use http::Method;
use tracing::info;

pub use load::{load_manifests, load_registry, parse_manifests, LoadedManifests, ManifestFormat};
pub use manifest::ResourceManifest;

/// Endpoints by method, built once and read-only afterwards.
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    base_path: String,
    manifests: Vec<Arc<ResourceManifest>>,
    by_method: HashMap<Method, Vec<Arc<ResourceManifest>>>,
}

impl ResourceRegistry {
    #[must_use]
    pub fn builder() -> ResourceRegistryBuilder {
        ResourceRegistryBuilder::default()
    }

    /// Registry without a base path
    #[must_use]
    pub fn new(manifests: Vec<ResourceManifest>) -> Self {
        let mut builder = Self::builder();
        for manifest in manifests {
            builder.register(manifest);
        }
        builder.build()
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Every manifest in registration order
    #[must_use]
    pub fn manifests(&self) -> &[Arc<ResourceManifest>] {
        &self.manifests
    }

    /// Manifests declared for `method`, in registration order
    #[must_use]
    pub fn for_method(&self, method: &Method) -> &[Arc<ResourceManifest>] {
        self.by_method.get(method).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn has_method(&self, method: &Method) -> bool {
        self.by_method.contains_key(method)
    }

    /// Strip the base path from a request path.
    ///
    /// `None` when the path lies outside the base path.
    #[must_use]
    pub fn relative_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        strip_base_path(&self.base_path, path)
    }

    /// `METHOD /base/path -> handler` lines, for diagnostics
    #[must_use]
    pub fn routes_summary(&self) -> Vec<String> {
        self.manifests
            .iter()
            .map(|m| {
                format!(
                    "{} {}{} -> {}",
                    m.method(),
                    self.base_path,
                    m.path_template(),
                    m.handler_name()
                )
            })
            .collect()
    }
}

/// Collects manifests in declaration order.
#[derive(Debug, Default)]
pub struct ResourceRegistryBuilder {
    base_path: String,
    manifests: Vec<ResourceManifest>,
}

impl ResourceRegistryBuilder {
    /// Prefix every manifest path with `base_path` (`""` for none)
    pub fn base_path(&mut self, base_path: &str) -> &mut Self {
        self.base_path = normalize_base_path(base_path);
        self
    }

    pub fn register(&mut self, manifest: ResourceManifest) -> &mut Self {
        let priority = self.manifests.len();
        self.manifests.push(manifest.with_priority(priority));
        self
    }

    #[must_use]
    pub fn build(self) -> ResourceRegistry {
        let manifests: Vec<Arc<ResourceManifest>> =
            self.manifests.into_iter().map(Arc::new).collect();
        let mut by_method: HashMap<Method, Vec<Arc<ResourceManifest>>> = HashMap::new();
        for manifest in &manifests {
            by_method
                .entry(manifest.method().clone())
                .or_default()
                .push(Arc::clone(manifest));
        }

        let registry = ResourceRegistry {
            base_path: self.base_path,
            manifests,
            by_method,
        };
        info!(
            manifests_count = registry.manifests.len(),
            methods_count = registry.by_method.len(),
            base_path = %registry.base_path,
            routes_summary = ?registry.routes_summary().into_iter().take(10).collect::<Vec<_>>(),
            "Resource registry built"
        );
        registry
    }
}

/// Leading `/`, no trailing `/`, `""` for the root.
pub(crate) fn normalize_base_path(base_path: &str) -> String {
    let trimmed = base_path.trim().trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

pub(crate) fn strip_base_path<'p>(base_path: &str, path: &'p str) -> Option<&'p str> {
    if base_path.is_empty() {
        return Some(path);
    }
    let rest = path.strip_prefix(base_path)?;
    (rest.is_empty() || rest.starts_with('/')).then_some(rest)
}
