//! Manifest declaration files.
//!
//! ```yaml
//! base_path: /api
//! config:
//!   error_verbose: false
//! resources:
//!   - method: GET
//!     path: /pets/{id}
//!     handler: get_pet
//!     produces: [application/json]
//! ```

use std::path::Path;

use anyhow::{anyhow, Context};
use http::Method;
use serde::Deserialize;
use tracing::info;

use super::{ResourceManifest, ResourceRegistry};
use crate::media_type::MediaType;
use crate::runtime_config::RuntimeConfig;

#[derive(Debug, Deserialize)]
struct ManifestFile {
    #[serde(default)]
    base_path: String,
    #[serde(default)]
    config: Option<RuntimeConfig>,
    #[serde(default)]
    resources: Vec<ResourceDecl>,
}

#[derive(Debug, Deserialize)]
struct ResourceDecl {
    method: String,
    path: String,
    handler: String,
    #[serde(default)]
    consumes: Option<Vec<String>>,
    #[serde(default)]
    produces: Option<Vec<String>>,
}

/// Serialization format of a declaration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Yaml,
    Json,
}

impl ManifestFormat {
    /// `.yaml`/`.yml` is YAML, anything else JSON
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml" | "yml") => ManifestFormat::Yaml,
            _ => ManifestFormat::Json,
        }
    }
}

/// Manifests read from a declaration, in declaration order.
#[derive(Debug)]
pub struct LoadedManifests {
    pub base_path: String,
    pub config: Option<RuntimeConfig>,
    pub manifests: Vec<ResourceManifest>,
}

impl LoadedManifests {
    #[must_use]
    pub fn into_registry(self) -> ResourceRegistry {
        let mut builder = ResourceRegistry::builder();
        builder.base_path(&self.base_path);
        for manifest in self.manifests {
            builder.register(manifest);
        }
        builder.build()
    }
}

/// Read a YAML or JSON manifest declaration file.
///
/// # Errors
///
/// Fails when the file cannot be read or parsed, or when a declared method,
/// path template or media type is invalid.
pub fn load_manifests(path: impl AsRef<Path>) -> anyhow::Result<LoadedManifests> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading manifest file {}", path.display()))?;
    let loaded = parse_manifests(&content, ManifestFormat::from_path(path))
        .with_context(|| format!("loading manifests from {}", path.display()))?;
    info!(
        file = %path.display(),
        manifests_count = loaded.manifests.len(),
        base_path = %loaded.base_path,
        "Manifest file loaded"
    );
    Ok(loaded)
}

/// [`load_manifests`] followed by [`LoadedManifests::into_registry`]
pub fn load_registry(path: impl AsRef<Path>) -> anyhow::Result<ResourceRegistry> {
    Ok(load_manifests(path)?.into_registry())
}

/// Parse declaration text.
///
/// # Errors
///
/// Same as [`load_manifests`], minus I/O.
pub fn parse_manifests(content: &str, format: ManifestFormat) -> anyhow::Result<LoadedManifests> {
    let file: ManifestFile = match format {
        ManifestFormat::Yaml => serde_yaml::from_str(content)?,
        ManifestFormat::Json => serde_json::from_str(content)?,
    };

    let manifests = file
        .resources
        .into_iter()
        .enumerate()
        .map(|(index, decl)| {
            to_manifest(decl).with_context(|| format!("resource #{index}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(LoadedManifests {
        base_path: file.base_path,
        config: file.config,
        manifests,
    })
}

fn to_manifest(decl: ResourceDecl) -> anyhow::Result<ResourceManifest> {
    let method = Method::from_bytes(decl.method.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| anyhow!("invalid HTTP method '{}'", decl.method))?;
    let mut manifest = ResourceManifest::new(method, &decl.path, &decl.handler)?;
    if let Some(consumes) = decl.consumes {
        manifest = manifest.with_consumes(parse_media_types(&consumes)?);
    }
    if let Some(produces) = decl.produces {
        manifest = manifest.with_produces(parse_media_types(&produces)?);
    }
    Ok(manifest)
}

fn parse_media_types(values: &[String]) -> anyhow::Result<Vec<MediaType>> {
    values
        .iter()
        .map(|v| MediaType::parse(v).map_err(anyhow::Error::from))
        .collect()
}
