//! Dispatcher core module - hot path for request dispatch.
//!
//! # JSF Compliance (Rule 206)
//!
//! Matching runs per request against registries built at startup. The
//! following clippy lints are denied to keep allocations out of it:
//!
//! - `clippy::inefficient_to_string` - Catches unnecessary allocations
//! - `clippy::format_push_string` - Prevents format! string building
//! - `clippy::unnecessary_to_owned` - Catches needless owned copies

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]
#![deny(clippy::unnecessary_to_owned)]

use std::sync::Arc;
use std::time::{Duration, Instant};

use http::Method;
use tracing::{debug, info, warn};

use super::{DispatchOutcome, DispatchRequest, MatchResult, OptionsResponse, RequestFilter};
use crate::media_type::{compatible, MediaType};
use crate::registry::{normalize_base_path, strip_base_path, ResourceManifest, ResourceRegistry};
use crate::response::Flow;
use crate::runtime_config::RuntimeConfig;

const SLOW_DISPATCH: Duration = Duration::from_millis(1);

/// Selects the endpoint, and the representation it produces, for a request.
///
/// Holds only shared, immutable state; one instance serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Dispatcher {
    resources: Arc<ResourceRegistry>,
    config: RuntimeConfig,
    base_path: String,
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("manifests_count", &self.resources.manifests().len())
            .field("base_path", &self.base_path)
            .field("filters_count", &self.filters.len())
            .field("config", &self.config)
            .finish()
    }
}

/// Manifests registered for the request method
struct Candidates<'r> {
    manifests: &'r [Arc<ResourceManifest>],
    head_fallback: bool,
}

impl Dispatcher {
    /// Dispatch over `resources`.
    ///
    /// The registry's own base path wins; `config.base_path` applies when the
    /// registry declares none.
    #[must_use]
    pub fn new(resources: Arc<ResourceRegistry>, config: RuntimeConfig) -> Self {
        let base_path = if resources.base_path().is_empty() {
            normalize_base_path(&config.base_path)
        } else {
            resources.base_path().to_string()
        };
        Self {
            resources,
            config,
            base_path,
            filters: Vec::new(),
        }
    }

    /// Add a request filter; filters run in the order added
    pub fn add_filter(&mut self, filter: Arc<dyn RequestFilter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Run filters, route by method, then match path and media types.
    #[must_use]
    pub fn dispatch(&self, request: &DispatchRequest) -> DispatchOutcome {
        debug!(
            method = %request.method,
            path = %request.path,
            accept = ?request.accept,
            content_type = ?request.content_type,
            "Dispatch attempt"
        );
        let start = Instant::now();

        for filter in &self.filters {
            if let Flow::ShortCircuit(response) = filter.pre_match(request) {
                info!(
                    method = %request.method,
                    path = %request.path,
                    status = response.status,
                    stage = "pre_match",
                    "Dispatch aborted by filter"
                );
                return DispatchOutcome::Aborted(response);
            }
        }

        let outcome = match strip_base_path(&self.base_path, &request.path) {
            Some(path) => self.route(request, path),
            None => {
                debug!(
                    path = %request.path,
                    base_path = %self.base_path,
                    "Path outside base path"
                );
                DispatchOutcome::NotFound
            }
        };

        if let Some(selected) = outcome.selected() {
            for filter in &self.filters {
                if let Flow::ShortCircuit(response) = filter.post_match(request, selected) {
                    info!(
                        method = %request.method,
                        path = %request.path,
                        handler_name = %selected.handler_name(),
                        status = response.status,
                        stage = "post_match",
                        "Dispatch aborted by filter"
                    );
                    return DispatchOutcome::Aborted(response);
                }
            }
        }

        self.log_outcome(request, &outcome, start.elapsed());
        outcome
    }

    fn route(&self, request: &DispatchRequest, path: &str) -> DispatchOutcome {
        let candidates = self.candidates(&request.method);

        if request.method == Method::OPTIONS {
            if !candidates.manifests.is_empty() {
                let outcome = self.negotiate(request, path, &candidates);
                if matches!(outcome, DispatchOutcome::Matched(_)) || !self.config.synthesize_options {
                    return outcome;
                }
            } else if !self.config.synthesize_options {
                return DispatchOutcome::MethodNotFound;
            }
            return self.synthesize_options(path);
        }

        if candidates.manifests.is_empty() {
            return DispatchOutcome::MethodNotFound;
        }
        self.negotiate(request, path, &candidates)
    }

    fn candidates(&self, method: &Method) -> Candidates<'_> {
        let manifests = self.resources.for_method(method);
        if manifests.is_empty() && *method == Method::HEAD && self.config.head_fallback {
            return Candidates {
                manifests: self.resources.for_method(&Method::GET),
                head_fallback: true,
            };
        }
        Candidates {
            manifests,
            head_fallback: false,
        }
    }

    fn negotiate(
        &self,
        request: &DispatchRequest,
        path: &str,
        candidates: &Candidates<'_>,
    ) -> DispatchOutcome {
        let mut matches = Vec::new();
        let mut path_matched = false;

        for manifest in candidates.manifests {
            let Some(path_params) = manifest.pattern().captures(path) else {
                continue;
            };
            path_matched = true;

            if !consumes_ok(manifest, request) {
                debug!(
                    handler_name = %manifest.handler_name(),
                    content_type = ?request.content_type,
                    "Candidate rejected: content type not consumed"
                );
                continue;
            }

            let Some(negotiated) = negotiate_produces(manifest, request.accept.as_deref()) else {
                debug!(
                    handler_name = %manifest.handler_name(),
                    accept = ?request.accept,
                    "Candidate rejected: no acceptable media type"
                );
                continue;
            };

            matches.push(MatchResult {
                manifest: Arc::clone(manifest),
                negotiated,
                path_params,
            });
        }

        if !matches.is_empty() {
            if candidates.head_fallback {
                debug!(path = %path, "HEAD served by GET manifests");
            }
            DispatchOutcome::Matched(matches)
        } else if path_matched {
            DispatchOutcome::NotAcceptable
        } else {
            DispatchOutcome::NotFound
        }
    }

    fn synthesize_options(&self, path: &str) -> DispatchOutcome {
        let mut allow: Vec<Method> = Vec::new();
        let mut accept_significant = false;
        let mut content_type_significant = false;

        for manifest in self.resources.manifests() {
            if !manifest.pattern().matches(path) {
                continue;
            }
            if !allow.contains(manifest.method()) {
                allow.push(manifest.method().clone());
            }
            accept_significant |= manifest.produces().is_some();
            content_type_significant |= manifest.consumes().is_some();
        }

        if allow.is_empty() {
            return DispatchOutcome::NotFound;
        }
        DispatchOutcome::Options(OptionsResponse {
            allow,
            accept_significant,
            content_type_significant,
        })
    }

    fn log_outcome(&self, request: &DispatchRequest, outcome: &DispatchOutcome, elapsed: Duration) {
        match outcome {
            DispatchOutcome::Matched(matches) => {
                let Some(selected) = matches.first() else {
                    return;
                };
                if elapsed > SLOW_DISPATCH {
                    warn!(
                        method = %request.method,
                        path = %request.path,
                        handler_name = %selected.handler_name(),
                        route_pattern = %selected.manifest.path_template(),
                        duration_us = elapsed.as_micros(),
                        "Slow dispatch detected"
                    );
                } else {
                    info!(
                        method = %request.method,
                        path = %request.path,
                        handler_name = %selected.handler_name(),
                        route_pattern = %selected.manifest.path_template(),
                        negotiated = %selected.negotiated,
                        path_params = ?selected.path_params,
                        candidates_count = matches.len(),
                        duration_us = elapsed.as_micros(),
                        "Request dispatched"
                    );
                }
            }
            DispatchOutcome::Options(options) => {
                info!(
                    path = %request.path,
                    allow = %options.allow_header(),
                    duration_us = elapsed.as_micros(),
                    "OPTIONS synthesized"
                );
            }
            DispatchOutcome::Aborted(_) => {}
            DispatchOutcome::NotFound
            | DispatchOutcome::NotAcceptable
            | DispatchOutcome::MethodNotFound => {
                warn!(
                    method = %request.method,
                    path = %request.path,
                    condition = %outcome.kind(),
                    duration_us = elapsed.as_micros(),
                    "No resource dispatched"
                );
            }
        }
    }
}

/// `consumes` only matters for requests with a body; a missing
/// `Content-Type` is treated as `*/*`.
fn consumes_ok(manifest: &ResourceManifest, request: &DispatchRequest) -> bool {
    if !request.has_entity {
        return true;
    }
    match manifest.consumes() {
        None => true,
        Some(consumes) => consumes
            .iter()
            .any(|c| compatible(Some(c), request.content_type.as_ref()).is_some()),
    }
}

/// First compatible pair walking `accept` by preference, then `produces` in
/// declaration order.
fn negotiate_produces(manifest: &ResourceManifest, accept: Option<&[MediaType]>) -> Option<MediaType> {
    let wildcard = [MediaType::wildcard()];
    let accept = accept.unwrap_or(&wildcard);
    match manifest.produces() {
        None => accept.iter().find_map(|a| compatible(Some(a), None)),
        Some(produces) => accept
            .iter()
            .find_map(|a| produces.iter().find_map(|p| compatible(Some(a), Some(p)))),
    }
}
