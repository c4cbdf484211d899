use std::sync::Arc;

use http::Method;

use crate::error::Condition;
use crate::media_type::MediaType;
use crate::registry::ResourceManifest;
use crate::response::{HeaderVec, Response};
use crate::template::{get_param, ParamVec};

/// One surviving candidate: the manifest, the negotiated representation and
/// the path parameters extracted from the request path.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub manifest: Arc<ResourceManifest>,
    pub negotiated: MediaType,
    /// Percent-decoded path parameters (stack-allocated for ≤8 params)
    pub path_params: ParamVec,
}

impl MatchResult {
    #[must_use]
    pub fn handler_name(&self) -> &str {
        self.manifest.handler_name()
    }

    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        get_param(&self.path_params, name)
    }
}

/// Synthesized answer to an `OPTIONS` request nobody declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionsResponse {
    /// Methods of every manifest matching the path, in registration order
    pub allow: Vec<Method>,
    /// Some matching manifest declares `produces`
    pub accept_significant: bool,
    /// Some matching manifest declares `consumes`
    pub content_type_significant: bool,
}

impl OptionsResponse {
    /// Comma-joined `Allow` value, e.g. `GET,POST`
    #[must_use]
    pub fn allow_header(&self) -> String {
        let methods: Vec<&str> = self.allow.iter().map(Method::as_str).collect();
        methods.join(",")
    }

    /// Request headers worth advertising, or `None` when no manifest declares
    /// media types
    #[must_use]
    pub fn significant_headers(&self) -> Option<String> {
        match (self.accept_significant, self.content_type_significant) {
            (true, true) => Some("Accept,Content-Type".to_string()),
            (true, false) => Some("Accept".to_string()),
            (false, true) => Some("Content-Type".to_string()),
            (false, false) => None,
        }
    }

    /// `200` with `Allow`, `Access-Control-Allow-Methods` and, when relevant,
    /// `Access-Control-Allow-Headers`
    #[must_use]
    pub fn to_response(&self) -> Response {
        let allow = self.allow_header();
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("Allow"), allow.clone()));
        headers.push((Arc::from("Access-Control-Allow-Methods"), allow));
        if let Some(significant) = self.significant_headers() {
            headers.push((Arc::from("Access-Control-Allow-Headers"), significant));
        }
        Response::new(200, headers, serde_json::Value::Null)
    }
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// Ranked candidates, declaration order; never empty
    Matched(Vec<MatchResult>),
    /// Synthesized `OPTIONS` answer
    Options(OptionsResponse),
    /// A request filter short-circuited
    Aborted(Response),
    NotFound,
    NotAcceptable,
    MethodNotFound,
}

impl DispatchOutcome {
    /// The first-ranked match
    #[must_use]
    pub fn selected(&self) -> Option<&MatchResult> {
        self.matches().first()
    }

    #[must_use]
    pub fn matches(&self) -> &[MatchResult] {
        match self {
            DispatchOutcome::Matched(matches) => matches,
            _ => &[],
        }
    }

    /// Condition code for the failure outcomes
    #[must_use]
    pub fn condition(&self) -> Option<Condition> {
        match self {
            DispatchOutcome::NotFound => Some(Condition::NotFound),
            DispatchOutcome::NotAcceptable => Some(Condition::NotAcceptable),
            DispatchOutcome::MethodNotFound => Some(Condition::MethodNotFound),
            DispatchOutcome::Matched(_)
            | DispatchOutcome::Options(_)
            | DispatchOutcome::Aborted(_) => None,
        }
    }

    /// Short label for logs and the CLI
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchOutcome::Matched(_) => "matched",
            DispatchOutcome::Options(_) => "options",
            DispatchOutcome::Aborted(_) => "aborted",
            DispatchOutcome::NotFound => Condition::NotFound.as_str(),
            DispatchOutcome::NotAcceptable => Condition::NotAcceptable.as_str(),
            DispatchOutcome::MethodNotFound => Condition::MethodNotFound.as_str(),
        }
    }
}
