//! Path templates compiled into matchers.
//!
//! # JSF Compliance (Rule 206)
//!
//! `captures` runs once per candidate manifest on every request; extracted
//! parameters go into a `SmallVec` so the common case stays off the heap.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use std::sync::Arc;

use percent_encoding::percent_decode_str;
use regex::Regex;
use smallvec::SmallVec;

use super::encode::PLACEHOLDER;
use crate::error::TemplateError;

/// Maximum number of path parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/{id}/posts/{postId}).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Stack-allocated parameter storage for the hot path.
///
/// Names are `Arc<str>` shared with the compiled pattern; values are owned
/// per-request strings, already percent-decoded.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Default body for a placeholder without an explicit regex.
const DEFAULT_SEGMENT: &str = "[^/]+?";

/// A compiled path template.
///
/// `/pets/{id}` becomes `^/pets/(?P<p0>[^/]+?)/?$`; `{id:[0-9]+}` uses the
/// declared regex instead. Literal text is escaped. Group names are synthetic
/// (`p0`, `p1`, ...) because template names may contain `.` and `-`.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    names: Vec<Arc<str>>,
    groups: Vec<String>,
}

impl PathPattern {
    /// Compile a path template
    ///
    /// # Errors
    ///
    /// `InvalidTemplate` when braces are unbalanced or a placeholder regex
    /// does not compile.
    pub fn compile(template: &str) -> Result<Self, TemplateError> {
        let normalized = if template.starts_with('/') {
            template.to_string()
        } else {
            ["/", template].concat()
        };
        let trimmed = normalized.trim_end_matches('/');

        let mut pattern = String::with_capacity(trimmed.len() + 16);
        pattern.push('^');
        let mut names = Vec::new();
        let mut groups = Vec::new();
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(trimmed) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            push_literal(&mut pattern, &trimmed[last..whole.start()], template)?;
            let group = ["p", &names.len().to_string()].concat();
            let body = caps.get(2).map_or(DEFAULT_SEGMENT, |m| m.as_str().trim());
            pattern.push_str("(?P<");
            pattern.push_str(&group);
            pattern.push('>');
            pattern.push_str(body);
            pattern.push(')');
            names.push(Arc::from(&caps[1]));
            groups.push(group);
            last = whole.end();
        }
        push_literal(&mut pattern, &trimmed[last..], template)?;
        pattern.push_str("/?$");

        let regex = Regex::new(&pattern)
            .map_err(|_| TemplateError::invalid(template, "placeholder regex does not compile"))?;

        Ok(Self {
            template: template.to_string(),
            regex,
            names,
            groups,
        })
    }

    /// The template text this pattern was compiled from
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Placeholder names in declaration order (duplicates kept)
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.names
    }

    #[inline]
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Match `path` and extract its parameters.
    ///
    /// Values are percent-decoded. When a name occurs twice the later value
    /// wins on lookup (see [`get_param`]).
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let caps = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (name, group) in self.names.iter().zip(&self.groups) {
            if let Some(value) = caps.name(group) {
                let decoded = percent_decode_str(value.as_str()).decode_utf8_lossy();
                params.push((Arc::clone(name), decoded.into_owned()));
            }
        }
        Some(params)
    }
}

/// Look up a parameter with "last write wins" semantics.
#[inline]
#[must_use]
pub fn get_param<'a>(params: &'a ParamVec, name: &str) -> Option<&'a str> {
    params
        .iter()
        .rfind(|(k, _)| k.as_ref() == name)
        .map(|(_, v)| v.as_str())
}

fn push_literal(pattern: &mut String, literal: &str, template: &str) -> Result<(), TemplateError> {
    if literal.contains(['{', '}']) {
        return Err(TemplateError::invalid(template, "malformed placeholder"));
    }
    pattern.push_str(&regex::escape(literal));
    Ok(())
}
