//! Mutable URI template builder.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::Hash;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::bind::{Binder, Named, Positional, Unbound};
use super::encode::{Encoding, Masked, PLACEHOLDER};
use crate::error::TemplateError;

// Scheme characters exclude `{` and the mask delimiters so a leading
// placeholder is never read as a scheme.
#[allow(clippy::expect_used)]
static OPAQUE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)([^:/?#{}\x{E000}\x{E001}]+):([^/].*)$").expect("opaque uri regex")
});

#[allow(clippy::expect_used)]
static HIERARCHICAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?s)(([^:/?#{}\x{E000}\x{E001}]+):)?(//([^/?#]*))?([^?#]*)(\?([^#]*))?(#(.*))?$",
    )
    .expect("hierarchical uri regex")
});

#[allow(clippy::expect_used)]
static HOST_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([^/:\[\]]+):(\d+)$").expect("host:port regex"));

// `[::1]:8080`, `[fe80::1%eth0]:8080`, `[::ffff:1.2.3.4]:80`; the brackets
// stay part of the host.
#[allow(clippy::expect_used)]
static IPV6_HOST_PORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\[[^\]]+\]):(\d+)$").expect("ipv6 host:port regex"));

/// A URI template under construction.
///
/// Components hold literal text or unresolved `{name}` / `{name:regex}`
/// placeholders. The opaque form (`scheme:ssp`) and the hierarchical form
/// (authority, path, query) are mutually exclusive: setting one clears the other.
///
/// The builder is a plain value. `clone()` copies every component, so a clone
/// can be mutated on another request without affecting the original.
///
/// # Example
///
/// ```rust
/// use brrtdispatch::template::UriTemplate;
///
/// let mut t = UriTemplate::parse("http://example.com/pets/{id}").unwrap();
/// t.query_param("fields", &[&"name"]);
/// assert_eq!(t.build(&[&42]).unwrap(), "http://example.com/pets/42?fields=name");
/// assert_eq!(t.to_template(), "http://example.com/pets/{id}?fields=name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UriTemplate {
    scheme: Option<String>,
    ssp: Option<String>,
    user_info: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Option<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl UriTemplate {
    /// Create an empty builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse template text into a fresh builder
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        let mut template = Self::new();
        template.uri(text)?;
        Ok(template)
    }

    /// Copy the components present in `text` into this builder, replacing
    /// existing values for those components.
    ///
    /// Input of the form `scheme:rest` where `rest` does not start with `/` is
    /// opaque; everything else is read as `scheme://authority/path?query#fragment`
    /// with every part optional.
    pub fn uri(&mut self, text: &str) -> Result<&mut Self, TemplateError> {
        let masked = Masked::new(text);

        if let Some(caps) = OPAQUE.captures(&masked.text) {
            let rest = masked.restore(&caps[2]);
            let (ssp, fragment) = match rest.split_once('#') {
                Some((ssp, fragment)) => (ssp.to_string(), Some(fragment.to_string())),
                None => (rest, None),
            };
            self.scheme = Some(masked.restore(&caps[1]));
            self.clear_hierarchical();
            self.ssp = Some(Encoding::Query.encode_template(&ssp));
            if let Some(fragment) = fragment {
                self.fragment(Some(&fragment));
            }
            return Ok(self);
        }

        let caps = HIERARCHICAL
            .captures(&masked.text)
            .ok_or_else(|| TemplateError::invalid(text, "not a hierarchical uri"))?;

        self.ssp = None;
        let has_scheme = caps.get(2).is_some();
        if let Some(scheme) = caps.get(2) {
            self.scheme = Some(masked.restore(scheme.as_str()));
        }

        if let Some(authority) = caps.get(4) {
            self.parse_authority(authority.as_str(), &masked, text)?;
        }

        if let Some(path) = caps.get(5) {
            let path = path.as_str();
            if !has_scheme && !path.is_empty() && !path.starts_with('/') {
                if let (Some(colon), Some(slash)) = (path.find(':'), path.find('/')) {
                    if colon < slash {
                        return Err(TemplateError::invalid(
                            text,
                            "relative path has ':' before the first '/'",
                        ));
                    }
                }
            }
            if !path.is_empty() {
                self.replace_path(Some(&masked.restore(path)));
            }
        }

        if let Some(query) = caps.get(7) {
            self.replace_query(Some(&masked.restore(query.as_str())));
        }

        if let Some(fragment) = caps.get(9) {
            self.fragment(Some(&masked.restore(fragment.as_str())));
        }

        Ok(self)
    }

    fn parse_authority(
        &mut self,
        authority: &str,
        masked: &Masked,
        template: &str,
    ) -> Result<(), TemplateError> {
        let (user_info, host) = match authority.find('@') {
            Some(at) => (Some(&authority[..at]), &authority[at + 1..]),
            None => (None, authority),
        };

        if host.is_empty() || host.starts_with(':') {
            return Err(TemplateError::invalid(template, "authority has no host"));
        }

        let parse_port = |digits: &str| {
            digits
                .parse::<u16>()
                .map_err(|_| TemplateError::invalid(template, "port out of range"))
        };

        let (host, port) = if let Some(caps) = HOST_PORT.captures(host) {
            (masked.restore(&caps[1]), Some(parse_port(&caps[2])?))
        } else if let Some(caps) = host
            .starts_with('[')
            .then(|| IPV6_HOST_PORT.captures(host))
            .flatten()
        {
            (masked.restore(&caps[1]), Some(parse_port(&caps[2])?))
        } else {
            (masked.restore(host), None)
        };

        if let Some(user_info) = user_info {
            self.user_info = Some(masked.restore(user_info));
        }
        self.host = Some(host);
        if port.is_some() {
            self.port = port;
        }
        Ok(())
    }

    fn clear_hierarchical(&mut self) {
        self.user_info = None;
        self.host = None;
        self.port = None;
        self.path = None;
        self.query = None;
    }

    pub fn scheme(&mut self, scheme: Option<&str>) -> &mut Self {
        self.scheme = scheme.map(str::to_string);
        self
    }

    /// Set the scheme-specific part.
    ///
    /// A value starting with `/` is hierarchical (`//host/path?query`) and is
    /// parsed into authority, path and query; anything else becomes the opaque
    /// part and clears those components.
    pub fn scheme_specific_part(&mut self, ssp: &str) -> Result<&mut Self, TemplateError> {
        if ssp.starts_with('/') {
            let parsed = Self::parse(ssp)?;
            self.ssp = None;
            self.user_info = parsed.user_info;
            self.host = parsed.host;
            self.port = parsed.port;
            self.path = parsed.path;
            self.query = parsed.query;
            return Ok(self);
        }
        if ssp.is_empty() {
            return Err(TemplateError::InvalidParameter {
                name: "ssp",
                value: "\"\"".to_string(),
            });
        }
        self.clear_hierarchical();
        self.ssp = Some(Encoding::Query.encode_template(ssp));
        Ok(self)
    }

    pub fn user_info(&mut self, user_info: Option<&str>) -> &mut Self {
        if user_info.is_some() {
            self.ssp = None;
        }
        self.user_info = user_info.map(str::to_string);
        self
    }

    /// Set the host; an empty host is rejected, `None` clears it.
    pub fn host(&mut self, host: Option<&str>) -> Result<&mut Self, TemplateError> {
        if host == Some("") {
            return Err(TemplateError::InvalidParameter {
                name: "host",
                value: "\"\"".to_string(),
            });
        }
        if host.is_some() {
            self.ssp = None;
        }
        self.host = host.map(str::to_string);
        Ok(self)
    }

    pub fn port(&mut self, port: Option<u16>) -> &mut Self {
        if port.is_some() {
            self.ssp = None;
        }
        self.port = port;
        self
    }

    /// Append a path, joining with exactly one `/`.
    pub fn path(&mut self, segment: &str) -> &mut Self {
        self.ssp = None;
        let mut path = self.path.take().unwrap_or_default();
        append_path(&mut path, segment);
        self.path = Some(path);
        self
    }

    /// Append each value as one encoded path segment (`/` inside a value is escaped).
    pub fn segment(&mut self, segments: &[&str]) -> &mut Self {
        for segment in segments {
            let encoded = Encoding::PathSegment.encode_template(segment);
            self.path(&encoded);
        }
        self
    }

    pub fn replace_path(&mut self, path: Option<&str>) -> &mut Self {
        if path.is_some() {
            self.ssp = None;
        }
        self.path = path.map(|p| Encoding::Path.encode_template(p));
        self
    }

    /// Append `;name=value` pairs to the current last path segment.
    pub fn matrix_param(&mut self, name: &str, values: &[&dyn Display]) -> &mut Self {
        self.ssp = None;
        let mut path = self.path.take().unwrap_or_default();
        let name = Encoding::Matrix.encode_as_is(name);
        for value in values {
            path.push(';');
            path.push_str(&name);
            path.push('=');
            path.push_str(&Encoding::Matrix.encode_as_is(&value.to_string()));
        }
        self.path = Some(path);
        self
    }

    /// Replace the whole matrix of the last path segment; `None` removes it.
    pub fn replace_matrix(&mut self, matrix: Option<&str>) -> &mut Self {
        self.ssp = None;
        let path = self.path.take().unwrap_or_default();
        let masked = Masked::new(&path);
        let mut edited = match last_segment_matrix(&masked.text) {
            Some(at) => masked.text[..at].to_string(),
            None => masked.text.clone(),
        };
        if let Some(matrix) = matrix.filter(|m| !m.is_empty()) {
            if !matrix.starts_with(';') {
                edited.push(';');
            }
            edited.push_str(&Encoding::Path.encode_template(matrix));
        }
        self.path = Some(masked.restore(&edited));
        self
    }

    /// Remove every matrix parameter called `name` from the last path segment,
    /// then append `values` (if any).
    ///
    /// Placeholders are masked while the segment is edited, so regex bodies
    /// holding `;` or `/` are never split.
    pub fn replace_matrix_param(&mut self, name: &str, values: &[&dyn Display]) -> &mut Self {
        let Some(path) = self.path.take() else {
            if !values.is_empty() {
                self.matrix_param(name, values);
            }
            return self;
        };

        let masked = Masked::new(&path);
        let encoded_name = Encoding::Matrix.encode_as_is(name);
        let mut edited = String::with_capacity(masked.text.len());
        match last_segment_matrix(&masked.text) {
            Some(at) => {
                edited.push_str(&masked.text[..at]);
                for param in masked.text[at + 1..].split(';') {
                    if param.is_empty() {
                        continue;
                    }
                    let param_name = param.split_once('=').map_or(param, |(n, _)| n);
                    if param_name == encoded_name || param_name == name {
                        continue;
                    }
                    edited.push(';');
                    edited.push_str(param);
                }
            }
            None => edited.push_str(&masked.text),
        }

        self.path = Some(edited);
        if !values.is_empty() {
            self.matrix_param(name, values);
        }
        self.path = self.path.take().map(|p| masked.restore(&p));
        self
    }

    /// Append `name=value` pairs to the query.
    pub fn query_param(&mut self, name: &str, values: &[&dyn Display]) -> &mut Self {
        if values.is_empty() {
            return self;
        }
        self.ssp = None;
        let mut query = self.query.take().unwrap_or_default();
        let name = Encoding::QueryParam.encode_as_is(name);
        for value in values {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(&name);
            query.push('=');
            query.push_str(&Encoding::QueryParam.encode_as_is(&value.to_string()));
        }
        self.query = Some(query);
        self
    }

    /// Drop every pair whose encoded name is `name`, then append `values`.
    ///
    /// A query left empty becomes absent rather than `""`.
    pub fn replace_query_param(&mut self, name: &str, values: &[&dyn Display]) -> &mut Self {
        if let Some(query) = self.query.take() {
            let encoded_name = Encoding::QueryParam.encode_as_is(name);
            let kept: Vec<&str> = query
                .split('&')
                .filter(|pair| !pair.is_empty())
                .filter(|pair| pair.split_once('=').map_or(*pair, |(n, _)| n) != encoded_name)
                .collect();
            self.query = (!kept.is_empty()).then(|| kept.join("&"));
        }
        self.query_param(name, values)
    }

    pub fn replace_query(&mut self, query: Option<&str>) -> &mut Self {
        self.query = match query {
            Some(q) if !q.is_empty() => {
                self.ssp = None;
                Some(Encoding::Query.encode_template(q))
            }
            _ => None,
        };
        self
    }

    pub fn fragment(&mut self, fragment: Option<&str>) -> &mut Self {
        self.fragment = fragment.map(|f| Encoding::Query.encode_template(f));
        self
    }

    /// Bind one placeholder everywhere it occurs, leaving the others intact.
    pub fn resolve_template(
        &mut self,
        name: &str,
        value: &dyn Display,
    ) -> Result<&mut Self, TemplateError> {
        self.resolve_template_with(name, value, true)
    }

    pub fn resolve_template_with(
        &mut self,
        name: &str,
        value: &dyn Display,
        encode_slash_in_path: bool,
    ) -> Result<&mut Self, TemplateError> {
        let map = HashMap::from([(name, value.to_string())]);
        self.resolve_with(&mut Named::lenient(&map, false), encode_slash_in_path)
    }

    /// Like [`resolve_template`](Self::resolve_template) but `%XX` escapes in
    /// `value` are kept.
    pub fn resolve_template_from_encoded(
        &mut self,
        name: &str,
        value: &dyn Display,
    ) -> Result<&mut Self, TemplateError> {
        let map = HashMap::from([(name, value.to_string())]);
        self.resolve_with(&mut Named::lenient(&map, true), false)
    }

    pub fn resolve_templates<K, V>(
        &mut self,
        values: &HashMap<K, V>,
    ) -> Result<&mut Self, TemplateError>
    where
        K: Borrow<str> + Eq + Hash,
        V: Display,
    {
        self.resolve_with(&mut Named::lenient(values, false), true)
    }

    /// Substitute inside each stored component; a value never moves text
    /// from one component to another.
    fn resolve_with<B>(&mut self, binder: &mut B, encode_slash: bool) -> Result<&mut Self, TemplateError>
    where
        B: Binder<Error = TemplateError>,
    {
        let values = if encode_slash {
            Encoding::PathSegment
        } else {
            Encoding::Path
        };
        resolve_component(&mut self.scheme, binder, values)?;
        resolve_component(&mut self.ssp, binder, values)?;
        resolve_component(&mut self.user_info, binder, values)?;
        resolve_component(&mut self.host, binder, values)?;
        resolve_component(&mut self.path, binder, values)?;
        resolve_component(&mut self.query, binder, Encoding::QueryParam)?;
        resolve_component(&mut self.fragment, binder, Encoding::Query)?;
        Ok(self)
    }

    /// Build a URI binding placeholders positionally, escaping `/` in values.
    pub fn build(&self, values: &[&dyn Display]) -> Result<String, TemplateError> {
        self.build_with(values, true)
    }

    pub fn build_with(
        &self,
        values: &[&dyn Display],
        encode_slash_in_path: bool,
    ) -> Result<String, TemplateError> {
        let uri = self.render(&mut Positional::new(values, false), encode_slash_in_path)?;
        trace!(uri = %uri, values = values.len(), "URI template built");
        Ok(uri)
    }

    pub fn build_from_map<K, V>(&self, values: &HashMap<K, V>) -> Result<String, TemplateError>
    where
        K: Borrow<str> + Eq + Hash,
        V: Display,
    {
        self.build_from_map_with(values, true)
    }

    pub fn build_from_map_with<K, V>(
        &self,
        values: &HashMap<K, V>,
        encode_slash_in_path: bool,
    ) -> Result<String, TemplateError>
    where
        K: Borrow<str> + Eq + Hash,
        V: Display,
    {
        self.render(&mut Named::strict(values, false), encode_slash_in_path)
    }

    /// Positional build whose values keep their existing `%XX` escapes.
    pub fn build_from_encoded(&self, values: &[&dyn Display]) -> Result<String, TemplateError> {
        self.render(&mut Positional::new(values, true), false)
    }

    pub fn build_from_encoded_map<K, V>(
        &self,
        values: &HashMap<K, V>,
    ) -> Result<String, TemplateError>
    where
        K: Borrow<str> + Eq + Hash,
        V: Display,
    {
        self.render(&mut Named::strict(values, true), false)
    }

    /// Render back to template text; unbound placeholders stay as `{name}`.
    #[must_use]
    pub fn to_template(&self) -> String {
        match self.render(&mut Unbound, true) {
            Ok(text) => text,
            Err(never) => match never {},
        }
    }

    /// Distinct placeholder names in the order a build would bind them.
    #[must_use]
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        let components = [
            &self.scheme,
            &self.ssp,
            &self.user_info,
            &self.host,
            &self.path,
            &self.query,
            &self.fragment,
        ];
        for text in components.into_iter().flatten() {
            for caps in PLACEHOLDER.captures_iter(text) {
                let name = &caps[1];
                if !names.iter().any(|n| n == name) {
                    names.push(name.to_string());
                }
            }
        }
        names
    }

    fn render<B: Binder>(&self, binder: &mut B, encode_slash: bool) -> Result<String, B::Error> {
        let values = if encode_slash {
            Encoding::PathSegment
        } else {
            Encoding::Path
        };
        let mut out = String::new();

        if let Some(scheme) = &self.scheme {
            substitute(scheme, binder, values, &mut out)?;
            out.push(':');
        }

        if let Some(ssp) = &self.ssp {
            substitute(ssp, binder, values, &mut out)?;
        } else {
            let has_authority =
                self.user_info.is_some() || self.host.is_some() || self.port.is_some();
            if has_authority {
                out.push_str("//");
                if let Some(user_info) = &self.user_info {
                    substitute(user_info, binder, values, &mut out)?;
                    out.push('@');
                }
                if let Some(host) = &self.host {
                    substitute(host, binder, values, &mut out)?;
                }
                if let Some(port) = self.port {
                    out.push(':');
                    out.push_str(&port.to_string());
                }
            }

            if let Some(path) = &self.path {
                let mut rendered = String::with_capacity(path.len());
                substitute(path, binder, values, &mut rendered)?;
                if has_authority && !rendered.is_empty() && !rendered.starts_with('/') {
                    out.push('/');
                }
                out.push_str(&rendered);
            }

            if let Some(query) = &self.query {
                out.push('?');
                substitute(query, binder, Encoding::QueryParam, &mut out)?;
            }
        }

        if let Some(fragment) = &self.fragment {
            out.push('#');
            substitute(fragment, binder, Encoding::Query, &mut out)?;
        }

        Ok(out)
    }

    #[must_use]
    pub fn get_scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    #[must_use]
    pub fn get_scheme_specific_part(&self) -> Option<&str> {
        self.ssp.as_deref()
    }

    #[must_use]
    pub fn get_user_info(&self) -> Option<&str> {
        self.user_info.as_deref()
    }

    #[must_use]
    pub fn get_host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    #[must_use]
    pub fn get_port(&self) -> Option<u16> {
        self.port
    }

    #[must_use]
    pub fn get_path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn get_query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    #[must_use]
    pub fn get_fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }
}

impl Display for UriTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_template())
    }
}

impl FromStr for UriTemplate {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Replace placeholders in `text` left to right.
fn substitute<B: Binder>(
    text: &str,
    binder: &mut B,
    encoding: Encoding,
    out: &mut String,
) -> Result<(), B::Error> {
    if !text.contains('{') {
        out.push_str(text);
        return Ok(());
    }
    let mut last = 0;
    for caps in PLACEHOLDER.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        out.push_str(&text[last..whole.start()]);
        match binder.bind(&caps[1])? {
            Some(value) if binder.encoded() => out.push_str(&encoding.encode_keep_escapes(&value)),
            Some(value) => out.push_str(&encoding.encode_as_is(&value)),
            None => out.push_str(whole.as_str()),
        }
        last = whole.end();
    }
    out.push_str(&text[last..]);
    Ok(())
}

fn resolve_component<B: Binder>(
    component: &mut Option<String>,
    binder: &mut B,
    encoding: Encoding,
) -> Result<(), B::Error> {
    if let Some(text) = component.as_mut() {
        let mut resolved = String::with_capacity(text.len());
        substitute(text, binder, encoding, &mut resolved)?;
        *text = resolved;
    }
    Ok(())
}

fn append_path(path: &mut String, segment: &str) {
    if segment.is_empty() {
        return;
    }
    if path.ends_with('/') {
        let segment = segment.strip_prefix('/').unwrap_or(segment);
        if !segment.is_empty() {
            path.push_str(&Encoding::Path.encode_template(segment));
        }
    } else {
        let segment = Encoding::Path.encode_template(segment);
        if !path.is_empty() && !segment.starts_with('/') {
            path.push('/');
        }
        path.push_str(&segment);
    }
}

/// Offset of the `;` opening the last segment's matrix, in masked text.
fn last_segment_matrix(masked_path: &str) -> Option<usize> {
    let start = masked_path.rfind('/').unwrap_or(0);
    masked_path[start..].find(';').map(|offset| start + offset)
}
