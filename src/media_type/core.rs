use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::MediaTypeError;

pub(crate) const WILDCARD: &str = "*";
pub(crate) const QUALITY: &str = "q";
pub(crate) const CHARSET: &str = "charset";

/// A parsed media-type expression such as `application/json;charset=utf-8`.
///
/// Type, subtype and parameter names are lowercased on parse. The `q`
/// parameter is kept so [`MediaType::quality`] can read it, but it takes no
/// part in equality or hashing.
#[derive(Debug, Clone)]
pub struct MediaType {
    type_: String,
    subtype: String,
    params: BTreeMap<String, String>,
}

impl MediaType {
    /// Build a media type from already-valid parts.
    ///
    /// Parts are lowercased; use [`MediaType::parse`] for header text.
    #[must_use]
    pub fn new(type_: &str, subtype: &str) -> Self {
        Self {
            type_: type_.to_ascii_lowercase(),
            subtype: subtype.to_ascii_lowercase(),
            params: BTreeMap::new(),
        }
    }

    /// `*/*`
    #[must_use]
    pub fn wildcard() -> Self {
        Self::new(WILDCARD, WILDCARD)
    }

    #[must_use]
    pub fn with_param(mut self, name: &str, value: &str) -> Self {
        self.insert_param(name, value.to_string());
        self
    }

    // Charset values are case-insensitive and stored lowercased.
    fn insert_param(&mut self, name: &str, value: String) {
        let name = name.to_ascii_lowercase();
        let value = if name == CHARSET {
            value.to_ascii_lowercase()
        } else {
            value
        };
        self.params.insert(name, value);
    }

    /// Parse `type/subtype(;name=value)*`.
    ///
    /// A bare `*` is read as `*/*`. Parameters without `=` are skipped.
    ///
    /// # Errors
    ///
    /// `Malformed` when the type or subtype is missing or not a token, or when
    /// a wildcard type carries a concrete subtype.
    pub fn parse(input: &str) -> Result<Self, MediaTypeError> {
        let malformed = |reason| MediaTypeError::Malformed {
            input: input.to_string(),
            reason,
        };

        let mut parts = split_quoted(input, ';').into_iter();
        let essence = parts.next().unwrap_or_default().trim();
        let (type_, subtype) = if essence == WILDCARD {
            (WILDCARD, WILDCARD)
        } else {
            essence
                .split_once('/')
                .map(|(t, s)| (t.trim(), s.trim()))
                .ok_or_else(|| malformed("missing '/'"))?
        };

        if !is_token(type_) || !is_token(subtype) {
            return Err(malformed("type and subtype must be non-empty tokens"));
        }
        if type_ == WILDCARD && subtype != WILDCARD {
            return Err(malformed("wildcard type with concrete subtype"));
        }

        let mut media_type = Self::new(type_, subtype);
        for param in parts {
            let Some((name, value)) = param.split_once('=') else {
                continue;
            };
            let name = name.trim();
            if name.is_empty() {
                continue;
            }
            media_type.insert_param(name, unquote(value.trim()));
        }
        Ok(media_type)
    }

    #[must_use]
    pub fn type_(&self) -> &str {
        &self.type_
    }

    #[must_use]
    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    /// Parameter value by (case-insensitive) name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Parameters in name order, `q` excluded
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(name, _)| name.as_str() != QUALITY)
            .map(|(n, v)| (n.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn is_wildcard_type(&self) -> bool {
        self.type_ == WILDCARD
    }

    #[must_use]
    pub fn is_wildcard_subtype(&self) -> bool {
        self.subtype == WILDCARD
    }

    /// Structured-syntax suffix: `json` for `vnd.api+json`
    #[must_use]
    pub fn suffix(&self) -> Option<&str> {
        self.subtype.rsplit_once('+').map(|(_, suffix)| suffix)
    }

    /// Subtype without its suffix: `vnd.api` for `vnd.api+json`
    #[must_use]
    pub fn subtype_stem(&self) -> &str {
        self.subtype
            .rsplit_once('+')
            .map_or(self.subtype.as_str(), |(stem, _)| stem)
    }

    /// Quality factor from `q`, clamped to `0.0..=1.0`; missing or
    /// unparseable values count as `1.0`.
    #[must_use]
    pub fn quality(&self) -> f32 {
        self.params
            .get(QUALITY)
            .and_then(|q| q.trim().parse::<f32>().ok())
            .filter(|q| !q.is_nan())
            .map_or(1.0, |q| q.clamp(0.0, 1.0))
    }

    #[must_use]
    pub fn without_quality(&self) -> Self {
        let mut copy = self.clone();
        copy.params.remove(QUALITY);
        copy
    }

    /// `true` when [`compatible`](super::compatible) would merge the two.
    #[must_use]
    pub fn is_compatible(&self, other: &MediaType) -> bool {
        super::compatible(Some(self), Some(other)).is_some()
    }

    pub(crate) fn from_parts(type_: String, subtype: String, params: BTreeMap<String, String>) -> Self {
        Self {
            type_,
            subtype,
            params,
        }
    }

    pub(crate) fn raw_params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.type_ == other.type_ && self.subtype == other.subtype && self.params().eq(other.params())
    }
}

impl Eq for MediaType {}

impl Hash for MediaType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_.hash(state);
        self.subtype.hash(state);
        for (name, value) in self.params() {
            name.hash(state);
            value.hash(state);
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.params {
            if is_token(value) {
                write!(f, ";{name}={value}")?;
            } else {
                write!(f, ";{name}=\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))?;
            }
        }
        Ok(())
    }
}

impl FromStr for MediaType {
    type Err = MediaTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// RFC 7230 `token`.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#'
                        | b'$'
                        | b'%'
                        | b'&'
                        | b'\''
                        | b'*'
                        | b'+'
                        | b'-'
                        | b'.'
                        | b'^'
                        | b'_'
                        | b'`'
                        | b'|'
                        | b'~'
                )
        })
}

fn unquote(value: &str) -> String {
    let Some(inner) = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
    else {
        return value.to_string();
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.extend(chars.next()),
            c => out.push(c),
        }
    }
    out
}

/// Split on `sep` outside double-quoted strings.
pub(crate) fn split_quoted(input: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            c if c == sep && !in_quotes => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    parts.push(&input[start..]);
    parts
}
