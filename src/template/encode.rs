//! Percent-encoding profiles and placeholder scanning for URI templates.
//!
//! Each URI component gets its own profile: paths keep `/`, path segments and
//! matrix parameters escape it, query parameters escape `&`, `=` and `+`.
//! Template text (as opposed to substituted values) is encoded in a way that
//! leaves `{placeholder}` spans and existing `%XX` escapes untouched.

use once_cell::sync::Lazy;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

/// Placeholder grammar: `{ ws* name ws* (: ws* regex)? ws* }`.
///
/// The regex body may itself hold one level of quantifier braces, e.g.
/// `{code:[0-9]{3}}`.
#[allow(clippy::expect_used)]
pub(crate) static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\s*(\w[\w.\-]*)\s*(?::\s*((?:[^{}]|\{[^{}]*\})+?))?\s*\}")
        .expect("placeholder regex must compile")
});

// RFC 3986 unreserved characters stay literal everywhere.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

const PATH_SET: &AsciiSet = &UNRESERVED
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@')
    .remove(b'/');

const PATH_SEGMENT_SET: &AsciiSet = &PATH_SET.add(b'/');
const MATRIX_SET: &AsciiSet = &PATH_SEGMENT_SET.add(b';').add(b'=');
const QUERY_SET: &AsciiSet = &PATH_SET.remove(b'?');
const QUERY_PARAM_SET: &AsciiSet = &QUERY_SET.add(b'&').add(b'=').add(b'+');

/// Encoding profile for one URI component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Whole path: `/` stays literal
    Path,
    /// Single path segment: `/` is escaped
    PathSegment,
    /// Matrix parameter name/value: `/`, `;` and `=` are escaped
    Matrix,
    /// Query or fragment text
    Query,
    /// Query parameter name/value: `&`, `=` and `+` are escaped
    QueryParam,
}

impl Encoding {
    fn set(self) -> &'static AsciiSet {
        match self {
            Encoding::Path => PATH_SET,
            Encoding::PathSegment => PATH_SEGMENT_SET,
            Encoding::Matrix => MATRIX_SET,
            Encoding::Query => QUERY_SET,
            Encoding::QueryParam => QUERY_PARAM_SET,
        }
    }

    /// Encode every disallowed character, `%` included.
    #[must_use]
    pub fn encode_as_is(self, value: &str) -> String {
        utf8_percent_encode(value, self.set()).to_string()
    }

    /// Encode disallowed characters but keep well-formed `%XX` escapes.
    #[must_use]
    pub fn encode_keep_escapes(self, value: &str) -> String {
        let set = self.set();
        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(pos) = rest.find('%') {
            let (head, tail) = rest.split_at(pos);
            out.extend(utf8_percent_encode(head, set));
            if is_escape(tail) {
                out.push_str(&tail[..3]);
                rest = &tail[3..];
            } else {
                out.push_str("%25");
                rest = &tail[1..];
            }
        }
        out.extend(utf8_percent_encode(rest, set));
        out
    }

    /// Encode template text: placeholders and `%XX` escapes pass through.
    #[must_use]
    pub fn encode_template(self, text: &str) -> String {
        if !text.contains('{') {
            return self.encode_keep_escapes(text);
        }
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in PLACEHOLDER.find_iter(text) {
            out.push_str(&self.encode_keep_escapes(&text[last..m.start()]));
            out.push_str(m.as_str());
            last = m.end();
        }
        out.push_str(&self.encode_keep_escapes(&text[last..]));
        out
    }
}

fn is_escape(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 3 && b[0] == b'%' && b[1].is_ascii_hexdigit() && b[2].is_ascii_hexdigit()
}

// Private-use code points never produced by any encoder above.
const MASK_OPEN: char = '\u{E000}';
const MASK_CLOSE: char = '\u{E001}';

/// Placeholder spans replaced by opaque tokens.
///
/// Tokens contain none of `/ ; ? # : @ { }` so structural edits on the masked
/// text never cut into a placeholder's regex body.
#[derive(Debug)]
pub(crate) struct Masked {
    pub text: String,
    saved: Vec<String>,
}

impl Masked {
    pub fn new(text: &str) -> Self {
        let mut saved = Vec::new();
        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for m in PLACEHOLDER.find_iter(text) {
            out.push_str(&text[last..m.start()]);
            out.push(MASK_OPEN);
            out.push_str(&saved.len().to_string());
            out.push(MASK_CLOSE);
            saved.push(m.as_str().to_string());
            last = m.end();
        }
        out.push_str(&text[last..]);
        Masked { text: out, saved }
    }

    /// Put the saved placeholders back into `text` (which may be any edit of
    /// the masked text).
    pub fn restore(&self, text: &str) -> String {
        if self.saved.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        while let Some(open) = rest.find(MASK_OPEN) {
            out.push_str(&rest[..open]);
            let after = &rest[open + MASK_OPEN.len_utf8()..];
            let restored = after.find(MASK_CLOSE).and_then(|close| {
                let index: usize = after[..close].parse().ok()?;
                let original = self.saved.get(index)?;
                Some((original, close))
            });
            match restored {
                Some((original, close)) => {
                    out.push_str(original);
                    rest = &after[close + MASK_CLOSE.len_utf8()..];
                }
                None => {
                    out.push(MASK_OPEN);
                    rest = after;
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_differ_on_slash() {
        assert_eq!(Encoding::Path.encode_as_is("a/b c"), "a/b%20c");
        assert_eq!(Encoding::PathSegment.encode_as_is("a/b"), "a%2Fb");
        assert_eq!(Encoding::Matrix.encode_as_is("a;b=c"), "a%3Bb%3Dc");
        assert_eq!(Encoding::QueryParam.encode_as_is("a&b=c+d"), "a%26b%3Dc%2Bd");
        assert_eq!(Encoding::Query.encode_as_is("a=b&c?"), "a=b&c?");
    }

    #[test]
    fn test_keep_escapes() {
        assert_eq!(Encoding::Path.encode_keep_escapes("a%20b%zz"), "a%20b%25zz");
        assert_eq!(Encoding::Path.encode_as_is("a%20b"), "a%2520b");
    }

    #[test]
    fn test_template_text_keeps_placeholders() {
        assert_eq!(
            Encoding::Path.encode_template("/a b/{id: [0-9]+}"),
            "/a%20b/{id: [0-9]+}"
        );
    }

    #[test]
    fn test_mask_round_trip() {
        let masked = Masked::new("/x/{id:[a-z;/]+};m=1");
        assert!(!masked.text.contains('{'));
        assert_eq!(masked.text.matches(';').count(), 1);
        assert_eq!(masked.restore(&masked.text), "/x/{id:[a-z;/]+};m=1");
    }

    #[test]
    fn test_placeholder_with_quantifier_braces() {
        let caps = PLACEHOLDER.captures("{code: [0-9]{3}}").unwrap();
        assert_eq!(&caps[1], "code");
        assert_eq!(&caps[2], "[0-9]{3}");
    }
}
