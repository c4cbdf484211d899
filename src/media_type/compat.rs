//! Media-type merging.

use std::collections::BTreeMap;

use super::core::{MediaType, QUALITY, WILDCARD};

/// Merge two media-type expressions into the most specific type both accept.
///
/// `None` on either side stands for `*/*`. Returns `None` when the two cannot
/// be reconciled:
///
/// - concrete types differ;
/// - subtypes differ and neither is `*`, unless exactly one side carries a
///   `+suffix` equal to the other's plain subtype (`xml+json` ~ `json` gives
///   `json`), or both share a suffix and one stem is `*` (`*+json` ~
///   `hal+json` gives `json`);
/// - both sides declare the same parameter with different values.
///
/// Quality is dropped from the result. The merge is symmetric.
///
/// ```rust
/// use brrtdispatch::media_type::{compatible, MediaType};
///
/// let json: MediaType = "application/json".parse().unwrap();
/// let any_json: MediaType = "application/*+json".parse().unwrap();
/// let merged = compatible(Some(&json), Some(&any_json)).unwrap();
/// assert_eq!(merged.to_string(), "application/json");
/// ```
#[must_use]
pub fn compatible(a: Option<&MediaType>, b: Option<&MediaType>) -> Option<MediaType> {
    let (a, b) = match (a, b) {
        (None, None) => return Some(MediaType::wildcard()),
        (Some(one), None) | (None, Some(one)) => return Some(one.without_quality()),
        (Some(a), Some(b)) => (a, b),
    };

    let type_ = merge_type(a.type_(), b.type_())?;
    let subtype = merge_subtype(a.subtype(), b.subtype())?;
    let params = merge_params(a.raw_params(), b.raw_params())?;
    Some(MediaType::from_parts(
        type_.to_string(),
        subtype.to_string(),
        params,
    ))
}

fn merge_type<'a>(a: &'a str, b: &'a str) -> Option<&'a str> {
    match (a, b) {
        (WILDCARD, other) | (other, WILDCARD) => Some(other),
        (a, b) if a == b => Some(a),
        _ => None,
    }
}

fn merge_subtype<'a>(a: &'a str, b: &'a str) -> Option<&'a str> {
    match (a, b) {
        (WILDCARD, other) | (other, WILDCARD) => return Some(other),
        (a, b) if a == b => return Some(a),
        _ => {}
    }
    match (a.rsplit_once('+'), b.rsplit_once('+')) {
        (Some((_, suffix)), None) if suffix == b => Some(b),
        (None, Some((_, suffix))) if suffix == a => Some(a),
        (Some((stem_a, suffix_a)), Some((stem_b, suffix_b))) if suffix_a == suffix_b => {
            (stem_a == WILDCARD || stem_b == WILDCARD).then_some(suffix_a)
        }
        _ => None,
    }
}

fn merge_params(
    a: &BTreeMap<String, String>,
    b: &BTreeMap<String, String>,
) -> Option<BTreeMap<String, String>> {
    let mut merged = BTreeMap::new();
    for (name, value) in a.iter().chain(b) {
        if name == QUALITY {
            continue;
        }
        match merged.get(name) {
            Some(existing) if existing != value => return None,
            Some(_) => {}
            None => {
                merged.insert(name.clone(), value.clone());
            }
        }
    }
    Some(merged)
}
