use super::{compatible, parse_accept, MediaType};
use crate::error::MediaTypeError;

fn mt(s: &str) -> MediaType {
    MediaType::parse(s).unwrap()
}

fn merge(a: &str, b: &str) -> Option<MediaType> {
    compatible(Some(&mt(a)), Some(&mt(b)))
}

#[test]
fn test_parse_lowercases_and_unquotes() {
    let m = mt("Application/JSON; Charset=\"UTF-8\"; profile=\"a;b\"");
    assert_eq!(m.type_(), "application");
    assert_eq!(m.subtype(), "json");
    assert_eq!(m.param("charset"), Some("utf-8"));
    assert_eq!(m.param("PROFILE"), Some("a;b"));
}

#[test]
fn test_parse_bare_star_and_malformed() {
    assert_eq!(mt("*"), MediaType::wildcard());
    assert!(matches!(
        MediaType::parse("*/json"),
        Err(MediaTypeError::Malformed { .. })
    ));
    assert!(MediaType::parse("json").is_err());
    assert!(MediaType::parse("application/").is_err());
    assert!(MediaType::parse("a b/c").is_err());
}

#[test]
fn test_parse_skips_params_without_value() {
    let m = mt("text/plain; flowed; format=fixed");
    assert_eq!(m.params().count(), 1);
    assert_eq!(m.param("format"), Some("fixed"));
}

#[test]
fn test_quality_is_not_identity() {
    let a = mt("text/html;q=0.3");
    let b = mt("text/html");
    assert_eq!(a, b);
    assert!((a.quality() - 0.3).abs() < f32::EPSILON);
    assert!((b.quality() - 1.0).abs() < f32::EPSILON);
    assert!((mt("text/html;q=abc").quality() - 1.0).abs() < f32::EPSILON);
    assert!((mt("text/html;q=7").quality() - 1.0).abs() < f32::EPSILON);
    assert!(mt("text/html;q=-0.5").quality().abs() < f32::EPSILON);
    assert!((mt("text/html;q=NaN").quality() - 1.0).abs() < f32::EPSILON);
}

#[test]
fn test_display_quotes_non_tokens() {
    let m = MediaType::new("text", "plain").with_param("title", "a b");
    assert_eq!(m.to_string(), "text/plain;title=\"a b\"");
    assert_eq!(mt("application/json;charset=utf-8").to_string(), "application/json;charset=utf-8");
}

#[test]
fn test_suffix_helpers() {
    let m = mt("application/vnd.api+json");
    assert_eq!(m.suffix(), Some("json"));
    assert_eq!(m.subtype_stem(), "vnd.api");
    assert_eq!(mt("application/json").suffix(), None);
}

#[test]
fn test_distinct_subtypes_incompatible() {
    assert_eq!(merge("application/json", "application/xml"), None);
    assert_eq!(merge("text/plain", "application/plain"), None);
}

#[test]
fn test_suffix_against_plain_subtype() {
    assert_eq!(merge("application/json", "application/*+json"), Some(mt("application/json")));
    assert_eq!(merge("application/json", "application/xml+json"), Some(mt("application/json")));
    assert_eq!(merge("application/xml+json", "application/json"), Some(mt("application/json")));
}

#[test]
fn test_differing_stems_under_same_suffix() {
    assert_eq!(merge("application/bar+json", "application/foo+json"), None);
    assert_eq!(
        merge("application/*+json", "application/bar+json"),
        Some(mt("application/json"))
    );
    assert_eq!(
        merge(
            "application/bar+json;charset=utf-8;y=foo",
            "application/*+json;charset=utf-8;x=3;q=.8"
        ),
        Some(mt("application/json;charset=utf-8;x=3;y=foo"))
    );
    assert_eq!(merge("application/*+json", "application/bar+xml"), None);
}

#[test]
fn test_wildcards_take_the_concrete_side() {
    assert_eq!(merge("*/*", "text/html"), Some(mt("text/html")));
    assert_eq!(merge("text/*", "text/html"), Some(mt("text/html")));
    assert_eq!(merge("text/*", "*/*"), Some(mt("text/*")));
    assert_eq!(merge("text/*", "image/*"), None);
}

#[test]
fn test_absent_sides() {
    assert_eq!(compatible(None, None), Some(MediaType::wildcard()));
    let json = mt("application/json;q=0.5");
    let merged = compatible(Some(&json), None).unwrap();
    assert_eq!(merged.raw_params().get("q"), None);
    assert_eq!(merged, mt("application/json"));
}

#[test]
fn test_parameters_union_and_conflict() {
    let merged = merge("text/plain;charset=UTF-8;q=0.2", "text/*;format=flowed").unwrap();
    assert_eq!(merged.param("charset"), Some("utf-8"));
    assert_eq!(merged.param("format"), Some("flowed"));
    assert_eq!(merged.param("q"), None);

    assert_eq!(merge("text/plain;charset=utf-8", "text/plain;charset=iso-8859-1"), None);
    assert!(merge("text/plain;charset=utf-8", "text/plain;charset=UTF-8").is_some());
}

#[test]
fn test_merge_is_symmetric_and_idempotent() {
    let samples = [
        "*/*",
        "text/*",
        "text/html",
        "text/html;level=1",
        "application/json",
        "application/*+json",
        "application/hal+json",
        "application/xml+json;q=0.4",
        "application/json;charset=utf-8",
    ];
    for a in samples {
        let a_mt = mt(a);
        assert_eq!(compatible(Some(&a_mt), Some(&a_mt)), Some(a_mt.without_quality()));
        for b in samples {
            assert_eq!(merge(a, b), merge(b, a), "{a} vs {b}");
        }
    }
}

#[test]
fn test_parse_accept_drops_negative_quality() {
    let ranges = parse_accept("text/html;q=-0.5, application/json");
    assert_eq!(ranges, vec![mt("application/json")]);
}

#[test]
fn test_parse_accept_orders_by_quality() {
    let ranges = parse_accept("text/html;q=0.5, application/json, text/plain;q=0.5, image/png;q=0");
    let rendered: Vec<String> = ranges.iter().map(|m| m.without_quality().to_string()).collect();
    assert_eq!(rendered, vec!["application/json", "text/html", "text/plain"]);
}

#[test]
fn test_parse_accept_skips_garbage() {
    let ranges = parse_accept("nonsense, , */*;q=0.1, text/x;title=\"a,b\"");
    assert_eq!(ranges.len(), 2);
    assert_eq!(ranges[0].param("title"), Some("a,b"));
    assert!(ranges[1].is_wildcard_type());
    assert!(parse_accept("").is_empty());
}
