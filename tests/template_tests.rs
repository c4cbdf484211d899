mod common;

use std::collections::HashMap;

use brrtdispatch::context::RuntimeContext;
use brrtdispatch::dispatcher::DispatchRequest;
use brrtdispatch::error::TemplateError;
use brrtdispatch::registry::load_manifests;
use brrtdispatch::template::UriTemplate;
use http::Method;

use common::fixtures::PET_STORE_YAML;
use common::temp_files::create_temp_yaml;

/// Build a self link for a matched request from the manifest's own template
fn self_link(base: &str, ctx: &RuntimeContext, path: &str) -> String {
    let outcome = ctx.dispatch(&DispatchRequest::new(Method::GET, path));
    let matched = outcome.selected().unwrap();

    let mut link = UriTemplate::parse(base).unwrap();
    link.path(ctx.dispatcher().base_path())
        .path(matched.manifest.path_template());
    let values: HashMap<&str, &str> = matched
        .path_params
        .iter()
        .map(|(name, value)| (name.as_ref(), value.as_str()))
        .collect();
    link.build_from_map(&values).unwrap()
}

#[test]
fn test_self_link_from_matched_params() {
    let file = create_temp_yaml(PET_STORE_YAML);
    let loaded = load_manifests(file.path()).unwrap();
    let mut builder = RuntimeContext::builder();
    builder
        .config(loaded.config.clone().unwrap())
        .resources(loaded.into_registry());
    let ctx = builder.build();

    assert_eq!(
        self_link("https://pets.example.com", &ctx, "/api/pets/42"),
        "https://pets.example.com/api/pets/42"
    );
    assert_eq!(
        self_link("https://pets.example.com", &ctx, "/api/users/a%20b/posts/1"),
        "https://pets.example.com/api/users/a%20b/posts/1"
    );
}

#[test]
fn test_built_uri_parses_back_to_same_parts() {
    let template = UriTemplate::parse("https://{host}:8443/orders/{id}?expand={field}#top").unwrap();
    let built = template.build(&[&"shop.example.com", &17, &"lines"]).unwrap();
    assert_eq!(built, "https://shop.example.com:8443/orders/17?expand=lines#top");

    let reparsed = UriTemplate::parse(&built).unwrap();
    assert_eq!(reparsed.get_host(), Some("shop.example.com"));
    assert_eq!(reparsed.get_port(), Some(8443));
    assert_eq!(reparsed.get_path(), Some("/orders/17"));
    assert_eq!(reparsed.get_query(), Some("expand=lines"));
    assert_eq!(reparsed.get_fragment(), Some("top"));
    assert!(reparsed.template_names().is_empty());
}

#[test]
fn test_template_text_survives_edits() {
    let mut template = UriTemplate::parse("/catalog/{section}").unwrap();
    let snapshot = template.clone();

    template
        .segment(&["items", "{item}"])
        .query_param("page", &[&2])
        .fragment(Some("reviews"));

    assert_eq!(snapshot.to_template(), "/catalog/{section}");
    assert_eq!(template.template_names(), vec!["section", "item"]);

    let partial = {
        let mut t = template.clone();
        t.resolve_template("section", &"toys").unwrap();
        t
    };
    assert_eq!(partial.template_names(), vec!["item"]);
    assert_eq!(
        partial.build(&[&"kite"]).unwrap(),
        "/catalog/toys/items/kite?page=2#reviews"
    );
}

#[test]
fn test_missing_values_are_reported_by_name() {
    let template = UriTemplate::parse("/users/{user}/posts/{post}").unwrap();
    let values = HashMap::from([("user", "ada")]);
    match template.build_from_map(&values) {
        Err(TemplateError::MissingTemplateParameter { name }) => assert_eq!(name, "post"),
        other => panic!("unexpected {other:?}"),
    }
}
