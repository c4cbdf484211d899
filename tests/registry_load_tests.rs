mod common;

use brrtdispatch::registry::{load_manifests, load_registry};
use http::Method;

use common::fixtures::PET_STORE_YAML;
use common::temp_files::{create_temp_json, create_temp_manifest, create_temp_yaml};

#[test]
fn test_yaml_file_keeps_declaration_order() {
    let file = create_temp_yaml(PET_STORE_YAML);
    let registry = load_registry(file.path()).unwrap();

    assert_eq!(registry.base_path(), "/api");
    assert_eq!(registry.manifests().len(), 6);
    let gets: Vec<&str> = registry
        .for_method(&Method::GET)
        .iter()
        .map(|m| m.handler_name())
        .collect();
    assert_eq!(gets, vec!["list_pets", "get_pet", "get_pet_xml", "get_post"]);
    assert!(registry.has_method(&Method::DELETE));
    assert!(!registry.has_method(&Method::PUT));

    let priorities: Vec<usize> = registry.manifests().iter().map(|m| m.priority()).collect();
    assert_eq!(priorities, (0..6).collect::<Vec<_>>());
}

#[test]
fn test_json_file_with_partial_config() {
    let file = create_temp_json(
        r#"{
            "base_path": "v2/",
            "config": {"head_fallback": false},
            "resources": [
                {"method": "get", "path": "/health", "handler": "health", "produces": ["text/plain"]}
            ]
        }"#,
    );
    let loaded = load_manifests(file.path()).unwrap();
    let config = loaded.config.clone().unwrap();
    assert!(!config.head_fallback);
    assert!(config.synthesize_options);
    assert!(config.error_verbose);

    let registry = loaded.into_registry();
    assert_eq!(registry.base_path(), "/v2");
    assert_eq!(registry.relative_path("/v2/health"), Some("/health"));
    assert_eq!(registry.relative_path("/v2health"), None);
    assert_eq!(registry.routes_summary(), vec!["GET /v2/health -> health".to_string()]);
}

#[test]
fn test_yml_extension_is_yaml() {
    let file = create_temp_manifest(
        "resources:\n  - method: PUT\n    path: /pets/{id}\n    handler: replace_pet\n",
        "yml",
    );
    let registry = load_registry(file.path()).unwrap();
    assert_eq!(registry.for_method(&Method::PUT)[0].handler_name(), "replace_pet");
    assert_eq!(registry.base_path(), "");
}

#[test]
fn test_missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yaml");
    let err = load_manifests(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("absent.yaml"));
}

#[test]
fn test_invalid_declaration_reports_resource_index() {
    let file = create_temp_yaml(
        "resources:\n  - method: GET\n    path: /ok\n    handler: ok\n  - method: GET\n    path: /bad/{id\n    handler: bad\n",
    );
    let err = load_manifests(file.path()).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("resource #1"), "{message}");
}

#[test]
fn test_malformed_yaml_is_error() {
    let file = create_temp_yaml("resources: [ {method: GET");
    assert!(load_registry(file.path()).is_err());
}
