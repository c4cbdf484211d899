#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;

    /// Write `content` to a temporary file ending in `.{ext}`; removed on drop
    pub fn create_temp_manifest(content: &str, ext: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("brrtdispatch_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    pub fn create_temp_yaml(content: &str) -> tempfile::NamedTempFile {
        create_temp_manifest(content, "yaml")
    }

    pub fn create_temp_json(content: &str) -> tempfile::NamedTempFile {
        create_temp_manifest(content, "json")
    }
}

pub mod fixtures {
    /// A pet store declared the way a discovery pass would hand it over
    pub const PET_STORE_YAML: &str = r"
base_path: /api
config:
  error_verbose: true
  synthesize_options: true
  head_fallback: true
resources:
  - method: GET
    path: /pets
    handler: list_pets
    produces: [application/json, application/xml]
  - method: POST
    path: /pets
    handler: add_pet
    consumes: [application/json]
    produces: [application/json]
  - method: GET
    path: /pets/{id:[0-9]+}
    handler: get_pet
    produces: [application/json]
  - method: GET
    path: /pets/{id:[0-9]+}
    handler: get_pet_xml
    produces: [application/xml]
  - method: DELETE
    path: /pets/{id:[0-9]+}
    handler: delete_pet
  - method: GET
    path: /users/{user_id}/posts/{post_id}
    handler: get_post
    produces: [application/hal+json]
";
}
