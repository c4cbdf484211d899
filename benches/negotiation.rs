use std::hint::black_box;
use std::sync::Arc;

use brrtdispatch::dispatcher::{DispatchRequest, Dispatcher};
use brrtdispatch::media_type::{compatible, parse_accept, MediaType};
use brrtdispatch::registry::{parse_manifests, ManifestFormat};
use brrtdispatch::runtime_config::RuntimeConfig;
use criterion::{criterion_group, criterion_main, Criterion};
use http::Method;

fn example_manifests() -> &'static str {
    r"
base_path: /zoo
resources:
  - method: GET
    path: /animals
    handler: list_animals
    produces: [application/json, application/xml, text/csv]
  - method: POST
    path: /animals
    handler: create_animal
    consumes: [application/json]
    produces: [application/json]
  - method: GET
    path: /animals/{id:[0-9]+}
    handler: get_animal
    produces: [application/json]
  - method: GET
    path: /animals/{id:[0-9]+}
    handler: get_animal_xml
    produces: [application/xml]
  - method: DELETE
    path: /animals/{id:[0-9]+}
    handler: delete_animal
  - method: GET
    path: /animals/{id}/toys/{toy_id}
    handler: animal_toy
    produces: [application/hal+json]
  - method: GET
    path: /{category}/animals/{id}/habitats/{habitat_id}/sections/{section_id}
    handler: habitat_section
    produces: [application/json]
"
}

fn dispatcher() -> Dispatcher {
    let loaded = parse_manifests(example_manifests(), ManifestFormat::Yaml)
        .expect("failed to parse manifests");
    Dispatcher::new(Arc::new(loaded.into_registry()), RuntimeConfig::default())
}

fn bench_dispatch(c: &mut Criterion) {
    let dispatcher = dispatcher();
    let requests = [
        DispatchRequest::new(Method::GET, "/zoo/animals").with_accept_header("text/html, application/xml;q=0.9, */*;q=0.1"),
        DispatchRequest::new(Method::GET, "/zoo/animals/123").with_accept_header("application/xml"),
        DispatchRequest::new(Method::GET, "/zoo/animals/123/toys/456").with_accept_header("application/*+json"),
        DispatchRequest::new(Method::GET, "/zoo/cats/animals/1/habitats/88/sections/5"),
        DispatchRequest::new(Method::POST, "/zoo/animals")
            .with_content_type(MediaType::new("application", "json")),
        DispatchRequest::new(Method::HEAD, "/zoo/animals/7"),
        DispatchRequest::new(Method::OPTIONS, "/zoo/animals/7"),
    ];
    c.bench_function("dispatch", |b| {
        b.iter(|| {
            for request in &requests {
                black_box(dispatcher.dispatch(black_box(request)));
            }
        })
    });
}

fn bench_media_types(c: &mut Criterion) {
    let pairs = [
        (MediaType::new("*", "*"), MediaType::new("application", "json")),
        (
            MediaType::parse("application/*+json").expect("valid media type"),
            MediaType::new("application", "hal+json"),
        ),
        (
            MediaType::parse("text/html;q=0.5").expect("valid media type"),
            MediaType::new("text", "*"),
        ),
        (MediaType::new("application", "json"), MediaType::new("application", "xml")),
    ];
    c.bench_function("compatible", |b| {
        b.iter(|| {
            for (a, z) in &pairs {
                black_box(compatible(black_box(Some(a)), black_box(Some(z))));
            }
        })
    });

    c.bench_function("parse_accept", |b| {
        b.iter(|| {
            black_box(parse_accept(black_box(
                "text/html, application/xhtml+xml, application/xml;q=0.9, image/webp, */*;q=0.8",
            )))
        })
    });
}

criterion_group!(benches, bench_dispatch, bench_media_types);
criterion_main!(benches);
