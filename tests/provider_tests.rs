use std::error::Error;
use std::fmt;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

use brrtdispatch::context::RuntimeContext;
use brrtdispatch::error::CodecError;
use brrtdispatch::interceptor::{EntityInput, EntityOutput};
use brrtdispatch::media_type::MediaType;
use brrtdispatch::providers::{
    Entity, EntityReader, EntityWriter, ExceptionMapper, HttpError, ParamConverter,
    ProviderDescriptor, TypeKey,
};
use brrtdispatch::response::{Flow, HeaderVec, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, PartialEq, Serialize, Deserialize)]
struct Order {
    id: u32,
    item: String,
}

struct JsonOrders;

impl EntityReader for JsonOrders {
    fn read_from(
        &self,
        ty: &TypeKey,
        _media_type: &MediaType,
        _headers: &HeaderVec,
        input: &mut EntityInput,
    ) -> Result<Entity, CodecError> {
        let mut body = Vec::new();
        input.read_to_end(&mut body)?;
        let order: Order = serde_json::from_slice(&body)
            .map_err(|e| CodecError::Message(format!("{}: {e}", ty.name())))?;
        Ok(Arc::new(order))
    }
}

impl EntityWriter for JsonOrders {
    fn write_to(
        &self,
        entity: &Entity,
        ty: &TypeKey,
        _media_type: &MediaType,
        _headers: &mut HeaderVec,
        output: &mut EntityOutput,
    ) -> Result<(), CodecError> {
        let order = entity
            .downcast_ref::<Order>()
            .ok_or(CodecError::Unsupported { type_name: ty.name() })?;
        serde_json::to_writer(&mut *output, order).map_err(|e| CodecError::Message(e.to_string()))
    }
}

/// Writes `id:item`, for clients asking for text
struct PlainOrders;

impl EntityWriter for PlainOrders {
    fn size(&self, entity: &Entity, _ty: &TypeKey, _media_type: &MediaType) -> Option<u64> {
        entity
            .downcast_ref::<Order>()
            .map(|o| format!("{}:{}", o.id, o.item).len() as u64)
    }

    fn write_to(
        &self,
        entity: &Entity,
        ty: &TypeKey,
        _media_type: &MediaType,
        _headers: &mut HeaderVec,
        output: &mut EntityOutput,
    ) -> Result<(), CodecError> {
        let order = entity
            .downcast_ref::<Order>()
            .ok_or(CodecError::Unsupported { type_name: ty.name() })?;
        write!(output, "{}:{}", order.id, order.item)?;
        Ok(())
    }
}

#[derive(Debug)]
struct RuntimeFailure;

#[derive(Debug)]
struct IllegalArgument;

impl fmt::Display for IllegalArgument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("illegal argument")
    }
}

impl Error for IllegalArgument {}

struct StatusMapper(u16);

impl ExceptionMapper for StatusMapper {
    fn to_response(&self, error: &(dyn Error + 'static)) -> Response {
        Response::json(self.0, json!({ "error": error.to_string() }))
    }
}

struct OrderId;

impl ParamConverter for OrderId {
    fn from_param(&self, value: &str) -> Result<Entity, CodecError> {
        value
            .parse::<u32>()
            .map(|id| Arc::new(id) as Entity)
            .map_err(|e| CodecError::Message(e.to_string()))
    }

    fn to_param(&self, value: &Entity) -> Result<String, CodecError> {
        value
            .downcast_ref::<u32>()
            .map(u32::to_string)
            .ok_or(CodecError::Unsupported { type_name: "u32" })
    }
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn json_type() -> MediaType {
    MediaType::new("application", "json")
}

fn orders_context() -> RuntimeContext {
    let order = TypeKey::of::<Order>();
    let runtime = TypeKey::of::<RuntimeFailure>();
    let illegal = TypeKey::child_of::<IllegalArgument>(&runtime);

    let json_reader: Arc<dyn EntityReader> = Arc::new(JsonOrders);
    let json_writer: Arc<dyn EntityWriter> = Arc::new(JsonOrders);
    let plain_writer: Arc<dyn EntityWriter> = Arc::new(PlainOrders);
    let parent_mapper: Arc<dyn ExceptionMapper> = Arc::new(StatusMapper(500));
    let child_mapper: Arc<dyn ExceptionMapper> = Arc::new(StatusMapper(400));
    let converter: Arc<dyn ParamConverter> = Arc::new(OrderId);

    let mut builder = RuntimeContext::builder();
    builder
        .providers()
        .register_reader(
            ProviderDescriptor::singleton(order.clone(), json_reader).with_media_types(vec![json_type()]),
        )
        .register_writer(
            ProviderDescriptor::singleton(order.clone(), json_writer).with_media_types(vec![json_type()]),
        )
        .register_writer(
            ProviderDescriptor::singleton(order, plain_writer)
                .with_media_types(vec![MediaType::new("text", "plain")]),
        )
        .register_exception_mapper(ProviderDescriptor::singleton(runtime, parent_mapper).with_priority(5))
        .register_exception_mapper(ProviderDescriptor::singleton(illegal, child_mapper).with_priority(10))
        .register_param_converter(ProviderDescriptor::singleton(TypeKey::of::<u32>(), converter));
    builder.build()
}

#[test]
fn test_json_body_read_through_context() {
    let ctx = orders_context();
    let mut headers = HeaderVec::new();
    let input = EntityInput::new(&br#"{"id": 7, "item": "kibble"}"#[..]);

    let flow = ctx
        .read_entity(&TypeKey::of::<Order>(), &json_type(), &mut headers, input)
        .unwrap();
    let Flow::Continue(entity) = flow else {
        panic!("reader short-circuited");
    };
    assert_eq!(
        entity.downcast_ref::<Order>(),
        Some(&Order {
            id: 7,
            item: "kibble".to_string()
        })
    );
}

#[test]
fn test_malformed_json_is_codec_error() {
    let ctx = orders_context();
    let mut headers = HeaderVec::new();
    let err = ctx
        .read_entity(
            &TypeKey::of::<Order>(),
            &json_type(),
            &mut headers,
            EntityInput::new(&b"{not json"[..]),
        )
        .unwrap_err();
    assert!(err.to_string().contains("Order"), "{err}");
}

#[test]
fn test_writer_selected_by_media_type() {
    let ctx = orders_context();
    let order: Entity = Arc::new(Order {
        id: 3,
        item: "leash".to_string(),
    });

    let json_buf = SharedBuf::default();
    let mut headers = HeaderVec::new();
    ctx.write_entity(
        Arc::clone(&order),
        &TypeKey::of::<Order>(),
        &json_type(),
        &mut headers,
        EntityOutput::new(json_buf.clone()),
    )
    .unwrap();
    let written: serde_json::Value = serde_json::from_str(&json_buf.contents()).unwrap();
    assert_eq!(written, json!({"id": 3, "item": "leash"}));
    assert!(headers.is_empty());

    let text_buf = SharedBuf::default();
    let mut headers = HeaderVec::new();
    ctx.write_entity(
        order,
        &TypeKey::of::<Order>(),
        &MediaType::new("text", "plain"),
        &mut headers,
        EntityOutput::new(text_buf.clone()),
    )
    .unwrap();
    assert_eq!(text_buf.contents(), "3:leash");
    assert_eq!(brrtdispatch::response::get_header(&headers, "Content-Length"), Some("7"));
}

#[test]
fn test_specific_mapper_beats_lower_priority_parent() {
    let ctx = orders_context();
    let runtime = TypeKey::of::<RuntimeFailure>();
    let illegal = TypeKey::child_of::<IllegalArgument>(&runtime);

    let response = ctx.map_error(&illegal, &IllegalArgument).unwrap();
    assert_eq!(response.status, 400);
    assert_eq!(response.body, json!({"error": "illegal argument"}));

    let response = ctx.map_error(&runtime, &IllegalArgument).unwrap();
    assert_eq!(response.status, 500);
}

#[test]
fn test_fallback_mapper_handles_http_errors() {
    let ctx = orders_context();
    let response = ctx
        .map_error(&TypeKey::of::<HttpError>(), &HttpError::new(404))
        .unwrap();
    assert_eq!(response.status, 404);

    assert!(ctx.map_error(&TypeKey::of::<Order>(), &IllegalArgument).is_none());
}

#[test]
fn test_param_converter_round_trip() {
    let ctx = orders_context();
    let converter = ctx
        .providers()
        .find_param_converter(&TypeKey::of::<u32>())
        .unwrap();

    let value = converter.from_param("42").unwrap();
    assert_eq!(value.downcast_ref::<u32>(), Some(&42));
    assert_eq!(converter.to_param(&value).unwrap(), "42");
    assert!(converter.from_param("forty-two").is_err());
}
