use std::io::Read;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::error::CodecError;
use crate::providers::EntityReader;

#[derive(Default)]
struct CountingReader {
    calls: AtomicUsize,
}

impl EntityReader for CountingReader {
    fn read_from(
        &self,
        _ty: &TypeKey,
        _media_type: &MediaType,
        _headers: &HeaderVec,
        input: &mut EntityInput,
    ) -> Result<Entity, CodecError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut body = String::new();
        input.read_to_string(&mut body)?;
        Ok(Arc::new(body))
    }
}

struct PassThrough;

impl ReaderInterceptor for PassThrough {
    fn around_read_from(
        &self,
        ctx: &mut ReaderInterceptorContext<'_>,
    ) -> Result<Flow<Entity>, ChainError> {
        ctx.proceed()
    }
}

fn body(flow: Flow<Entity>) -> String {
    match flow {
        Flow::Continue(entity) => entity.downcast_ref::<String>().unwrap().clone(),
        Flow::ShortCircuit(response) => panic!("short circuit {}", response.status),
    }
}

#[test]
fn test_terminal_result_is_cached() {
    let reader = Arc::new(CountingReader::default());
    let mut headers = HeaderVec::new();
    let mut input = EntityInput::new(&b"payload"[..]);
    let mut ctx = ReaderInterceptorContext::new(
        TypeKey::of::<String>(),
        MediaType::new("text", "plain"),
        &mut headers,
        &mut input,
        Arc::clone(&reader) as Arc<dyn EntityReader>,
        &[],
    );

    assert_eq!(body(ctx.proceed().unwrap()), "payload");
    assert_eq!(body(ctx.proceed().unwrap()), "payload");
    assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_proceed_after_chain_completes_reuses_result() {
    let reader = Arc::new(CountingReader::default());
    let interceptors: Vec<Arc<dyn ReaderInterceptor>> = vec![Arc::new(PassThrough)];
    let mut headers = HeaderVec::new();
    let mut input = EntityInput::new(&b"once"[..]);
    let mut ctx = ReaderInterceptorContext::new(
        TypeKey::of::<String>(),
        MediaType::new("text", "plain"),
        &mut headers,
        &mut input,
        Arc::clone(&reader) as Arc<dyn EntityReader>,
        &interceptors,
    );

    assert_eq!(body(ctx.proceed().unwrap()), "once");
    assert_eq!(body(ctx.proceed().unwrap()), "once");
    assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_context_accessors_are_mutable() {
    let reader = Arc::new(CountingReader::default());
    let mut headers = HeaderVec::new();
    let mut input = EntityInput::empty();
    let mut ctx = ReaderInterceptorContext::new(
        TypeKey::of::<String>(),
        MediaType::new("text", "plain"),
        &mut headers,
        &mut input,
        reader,
        &[],
    );

    ctx.set_media_type(MediaType::new("application", "json"));
    ctx.headers_mut().push((Arc::from("x-trace"), "1".to_string()));
    assert_eq!(ctx.media_type(), &MediaType::new("application", "json"));
    assert_eq!(ctx.headers().len(), 1);
    assert!(!ctx.input().is_closed());
}
