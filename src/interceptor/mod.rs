//! # Interceptor Module
//!
//! Resumable reader and writer chains around entity (de)serialization.
//!
//! A chain is an ordered list of interceptors followed by one terminal codec
//! call. Each interceptor receives the context and may:
//!
//! - call `proceed()` once to run the rest of the chain and inspect or replace
//!   its result;
//! - return its own entity (reader) or skip writing (writer) without
//!   proceeding, so the codec never runs;
//! - return `Flow::ShortCircuit(response)` to abort request processing with a
//!   response.
//!
//! Calling `proceed()` twice from the same interceptor fails with
//! [`ChainError::ProceedCalledTwice`](crate::error::ChainError). The terminal
//! codec runs at most once per chain; later calls that reach it get the cached
//! result.
//!
//! [`read_entity`] and [`write_entity`] take ownership of the body stream and
//! close it on every exit path.

mod chain;
mod stream;
#[cfg(test)]
mod tests;

use tracing::warn;

pub use chain::{
    ReaderInterceptor, ReaderInterceptorContext, WriterInterceptor, WriterInterceptorContext,
};
pub use stream::{EntityInput, EntityOutput};

use crate::error::{ChainError, ProviderError, ProviderKind};
use crate::media_type::MediaType;
use crate::providers::{Entity, ProviderRegistry, TypeKey};
use crate::response::{Flow, HeaderVec};

/// Read a request entity of type `ty` through the registered reader
/// interceptors and the first matching reader.
///
/// # Errors
///
/// `Provider(NoProviderFound)` when no reader accepts `ty` and `media_type`;
/// otherwise any interceptor or codec error.
pub fn read_entity(
    providers: &ProviderRegistry,
    ty: &TypeKey,
    media_type: &MediaType,
    headers: &mut HeaderVec,
    mut input: EntityInput,
) -> Result<Flow<Entity>, ChainError> {
    let result = run_reader(providers, ty, media_type, headers, &mut input);
    input.close();
    if let Err(err) = &result {
        warn!(type_name = ty.name(), media_type = %media_type, error = %err, "Reading entity failed");
    }
    result
}

fn run_reader(
    providers: &ProviderRegistry,
    ty: &TypeKey,
    media_type: &MediaType,
    headers: &mut HeaderVec,
    input: &mut EntityInput,
) -> Result<Flow<Entity>, ChainError> {
    let reader = providers
        .find_reader(ty, media_type)
        .ok_or_else(|| ProviderError::NoProviderFound {
            kind: ProviderKind::Reader,
            type_name: ty.name(),
            media_type: media_type.to_string(),
        })?;
    let mut ctx = ReaderInterceptorContext::new(
        ty.clone(),
        media_type.clone(),
        headers,
        input,
        reader,
        providers.reader_interceptors(),
    );
    ctx.proceed()
}

/// Write `entity` through the registered writer interceptors and the first
/// matching writer.
///
/// # Errors
///
/// `Provider(NoProviderFound)` when no writer accepts `ty` and `media_type`;
/// otherwise any interceptor or codec error.
pub fn write_entity(
    providers: &ProviderRegistry,
    entity: Entity,
    ty: &TypeKey,
    media_type: &MediaType,
    headers: &mut HeaderVec,
    mut output: EntityOutput,
) -> Result<Flow<()>, ChainError> {
    let result = run_writer(providers, entity, ty, media_type, headers, &mut output);
    output.close();
    if let Err(err) = &result {
        warn!(type_name = ty.name(), media_type = %media_type, error = %err, "Writing entity failed");
    }
    result
}

fn run_writer(
    providers: &ProviderRegistry,
    entity: Entity,
    ty: &TypeKey,
    media_type: &MediaType,
    headers: &mut HeaderVec,
    output: &mut EntityOutput,
) -> Result<Flow<()>, ChainError> {
    let writer = providers
        .find_writer(ty, media_type)
        .ok_or_else(|| ProviderError::NoProviderFound {
            kind: ProviderKind::Writer,
            type_name: ty.name(),
            media_type: media_type.to_string(),
        })?;
    let mut ctx = WriterInterceptorContext::new(
        entity,
        ty.clone(),
        media_type.clone(),
        headers,
        output,
        writer,
        providers.writer_interceptors(),
    );
    ctx.proceed()
}
