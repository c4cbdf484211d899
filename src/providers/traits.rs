use std::any::Any;
use std::error::Error;
use std::sync::Arc;

use super::TypeKey;
use crate::error::CodecError;
use crate::interceptor::{EntityInput, EntityOutput};
use crate::media_type::MediaType;
use crate::response::{HeaderVec, Response};

/// A deserialized request entity or an entity about to be serialized.
pub type Entity = Arc<dyn Any + Send + Sync>;

/// Deserializes request bodies into entities.
///
/// Codecs are external collaborators: the engine only selects one and runs it
/// at the end of the reader interceptor chain.
pub trait EntityReader: Send + Sync {
    /// Veto hook consulted after type and media-type matching
    fn is_readable(&self, _ty: &TypeKey, _media_type: &MediaType) -> bool {
        true
    }

    fn read_from(
        &self,
        ty: &TypeKey,
        media_type: &MediaType,
        headers: &HeaderVec,
        input: &mut EntityInput,
    ) -> Result<Entity, CodecError>;
}

/// Serializes entities into response bodies.
pub trait EntityWriter: Send + Sync {
    fn is_writeable(&self, _ty: &TypeKey, _media_type: &MediaType) -> bool {
        true
    }

    /// Serialized length if known up front; becomes `content-length`
    fn size(&self, _entity: &Entity, _ty: &TypeKey, _media_type: &MediaType) -> Option<u64> {
        None
    }

    fn write_to(
        &self,
        entity: &Entity,
        ty: &TypeKey,
        media_type: &MediaType,
        headers: &mut HeaderVec,
        output: &mut EntityOutput,
    ) -> Result<(), CodecError>;
}

/// Turns an error into a response.
pub trait ExceptionMapper: Send + Sync {
    fn to_response(&self, error: &(dyn Error + 'static)) -> Response;
}

/// Converts between a request parameter's text and a typed value.
pub trait ParamConverter: Send + Sync {
    fn from_param(&self, value: &str) -> Result<Entity, CodecError>;

    fn to_param(&self, value: &Entity) -> Result<String, CodecError>;
}
