use std::sync::Arc;

use tracing::{debug, trace};

use super::{EntityInput, EntityOutput};
use crate::error::ChainError;
use crate::media_type::MediaType;
use crate::providers::{Entity, EntityReader, EntityWriter, TypeKey};
use crate::response::{set_header, Flow, HeaderVec};

/// Wraps entity deserialization.
///
/// Call [`ReaderInterceptorContext::proceed`] at most once to run the rest of
/// the chain, or return without calling it to supply the result directly.
pub trait ReaderInterceptor: Send + Sync {
    fn around_read_from(
        &self,
        ctx: &mut ReaderInterceptorContext<'_>,
    ) -> Result<Flow<Entity>, ChainError>;
}

/// Wraps entity serialization.
pub trait WriterInterceptor: Send + Sync {
    fn around_write_to(
        &self,
        ctx: &mut WriterInterceptorContext<'_>,
    ) -> Result<Flow<()>, ChainError>;
}

enum Step {
    Interceptor(usize),
    Terminal,
}

/// Position in an interceptor list.
///
/// `next` only moves forward. `executing` is the stack of interceptors whose
/// `around_*` call is on the call stack; the top one is the caller of any
/// `proceed()`.
struct Cursor {
    next: usize,
    executing: Vec<usize>,
    proceeded: Vec<bool>,
}

impl Cursor {
    fn new(len: usize) -> Self {
        Self {
            next: 0,
            executing: Vec::with_capacity(len),
            proceeded: vec![false; len],
        }
    }

    fn step(&mut self) -> Result<Step, ChainError> {
        if let Some(&current) = self.executing.last() {
            if std::mem::replace(&mut self.proceeded[current], true) {
                return Err(ChainError::ProceedCalledTwice { index: current });
            }
        }
        if self.next < self.proceeded.len() {
            let index = self.next;
            self.next += 1;
            self.executing.push(index);
            Ok(Step::Interceptor(index))
        } else {
            Ok(Step::Terminal)
        }
    }

    fn leave(&mut self) {
        self.executing.pop();
    }
}

/// Per-request state of a reader chain.
pub struct ReaderInterceptorContext<'a> {
    ty: TypeKey,
    media_type: MediaType,
    headers: &'a mut HeaderVec,
    input: &'a mut EntityInput,
    reader: Arc<dyn EntityReader>,
    interceptors: &'a [Arc<dyn ReaderInterceptor>],
    cursor: Cursor,
    last_proceeded: Option<Flow<Entity>>,
}

impl<'a> ReaderInterceptorContext<'a> {
    pub(crate) fn new(
        ty: TypeKey,
        media_type: MediaType,
        headers: &'a mut HeaderVec,
        input: &'a mut EntityInput,
        reader: Arc<dyn EntityReader>,
        interceptors: &'a [Arc<dyn ReaderInterceptor>],
    ) -> Self {
        Self {
            ty,
            media_type,
            headers,
            input,
            reader,
            interceptors,
            cursor: Cursor::new(interceptors.len()),
            last_proceeded: None,
        }
    }

    /// Run the next interceptor, or the reader once every interceptor has
    /// proceeded.
    ///
    /// # Errors
    ///
    /// `ProceedCalledTwice` when the calling interceptor already proceeded;
    /// otherwise whatever the downstream stage returned.
    pub fn proceed(&mut self) -> Result<Flow<Entity>, ChainError> {
        match self.cursor.step()? {
            Step::Interceptor(index) => {
                let interceptors = self.interceptors;
                trace!(index, "Entering reader interceptor");
                let result = interceptors[index].around_read_from(self);
                self.cursor.leave();
                result
            }
            Step::Terminal => {
                if let Some(last) = &self.last_proceeded {
                    return Ok(last.clone());
                }
                let entity =
                    self.reader
                        .read_from(&self.ty, &self.media_type, self.headers, self.input)?;
                debug!(type_name = self.ty.name(), media_type = %self.media_type, "Entity read");
                let flow = Flow::Continue(entity);
                self.last_proceeded = Some(flow.clone());
                Ok(flow)
            }
        }
    }

    #[must_use]
    pub fn entity_type(&self) -> &TypeKey {
        &self.ty
    }

    pub fn set_entity_type(&mut self, ty: TypeKey) {
        self.ty = ty;
    }

    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.media_type = media_type;
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &*self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderVec {
        &mut *self.headers
    }

    pub fn input(&mut self) -> &mut EntityInput {
        &mut *self.input
    }
}

/// Per-request state of a writer chain.
pub struct WriterInterceptorContext<'a> {
    entity: Entity,
    ty: TypeKey,
    media_type: MediaType,
    headers: &'a mut HeaderVec,
    output: &'a mut EntityOutput,
    writer: Arc<dyn EntityWriter>,
    interceptors: &'a [Arc<dyn WriterInterceptor>],
    cursor: Cursor,
    last_proceeded: Option<Flow<()>>,
}

impl<'a> WriterInterceptorContext<'a> {
    pub(crate) fn new(
        entity: Entity,
        ty: TypeKey,
        media_type: MediaType,
        headers: &'a mut HeaderVec,
        output: &'a mut EntityOutput,
        writer: Arc<dyn EntityWriter>,
        interceptors: &'a [Arc<dyn WriterInterceptor>],
    ) -> Self {
        Self {
            entity,
            ty,
            media_type,
            headers,
            output,
            writer,
            interceptors,
            cursor: Cursor::new(interceptors.len()),
            last_proceeded: None,
        }
    }

    /// Run the next interceptor, or the writer once every interceptor has
    /// proceeded.
    ///
    /// # Errors
    ///
    /// `ProceedCalledTwice` when the calling interceptor already proceeded.
    pub fn proceed(&mut self) -> Result<Flow<()>, ChainError> {
        match self.cursor.step()? {
            Step::Interceptor(index) => {
                let interceptors = self.interceptors;
                trace!(index, "Entering writer interceptor");
                let result = interceptors[index].around_write_to(self);
                self.cursor.leave();
                result
            }
            Step::Terminal => {
                if let Some(last) = &self.last_proceeded {
                    return Ok(last.clone());
                }
                if let Some(size) = self.writer.size(&self.entity, &self.ty, &self.media_type) {
                    set_header(self.headers, "content-length", size.to_string());
                }
                self.writer.write_to(
                    &self.entity,
                    &self.ty,
                    &self.media_type,
                    self.headers,
                    self.output,
                )?;
                debug!(type_name = self.ty.name(), media_type = %self.media_type, "Entity written");
                self.last_proceeded = Some(Flow::Continue(()));
                Ok(Flow::Continue(()))
            }
        }
    }

    #[must_use]
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Replace the entity handed to the writer
    pub fn set_entity(&mut self, entity: Entity) {
        self.entity = entity;
    }

    #[must_use]
    pub fn entity_type(&self) -> &TypeKey {
        &self.ty
    }

    pub fn set_entity_type(&mut self, ty: TypeKey) {
        self.ty = ty;
    }

    #[must_use]
    pub fn media_type(&self) -> &MediaType {
        &self.media_type
    }

    pub fn set_media_type(&mut self, media_type: MediaType) {
        self.media_type = media_type;
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderVec {
        &*self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderVec {
        &mut *self.headers
    }

    pub fn output(&mut self) -> &mut EntityOutput {
        &mut *self.output
    }
}
