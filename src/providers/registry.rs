use std::error::Error;
use std::sync::Arc;

use tracing::{debug, info};

use super::descriptor::sort_by_specificity;
use super::{
    EntityReader, EntityWriter, ExceptionMapper, ParamConverter, ProviderDescriptor, TypeKey,
};
use crate::interceptor::{ReaderInterceptor, WriterInterceptor};
use crate::media_type::MediaType;
use crate::response::Response;

/// Body readers, body writers, exception mappers, parameter converters and
/// entity interceptors, each in lookup order.
///
/// Built once through [`ProviderRegistryBuilder`] and read-only afterwards;
/// lookups never re-sort.
pub struct ProviderRegistry {
    readers: Vec<ProviderDescriptor<dyn EntityReader>>,
    writers: Vec<ProviderDescriptor<dyn EntityWriter>>,
    exception_mappers: Vec<ProviderDescriptor<dyn ExceptionMapper>>,
    param_converters: Vec<ProviderDescriptor<dyn ParamConverter>>,
    reader_interceptors: Vec<Arc<dyn ReaderInterceptor>>,
    writer_interceptors: Vec<Arc<dyn WriterInterceptor>>,
}

impl ProviderRegistry {
    #[must_use]
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// First reader bound to `ty` (or a supertype) that handles `media_type`
    /// and does not veto it.
    #[must_use]
    pub fn find_reader(&self, ty: &TypeKey, media_type: &MediaType) -> Option<Arc<dyn EntityReader>> {
        let found = self
            .readers
            .iter()
            .filter(|d| d.bound().is_assignable_from(ty) && d.supports(media_type))
            .map(ProviderDescriptor::instance)
            .find(|reader| reader.is_readable(ty, media_type));
        if found.is_none() {
            debug!(type_name = ty.name(), media_type = %media_type, "No entity reader matched");
        }
        found
    }

    #[must_use]
    pub fn find_writer(&self, ty: &TypeKey, media_type: &MediaType) -> Option<Arc<dyn EntityWriter>> {
        let found = self
            .writers
            .iter()
            .filter(|d| d.bound().is_assignable_from(ty) && d.supports(media_type))
            .map(ProviderDescriptor::instance)
            .find(|writer| writer.is_writeable(ty, media_type));
        if found.is_none() {
            debug!(type_name = ty.name(), media_type = %media_type, "No entity writer matched");
        }
        found
    }

    /// Most specific mapper whose bound type is `ty` or one of its ancestors.
    #[must_use]
    pub fn find_exception_mapper(&self, ty: &TypeKey) -> Option<Arc<dyn ExceptionMapper>> {
        self.exception_mappers
            .iter()
            .find(|d| d.bound().is_assignable_from(ty))
            .map(ProviderDescriptor::instance)
    }

    #[must_use]
    pub fn find_param_converter(&self, ty: &TypeKey) -> Option<Arc<dyn ParamConverter>> {
        self.param_converters
            .iter()
            .find(|d| d.bound().is_assignable_from(ty))
            .map(ProviderDescriptor::instance)
    }

    /// Run the most specific exception mapper for `ty` over `error`.
    #[must_use]
    pub fn map_error(&self, ty: &TypeKey, error: &(dyn Error + 'static)) -> Option<Response> {
        let Some(mapper) = self.find_exception_mapper(ty) else {
            debug!(type_name = ty.name(), error = %error, "No exception mapper matched");
            return None;
        };
        let response = mapper.to_response(error);
        debug!(
            type_name = ty.name(),
            status = response.status,
            "Error mapped to response"
        );
        Some(response)
    }

    /// Reader interceptors in ascending priority
    #[must_use]
    pub fn reader_interceptors(&self) -> &[Arc<dyn ReaderInterceptor>] {
        &self.reader_interceptors
    }

    #[must_use]
    pub fn writer_interceptors(&self) -> &[Arc<dyn WriterInterceptor>] {
        &self.writer_interceptors
    }

    pub fn readers(&self) -> &[ProviderDescriptor<dyn EntityReader>] {
        &self.readers
    }

    pub fn writers(&self) -> &[ProviderDescriptor<dyn EntityWriter>] {
        &self.writers
    }

    pub fn exception_mappers(&self) -> &[ProviderDescriptor<dyn ExceptionMapper>] {
        &self.exception_mappers
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("readers", &self.readers)
            .field("writers", &self.writers)
            .field("exception_mappers", &self.exception_mappers)
            .field("param_converters", &self.param_converters)
            .field("reader_interceptors_count", &self.reader_interceptors.len())
            .field("writer_interceptors_count", &self.writer_interceptors.len())
            .finish()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Collects provider registrations; [`build`](Self::build) sorts them once.
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    readers: Vec<ProviderDescriptor<dyn EntityReader>>,
    writers: Vec<ProviderDescriptor<dyn EntityWriter>>,
    exception_mappers: Vec<ProviderDescriptor<dyn ExceptionMapper>>,
    param_converters: Vec<ProviderDescriptor<dyn ParamConverter>>,
    reader_interceptors: Vec<(i32, Arc<dyn ReaderInterceptor>)>,
    writer_interceptors: Vec<(i32, Arc<dyn WriterInterceptor>)>,
}

impl ProviderRegistryBuilder {
    pub fn register_reader(&mut self, descriptor: ProviderDescriptor<dyn EntityReader>) -> &mut Self {
        self.readers.push(descriptor);
        self
    }

    pub fn register_writer(&mut self, descriptor: ProviderDescriptor<dyn EntityWriter>) -> &mut Self {
        self.writers.push(descriptor);
        self
    }

    pub fn register_exception_mapper(
        &mut self,
        descriptor: ProviderDescriptor<dyn ExceptionMapper>,
    ) -> &mut Self {
        self.exception_mappers.push(descriptor);
        self
    }

    pub fn register_param_converter(
        &mut self,
        descriptor: ProviderDescriptor<dyn ParamConverter>,
    ) -> &mut Self {
        self.param_converters.push(descriptor);
        self
    }

    pub fn register_reader_interceptor(
        &mut self,
        priority: i32,
        interceptor: Arc<dyn ReaderInterceptor>,
    ) -> &mut Self {
        self.reader_interceptors.push((priority, interceptor));
        self
    }

    pub fn register_writer_interceptor(
        &mut self,
        priority: i32,
        interceptor: Arc<dyn WriterInterceptor>,
    ) -> &mut Self {
        self.writer_interceptors.push((priority, interceptor));
        self
    }

    #[must_use]
    pub fn build(self) -> ProviderRegistry {
        let Self {
            mut readers,
            mut writers,
            mut exception_mappers,
            mut param_converters,
            mut reader_interceptors,
            mut writer_interceptors,
        } = self;

        sort_by_specificity(&mut readers);
        sort_by_specificity(&mut writers);
        sort_by_specificity(&mut exception_mappers);
        sort_by_specificity(&mut param_converters);
        reader_interceptors.sort_by_key(|(priority, _)| *priority);
        writer_interceptors.sort_by_key(|(priority, _)| *priority);

        info!(
            readers = readers.len(),
            writers = writers.len(),
            exception_mappers = exception_mappers.len(),
            param_converters = param_converters.len(),
            reader_interceptors = reader_interceptors.len(),
            writer_interceptors = writer_interceptors.len(),
            "Provider registry built"
        );

        ProviderRegistry {
            readers,
            writers,
            exception_mappers,
            param_converters,
            reader_interceptors: reader_interceptors.into_iter().map(|(_, i)| i).collect(),
            writer_interceptors: writer_interceptors.into_iter().map(|(_, i)| i).collect(),
        }
    }
}
