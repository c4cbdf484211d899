//! Parameter sources used while rendering a template.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Display;
use std::hash::Hash;

use crate::error::TemplateError;

/// Supplies a value for each placeholder, in render order.
pub(crate) trait Binder {
    type Error;

    /// `Ok(None)` leaves the placeholder in the output as literal `{name}` text.
    fn bind(&mut self, name: &str) -> Result<Option<String>, Self::Error>;

    /// Values already carry `%XX` escapes that must survive encoding.
    fn encoded(&self) -> bool {
        false
    }
}

/// Binds nothing; rendering with it never fails.
pub(crate) struct Unbound;

impl Binder for Unbound {
    type Error = Infallible;

    fn bind(&mut self, _name: &str) -> Result<Option<String>, Infallible> {
        Ok(None)
    }
}

/// Ordered values consumed once per distinct name.
///
/// A name seen again replays the value it was first bound to; values are only
/// consumed when a placeholder asks for one, so running out is reported at the
/// placeholder that needed it.
pub(crate) struct Positional<'a> {
    values: &'a [&'a dyn Display],
    next: usize,
    bound: Vec<(String, String)>,
    encoded: bool,
}

impl<'a> Positional<'a> {
    pub fn new(values: &'a [&'a dyn Display], encoded: bool) -> Self {
        Self {
            values,
            next: 0,
            bound: Vec::with_capacity(values.len()),
            encoded,
        }
    }
}

impl Binder for Positional<'_> {
    type Error = TemplateError;

    fn bind(&mut self, name: &str) -> Result<Option<String>, TemplateError> {
        if let Some((_, value)) = self.bound.iter().find(|(n, _)| n == name) {
            return Ok(Some(value.clone()));
        }
        match self.values.get(self.next) {
            Some(value) => {
                let value = value.to_string();
                self.next += 1;
                self.bound.push((name.to_string(), value.clone()));
                Ok(Some(value))
            }
            None => Err(TemplateError::TooFewValues {
                name: name.to_string(),
                needed: self.next + 1,
                supplied: self.values.len(),
            }),
        }
    }

    fn encoded(&self) -> bool {
        self.encoded
    }
}

/// Values looked up by name.
///
/// A strict binder fails on a missing name; a lenient one (used when resolving
/// a subset of templates) leaves the placeholder in place.
pub(crate) struct Named<'a, K, V> {
    map: &'a HashMap<K, V>,
    strict: bool,
    encoded: bool,
}

impl<'a, K, V> Named<'a, K, V> {
    pub fn strict(map: &'a HashMap<K, V>, encoded: bool) -> Self {
        Self {
            map,
            strict: true,
            encoded,
        }
    }

    pub fn lenient(map: &'a HashMap<K, V>, encoded: bool) -> Self {
        Self {
            map,
            strict: false,
            encoded,
        }
    }
}

impl<K, V> Binder for Named<'_, K, V>
where
    K: Borrow<str> + Eq + Hash,
    V: Display,
{
    type Error = TemplateError;

    fn bind(&mut self, name: &str) -> Result<Option<String>, TemplateError> {
        match self.map.get(name) {
            Some(value) => Ok(Some(value.to_string())),
            None if self.strict => Err(TemplateError::MissingTemplateParameter {
                name: name.to_string(),
            }),
            None => Ok(None),
        }
    }

    fn encoded(&self) -> bool {
        self.encoded
    }
}
