//! Entity body streams with deterministic, idempotent close.

use std::fmt;
use std::io::{self, Read, Write};

use tracing::trace;

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, "entity stream is closed")
}

/// The request body as seen by readers and reader interceptors.
///
/// `close()` drops the underlying reader; calling it again does nothing.
/// Dropping the value closes it too. Reads after close fail.
pub struct EntityInput {
    inner: Option<Box<dyn Read + Send>>,
}

impl EntityInput {
    pub fn new(reader: impl Read + Send + 'static) -> Self {
        Self {
            inner: Some(Box::new(reader)),
        }
    }

    /// An already-exhausted body
    #[must_use]
    pub fn empty() -> Self {
        Self::new(io::empty())
    }

    /// Replace the underlying reader with a wrapper around it.
    ///
    /// Does nothing once the stream is closed.
    pub fn wrap<F>(&mut self, f: F)
    where
        F: FnOnce(Box<dyn Read + Send>) -> Box<dyn Read + Send>,
    {
        if let Some(inner) = self.inner.take() {
            self.inner = Some(f(inner));
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    pub fn close(&mut self) {
        if self.inner.take().is_some() {
            trace!("Entity input closed");
        }
    }
}

impl Read for EntityInput {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.read(buf),
            None => Err(closed_error()),
        }
    }
}

impl Drop for EntityInput {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for EntityInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityInput")
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// The response body as seen by writers and writer interceptors.
///
/// `close()` flushes and drops the underlying writer exactly once.
pub struct EntityOutput {
    inner: Option<Box<dyn Write + Send>>,
}

impl EntityOutput {
    pub fn new(writer: impl Write + Send + 'static) -> Self {
        Self {
            inner: Some(Box::new(writer)),
        }
    }

    pub fn wrap<F>(&mut self, f: F)
    where
        F: FnOnce(Box<dyn Write + Send>) -> Box<dyn Write + Send>,
    {
        if let Some(inner) = self.inner.take() {
            self.inner = Some(f(inner));
        }
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.is_none()
    }

    /// Flush and release the writer. A flush failure is logged; the stream is
    /// closed either way.
    pub fn close(&mut self) {
        if let Some(mut inner) = self.inner.take() {
            if let Err(err) = inner.flush() {
                tracing::warn!(error = %err, "Flushing entity output on close failed");
            }
            trace!("Entity output closed");
        }
    }
}

impl Write for EntityOutput {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self.inner.as_mut() {
            Some(inner) => inner.write(buf),
            None => Err(closed_error()),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.inner.as_mut() {
            Some(inner) => inner.flush(),
            None => Err(closed_error()),
        }
    }
}

impl Drop for EntityOutput {
    fn drop(&mut self) {
        self.close();
    }
}

impl fmt::Debug for EntityOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityOutput")
            .field("closed", &self.is_closed())
            .finish()
    }
}
