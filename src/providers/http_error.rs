use std::error::Error;
use std::fmt;

use http::StatusCode;
use serde_json::{Map, Value};
use tracing::warn;

use super::ExceptionMapper;
use crate::response::Response;

/// An error that already knows its HTTP status.
///
/// Without an explicit message the text is `HTTP <status> <reason>`, e.g.
/// `HTTP 404 Not Found`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    status: u16,
    message: Option<String>,
}

impl HttpError {
    #[must_use]
    pub fn new(status: u16) -> Self {
        Self {
            status,
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
        }
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Explicit message, or the default `HTTP <status> <reason>` text
    #[must_use]
    pub fn message(&self) -> String {
        match &self.message {
            Some(message) => message.clone(),
            None => {
                let reason = StatusCode::from_u16(self.status)
                    .ok()
                    .and_then(|s| s.canonical_reason())
                    .unwrap_or("");
                format!("HTTP {} {}", self.status, reason).trim_end().to_string()
            }
        }
    }
}

impl fmt::Display for HttpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl Error for HttpError {}

/// Maps [`HttpError`] to a `{"status": .., "message": ..}` envelope.
///
/// The message is omitted unless `verbose`; a leading `HTTP <status> ` is
/// stripped from it.
#[derive(Debug, Clone, Copy)]
pub struct HttpErrorMapper {
    verbose: bool,
}

impl HttpErrorMapper {
    #[must_use]
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Default for HttpErrorMapper {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ExceptionMapper for HttpErrorMapper {
    fn to_response(&self, error: &(dyn Error + 'static)) -> Response {
        let Some(http_error) = error.downcast_ref::<HttpError>() else {
            warn!(error = %error, "HttpErrorMapper received a foreign error type");
            return Response::json(500, envelope(500, None));
        };

        let status = http_error.status();
        let message = self.verbose.then(|| {
            let message = http_error.message();
            let prefix = format!("HTTP {status} ");
            match message.strip_prefix(&prefix) {
                Some(rest) => rest.to_string(),
                None => message,
            }
        });
        Response::json(status, envelope(status, message))
    }
}

fn envelope(status: u16, message: Option<String>) -> Value {
    let mut body = Map::new();
    body.insert("status".to_string(), Value::from(status));
    if let Some(message) = message {
        body.insert("message".to_string(), Value::String(message));
    }
    Value::Object(body)
}
