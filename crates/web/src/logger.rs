//! The per-dispatch log line.
//!
//! The registry reports every dispatch attempt exactly once, 404 and 405 included, to a
//! [`DispatchLogger`]. [`TracingLogger`] is the default.

use http::StatusCode;
use std::error::Error;
use std::fmt;
use std::fmt::Write as _;
use tracing::{error, info, warn};

/// One dispatch attempt, as reported to a [`DispatchLogger`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchRecord {
    pub status: StatusCode,
    /// The verb or wire-level method token, as received.
    pub method: String,
    pub path: String,
    /// The error chain that produced an error response, outermost first.
    pub error: Option<String>,
}

impl DispatchRecord {
    pub fn new(status: StatusCode, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self { status, method: method.into(), path: path.into(), error: None }
    }

    pub fn with_error(mut self, error: &(dyn Error + 'static)) -> Self {
        self.error = Some(render_chain(error));
        self
    }
}

impl fmt::Display for DispatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}", self.status.as_u16(), self.method, self.path)
    }
}

/// Renders `error` and its sources as `outer: cause: root`.
pub fn render_chain(error: &(dyn Error + 'static)) -> String {
    let mut rendered = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let _ = write!(rendered, ": {cause}");
        source = cause.source();
    }
    rendered
}

#[cfg_attr(test, mockall::automock)]
pub trait DispatchLogger: Send + Sync {
    fn log(&self, record: &DispatchRecord);
}

impl<F> DispatchLogger for F
where
    F: Fn(&DispatchRecord) + Send + Sync,
{
    fn log(&self, record: &DispatchRecord) {
        (self)(record);
    }
}

/// Logs through `tracing`: `info` below 400, `warn` for client errors and for server errors
/// without a cause, `error` for server errors with a cause.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl DispatchLogger for TracingLogger {
    fn log(&self, record: &DispatchRecord) {
        let status = record.status.as_u16();
        let method = record.method.as_str();
        let path = record.path.as_str();

        match &record.error {
            None if status < 400 => info!(status, method, path, "dispatched"),
            None => warn!(status, method, path, "dispatched"),
            Some(cause) if status < 500 => warn!(status, method, path, cause = %cause, "dispatch failed"),
            Some(cause) => error!(status, method, path, cause = %cause, "dispatch failed"),
        }
    }
}

/// Discards every record.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLogger;

impl DispatchLogger for SilentLogger {
    fn log(&self, _record: &DispatchRecord) {}
}

/// Prints `[status] method path` to stdout below 400 and to stderr otherwise, preceded by the
/// error chain if there is one.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleLogger;

impl DispatchLogger for SimpleLogger {
    fn log(&self, record: &DispatchRecord) {
        let result = if record.status.as_u16() < 400 {
            write_record(&mut std::io::stdout().lock(), record)
        } else {
            write_record(&mut std::io::stderr().lock(), record)
        };
        if let Err(e) = result {
            error!(cause = %e, "failed to print dispatch record");
        }
    }
}

fn write_record(out: &mut dyn std::io::Write, record: &DispatchRecord) -> std::io::Result<()> {
    if let Some(cause) = &record.error {
        writeln!(out, "{cause}")?;
    }
    writeln!(out, "{record}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_http::protocol::{BodyError, ServeError};

    #[test]
    fn record_display() {
        let record = DispatchRecord::new(StatusCode::METHOD_NOT_ALLOWED, "BREW", "/pot");
        assert_eq!(record.to_string(), "[405] BREW /pot");
    }

    #[test]
    fn chain_is_rendered_outermost_first() {
        let err = ServeError::from(BodyError::Consumed);
        let record = DispatchRecord::new(StatusCode::INTERNAL_SERVER_ERROR, "POST", "/").with_error(&err);
        assert_eq!(record.error.as_deref(), Some("500 Internal Server Error: invalid request body: body has been consumed"));
    }

    #[test]
    fn simple_logger_format() {
        let mut out = Vec::new();
        let record = DispatchRecord { error: Some("boom".into()), ..DispatchRecord::new(StatusCode::BAD_GATEWAY, "GET", "/x") };
        write_record(&mut out, &record).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "boom\n[502] GET /x\n");
    }

    #[test]
    fn closures_are_loggers() {
        let seen = std::sync::Mutex::new(Vec::new());
        let logger = |record: &DispatchRecord| seen.lock().unwrap().push(record.status);
        logger.log(&DispatchRecord::new(StatusCode::OK, "GET", "/"));
        TracingLogger.log(&DispatchRecord::new(StatusCode::NOT_FOUND, "GET", "/missing"));
        SilentLogger.log(&DispatchRecord::new(StatusCode::OK, "GET", "/"));
        assert_eq!(*seen.lock().unwrap(), vec![StatusCode::OK]);
    }
}
