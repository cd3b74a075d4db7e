//! Mapping of dispatch errors to status codes.
//!
//! A [`ClassifierTable`] holds one rule per concrete error type. Classification looks at the
//! error, then at each of its [`source`](Error::source)s, outermost first; the first layer
//! whose exact type has a rule decides the status. Errors without a matching rule, and rules
//! answering a status outside `400..=599`, produce `500 Internal Server Error`.
//!
//! ```
//! use http::StatusCode;
//! use switchyard_web::classify::{ClassifierTable, ErrorClassifier};
//!
//! #[derive(Debug, thiserror::Error)]
//! #[error("database unavailable")]
//! struct DbDown;
//!
//! let table = ClassifierTable::builder().defaults().handle_status::<DbDown>(StatusCode::BAD_GATEWAY).build();
//!
//! assert_eq!(table.classify(&DbDown), StatusCode::BAD_GATEWAY);
//! assert_eq!(table.classify(&"x".parse::<u8>().unwrap_err()), StatusCode::BAD_REQUEST);
//! ```

use crate::error::{ContextMissError, HandlerPanic, OutputTypeError};
use http::StatusCode;
use once_cell::sync::Lazy;
use std::any::{TypeId, type_name};
use std::error::Error;
use std::fmt;
use std::num::{ParseFloatError, ParseIntError};
use std::str::{ParseBoolError, Utf8Error};
use std::string::FromUtf8Error;
use std::sync::Arc;
use switchyard_http::protocol::{BodyError, ServeError};

pub trait ErrorClassifier: Send + Sync {
    /// A status in `400..=599` for `error`.
    fn classify(&self, error: &(dyn Error + 'static)) -> StatusCode;
}

impl<F> ErrorClassifier for F
where
    F: Fn(&(dyn Error + 'static)) -> StatusCode + Send + Sync,
{
    fn classify(&self, error: &(dyn Error + 'static)) -> StatusCode {
        clamp((self)(error))
    }
}

fn clamp(status: StatusCode) -> StatusCode {
    if status.is_client_error() || status.is_server_error() { status } else { StatusCode::INTERNAL_SERVER_ERROR }
}

type Rule = Box<dyn Fn(&(dyn Error + 'static)) -> Option<StatusCode> + Send + Sync>;

struct Entry {
    type_id: TypeId,
    type_name: &'static str,
    rule: Rule,
}

pub struct ClassifierTable {
    entries: Vec<Entry>,
}

static DEFAULT_TABLE: Lazy<Arc<ClassifierTable>> = Lazy::new(|| Arc::new(ClassifierTable::builder().defaults().build()));

/// The shared table holding the default rules.
pub fn default_classifier() -> Arc<dyn ErrorClassifier> {
    let table: Arc<ClassifierTable> = Arc::clone(&DEFAULT_TABLE);
    table
}

impl ClassifierTable {
    pub fn builder() -> ClassifierBuilder {
        ClassifierBuilder { entries: Vec::new() }
    }

    fn rule_for(&self, error: &(dyn Error + 'static)) -> Option<StatusCode> {
        self.entries.iter().find_map(|entry| (entry.rule)(error))
    }
}

impl ErrorClassifier for ClassifierTable {
    fn classify(&self, error: &(dyn Error + 'static)) -> StatusCode {
        let mut layer = Some(error);
        while let Some(current) = layer {
            if let Some(status) = self.rule_for(current) {
                return clamp(status);
            }
            layer = current.source();
        }
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

impl Default for ClassifierTable {
    fn default() -> Self {
        Self::builder().defaults().build()
    }
}

impl fmt::Debug for ClassifierTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| e.type_name)).finish()
    }
}

pub struct ClassifierBuilder {
    entries: Vec<Entry>,
}

impl ClassifierBuilder {
    /// Classifies errors of exactly type `E` with `f`, replacing an earlier rule for `E`.
    #[must_use]
    pub fn handle<E>(self, f: fn(&E) -> StatusCode) -> Self
    where
        E: Error + 'static,
    {
        self.push::<E>(Box::new(move |error| error.downcast_ref::<E>().map(f)))
    }

    /// Classifies errors of exactly type `E` as `status`.
    #[must_use]
    pub fn handle_status<E>(self, status: StatusCode) -> Self
    where
        E: Error + 'static,
    {
        self.push::<E>(Box::new(move |error| error.is::<E>().then_some(status)))
    }

    fn push<E: 'static>(mut self, rule: Rule) -> Self {
        let entry = Entry { type_id: TypeId::of::<E>(), type_name: type_name::<E>(), rule };
        match self.entries.iter_mut().find(|e| e.type_id == entry.type_id) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
        self
    }

    /// Adds the default rules:
    ///
    /// - [`ServeError`] and [`BodyError`]: their own status
    /// - [`ContextMissError`], [`OutputTypeError`] and [`HandlerPanic`]: 500
    /// - number, bool and utf-8 parse errors, malformed urlencoded data: 400
    #[must_use]
    pub fn defaults(self) -> Self {
        self.handle::<ServeError>(ServeError::status)
            .handle::<BodyError>(BodyError::status)
            .handle_status::<ContextMissError>(StatusCode::INTERNAL_SERVER_ERROR)
            .handle_status::<OutputTypeError>(StatusCode::INTERNAL_SERVER_ERROR)
            .handle_status::<HandlerPanic>(StatusCode::INTERNAL_SERVER_ERROR)
            .handle_status::<ParseIntError>(StatusCode::BAD_REQUEST)
            .handle_status::<ParseFloatError>(StatusCode::BAD_REQUEST)
            .handle_status::<ParseBoolError>(StatusCode::BAD_REQUEST)
            .handle_status::<Utf8Error>(StatusCode::BAD_REQUEST)
            .handle_status::<FromUtf8Error>(StatusCode::BAD_REQUEST)
            .handle_status::<serde_urlencoded::de::Error>(StatusCode::BAD_REQUEST)
    }

    pub fn build(self) -> ClassifierTable {
        ClassifierTable { entries: self.entries }
    }
}

impl fmt::Debug for ClassifierBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries.iter().map(|e| e.type_name)).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_http::protocol::BoxError;
    use thiserror::Error;

    #[derive(Debug, Error)]
    #[error("wrapper")]
    struct Wrapper(#[source] BoxError);

    #[derive(Debug, Error)]
    #[error("teapot")]
    struct Teapot;

    #[derive(Debug, Error)]
    #[error("weird")]
    struct Weird;

    #[test]
    fn serve_error_keeps_its_status() {
        let table = ClassifierTable::default();
        assert_eq!(table.classify(&ServeError::new(StatusCode::CONFLICT, "taken")), StatusCode::CONFLICT);
    }

    #[test]
    fn unknown_is_500() {
        let table = ClassifierTable::default();
        assert_eq!(table.classify(&Teapot), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn boxed_errors_are_seen_through() {
        let table = ClassifierTable::default();
        let boxed: BoxError = Box::new(ServeError::bad_request("bad"));
        assert_eq!(table.classify(boxed.as_ref()), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn source_chain_outermost_first() {
        let table = ClassifierTable::builder().defaults().handle_status::<Teapot>(StatusCode::IM_A_TEAPOT).build();

        let wrapped = Wrapper(Box::new(Teapot));
        assert_eq!(table.classify(&wrapped), StatusCode::IM_A_TEAPOT);

        let table = table_with_wrapper(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(table.classify(&Wrapper(Box::new(Teapot))), StatusCode::SERVICE_UNAVAILABLE);
    }

    fn table_with_wrapper(status: StatusCode) -> ClassifierTable {
        ClassifierTable::builder().handle_status::<Teapot>(StatusCode::IM_A_TEAPOT).handle_status::<Wrapper>(status).build()
    }

    #[test]
    fn later_rule_replaces_earlier() {
        let table = ClassifierTable::builder()
            .handle_status::<Teapot>(StatusCode::BAD_REQUEST)
            .handle_status::<Teapot>(StatusCode::IM_A_TEAPOT)
            .build();
        assert_eq!(table.classify(&Teapot), StatusCode::IM_A_TEAPOT);
        assert_eq!(format!("{table:?}").matches("Teapot").count(), 1);
    }

    #[test]
    fn out_of_range_falls_back_to_500() {
        let table = ClassifierTable::builder().handle_status::<Weird>(StatusCode::OK).build();
        assert_eq!(table.classify(&Weird), StatusCode::INTERNAL_SERVER_ERROR);

        let closure = |_: &(dyn Error + 'static)| StatusCode::PERMANENT_REDIRECT;
        assert_eq!(closure.classify(&Weird), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn default_rules() {
        let classifier = default_classifier();
        assert_eq!(classifier.classify(&"x".parse::<i32>().unwrap_err()), StatusCode::BAD_REQUEST);
        assert_eq!(classifier.classify(&"x".parse::<f64>().unwrap_err()), StatusCode::BAD_REQUEST);
        assert_eq!(classifier.classify(&"x".parse::<bool>().unwrap_err()), StatusCode::BAD_REQUEST);
        assert_eq!(classifier.classify(&BodyError::Consumed), StatusCode::INTERNAL_SERVER_ERROR);

        let miss = ContextMissError::of::<u8>(None);
        assert_eq!(classifier.classify(&miss), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
