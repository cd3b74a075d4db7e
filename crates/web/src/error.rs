use crate::endpoint::EndpointMeta;
use crate::inject::InjectError;
use mime::Mime;
use std::any::{Any, type_name};
use thiserror::Error;

/// A handler argument has no matching value in the dispatch context.
///
/// This is a programming error of the endpoint set, never caused by the client.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no value of type {type_name} in the dispatch context of {endpoint}")]
pub struct ContextMissError {
    type_name: &'static str,
    endpoint: String,
}

impl ContextMissError {
    pub fn of<T: ?Sized>(meta: Option<&EndpointMeta>) -> Self {
        let endpoint = meta.map_or_else(|| "<unknown endpoint>".to_string(), ToString::to_string);
        Self { type_name: type_name::<T>(), endpoint }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// A successful response whose body does not have the declared output mime.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{endpoint} produces {declared} but responded with {actual}")]
pub struct OutputTypeError {
    endpoint: String,
    declared: Mime,
    actual: Mime,
}

impl OutputTypeError {
    pub fn new(meta: &EndpointMeta, declared: Mime, actual: Mime) -> Self {
        Self { endpoint: meta.to_string(), declared, actual }
    }

    pub fn declared(&self) -> &Mime {
        &self.declared
    }

    pub fn actual(&self) -> &Mime {
        &self.actual
    }
}

/// A hook or handler panicked while serving a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("handler panicked: {message}")]
pub struct HandlerPanic {
    message: String,
}

impl HandlerPanic {
    pub fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "<non-string panic payload>".to_string()
        };
        Self { message }
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("registry is sealed, endpoints can no longer be registered")]
    Sealed,

    #[error("failed to construct endpoints: {source}")]
    Inject {
        #[from]
        source: InjectError,
    },
}
