//! Shared services used to construct endpoint sets.
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_web::inject::Injector;
//! use switchyard_web::Provider;
//!
//! trait Clock: Send + Sync {
//!     fn now(&self) -> u64;
//! }
//!
//! struct Fixed;
//! impl Clock for Fixed {
//!     fn now(&self) -> u64 {
//!         42
//!     }
//! }
//!
//! let injector = Injector::new()
//!     .with(String::from("prod"))
//!     .provide(Provider::new(Arc::new(Fixed)).view(|c| Arc::clone(c) as Arc<dyn Clock>));
//!
//! let clock: Arc<dyn Clock> = injector.get().unwrap();
//! assert_eq!(clock.now(), 42);
//! assert_eq!(injector.get::<String>().unwrap(), "prod");
//! assert!(injector.get::<u8>().is_err());
//! ```

use crate::context::{Provider, TypeMap};
use std::any::type_name;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("nothing injectable provides {type_name}")]
pub struct InjectError {
    type_name: &'static str,
}

impl InjectError {
    pub fn missing<T: ?Sized>() -> Self {
        Self { type_name: type_name::<T>() }
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

/// A type-keyed table of services, with the lookup rules of the dispatch context.
#[derive(Debug, Default)]
pub struct Injector {
    values: TypeMap,
}

impl Injector {
    pub fn new() -> Self {
        Self { values: TypeMap::new() }
    }

    #[must_use]
    pub fn with<T: Send + Sync + 'static>(mut self, value: T) -> Self {
        self.values.insert(value);
        self
    }

    #[must_use]
    pub fn provide<T: Send + Sync + 'static>(mut self, provider: Provider<T>) -> Self {
        self.values.provide(provider);
        self
    }

    pub fn get<T: Clone + 'static>(&self) -> Result<T, InjectError> {
        self.values.get().ok_or_else(InjectError::missing::<T>)
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains::<T>()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
