//! Request routing and dispatch.
//!
//! Endpoint sets declare their handlers through [`Endpoints::routes`]; a [`Registry`] resolves
//! each incoming verb and path to the most specific handler, runs it between the set's hooks
//! and turns its result, or its failure, into a response.
//!
//! ```
//! use http::StatusCode;
//! use switchyard_http::protocol::{PathParams, Request, Verb};
//! use switchyard_web::{Endpoints, Registry, Routes};
//!
//! struct Hello;
//!
//! impl Endpoints for Hello {
//!     fn routes(routes: &mut Routes<Self>) {
//!         routes.get("/hello/*", Hello::greet);
//!     }
//! }
//!
//! impl Hello {
//!     fn greet(&self, params: PathParams) -> String {
//!         format!("hello {}", params.get(0).unwrap_or_default())
//!     }
//! }
//!
//! let registry = Registry::new();
//! registry.register(Hello).unwrap();
//!
//! let response = registry.dispatch(Verb::Get, "/hello/world", |params| Request::builder("/hello/world").params(params).build());
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.into_body().into_text().unwrap(), "hello world");
//! ```

mod fn_trait;
mod handler;
mod registry;
mod responder;
mod service;

pub mod classify;
pub mod config;
pub mod context;
pub mod endpoint;
pub mod error;
pub mod extract;
pub mod inject;
pub mod logger;
pub mod path;

pub use classify::ErrorClassifier;
pub use config::{DispatchConfig, RegistryBuilder};
pub use context::{DispatchContext, Provider, TypeMap};
pub use endpoint::{EndpointMeta, Endpoints, RouteBuilder, Routes};
pub use extract::FromContext;
pub use fn_trait::EndpointFn;
pub use handler::{FnHandler, RequestHandler};
pub use logger::{DispatchLogger, DispatchRecord, TracingLogger};
pub use path::PathTrie;
pub use registry::Registry;
pub use responder::Responder;
