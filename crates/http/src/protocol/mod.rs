//! Protocol primitives shared by every layer of the dispatch engine.
//!
//! - [`Verb`]: the methods a handler can be registered for
//! - [`body`]: the [`Body`] abstraction, the streaming pipe and the async bridge
//! - [`Request`]: the request handle given to hooks and handlers
//! - [`response`]: helpers producing responses with consistent entity headers
//! - [`ServeError`] and [`BodyError`]: errors carrying the status they produce

mod verb;
pub use verb::UnknownVerb;
pub use verb::Verb;

mod request;
pub use request::PathParams;
pub use request::Request;
pub use request::RequestBuilder;

pub mod response;

mod error;
pub use error::BodyError;
pub use error::BoxError;
pub use error::ServeError;

pub mod body;
pub use body::Body;
pub use body::BodyReader;
pub use body::ChannelBody;

pub mod mime_defaults;
