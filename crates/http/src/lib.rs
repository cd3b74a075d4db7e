//! Protocol primitives for the switchyard dispatch engine.
//!
//! This crate knows nothing about routing. It provides the values the dispatch engine in
//! `switchyard-web` moves around:
//!
//! - [`protocol::Verb`]: the HTTP verbs a handler can be registered for
//! - [`protocol::Body`]: a response or request body with an optional size, a MIME type and an
//!   empty, in-memory, pull (`Read`) or push (`Write` producer) source
//! - [`protocol::body::PipeReader`]: a bounded 8 KiB pipe running a push producer on a worker
//!   thread while the caller pulls its bytes
//! - [`protocol::ChannelBody`]: an `http_body::Body` bridge for async transports
//! - [`protocol::Request`]: the request handle given to hooks and handlers
//! - [`protocol::ServeError`] and [`protocol::BodyError`]: errors carrying the status they
//!   produce
//!
//! # Example
//!
//! ```
//! use std::io::{Read, Write};
//! use switchyard_http::protocol::Body;
//!
//! let body = Body::producer(None, |sink| {
//!     for i in 0..3 {
//!         writeln!(sink, "line {i}")?;
//!     }
//!     Ok(())
//! })
//! .with_mime(mime::TEXT_PLAIN);
//!
//! let mut reader = body.into_reader().unwrap();
//! let mut text = String::new();
//! reader.read_to_string(&mut text).unwrap();
//! reader.close().unwrap();
//!
//! assert_eq!(text, "line 0\nline 1\nline 2\n");
//! ```

pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
