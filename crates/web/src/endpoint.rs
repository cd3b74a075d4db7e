//! Declaration of endpoint sets.
//!
//! An endpoint set is a type implementing [`Endpoints`]. Its [`Endpoints::routes`] binds
//! handler functions, written as methods `fn(&self, A1, .., An) -> R`, to a verb and a route
//! pattern. The same instance receives the [`before_each`](Endpoints::before_each) and
//! [`after_each`](Endpoints::after_each) hooks around every dispatch to one of its handlers.
//!
//! # Example
//!
//! ```
//! use switchyard_web::{Endpoints, Routes};
//! use switchyard_http::protocol::{PathParams, Request};
//!
//! struct Users;
//!
//! impl Endpoints for Users {
//!     fn routes(routes: &mut Routes<Self>) {
//!         routes.get("/users/*", Users::show);
//!         routes.post("/users", Users::create).produces(mime::TEXT_PLAIN);
//!     }
//! }
//!
//! impl Users {
//!     fn show(&self, params: PathParams) -> String {
//!         format!("user {}", params.get(0).unwrap_or_default())
//!     }
//!
//!     fn create(&self, request: Request) -> Result<String, switchyard_http::protocol::BodyError> {
//!         Ok(format!("created {}", request.text()?))
//!     }
//! }
//! ```

use crate::context::DispatchContext;
use crate::extract::FromContext;
use crate::fn_trait::EndpointFn;
use crate::handler::{FnHandler, RequestHandler};
use crate::responder::Responder;
use mime::Mime;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use switchyard_http::protocol::{BoxError, Verb, mime_defaults};

/// A set of handlers sharing one instance and one pair of hooks.
pub trait Endpoints: Send + Sync + 'static {
    /// Declares the handlers of this set.
    fn routes(routes: &mut Routes<Self>)
    where
        Self: Sized;

    /// Runs before every handler of this set. An error aborts the dispatch.
    fn before_each(&self, _context: &mut DispatchContext) -> Result<(), BoxError> {
        Ok(())
    }

    /// Runs after every successful handler of this set, and may replace the stored response.
    ///
    /// An error replaces the response with an error response.
    fn after_each(&self, _context: &mut DispatchContext) -> Result<(), BoxError> {
        Ok(())
    }
}

/// What the dispatch engine knows about one registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointMeta {
    verb: Verb,
    path: String,
    endpoints: &'static str,
    consumes: Option<Mime>,
    produces: Option<Mime>,
    void: bool,
}

impl EndpointMeta {
    pub fn new(verb: Verb, path: impl Into<String>) -> Self {
        Self { verb, path: path.into(), endpoints: "", consumes: None, produces: None, void: false }
    }

    #[inline]
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// The route pattern, as registered.
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Type name of the endpoint set declaring this registration.
    #[inline]
    pub fn endpoints(&self) -> &'static str {
        self.endpoints
    }

    pub fn consumes(&self) -> Option<&Mime> {
        self.consumes.as_ref()
    }

    pub fn produces(&self) -> Option<&Mime> {
        self.produces.as_ref()
    }

    /// `true` when responses must carry the declared output mime.
    #[inline]
    pub fn is_output_enforced(&self) -> bool {
        self.produces.is_some()
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        self.void
    }

    /// The expected request mime. `GET` always expects urlencoded data.
    pub fn in_type(&self, default: &Mime) -> Mime {
        if self.verb == Verb::Get {
            return mime_defaults::default_in();
        }
        self.consumes.as_ref().unwrap_or(default).clone()
    }

    pub fn out_type(&self, default: &Mime) -> Mime {
        self.produces.as_ref().unwrap_or(default).clone()
    }
}

impl fmt::Display for EndpointMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb, self.path)
    }
}

type MakeHandler<E> = Box<dyn FnOnce(Arc<E>) -> Box<dyn RequestHandler>>;

pub(crate) struct RouteSpec<E> {
    pub(crate) meta: EndpointMeta,
    pub(crate) make: MakeHandler<E>,
}

impl<E> fmt::Debug for RouteSpec<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteSpec").field("meta", &self.meta).finish_non_exhaustive()
    }
}

/// Collects the handlers of an endpoint set.
pub struct Routes<E> {
    specs: Vec<RouteSpec<E>>,
}

macro_rules! verb_route {
    ($method:ident, $verb:expr) => {
        pub fn $method<F, Args>(&mut self, path: &str, handler: F) -> RouteBuilder<'_>
        where
            F: EndpointFn<E, Args>,
            F::Output: Responder,
            Args: FromContext + 'static,
        {
            self.route($verb, path, handler)
        }
    };
}

impl<E: Endpoints> Routes<E> {
    pub(crate) fn new() -> Self {
        Self { specs: Vec::new() }
    }

    verb_route!(get, Verb::Get);
    verb_route!(post, Verb::Post);
    verb_route!(put, Verb::Put);
    verb_route!(patch, Verb::Patch);
    verb_route!(delete, Verb::Delete);

    pub fn route<F, Args>(&mut self, verb: Verb, path: &str, handler: F) -> RouteBuilder<'_>
    where
        F: EndpointFn<E, Args>,
        F::Output: Responder,
        Args: FromContext + 'static,
    {
        let mut meta = EndpointMeta::new(verb, path);
        meta.endpoints = type_name::<E>();
        meta.void = <F::Output as Responder>::VOID;

        let make: MakeHandler<E> =
            Box::new(move |endpoints: Arc<E>| Box::new(FnHandler::new(endpoints, handler)) as Box<dyn RequestHandler>);
        self.specs.push(RouteSpec { meta, make });

        let index = self.specs.len() - 1;
        RouteBuilder { meta: &mut self.specs[index].meta }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    pub(crate) fn collect(endpoints: &Arc<E>) -> Vec<(EndpointMeta, Box<dyn RequestHandler>)> {
        let mut routes = Self::new();
        E::routes(&mut routes);
        routes.specs.into_iter().map(|spec| (spec.meta, (spec.make)(Arc::clone(endpoints)))).collect()
    }
}

impl<E> fmt::Debug for Routes<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.specs).finish()
    }
}

/// Adjusts the mime negotiation of the route just declared.
#[derive(Debug)]
pub struct RouteBuilder<'r> {
    meta: &'r mut EndpointMeta,
}

impl RouteBuilder<'_> {
    /// The expected request mime; ignored for `GET`.
    pub fn consumes(self, mime: Mime) -> Self {
        if self.meta.verb != Verb::Get {
            self.meta.consumes = Some(mime);
        }
        self
    }

    /// The response mime, enforced on successful non-empty responses.
    pub fn produces(self, mime: Mime) -> Self {
        self.meta.produces = Some(mime);
        self
    }
}
