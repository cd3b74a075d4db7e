//! The dispatch engine.
//!
//! A [`Registry`] maps route patterns to the handlers registered for each verb, and drives one
//! dispatch through resolution, verb selection, invocation of the hooks and the handler, and
//! finalization of the response. Registration takes the write side of a single lock, dispatch
//! the read side, so a dispatch never observes a partially registered endpoint set.

use crate::classify::ErrorClassifier;
use crate::config::{DispatchConfig, ErrorBody, RegistryBuilder};
use crate::context::DispatchContext;
use crate::endpoint::{EndpointMeta, Endpoints, Routes};
use crate::error::{HandlerPanic, OutputTypeError, RegistryError};
use crate::handler::RequestHandler;
use crate::inject::{InjectError, Injector};
use crate::logger::{DispatchLogger, DispatchRecord};
use crate::path::PathTrie;
use http::header::{self, HeaderName, HeaderValue};
use http::{HeaderMap, Response, StatusCode};
use std::error::Error;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use switchyard_http::protocol::response::{error_response, normalize, response_of, response_with};
use switchyard_http::protocol::{Body, BoxError, PathParams, Request, Verb, mime_defaults};
use tracing::{debug, warn};

/// One handler bound to a verb and a route pattern.
struct Registration {
    meta: EndpointMeta,
    hooks: Arc<dyn Endpoints>,
    handler: Box<dyn RequestHandler>,
}

impl Registration {
    fn run(&self, context: &mut DispatchContext) -> Result<Response<Body>, BoxError> {
        self.hooks.before_each(context)?;

        let response = self.handler.invoke(context)?;
        let response = if self.meta.is_void() { response_with(StatusCode::OK, Body::empty()) } else { response };
        context.set_response(response);

        self.hooks.after_each(context)?;
        // an after hook taking the response leaves nothing to send
        Ok(context.take_response().unwrap_or_else(|| response_of(Body::empty())))
    }
}

/// The registrations of one route, in registration order.
type VerbTable = Vec<(Verb, Arc<Registration>)>;

enum MethodToken<'a> {
    Verb(Verb),
    Raw(&'a str),
}

impl MethodToken<'_> {
    fn as_str(&self) -> &str {
        match self {
            MethodToken::Verb(verb) => verb.as_str(),
            MethodToken::Raw(token) => token,
        }
    }

    fn is_meta(&self) -> bool {
        matches!(self, MethodToken::Raw(token) if Verb::is_meta_token(token))
    }

    fn verb(&self) -> Option<Verb> {
        match self {
            MethodToken::Verb(verb) => Some(*verb),
            MethodToken::Raw(token) => token.parse().ok(),
        }
    }
}

enum Selection {
    NotFound,
    Answered(Response<Body>),
    Matched { registration: Arc<Registration>, params: PathParams },
}

pub struct Registry {
    routes: RwLock<PathTrie<VerbTable>>,
    sealed: AtomicBool,
    config: DispatchConfig,
    logger: Arc<dyn DispatchLogger>,
    classifier: Arc<dyn ErrorClassifier>,
    error_body: ErrorBody,
    injector: Injector,
}

impl Registry {
    /// A registry with the default configuration and collaborators.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub(crate) fn from_parts(
        config: DispatchConfig,
        logger: Arc<dyn DispatchLogger>,
        classifier: Arc<dyn ErrorClassifier>,
        error_body: ErrorBody,
        injector: Injector,
    ) -> Self {
        let trie = if config.wildcards { PathTrie::new() } else { PathTrie::literal() };
        Self { routes: RwLock::new(trie), sealed: AtomicBool::new(false), config, logger, classifier, error_body, injector }
    }

    #[inline]
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    fn read_routes(&self) -> RwLockReadGuard<'_, PathTrie<VerbTable>> {
        self.routes.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_routes(&self) -> RwLockWriteGuard<'_, PathTrie<VerbTable>> {
        self.routes.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers every handler of `endpoints`, returning how many were registered.
    ///
    /// A handler registered for a verb and route that already have one replaces it.
    pub fn register<E: Endpoints>(&self, endpoints: E) -> Result<usize, RegistryError> {
        let endpoints = Arc::new(endpoints);
        let hooks = Arc::clone(&endpoints) as Arc<dyn Endpoints>;
        let handlers = Routes::collect(&endpoints);

        let mut trie = self.write_routes();
        if self.is_sealed() {
            return Err(RegistryError::Sealed);
        }

        let count = handlers.len();
        for (meta, handler) in handlers {
            let verb = meta.verb();
            let registration = Arc::new(Registration { meta, hooks: Arc::clone(&hooks), handler });
            let table = trie.get_or_insert_with(registration.meta.path(), Vec::new);

            debug!(verb = verb.as_str(), path = registration.meta.path(), endpoints = registration.meta.endpoints(), "registered route");
            match table.iter_mut().find(|(existing, _)| *existing == verb) {
                Some(entry) => {
                    debug!(verb = verb.as_str(), path = registration.meta.path(), "replaced earlier registration");
                    entry.1 = registration;
                }
                None => table.push((verb, registration)),
            }
        }
        Ok(count)
    }

    /// Builds an endpoint set from the registry's [`Injector`] and registers it.
    pub fn register_injected<E, F>(&self, f: F) -> Result<usize, RegistryError>
    where
        E: Endpoints,
        F: FnOnce(&Injector) -> Result<E, InjectError>,
    {
        let endpoints = f(&self.injector)?;
        self.register(endpoints)
    }

    /// Forbids any further registration.
    pub fn seal(&self) {
        let _guard = self.write_routes();
        self.sealed.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    /// Every registered verb and route pattern.
    pub fn routes(&self) -> Vec<(Verb, String)> {
        let trie = self.read_routes();
        trie.entries()
            .into_iter()
            .flat_map(|(_, table)| table.iter().map(|(verb, registration)| (*verb, registration.meta.path().to_string())))
            .collect()
    }

    /// The number of registrations.
    pub fn len(&self) -> usize {
        self.read_routes().entries().iter().map(|(_, table)| table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.read_routes().is_empty()
    }

    /// Dispatches a request for `verb` to the handler registered for `path`.
    ///
    /// `make_request` is called with the captured wildcard values, only once a handler was
    /// selected. Every failure is turned into an error response.
    pub fn dispatch<F>(&self, verb: Verb, path: &str, make_request: F) -> Response<Body>
    where
        F: FnOnce(PathParams) -> Request,
    {
        self.dispatch_token(MethodToken::Verb(verb), path, make_request)
    }

    /// Dispatches a request for a wire-level method token.
    ///
    /// `HEAD` and `OPTIONS` are answered with `204 No Content` describing the route; tokens that
    /// are not verbs answer `405 Method Not Allowed`.
    pub fn dispatch_method<F>(&self, method: &str, path: &str, make_request: F) -> Response<Body>
    where
        F: FnOnce(PathParams) -> Request,
    {
        self.dispatch_token(MethodToken::Raw(method), path, make_request)
    }

    fn dispatch_token<F>(&self, token: MethodToken<'_>, path: &str, make_request: F) -> Response<Body>
    where
        F: FnOnce(PathParams) -> Request,
    {
        let (mut response, registration, error) = match self.select(&token, path) {
            Selection::NotFound => (self.error_response(StatusCode::NOT_FOUND), None, None),
            // meta and 405 answers carry their final headers already
            Selection::Answered(response) => {
                self.log(&token, path, response.status(), None);
                return response;
            }
            Selection::Matched { registration, params } => {
                let request = make_request(params);
                match self.invoke(&registration, request) {
                    Ok(response) => (response, Some(registration), None),
                    Err(err) => {
                        let status = self.classifier.classify(&*err);
                        (self.error_response(status), Some(registration), Some(err))
                    }
                }
            }
        };

        normalize(&mut response);
        if let Some(registration) = &registration
            && registration.meta.verb() != Verb::Get
            && !response.headers().contains_key(header::ACCEPT)
        {
            let accept = registration.meta.in_type(&self.config.default_in);
            set_header(response.headers_mut(), header::ACCEPT, accept.as_ref());
        }

        self.log(&token, path, response.status(), error.as_deref());
        response
    }

    fn log(&self, token: &MethodToken<'_>, path: &str, status: StatusCode, error: Option<&(dyn Error + Send + Sync + 'static)>) {
        let mut record = DispatchRecord::new(status, token.as_str(), path);
        if let Some(err) = error {
            record = record.with_error(err);
        }
        self.logger.log(&record);
    }

    fn select(&self, token: &MethodToken<'_>, path: &str) -> Selection {
        let trie = self.read_routes();
        let Some(resolution) = trie.resolve(path) else {
            return Selection::NotFound;
        };
        let table = resolution.value;

        if token.is_meta() {
            return Selection::Answered(self.describe(table, StatusCode::NO_CONTENT));
        }

        let registration = token.verb().and_then(|verb| table.iter().find(|(v, _)| *v == verb));
        match registration {
            Some((_, registration)) => Selection::Matched { registration: Arc::clone(registration), params: resolution.params },
            None => Selection::Answered(self.describe(table, StatusCode::METHOD_NOT_ALLOWED)),
        }
    }

    /// The `204` answer to a meta token, or the `405` answer to an unsupported verb.
    ///
    /// Both are bodiless and list the route's verbs in `Allow`; only the `204` names the `GET`
    /// output mime in `Content-Type`.
    fn describe(&self, table: &VerbTable, status: StatusCode) -> Response<Body> {
        let mut response = if status == StatusCode::NO_CONTENT {
            let mut response = response_with(status, Body::empty());
            let out = table
                .iter()
                .find(|(verb, _)| *verb == Verb::Get)
                .map_or_else(|| self.config.default_out.clone(), |(_, get)| get.meta.out_type(&self.config.default_out));
            set_header(response.headers_mut(), header::CONTENT_TYPE, out.as_ref());
            response
        } else {
            let mut response = response_with(status, Body::empty());
            response.headers_mut().remove(header::CONTENT_TYPE);
            response
        };

        let allow = ["HEAD", "OPTIONS"].into_iter().chain(table.iter().map(|(verb, _)| verb.as_str())).collect::<Vec<_>>().join(", ");
        let accept = table
            .iter()
            .filter(|(verb, _)| *verb != Verb::Get)
            .fold(self.config.default_in.clone(), |accept, (_, registration)| registration.meta.in_type(&accept));

        let headers = response.headers_mut();
        set_header(headers, header::ALLOW, &allow);
        set_header(headers, header::ACCEPT, accept.as_ref());
        response
    }

    fn invoke(&self, registration: &Registration, request: Request) -> Result<Response<Body>, BoxError> {
        let mut context = DispatchContext::new(request, registration.meta.clone());

        let response = match panic::catch_unwind(AssertUnwindSafe(|| registration.run(&mut context))) {
            Ok(result) => result?,
            Err(payload) => return Err(Box::new(HandlerPanic::from_payload(payload.as_ref()))),
        };
        enforce_output(&registration.meta, response)
    }

    fn error_response(&self, status: StatusCode) -> Response<Body> {
        error_response(status, (self.error_body)(status))
    }
}

/// Applies the declared output mime of `meta` to a response.
fn enforce_output(meta: &EndpointMeta, response: Response<Body>) -> Result<Response<Body>, BoxError> {
    let Some(declared) = meta.produces() else {
        return Ok(response);
    };

    let actual = response.body().mime();
    if response.status().is_success() && !response.body().is_empty() && !mime_defaults::same_essence(declared, actual) {
        return Err(Box::new(OutputTypeError::new(meta, declared.clone(), actual.clone())));
    }
    Ok(response.map(|body| body.with_mime(declared.clone())))
}

fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(e) => warn!(header = %name, value, cause = %e, "dropping invalid header value"),
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("routes", &self.routes())
            .field("sealed", &self.is_sealed())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Data;
    use crate::logger::{MockDispatchLogger, SilentLogger};
    use std::sync::Mutex;
    use switchyard_http::protocol::{BodyError, ServeError};

    type Trail = Arc<Mutex<Vec<String>>>;

    struct Catalog {
        trail: Trail,
    }

    impl Endpoints for Catalog {
        fn routes(routes: &mut Routes<Self>) {
            routes.get("/items", Catalog::list).produces(mime::TEXT_PLAIN);
            routes.post("/items", Catalog::add).consumes(mime::APPLICATION_JSON);
            routes.get("/items/*", Catalog::show);
            routes.get("/items/featured", Catalog::featured);
            routes.delete("/items/*", Catalog::remove);
            routes.get("/sample/*/and/*", Catalog::pair);
            routes.get("/needs", Catalog::needs);
            routes.get("/panic", Catalog::boom);
            routes.get("/wrong", Catalog::wrong).produces(mime::APPLICATION_JSON);
            routes.get("/conflict", Catalog::conflict);
            routes.get("/late", Catalog::late);
        }

        fn before_each(&self, context: &mut DispatchContext) -> Result<(), BoxError> {
            let meta = context.meta().map(ToString::to_string).unwrap_or_default();
            self.trail.lock().unwrap().push(format!("before {meta}"));
            Ok(())
        }

        fn after_each(&self, context: &mut DispatchContext) -> Result<(), BoxError> {
            let meta = context.meta().map(ToString::to_string).unwrap_or_default();
            self.trail.lock().unwrap().push(format!("after {meta}"));
            if meta == "GET /late" {
                return Err(ServeError::new(StatusCode::SERVICE_UNAVAILABLE, "too late").into());
            }
            Ok(())
        }
    }

    impl Catalog {
        fn list(&self) -> &'static str {
            self.trail.lock().unwrap().push("handler".to_string());
            "apple,pear"
        }

        fn add(&self, request: Request) -> Result<String, BodyError> {
            request.text()
        }

        fn show(&self, params: PathParams) -> String {
            format!("item {}", params.get(0).unwrap_or_default())
        }

        fn featured(&self) -> &'static str {
            "featured"
        }

        fn remove(&self, _params: PathParams) {}

        fn pair(&self, params: PathParams) -> String {
            params.iter().collect::<Vec<_>>().join("+")
        }

        fn needs(&self, Data(limit): Data<u64>) -> String {
            limit.to_string()
        }

        fn boom(&self) -> String {
            panic!("handler exploded")
        }

        fn wrong(&self) -> &'static str {
            "not json"
        }

        fn conflict(&self) -> Result<String, ServeError> {
            Err(ServeError::new(StatusCode::CONFLICT, "taken"))
        }

        fn late(&self) -> &'static str {
            "in time"
        }
    }

    struct Replacement;

    impl Endpoints for Replacement {
        fn routes(routes: &mut Routes<Self>) {
            routes.get("/ITEMS", |_: &Replacement| "replaced");
        }
    }

    fn catalog() -> (Registry, Trail) {
        let trail = Trail::default();
        let registry = Registry::builder().logger(SilentLogger).build();
        registry.register(Catalog { trail: Arc::clone(&trail) }).unwrap();
        (registry, trail)
    }

    fn dispatch(registry: &Registry, verb: Verb, path: &str) -> Response<Body> {
        registry.dispatch(verb, path, |params| Request::builder(path).params(params).build())
    }

    fn text(response: Response<Body>) -> String {
        response.into_body().into_text().unwrap()
    }

    fn header<'r>(response: &'r Response<Body>, name: &HeaderName) -> Option<&'r str> {
        response.headers().get(name).and_then(|v| v.to_str().ok())
    }

    #[test]
    fn literal_wins_over_wildcard() {
        let (registry, _) = catalog();
        assert_eq!(text(dispatch(&registry, Verb::Get, "/items/featured")), "featured");
        assert_eq!(text(dispatch(&registry, Verb::Get, "/items/42")), "item 42");
        assert_eq!(text(dispatch(&registry, Verb::Get, "//items//")), "apple,pear");
    }

    #[test]
    fn wildcards_capture_in_order() {
        let (registry, _) = catalog();
        assert_eq!(text(dispatch(&registry, Verb::Get, "/sample/1/and/2")), "1+2");
    }

    #[test]
    fn options_describes_route() {
        let (registry, trail) = catalog();
        let response = registry.dispatch_method("OPTIONS", "/items", |_| unreachable!());

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(header(&response, &header::ALLOW), Some("HEAD, OPTIONS, GET, POST"));
        assert_eq!(header(&response, &header::ACCEPT), Some("application/json"));
        assert_eq!(header(&response, &header::CONTENT_TYPE), Some("text/plain"));
        assert!(!response.headers().contains_key(header::CONTENT_LENGTH));
        assert!(trail.lock().unwrap().is_empty());

        let response = registry.dispatch_method("HEAD", "/items/7", |_| unreachable!());
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(header(&response, &header::ALLOW), Some("HEAD, OPTIONS, GET, DELETE"));
        assert_eq!(header(&response, &header::ACCEPT), Some("application/x-www-form-urlencoded"));
        assert_eq!(header(&response, &header::CONTENT_TYPE), Some("text/html"));
    }

    #[test]
    fn not_found_and_not_allowed() {
        let (registry, trail) = catalog();

        let response = dispatch(&registry, Verb::Get, "/nothing/here");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.headers().contains_key(header::ALLOW));
        assert!(text(response).contains("404"));

        let response = dispatch(&registry, Verb::Put, "/items");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&response, &header::ALLOW), Some("HEAD, OPTIONS, GET, POST"));
        assert_eq!(header(&response, &header::ACCEPT), Some("application/json"));
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
        assert!(response.body().is_empty());

        for token in ["BREW", "options", "get"] {
            let response = registry.dispatch_method(token, "/items", |_| unreachable!());
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{token}");
        }
        assert!(trail.lock().unwrap().is_empty());
    }

    #[test]
    fn not_allowed_has_no_content_type() {
        struct ReadOnly;

        impl Endpoints for ReadOnly {
            fn routes(routes: &mut Routes<Self>) {
                routes.get("/x", |_: &ReadOnly| "x");
            }
        }

        let registry = Registry::builder().logger(SilentLogger).error_body(|_| Body::html("<p>error</p>")).build();
        registry.register(ReadOnly).unwrap();

        let response = dispatch(&registry, Verb::Post, "/x");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(header(&response, &header::ALLOW), Some("HEAD, OPTIONS, GET"));
        assert_eq!(header(&response, &header::ACCEPT), Some("application/x-www-form-urlencoded"));
        assert!(!response.headers().contains_key(header::CONTENT_TYPE));
        assert_eq!(header(&response, &header::CONTENT_LENGTH), Some("0"));
    }

    #[test]
    fn raw_tokens_reach_handlers() {
        let (registry, _) = catalog();
        let response = registry.dispatch_method("GET", "/items/9", |params| Request::builder("/items/9").params(params).build());
        assert_eq!(text(response), "item 9");
    }

    #[test]
    fn hooks_surround_handler() {
        let (registry, trail) = catalog();
        let response = dispatch(&registry, Verb::Get, "/items");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &header::CONTENT_TYPE), Some("text/plain"));
        assert_eq!(header(&response, &header::CONTENT_LENGTH), Some("10"));
        assert_eq!(*trail.lock().unwrap(), ["before GET /items", "handler", "after GET /items"]);
    }

    #[test]
    fn context_miss_is_internal_error() {
        let (registry, trail) = catalog();
        let response = dispatch(&registry, Verb::Get, "/needs");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(text(response).contains("500"));
        assert_eq!(*trail.lock().unwrap(), ["before GET /needs"]);
    }

    #[test]
    fn panics_are_contained() {
        let (registry, _) = catalog();
        let response = dispatch(&registry, Verb::Get, "/panic");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serve_errors_keep_their_status() {
        let (registry, _) = catalog();
        assert_eq!(dispatch(&registry, Verb::Get, "/conflict").status(), StatusCode::CONFLICT);
    }

    #[test]
    fn after_hook_error_replaces_response() {
        let (registry, trail) = catalog();
        let response = dispatch(&registry, Verb::Get, "/late");
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(trail.lock().unwrap().len(), 2);
    }

    #[test]
    fn declared_output_is_enforced() {
        let (registry, _) = catalog();
        assert_eq!(dispatch(&registry, Verb::Get, "/wrong").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn accept_announces_expected_input() {
        let (registry, _) = catalog();

        let response = registry.dispatch(Verb::Post, "/items", |params| {
            Request::builder("/items").params(params).body(Body::text("{\"name\":\"fig\"}")).build()
        });
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &header::ACCEPT), Some("application/json"));
        assert_eq!(text(response), "{\"name\":\"fig\"}");

        let response = dispatch(&registry, Verb::Get, "/items");
        assert!(!response.headers().contains_key(header::ACCEPT));
    }

    #[test]
    fn void_handlers_answer_ok() {
        let (registry, _) = catalog();
        let response = dispatch(&registry, Verb::Delete, "/items/3");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(header(&response, &header::CONTENT_LENGTH), Some("0"));
        assert_eq!(header(&response, &header::ACCEPT), Some("application/x-www-form-urlencoded"));
    }

    #[test]
    fn re_registration_replaces() {
        let (registry, _) = catalog();
        let before = registry.len();

        assert_eq!(registry.register(Replacement), Ok(1));
        assert_eq!(registry.len(), before);
        assert_eq!(text(dispatch(&registry, Verb::Get, "/items")), "replaced");

        let gets = registry.routes().into_iter().filter(|(verb, path)| *verb == Verb::Get && path.eq_ignore_ascii_case("/items")).count();
        assert_eq!(gets, 1);
    }

    #[test]
    fn sealed_registry_rejects_registration() {
        let (registry, _) = catalog();
        registry.seal();
        assert!(registry.is_sealed());
        assert_eq!(registry.register(Replacement), Err(RegistryError::Sealed));
        assert_eq!(text(dispatch(&registry, Verb::Get, "/items")), "apple,pear");
    }

    #[test]
    fn injected_endpoints() {
        struct Greeting(String);

        impl Endpoints for Greeting {
            fn routes(routes: &mut Routes<Self>) {
                routes.get("/greet", |greeting: &Greeting| greeting.0.clone());
            }
        }

        let registry = Registry::builder().logger(SilentLogger).injector(Injector::new().with(String::from("hello"))).build();
        assert_eq!(registry.register_injected(|injector| injector.get::<String>().map(Greeting)), Ok(1));
        assert_eq!(text(dispatch(&registry, Verb::Get, "/greet")), "hello");

        let err = registry.register_injected(|injector| injector.get::<u8>().map(|n| Greeting(n.to_string()))).unwrap_err();
        assert!(matches!(err, RegistryError::Inject { .. }));
    }

    #[test]
    fn custom_error_body() {
        let registry = Registry::builder().logger(SilentLogger).error_body(|status| Body::text(format!("oops {}", status.as_u16()))).build();
        let response = dispatch(&registry, Verb::Get, "/");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(header(&response, &header::CONTENT_TYPE), Some("text/plain"));
        assert_eq!(text(response), "oops 404");
    }

    #[test]
    fn literal_registry_has_no_wildcards() {
        let registry = Registry::builder().logger(SilentLogger).wildcards(false).build();
        registry.register(Catalog { trail: Trail::default() }).unwrap();

        assert_eq!(dispatch(&registry, Verb::Get, "/items/42").status(), StatusCode::NOT_FOUND);
        assert_eq!(dispatch(&registry, Verb::Get, "/items/*").status(), StatusCode::OK);
    }

    #[test]
    fn logs_once_per_dispatch() {
        let mut logger = MockDispatchLogger::new();
        logger
            .expect_log()
            .withf(|record| record.status == StatusCode::NOT_FOUND && record.method == "GET" && record.path == "/none")
            .times(1)
            .return_const(());
        logger
            .expect_log()
            .withf(|record| record.status == StatusCode::CONFLICT && record.error.as_deref() == Some("409 Conflict: taken"))
            .times(1)
            .return_const(());
        logger.expect_log().withf(|record| record.status == StatusCode::NO_CONTENT && record.method == "OPTIONS").times(1).return_const(());

        let registry = Registry::builder().logger(logger).build();
        registry.register(Catalog { trail: Trail::default() }).unwrap();

        dispatch(&registry, Verb::Get, "/none");
        dispatch(&registry, Verb::Get, "/conflict");
        registry.dispatch_method("OPTIONS", "/items", |_| unreachable!());
    }

    #[test]
    fn concurrent_dispatch_and_registration() {
        let (registry, _) = catalog();

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for i in 0..50 {
                        let path = format!("/items/{i}");
                        assert_eq!(dispatch(&registry, Verb::Get, &path).status(), StatusCode::OK);
                    }
                });
            }
            scope.spawn(|| {
                for _ in 0..10 {
                    registry.register(Replacement).unwrap();
                }
            });
        });
        assert_eq!(text(dispatch(&registry, Verb::Get, "/items")), "replaced");
    }
}
