//! The request object handed to hooks and handlers.
//!
//! A [`Request`] is built by the transport once a route matched, from the captured
//! [`PathParams`]. It is a cheap handle: clones share the same headers, cookies and body, and
//! the body can be taken exactly once.

use crate::protocol::{Body, BodyError, ServeError};
use http::header::{self, HeaderName, HeaderValue};
use http::HeaderMap;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Values captured by wildcard segments, in left-to-right order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PathParams(Vec<String>);

impl PathParams {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, value: impl Into<String>) {
        self.0.push(value.into());
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<Vec<String>> for PathParams {
    fn from(values: Vec<String>) -> Self {
        Self(values)
    }
}

impl<S: Into<String>> FromIterator<S> for PathParams {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone)]
pub struct Request {
    inner: Arc<Inner>,
}

struct Inner {
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    params: PathParams,
    body: Mutex<Option<Body>>,
}

impl Request {
    pub fn builder(path: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            path: path.into(),
            query: None,
            headers: HeaderMap::new(),
            cookies: HashMap::new(),
            params: PathParams::new(),
            body: None,
        }
    }

    /// Builds a request from an `http::Request`, using its uri and headers.
    pub fn from_http(request: http::Request<Body>, params: PathParams) -> Self {
        let (parts, body) = request.into_parts();
        let mut builder = Request::builder(parts.uri.path()).headers(parts.headers).params(params).body(body);
        if let Some(query) = parts.uri.query() {
            builder = builder.query(query);
        }
        builder.build()
    }

    #[inline]
    pub fn path(&self) -> &str {
        &self.inner.path
    }

    /// The raw query string, without the leading `?`.
    #[inline]
    pub fn raw_query(&self) -> Option<&str> {
        self.inner.query.as_deref()
    }

    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.inner.headers
    }

    pub fn header(&self, name: &HeaderName) -> Option<&str> {
        self.inner.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[inline]
    pub fn params(&self) -> &PathParams {
        &self.inner.params
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.inner.params.get(index)
    }

    pub fn cookies(&self) -> &HashMap<String, String> {
        &self.inner.cookies
    }

    pub fn cookie(&self, name: &str) -> Result<&str, ServeError> {
        self.inner.cookies.get(name).map(String::as_str).ok_or_else(|| ServeError::missing_cookie(name))
    }

    pub fn query(&self) -> Result<HashMap<String, String>, BodyError> {
        match &self.inner.query {
            Some(query) => Ok(serde_urlencoded::from_str(query)?),
            None => Ok(HashMap::new()),
        }
    }

    /// Takes the body out of the request; every later call fails with [`BodyError::Consumed`].
    pub fn take_body(&self) -> Result<Body, BodyError> {
        let mut body = self.inner.body.lock().unwrap_or_else(PoisonError::into_inner);
        body.take().ok_or(BodyError::Consumed)
    }

    pub fn text(&self) -> Result<String, BodyError> {
        self.take_body()?.into_text()
    }

    /// Query parameters merged with an urlencoded body; the query wins when a key is in both.
    pub fn urlencoded(&self) -> Result<HashMap<String, String>, BodyError> {
        let mut values = self.take_body()?.into_urlencoded()?;
        values.extend(self.query()?);
        Ok(values)
    }
}

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("path", &self.inner.path)
            .field("query", &self.inner.query)
            .field("headers", &self.inner.headers)
            .field("params", &self.inner.params)
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct RequestBuilder {
    path: String,
    query: Option<String>,
    headers: HeaderMap,
    cookies: HashMap<String, String>,
    params: PathParams,
    body: Option<Body>,
}

impl RequestBuilder {
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    pub fn headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    pub fn params(mut self, params: PathParams) -> Self {
        self.params = params;
        self
    }

    /// Sets the body; a `Content-Type` header is added from the body's mime unless present.
    pub fn body(mut self, body: Body) -> Self {
        if !self.headers.contains_key(header::CONTENT_TYPE)
            && let Ok(value) = HeaderValue::from_str(body.mime().as_ref())
        {
            self.headers.insert(header::CONTENT_TYPE, value);
        }
        self.body = Some(body);
        self
    }

    pub fn build(self) -> Request {
        let inner = Inner {
            path: self.path,
            query: self.query,
            headers: self.headers,
            cookies: self.cookies,
            params: self.params,
            body: Mutex::new(Some(self.body.unwrap_or_default())),
        };
        Request { inner: Arc::new(inner) }
    }
}
