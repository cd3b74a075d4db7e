//! Resolution of handler arguments from the [`DispatchContext`].
//!
//! Every argument of a handler implements [`FromContext`]. Built-in implementations cover the
//! values the context is seeded with ([`Request`], [`EndpointMeta`] and what derives from
//! them), shared services stored by hooks (`Arc<T>`, [`Data<T>`]) and typed views of the query
//! string and of an urlencoded body ([`Query<T>`], [`Form<T>`]).

use crate::context::DispatchContext;
use crate::endpoint::EndpointMeta;
use crate::error::ContextMissError;
use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use switchyard_http::protocol::{BodyError, BoxError, PathParams, Request, Verb};

pub trait FromContext: Sized {
    type Error: Into<BoxError>;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error>;
}

fn miss<T>(context: &DispatchContext) -> ContextMissError {
    ContextMissError::of::<T>(context.meta())
}

fn request(context: &DispatchContext) -> Result<&Request, ContextMissError> {
    context.request().ok_or_else(|| miss::<Request>(context))
}

impl FromContext for Request {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        request(context).cloned()
    }
}

impl FromContext for EndpointMeta {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        context.meta().cloned().ok_or_else(|| miss::<EndpointMeta>(context))
    }
}

impl FromContext for Verb {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        context.meta().map(EndpointMeta::verb).ok_or_else(|| miss::<Verb>(context))
    }
}

impl FromContext for PathParams {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        request(context).map(|r| r.params().clone())
    }
}

/// A shared value stored in the context, exactly or through a view.
impl<T: ?Sized + Send + Sync + 'static> FromContext for Arc<T> {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        context.get::<Arc<T>>().ok_or_else(|| miss::<Arc<T>>(context))
    }
}

/// Never fails: a missing value becomes `None`.
impl<T: FromContext> FromContext for Option<T> {
    type Error = Infallible;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        Ok(T::from_context(context).ok())
    }
}

impl FromContext for () {
    type Error = Infallible;

    fn from_context(_context: &DispatchContext) -> Result<Self, Self::Error> {
        Ok(())
    }
}

/// Any cloneable value stored in the context
///
/// hooks can store request scoped values with [`DispatchContext::insert`], handlers receive a
/// clone of them
///
/// # Example
/// ```
/// # use switchyard_web::extract::Data;
/// # #[derive(Clone)]
/// # struct UserId(u64);
/// # struct Api;
/// # impl Api {
/// fn whoami(&self, Data(user): Data<UserId>) -> String {
///     format!("user {}", user.0)
/// }
/// # }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Data<T>(pub T);

impl<T: Clone + Send + Sync + 'static> FromContext for Data<T> {
    type Error = ContextMissError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        context.get::<T>().map(Data).ok_or_else(|| miss::<T>(context))
    }
}

/// Represented as url query data
///
/// note: the struct must impl [`serde::Deserialize`]; a malformed query fails with
/// [`BodyError`], which is answered with `400 Bad Request`
///
/// # Example
/// ```
/// # use serde::Deserialize;
/// # use switchyard_web::extract::Query;
/// # struct Api;
/// #[derive(Deserialize, Debug)]
/// struct Page {
///     offset: u32,
///     limit: u32,
/// }
///
/// # impl Api {
/// fn list(&self, Query(page): Query<Page>) -> String {
///     format!("items {}..{}", page.offset, page.offset + page.limit)
/// }
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query<T>(pub T);

impl<T: DeserializeOwned> FromContext for Query<T> {
    type Error = BoxError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        let query = request(context)?.raw_query().unwrap_or("");
        let value = serde_urlencoded::from_str(query).map_err(BodyError::from)?;
        Ok(Query(value))
    }
}

/// Represented as form data
///
/// when `post` as a `application/x-www-form-urlencoded`, the body is taken from the request
/// and deserialized; a later attempt to read the body fails with [`BodyError::Consumed`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Form<T>(pub T);

impl<T: DeserializeOwned> FromContext for Form<T> {
    type Error = BoxError;

    fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
        let body = request(context)?.take_body()?;
        let bytes = body.into_bytes().map_err(BodyError::from)?;
        let value = serde_urlencoded::from_bytes(&bytes).map_err(BodyError::from)?;
        Ok(Form(value))
    }
}

macro_rules! impl_from_context_for_tuple {
    ($($param:ident)*) => {
        impl<$($param,)*> FromContext for ($($param,)*)
        where
            $($param: FromContext,)*
        {
            type Error = BoxError;

            fn from_context(context: &DispatchContext) -> Result<Self, Self::Error> {
                Ok(($($param::from_context(context).map_err(Into::into)?,)*))
            }
        }
    }
}

impl_from_context_for_tuple! { A }
impl_from_context_for_tuple! { A B }
impl_from_context_for_tuple! { A B C }
impl_from_context_for_tuple! { A B C D }
impl_from_context_for_tuple! { A B C D E }
impl_from_context_for_tuple! { A B C D E F }
impl_from_context_for_tuple! { A B C D E F G }
impl_from_context_for_tuple! { A B C D E F G H }
impl_from_context_for_tuple! { A B C D E F G H I }
impl_from_context_for_tuple! { A B C D E F G H I J }
impl_from_context_for_tuple! { A B C D E F G H I J K }
impl_from_context_for_tuple! { A B C D E F G H I J K L }
