use crate::context::DispatchContext;
use crate::extract::FromContext;
use crate::fn_trait::EndpointFn;
use crate::responder::Responder;
use http::Response;
use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use switchyard_http::protocol::{Body, BoxError};

/// A type-erased handler bound to its endpoint set.
pub trait RequestHandler: Send + Sync {
    fn invoke(&self, context: &DispatchContext) -> Result<Response<Body>, BoxError>;
}

/// an `EndpointFn` holder which represents any handler function of `E`
pub struct FnHandler<E, F, Args> {
    endpoints: Arc<E>,
    f: F,
    _phantom: PhantomData<fn(Args)>,
}

impl<E, F, Args> FnHandler<E, F, Args>
where
    F: EndpointFn<E, Args>,
{
    pub(crate) fn new(endpoints: Arc<E>, f: F) -> Self {
        Self { endpoints, f, _phantom: PhantomData }
    }
}

impl<E, F, Args> RequestHandler for FnHandler<E, F, Args>
where
    E: Send + Sync,
    F: EndpointFn<E, Args>,
    F::Output: Responder,
    Args: FromContext,
{
    fn invoke(&self, context: &DispatchContext) -> Result<Response<Body>, BoxError> {
        let args = Args::from_context(context).map_err(Into::into)?;
        self.f.call(&self.endpoints, args).into_response()
    }
}

impl<E, F, Args> fmt::Debug for FnHandler<E, F, Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").field("endpoints", &type_name::<E>()).field("args", &type_name::<Args>()).finish()
    }
}
