/// A handler function of an endpoint set `E`: `fn(&E, A1, .., An) -> R`.
pub trait EndpointFn<E, Args>: Send + Sync + 'static {
    type Output;
    fn call(&self, endpoints: &E, args: Args) -> Self::Output;
}

/// impl `Fn` for `EndpointFn`, from 0 arguments to 12 arguments besides the endpoint set
///
/// for example, it will impl Fn(&E, A, B) like this:
///```ignore
/// impl<Func, E, R, A, B> EndpointFn<E, (A, B)> for Func
///    where
///        Func: Fn(&E, A, B) -> R + Send + Sync + 'static,
/// {
///    type Output = R;
///
///    #[inline]
///    #[allow(non_snake_case)]
///    fn call(&self, endpoints: &E, (A, B): (A, B)) -> Self::Output {
///        (self)(endpoints, A, B)
///    }
/// }
///```
macro_rules! impl_endpoint_fn_for_fn ({ $($param:ident)* } => {
    impl<Func, E, R, $($param,)*> EndpointFn<E, ($($param,)*)> for Func
    where
        Func: Fn(&E, $($param),*) -> R + Send + Sync + 'static,
    {
        type Output = R;

        #[inline]
        #[allow(non_snake_case, reason = "type parameters double as argument names")]
        fn call(&self, endpoints: &E, ($($param,)*): ($($param,)*)) -> Self::Output {
            (self)(endpoints, $($param,)*)
        }
    }
});

impl_endpoint_fn_for_fn! {}
impl_endpoint_fn_for_fn! { A }
impl_endpoint_fn_for_fn! { A B }
impl_endpoint_fn_for_fn! { A B C }
impl_endpoint_fn_for_fn! { A B C D }
impl_endpoint_fn_for_fn! { A B C D E1 }
impl_endpoint_fn_for_fn! { A B C D E1 F }
impl_endpoint_fn_for_fn! { A B C D E1 F G }
impl_endpoint_fn_for_fn! { A B C D E1 F G H }
impl_endpoint_fn_for_fn! { A B C D E1 F G H I }
impl_endpoint_fn_for_fn! { A B C D E1 F G H I J }
impl_endpoint_fn_for_fn! { A B C D E1 F G H I J K }
impl_endpoint_fn_for_fn! { A B C D E1 F G H I J K L }

#[cfg(test)]
mod tests {
    use crate::fn_trait::EndpointFn;
    use switchyard_http::protocol::{PathParams, Request};

    struct Api;

    fn assert_is_endpoint_fn<Args, F: EndpointFn<Api, Args>>(_f: F) {
        //noop
    }

    impl Api {
        fn foo0(&self) {}
        fn foo1(&self, _a: Request) {}
        fn foo2(&self, _a1: Request, _a2: PathParams) -> String {
            String::new()
        }
        #[allow(clippy::too_many_arguments, reason = "arity coverage")]
        fn foo12(
            &self,
            _a1: Request,
            _a2: PathParams,
            _a3: (),
            _a4: (),
            _a5: (),
            _a6: (),
            _a7: (),
            _a8: (),
            _a9: (),
            _a10: (),
            _a11: (),
            _a12: (),
        ) {
        }
    }

    #[test]
    fn test_fn_is_endpoint_fn() {
        assert_is_endpoint_fn(Api::foo0);
        assert_is_endpoint_fn(Api::foo1);
        assert_is_endpoint_fn(Api::foo2);
        assert_is_endpoint_fn(Api::foo12);
        assert_is_endpoint_fn(|_: &Api, _: Request| "closure");
    }

    #[test]
    fn call_passes_endpoints_and_args() {
        struct Counter(u32);
        let f = |c: &Counter, add: u32| c.0 + add;
        assert_eq!(EndpointFn::<Counter, (u32,)>::call(&f, &Counter(40), (2,)), 42);
    }
}
