use crate::registry::Registry;
use http::{Response, StatusCode};
use std::sync::Arc;
use switchyard_http::protocol::body::ChannelBody;
use switchyard_http::protocol::response::{error_response, response_with};
use switchyard_http::protocol::{Body, PathParams, Request, Verb};
use tracing::error;

impl Registry {
    /// Runs [`dispatch`](Registry::dispatch) on the blocking thread pool of the tokio runtime.
    ///
    /// The response body is converted into a [`ChannelBody`], so a streamed body is pulled on a
    /// blocking thread as the transport polls it.
    pub async fn dispatch_async<F>(self: &Arc<Self>, verb: Verb, path: impl Into<String>, make_request: F) -> Response<ChannelBody>
    where
        F: FnOnce(PathParams) -> Request + Send + 'static,
    {
        let registry = Arc::clone(self);
        let path = path.into();

        let response = match tokio::task::spawn_blocking(move || registry.dispatch(verb, &path, make_request)).await {
            Ok(response) => response,
            Err(e) => {
                error!(cause = %e, "dispatch task failed");
                error_response(StatusCode::INTERNAL_SERVER_ERROR, Body::error_page(StatusCode::INTERNAL_SERVER_ERROR))
            }
        };

        let (parts, body) = response.into_parts();
        match body.into_channel_body() {
            Ok(body) => Response::from_parts(parts, body),
            Err(e) => {
                error!(cause = %e, "failed to start streaming the response body");
                let (parts, _) = response_with(StatusCode::INTERNAL_SERVER_ERROR, Body::empty()).into_parts();
                Response::from_parts(parts, ChannelBody::empty())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::{Endpoints, Routes};
    use crate::logger::SilentLogger;
    use http_body_util::BodyExt;
    use std::io::Write;

    struct Stream;

    impl Endpoints for Stream {
        fn routes(routes: &mut Routes<Self>) {
            routes.get("/numbers/*", Stream::numbers);
        }
    }

    impl Stream {
        fn numbers(&self, params: PathParams) -> Result<Body, std::num::ParseIntError> {
            let count: usize = params.get(0).unwrap_or_default().parse()?;
            Ok(Body::producer(None, move |sink: &mut dyn Write| {
                for i in 0..count {
                    writeln!(sink, "{i}")?;
                }
                Ok(())
            })
            .with_mime(mime::TEXT_PLAIN))
        }
    }

    fn registry() -> Arc<Registry> {
        let registry = Registry::builder().logger(SilentLogger).build();
        registry.register(Stream).unwrap();
        Arc::new(registry)
    }

    #[tokio::test]
    async fn streams_producer_bodies() {
        let registry = registry();
        let response = registry.dispatch_async(Verb::Get, "/numbers/5000", |params| Request::builder("/numbers/5000").params(params).build()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(!response.headers().contains_key(http::header::CONTENT_LENGTH));

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let expected: String = (0..5000).map(|i| format!("{i}\n")).collect();
        assert_eq!(bytes, expected.as_bytes());
    }

    #[tokio::test]
    async fn errors_become_error_pages() {
        let registry = registry();

        let response = registry.dispatch_async(Verb::Get, "/numbers/many", |params| Request::builder("/").params(params).build()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = registry.dispatch_async(Verb::Get, "/missing", |_| unreachable!()).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert!(String::from_utf8_lossy(&bytes).contains("404"));
    }
}
