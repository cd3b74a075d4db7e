//! Helpers building `http::Response<Body>` values with consistent entity headers.

use crate::protocol::Body;
use http::header::{self, HeaderValue};
use http::{Response, StatusCode};

/// A response with the given status, its `Content-Type` and `Content-Length` derived from `body`.
pub fn response_with(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    normalize(&mut response);
    response
}

/// `204 No Content` for an empty body, `200 OK` otherwise.
pub fn response_of(body: Body) -> Response<Body> {
    let status = if body.is_empty() { StatusCode::NO_CONTENT } else { StatusCode::OK };
    response_with(status, body)
}

pub fn error_response(status: StatusCode, body: Body) -> Response<Body> {
    response_with(status, body)
}

/// Rewrites the entity headers from the body.
///
/// `Content-Type` follows the body's mime. `Content-Length` is set when the size is known and
/// removed otherwise. Responses that cannot carry content (`1xx`, `204`) keep their
/// `Content-Type` and lose any `Content-Length`.
pub fn normalize(response: &mut Response<Body>) {
    let status = response.status();
    if status.is_informational() || status == StatusCode::NO_CONTENT {
        response.headers_mut().remove(header::CONTENT_LENGTH);
        return;
    }

    let content_type = HeaderValue::from_str(response.body().mime().as_ref()).ok();
    let size = response.body().size();
    let headers = response.headers_mut();

    match content_type {
        Some(value) => headers.insert(header::CONTENT_TYPE, value),
        None => headers.remove(header::CONTENT_TYPE),
    };

    match size {
        Some(size) => headers.insert(header::CONTENT_LENGTH, HeaderValue::from(size)),
        None => headers.remove(header::CONTENT_LENGTH),
    };
}
