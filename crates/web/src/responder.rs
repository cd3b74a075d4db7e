//! Conversion of handler return values into responses.
//!
//! The [`Responder`] trait defines how a handler's return value becomes a `Response<Body>`.
//! Returning `()` (or `Result<(), E>`) declares the handler *void*: the dispatch engine answers
//! `200 OK` with an empty body on success.

use http::{Response, StatusCode};
use switchyard_http::protocol::response::{response_of, response_with};
use switchyard_http::protocol::{Body, BoxError};

/// A type handlers can return.
pub trait Responder {
    /// `true` when the handler produces no content of its own.
    const VOID: bool = false;

    fn into_response(self) -> Result<Response<Body>, BoxError>;
}

/// Errors are raised to the dispatch engine and classified into an error response.
impl<T: Responder, E: Into<BoxError>> Responder for Result<T, E> {
    const VOID: bool = T::VOID;

    fn into_response(self) -> Result<Response<Body>, BoxError> {
        match self {
            Ok(t) => t.into_response(),
            Err(e) => Err(e.into()),
        }
    }
}

/// `None` answers `204 No Content`.
impl<T: Responder> Responder for Option<T> {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        match self {
            Some(t) => t.into_response(),
            None => Ok(response_of(Body::empty())),
        }
    }
}

impl Responder for Response<Body> {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        Ok(self)
    }
}

impl Responder for Body {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        Ok(response_of(self))
    }
}

impl<T: Responder> Responder for (StatusCode, T) {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        let (status, responder) = self;
        let mut response = responder.into_response()?;
        *response.status_mut() = status;
        Ok(response)
    }
}

impl Responder for () {
    const VOID: bool = true;

    fn into_response(self) -> Result<Response<Body>, BoxError> {
        Ok(response_with(StatusCode::OK, Body::empty()))
    }
}

impl Responder for &'static str {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        Ok(response_of(Body::from(self)))
    }
}

impl Responder for String {
    fn into_response(self) -> Result<Response<Body>, BoxError> {
        Ok(response_of(Body::from(self)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use switchyard_http::protocol::ServeError;

    const fn is_void<R: Responder>() -> bool {
        R::VOID
    }

    #[test]
    fn void_types() {
        assert!(is_void::<()>());
        assert!(is_void::<Result<(), ServeError>>());
        assert!(!is_void::<String>());
        assert!(!is_void::<Result<Body, BoxError>>());
    }

    #[test]
    fn strings_are_text() {
        let response = "hi".into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().mime(), &mime::TEXT_PLAIN);

        let response = String::new().into_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[test]
    fn status_tuple_overrides() {
        let response = (StatusCode::CREATED, Body::html("<p>made</p>")).into_response().unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body().mime(), &mime::TEXT_HTML);
    }

    #[test]
    fn errors_are_raised() {
        let result: Result<String, ServeError> = Err(ServeError::bad_request("nope"));
        let err = result.into_response().unwrap_err();
        assert_eq!(err.downcast_ref::<ServeError>().map(ServeError::status), Some(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn none_is_no_content() {
        let response = Option::<String>::None.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
