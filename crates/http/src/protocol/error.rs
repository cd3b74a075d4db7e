use http::StatusCode;
use std::error::Error;
use std::io;
use thiserror::Error;

/// Boxed error type returned by handlers, hooks and body producers.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// An error raised on purpose by request handling code, carrying the status it should produce.
///
/// The status is always a client or server error (`400..=599`); anything else passed to
/// [`ServeError::new`] is replaced by `500 Internal Server Error`.
#[derive(Error, Debug)]
#[error("{status}: {message}")]
pub struct ServeError {
    status: StatusCode,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ServeError {
    pub fn new<S: ToString>(status: StatusCode, message: S) -> Self {
        let status = if status.is_client_error() || status.is_server_error() {
            status
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        Self { status, message: message.to_string(), source: None }
    }

    pub fn with_source<E: Into<BoxError>>(mut self, source: E) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn bad_request<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn body_format<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn missing_cookie(name: &str) -> Self {
        Self::new(StatusCode::BAD_REQUEST, format!("missing cookie \"{name}\""))
    }

    pub fn internal<S: ToString>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug)]
pub enum BodyError {
    #[error("body is not valid utf-8: {source}")]
    InvalidUtf8 {
        #[from]
        source: std::string::FromUtf8Error,
    },

    #[error("malformed urlencoded data: {source}")]
    Malformed {
        #[from]
        source: serde_urlencoded::de::Error,
    },

    #[error("body has been consumed")]
    Consumed,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl BodyError {
    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }

    /// The status a handler failing with this error should produce.
    pub fn status(&self) -> StatusCode {
        match self {
            BodyError::InvalidUtf8 { .. } | BodyError::Malformed { .. } => StatusCode::BAD_REQUEST,
            BodyError::Consumed | BodyError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<BodyError> for ServeError {
    fn from(e: BodyError) -> Self {
        let status = e.status();
        ServeError::new(status, "invalid request body").with_source(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_error_rejects_non_error_status() {
        assert_eq!(ServeError::new(StatusCode::OK, "fine").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ServeError::new(StatusCode::IM_A_TEAPOT, "tea").status(), StatusCode::IM_A_TEAPOT);
        assert_eq!(ServeError::new(StatusCode::BAD_GATEWAY, "upstream").status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn missing_cookie_is_bad_request() {
        let e = ServeError::missing_cookie("session");
        assert_eq!(e.status(), StatusCode::BAD_REQUEST);
        assert_eq!(e.message(), "missing cookie \"session\"");
    }

    #[test]
    fn body_error_status() {
        let utf8 = String::from_utf8(vec![0xff, 0xfe]).unwrap_err();
        assert_eq!(BodyError::from(utf8).status(), StatusCode::BAD_REQUEST);
        assert_eq!(BodyError::Consumed.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let serve: ServeError = BodyError::Consumed.into();
        assert_eq!(serve.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(std::error::Error::source(&serve).is_some());
    }
}
