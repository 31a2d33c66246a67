//! Typed error hierarchy for the webreq crate.
//!
//! Three failure kinds exist, matching the three boundaries a web request
//! can fail at:
//!
//! - [`WebError::Transport`] — the request never produced an HTTP response
//!   (DNS resolution, TCP connect, TLS handshake, timeout). Wraps the
//!   underlying `reqwest::Error`, which carries the transport diagnostics.
//! - [`WebError::Protocol`] — an HTTP exchange completed but violated the
//!   expected shape (e.g. a token handshake response without a `token`
//!   field).
//! - [`WebError::Response`] — the server answered with an error status code.
//!   One concrete [`ResponseError`] variant exists per mapped status code,
//!   with an explicit catch-all for everything else, so callers can match
//!   on the exact failure or on the enum generically.
//!
//! No variant is ever retried internally; every error propagates to the
//! immediate caller unchanged.

use reqwest::StatusCode;
use std::fmt;

/// Unified error type for all webreq library operations.
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A network-level failure occurred before any HTTP response existed
    /// (DNS resolution, TCP connection, TLS handshake, request timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// An HTTP exchange completed but its content violated the expected
    /// protocol shape — a missing token field in a handshake response, a
    /// header that cannot be encoded, a collection item without an
    /// identifying field.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The server answered with an HTTP error status code. The inner
    /// [`ResponseError`] identifies the exact code and carries the raw
    /// response body for diagnostics.
    #[error(transparent)]
    Response(#[from] ResponseError),
}

impl WebError {
    /// Returns the HTTP status code for response errors, `None` for
    /// transport and protocol failures (no status exists there).
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            WebError::Response(err) => Some(err.status()),
            _ => None,
        }
    }
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, WebError>;

/// One concrete error variant per mapped HTTP status code.
///
/// The variant set is closed: every status code in the mapping below gets
/// its own variant, and anything else lands in [`ResponseError::Other`],
/// which records the actual code. The carried status therefore always
/// equals the status the server really returned.
///
/// Every variant carries the raw response body text (possibly empty) so
/// server-side diagnostics survive into the error message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// Response status code was 400.
    BadRequest {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 401.
    Unauthorized {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 403.
    Forbidden {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 404.
    NotFound {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 405.
    MethodNotAllowed {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 406.
    NotAcceptable {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 408.
    RequestTimeout {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 409.
    Conflict {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 415.
    UnsupportedMediaType {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 416.
    RangeNotSatisfiable {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 500.
    InternalServerError {
        /// Raw response body text.
        body: String,
    },
    /// Response status code was 503.
    ServiceUnavailable {
        /// Raw response body text.
        body: String,
    },
    /// Any other error status code. Carries the actual code alongside the
    /// body so nothing is lost for codes outside the mapped set.
    Other {
        /// The HTTP status code the server returned.
        status: StatusCode,
        /// Raw response body text.
        body: String,
    },
}

impl ResponseError {
    /// Maps a status code to its variant. Codes outside the mapped set
    /// produce [`ResponseError::Other`] with the code preserved.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::BAD_REQUEST => ResponseError::BadRequest { body },
            StatusCode::UNAUTHORIZED => ResponseError::Unauthorized { body },
            StatusCode::FORBIDDEN => ResponseError::Forbidden { body },
            StatusCode::NOT_FOUND => ResponseError::NotFound { body },
            StatusCode::METHOD_NOT_ALLOWED => ResponseError::MethodNotAllowed { body },
            StatusCode::NOT_ACCEPTABLE => ResponseError::NotAcceptable { body },
            StatusCode::REQUEST_TIMEOUT => ResponseError::RequestTimeout { body },
            StatusCode::CONFLICT => ResponseError::Conflict { body },
            StatusCode::UNSUPPORTED_MEDIA_TYPE => ResponseError::UnsupportedMediaType { body },
            StatusCode::RANGE_NOT_SATISFIABLE => ResponseError::RangeNotSatisfiable { body },
            StatusCode::INTERNAL_SERVER_ERROR => ResponseError::InternalServerError { body },
            StatusCode::SERVICE_UNAVAILABLE => ResponseError::ServiceUnavailable { body },
            _ => ResponseError::Other { status, body },
        }
    }

    /// The HTTP status code this error corresponds to.
    pub fn status(&self) -> StatusCode {
        match self {
            ResponseError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ResponseError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            ResponseError::Forbidden { .. } => StatusCode::FORBIDDEN,
            ResponseError::NotFound { .. } => StatusCode::NOT_FOUND,
            ResponseError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ResponseError::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            ResponseError::RequestTimeout { .. } => StatusCode::REQUEST_TIMEOUT,
            ResponseError::Conflict { .. } => StatusCode::CONFLICT,
            ResponseError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ResponseError::RangeNotSatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
            ResponseError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ResponseError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            ResponseError::Other { status, .. } => *status,
        }
    }

    /// The raw response body text carried by this error.
    pub fn body(&self) -> &str {
        match self {
            ResponseError::BadRequest { body }
            | ResponseError::Unauthorized { body }
            | ResponseError::Forbidden { body }
            | ResponseError::NotFound { body }
            | ResponseError::MethodNotAllowed { body }
            | ResponseError::NotAcceptable { body }
            | ResponseError::RequestTimeout { body }
            | ResponseError::Conflict { body }
            | ResponseError::UnsupportedMediaType { body }
            | ResponseError::RangeNotSatisfiable { body }
            | ResponseError::InternalServerError { body }
            | ResponseError::ServiceUnavailable { body }
            | ResponseError::Other { body, .. } => body,
        }
    }
}

impl fmt::Display for ResponseError {
    /// Renders as `"<code> - <body>"`, or just the code when the body is
    /// empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let body = self.body();
        if body.is_empty() {
            write!(f, "{}", self.status().as_u16())
        } else {
            write!(f, "{} - {}", self.status().as_u16(), body)
        }
    }
}

impl std::error::Error for ResponseError {}
