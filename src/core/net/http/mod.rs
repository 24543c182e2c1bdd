//! Minimal HTTP/1.1 engine
//!
//! One request per connection, no keep-alive, no chunked transfer. The
//! whole request must fit into a bounded buffer.

pub mod headers;
pub mod request;
pub mod response;
pub mod router;
pub mod server;
pub mod static_files;

use embedded_io_async::ErrorKind;

pub use headers::{ContentType, HttpMethod, StatusCode, reason_phrase};
pub use request::Request;
pub use response::{Body, Response};
pub use router::{Handler, Params, RequestFilter, RoutePattern, Router};
pub use server::{
    Connection,
    ConnectionError,
    ConnectionErrorKind,
    ErrorHandler,
    HttpServer,
    Listener,
    Outcome,
};
pub use static_files::StaticFiles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    Closed,
    Parse,
    TooLarge,
    FormatHeaders,
    Bind,
    Io(ErrorKind),
}

impl From<core::fmt::Error> for Error {
    fn from(_error: core::fmt::Error) -> Self {
        Error::FormatHeaders
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => Error::Closed,
            kind => Error::Io(kind),
        }
    }
}

impl From<embassy_net::tcp::Error> for Error {
    fn from(err: embassy_net::tcp::Error) -> Self {
        match err {
            embassy_net::tcp::Error::ConnectionReset => Error::Closed,
        }
    }
}

/// Map any socket error onto [`Error`]
pub(crate) fn io_error<E: embedded_io_async::Error>(err: E) -> Error {
    Error::from(err.kind())
}

pub type HttpResult<T = ()> = Result<T, Error>;

/// Failure reported by a route handler, answered with a 500
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerError {
    Serialize,
    Internal(&'static str),
}

impl HandlerError {
    pub fn message(&self) -> &'static str {
        match self {
            HandlerError::Serialize => "failed to serialize response",
            HandlerError::Internal(message) => message,
        }
    }
}

pub type HandlerResult = Result<(), HandlerError>;
