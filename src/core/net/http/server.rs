use alloc::vec;

use embassy_futures::select::{Either, select};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_io_async::{Read, Write};
use log::{debug, error, info, warn};

use super::request::{find_head_end, header_value};
use super::{Error, HandlerError, HttpResult, Request, Response, Router, StatusCode, io_error};
use crate::config::REQUEST_BUFFER_SIZE;

/// Accepted client connection
#[allow(async_fn_in_trait)]
pub trait Connection: Read + Write {
    /// Shut the connection down once the response is written.
    ///
    /// Dropping the connection is enough unless the transport needs an
    /// orderly close.
    async fn close(&mut self) {}
}

/// Source of incoming connections
#[allow(async_fn_in_trait)]
pub trait Listener {
    type Connection<'a>: Connection
    where
        Self: 'a;

    /// Wait for the next connection.
    ///
    /// [`Error::Bind`] is fatal and stops the server; any other error only
    /// drops the pending connection.
    async fn accept(&mut self) -> Result<Self::Connection<'_>, Error>;
}

/// What happened on a connection that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The peer closed without sending anything
    Idle,
    Served(StatusCode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionErrorKind {
    Parse,
    TooLarge,
    Handler,
    Io,
}

/// Failure at the connection boundary.
///
/// Every variant except `Io` still got an error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionError {
    Parse,
    TooLarge,
    Handler(HandlerError),
    Io(Error),
}

impl ConnectionError {
    pub fn kind(&self) -> ConnectionErrorKind {
        match self {
            ConnectionError::Parse => ConnectionErrorKind::Parse,
            ConnectionError::TooLarge => ConnectionErrorKind::TooLarge,
            ConnectionError::Handler(_) => ConnectionErrorKind::Handler,
            ConnectionError::Io(_) => ConnectionErrorKind::Io,
        }
    }
}

impl From<Error> for ConnectionError {
    fn from(err: Error) -> Self {
        ConnectionError::Io(err)
    }
}

/// Builds the response for a request whose handler failed
pub type ErrorHandler = fn(&HandlerError, &mut Response<'_>);

/// Serial HTTP server: one connection is read, answered and closed before
/// the next one is accepted.
pub struct HttpServer<'a, C> {
    router: &'a Router<C>,
    context: &'a C,
    on_error: ErrorHandler,
    stop: Signal<CriticalSectionRawMutex, ()>,
}

impl<'a, C> HttpServer<'a, C> {
    pub fn new(router: &'a Router<C>, context: &'a C) -> Self {
        Self {
            router,
            context,
            on_error: default_error,
            stop: Signal::new(),
        }
    }

    /// Replace the default 500 page for failed handlers
    #[must_use]
    pub fn on_error(mut self, handler: ErrorHandler) -> Self {
        self.on_error = handler;
        self
    }

    /// Make [`Self::listen_and_serve`] return once it is waiting for the
    /// next connection. A connection in progress is finished first.
    pub fn stop(&self) {
        self.stop.signal(());
    }

    pub async fn listen_and_serve(&self, listener: &mut impl Listener) -> HttpResult {
        info!("http: serving");
        loop {
            let accepted = match select(listener.accept(), self.stop.wait()).await {
                Either::First(accepted) => accepted,
                Either::Second(()) => {
                    info!("http: stopped");
                    return Ok(());
                }
            };
            let mut connection = match accepted {
                Ok(connection) => connection,
                Err(Error::Bind) => {
                    error!("http: failed to listen");
                    return Err(Error::Bind);
                }
                Err(err) => {
                    debug!("http: accept failed: {:?}", err);
                    continue;
                }
            };

            match self.serve_connection(&mut connection).await {
                Ok(Outcome::Idle) => debug!("http: idle connection closed"),
                Ok(Outcome::Served(status)) => debug!("http: served {}", status),
                Err(err) => log_connection_error(err),
            }
            connection.close().await;
        }
    }

    /// Read one request from `socket`, dispatch it and write the response
    pub async fn serve_connection<S: Read + Write>(
        &self,
        socket: &mut S,
    ) -> Result<Outcome, ConnectionError> {
        let mut buffer = vec![0u8; REQUEST_BUFFER_SIZE];
        let len = match read_request(socket, &mut buffer).await {
            Ok(len) => len,
            Err(Error::TooLarge) => {
                let mut response = Response::new();
                response.error(413, "Request Entity Too Large");
                response.write_to(socket).await?;
                return Err(ConnectionError::TooLarge);
            }
            Err(err) => return Err(ConnectionError::Io(err)),
        };
        let raw = &buffer[..len];
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Outcome::Idle);
        }

        let Ok(mut request) = Request::parse(raw) else {
            let mut response = Response::new();
            response.error(400, "Bad Request");
            response.write_to(socket).await?;
            return Err(ConnectionError::Parse);
        };

        let mut response = Response::new();
        let result = self.router.dispatch(self.context, &mut request, &mut response);
        if let Err(err) = &result {
            response = Response::new();
            (self.on_error)(err, &mut response);
        }
        response.write_to(socket).await?;

        match result {
            Ok(()) => Ok(Outcome::Served(response.status_code())),
            Err(err) => Err(ConnectionError::Handler(err)),
        }
    }
}

fn default_error(err: &HandlerError, response: &mut Response<'_>) {
    response.error(500, err.message());
}

fn log_connection_error(err: ConnectionError) {
    match err {
        ConnectionError::Parse => warn!("http: malformed request"),
        ConnectionError::TooLarge => warn!("http: request too large"),
        ConnectionError::Handler(err) => error!("http: handler failed: {}", err.message()),
        ConnectionError::Io(err) => warn!("http: connection error: {:?}", err),
    }
}

/// Read a whole request into `buffer` and return its length.
///
/// Reading stops at end of stream, or once the head and `Content-Length`
/// bytes of body have arrived. Without `Content-Length` the body is
/// whatever arrived together with the head. A request that cannot fit is
/// [`Error::TooLarge`].
async fn read_request(
    socket: &mut impl Read,
    buffer: &mut [u8],
) -> Result<usize, Error> {
    let mut len = 0;
    let head_end = loop {
        if let Some(end) = find_head_end(&buffer[..len]) {
            break end;
        }
        if len == buffer.len() {
            return Err(Error::TooLarge);
        }
        let n = socket.read(&mut buffer[len..]).await.map_err(io_error)?;
        if n == 0 {
            return Ok(len);
        }
        len += n;
    };

    let content_length = core::str::from_utf8(&buffer[..head_end])
        .ok()
        .and_then(|head| header_value(head, "content-length"))
        .and_then(|value| value.parse::<usize>().ok());
    let Some(content_length) = content_length else {
        return Ok(len);
    };
    let total = head_end.checked_add(content_length).ok_or(Error::TooLarge)?;
    if total > buffer.len() {
        return Err(Error::TooLarge);
    }

    while len < total {
        let n = socket.read(&mut buffer[len..total]).await.map_err(io_error)?;
        if n == 0 {
            break;
        }
        len += n;
    }
    Ok(len.min(total))
}
