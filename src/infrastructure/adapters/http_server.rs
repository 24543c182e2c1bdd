//! HTTP server on top of embassy-net
//!
//! [`TcpListener`] hands out one socket at a time over a single pair of
//! RX/TX buffers, which is all the serial HTTP server needs.

use embassy_net::Stack;
use embassy_net::tcp::{AcceptError, TcpSocket};
use embassy_time::Duration;
use log::error;

use crate::config::HTTP;
use crate::core::net::http::{Connection, Error, HttpServer, Listener};

const RX_BUFFER_SIZE: usize = 4096;
const TX_BUFFER_SIZE: usize = 4096;

pub struct TcpListener<'a> {
    stack: Stack<'a>,
    port: u16,
    rx_buffer: &'a mut [u8],
    tx_buffer: &'a mut [u8],
}

impl<'a> TcpListener<'a> {
    pub fn new(
        stack: Stack<'a>,
        port: u16,
        rx_buffer: &'a mut [u8],
        tx_buffer: &'a mut [u8],
    ) -> Self {
        Self {
            stack,
            port,
            rx_buffer,
            tx_buffer,
        }
    }
}

impl Listener for TcpListener<'_> {
    type Connection<'c>
        = TcpSocket<'c>
    where
        Self: 'c;

    async fn accept(&mut self) -> Result<TcpSocket<'_>, Error> {
        let mut socket = TcpSocket::new(self.stack, self.rx_buffer, self.tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(HTTP.socket_timeout_secs)));

        match socket.accept(self.port).await {
            Ok(()) => Ok(socket),
            Err(AcceptError::ConnectionReset) => Err(Error::Closed),
            Err(AcceptError::InvalidPort | AcceptError::InvalidState) => Err(Error::Bind),
        }
    }
}

impl Connection for TcpSocket<'_> {
    async fn close(&mut self) {
        TcpSocket::close(self);
        // Wait until the peer has acknowledged everything
        let _ = embedded_io_async::Write::flush(self).await;
    }
}

/// Serve `server` on [`HTTP`]`.port` until it is stopped.
///
/// This function allocates 8KB of buffers on the stack (4KB RX + 4KB TX).
/// Ensure the calling task has sufficient stack size!
pub async fn run_http_server<C>(stack: Stack<'_>, server: &HttpServer<'_, C>) {
    let mut rx_buffer = [0u8; RX_BUFFER_SIZE];
    let mut tx_buffer = [0u8; TX_BUFFER_SIZE];
    let mut listener = TcpListener::new(stack, HTTP.port, &mut rx_buffer, &mut tx_buffer);

    if let Err(err) = server.listen_and_serve(&mut listener).await {
        error!("http_server: stopped with error: {:?}", err);
    }
}
