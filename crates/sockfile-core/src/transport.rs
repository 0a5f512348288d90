//! Transport seam: how the adapter reaches the network.
//!
//! `Connector` turns an address into a live `Link`; a `Link` moves bytes
//! and signals end-of-stream. Releasing the transport resource is `Drop`.
//! The production pair is `TcpConnector` / `socket2::Socket`.

use std::io;
use std::net::{Shutdown, SocketAddrV4};
use std::time::Duration;

use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use crate::error::OpenError;

/// One open connection.
pub trait Link {
    /// Hand `chunk` to the transport. Returns how many bytes it took.
    fn transmit(&mut self, chunk: &[u8]) -> io::Result<usize>;

    /// Orderly shutdown of both directions.
    fn shutdown(&mut self) -> io::Result<()>;
}

/// Factory for links.
pub trait Connector {
    type Link: Link;

    /// Allocate a transport resource and connect it to `addr`.
    ///
    /// Allocation failure is `OpenError::ConnectionCreate`; a failed
    /// connection attempt is `OpenError::ConnectionEstablish`.
    fn connect(&mut self, addr: SocketAddrV4) -> Result<Self::Link, OpenError>;
}

/// Blocking IPv4 TCP connector.
#[derive(Debug, Clone, Default)]
pub struct TcpConnector {
    connect_timeout: Option<Duration>,
}

impl TcpConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the connection attempt. Without this the platform's own
    /// connect timeout applies.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout
    }
}

impl Connector for TcpConnector {
    type Link = Socket;

    fn connect(&mut self, addr: SocketAddrV4) -> Result<Socket, OpenError> {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(OpenError::create)?;

        let target = SockAddr::from(addr);
        let connected = match self.connect_timeout {
            Some(timeout) => socket.connect_timeout(&target, timeout),
            None => socket.connect(&target),
        };
        // On failure the socket drops here, releasing the descriptor.
        connected.map_err(|e| OpenError::establish(addr, e))?;

        Ok(socket)
    }
}

impl Link for Socket {
    fn transmit(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.send(chunk)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        Socket::shutdown(self, Shutdown::Both)
    }
}
