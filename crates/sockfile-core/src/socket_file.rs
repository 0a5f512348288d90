//! `SocketFile`: a remote file reached over one TCP connection.
//!
//! Owns exactly one connection handle and one chunk buffer. Every session
//! (open → close) becomes one file on the listener. Dropping an open
//! adapter flushes and closes it.
//!
//! Failure policy: a failed transmission faults the connection. Buffered
//! bytes are discarded, further writes accept nothing, and the adapter
//! must be closed and reopened before it carries data again.

use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::num::NonZeroUsize;

use crate::chunk::{self, ChunkBuffer, SessionStats};
use crate::error::OpenError;
use crate::platform::DEFAULT_CAPACITY;
use crate::transport::{Connector, Link, TcpConnector};

pub struct SocketFile<C: Connector = TcpConnector> {
    connector: C,
    link: Option<C::Link>,
    peer: Option<SocketAddrV4>,
    buffer: ChunkBuffer,
    stats: SessionStats,
    faulted: bool,
}

impl SocketFile<TcpConnector> {
    /// An unconnected adapter with the platform chunk capacity.
    pub fn new() -> Self {
        Self::with_connector(TcpConnector::new(), default_capacity())
    }

    /// An unconnected adapter with a custom chunk capacity.
    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self::with_connector(TcpConnector::new(), capacity)
    }

    /// Create an adapter and open it against `addr:port`.
    pub fn connect(addr: &str, port: u16) -> Result<Self, OpenError> {
        let mut file = Self::new();
        file.open(addr, port)?;
        Ok(file)
    }
}

impl Default for SocketFile<TcpConnector> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Connector> SocketFile<C> {
    pub fn with_connector(connector: C, capacity: NonZeroUsize) -> Self {
        Self {
            connector,
            link: None,
            peer: None,
            buffer: ChunkBuffer::new(capacity),
            stats: SessionStats::default(),
            faulted: false,
        }
    }

    /// Start a new session with the listener at `addr:port`.
    ///
    /// Any session still open is closed (and flushed) first. `addr` must
    /// be a numeric dotted IPv4 address; it is checked before any
    /// transport resource is allocated. On failure the adapter stays
    /// closed and may be opened again.
    pub fn open(&mut self, addr: &str, port: u16) -> Result<(), OpenError> {
        self.close();

        let ip: Ipv4Addr = addr
            .parse()
            .map_err(|_| OpenError::AddressFormat(addr.to_string()))?;
        let target = SocketAddrV4::new(ip, port);

        tracing::debug!(peer = %target, "connecting");
        let link = self.connector.connect(target)?;

        self.link = Some(link);
        self.peer = Some(target);
        self.buffer.clear();
        self.stats = SessionStats::default();
        self.faulted = false;

        tracing::debug!(
            peer = %target,
            capacity = self.buffer.capacity(),
            "session opened"
        );
        Ok(())
    }

    /// End the session: flush, shut down, release. No-op when closed.
    pub fn close(&mut self) {
        let Some(mut link) = self.link.take() else {
            return;
        };

        if !self.faulted {
            if let Err(e) = chunk::flush(&mut self.buffer, &mut link, &mut self.stats) {
                tracing::warn!(
                    error = %e,
                    dropped = self.buffer.len(),
                    "flush on close failed"
                );
            }
        }

        if let Err(e) = link.shutdown() {
            tracing::debug!(error = %e, "shutdown failed");
        }
        drop(link);

        tracing::debug!(
            peer = ?self.peer,
            bytes_sent = self.stats.bytes_sent,
            transmissions = self.stats.transmissions,
            faulted = self.faulted,
            "session closed"
        );

        self.buffer.clear();
        self.peer = None;
        self.faulted = false;
    }

    /// Append `data` to the stream. Returns the number of bytes accepted.
    ///
    /// Anything short of `data.len()` means the write failed: the adapter
    /// is closed, faulted, or a transmission just failed (which faults it).
    pub fn write_bytes(&mut self, data: &[u8]) -> usize {
        if self.faulted {
            return 0;
        }
        let Some(link) = self.link.as_mut() else {
            return 0;
        };

        match chunk::write_through(&mut self.buffer, link, data, &mut self.stats) {
            Ok(n) => n,
            Err(partial) => {
                self.fault(&partial.source);
                partial.accepted
            }
        }
    }

    /// Push buffered bytes to the listener now, as one short chunk.
    ///
    /// Always succeeds with nothing buffered, which includes every faulted
    /// session since a fault discards the buffer. Fails with `NotConnected`
    /// when closed, or with the transmission error (faulting the session).
    pub fn sync(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let Some(link) = self.link.as_mut() else {
            return Err(io::Error::new(
                io::ErrorKind::NotConnected,
                "socket file is not open",
            ));
        };

        let result = chunk::flush(&mut self.buffer, link, &mut self.stats);
        if let Err(e) = &result {
            self.fault(e);
        }
        result
    }

    fn fault(&mut self, cause: &io::Error) {
        tracing::warn!(
            peer = ?self.peer,
            error = %cause,
            dropped = self.buffer.len(),
            "transmission failed, connection faulted"
        );
        self.buffer.clear();
        self.faulted = true;
    }

    pub fn is_open(&self) -> bool {
        self.link.is_some()
    }

    /// Whether a transmission failed during the current session.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn peer_addr(&self) -> Option<SocketAddrV4> {
        self.peer
    }

    /// Bytes waiting for the next chunk.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }
}

impl<C: Connector> Drop for SocketFile<C> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<C: Connector> std::fmt::Debug for SocketFile<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SocketFile")
            .field("peer", &self.peer)
            .field("open", &self.is_open())
            .field("buffered", &self.buffer.len())
            .field("capacity", &self.buffer.capacity())
            .field("faulted", &self.faulted)
            .finish()
    }
}

pub(crate) fn default_capacity() -> NonZeroUsize {
    NonZeroUsize::new(DEFAULT_CAPACITY).unwrap_or(NonZeroUsize::MIN)
}
