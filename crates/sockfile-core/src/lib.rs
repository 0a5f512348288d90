//! sockfile-core: write a file on a remote host through a TCP socket.
//!
//! `SocketFile` batches arbitrary writes into TCP-segment-sized chunks
//! and streams them to a listener, which stores each connection as one
//! file. The stream is raw bytes: no framing, no encryption.

pub mod append;
pub mod chunk;
pub mod config;
pub mod error;
pub mod platform;
pub mod socket_file;
pub mod transport;

#[cfg(test)]
mod testing;

pub use append::Append;
pub use chunk::SessionStats;
pub use error::OpenError;
pub use platform::DEFAULT_CAPACITY;
pub use socket_file::SocketFile;
pub use transport::{Connector, Link, TcpConnector};
