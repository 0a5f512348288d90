//! sockfiled: the receiving end of sockfile.
//!
//! Listens for TCP connections and writes each connection's bytes to a
//! new timestamped file.

pub mod naming;
pub mod sink;

pub use naming::{human_bytes, NamingScheme};
pub use sink::{receive_session, SessionReport, Sink};
