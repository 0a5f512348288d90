//! Errors raised while opening a connection.
//!
//! Only `open` reports through this type. Transmission failures during
//! `write_bytes` / `sync` come back as an accepted byte count or a plain
//! `io::Result`, the convention of the byte-sink layer.

use std::io;
use std::net::SocketAddrV4;

use crate::platform;

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    /// The address text is not a numeric dotted IPv4 address.
    #[error("server IP was provided in a wrong format '{0}'")]
    AddressFormat(String),

    /// The local socket could not be allocated.
    #[error(
        "socket creation error ({} == {code}: {})",
        platform::ERROR_SOURCE,
        platform::describe(*.code)
    )]
    ConnectionCreate {
        code: i32,
        #[source]
        source: io::Error,
    },

    /// The remote endpoint refused, reset or timed out the attempt.
    #[error(
        "socket connection error to {addr} ({} == {code}: {}){}",
        platform::ERROR_SOURCE,
        platform::describe(*.code),
        hint_suffix(.hint)
    )]
    ConnectionEstablish {
        addr: SocketAddrV4,
        code: i32,
        hint: Option<&'static str>,
        #[source]
        source: io::Error,
    },
}

impl OpenError {
    pub fn create(source: io::Error) -> Self {
        OpenError::ConnectionCreate {
            code: os_code(&source),
            source,
        }
    }

    pub fn establish(addr: SocketAddrV4, source: io::Error) -> Self {
        let code = os_code(&source);
        OpenError::ConnectionEstablish {
            addr,
            code,
            hint: platform::connect_hint(code),
            source,
        }
    }

    /// Platform error code carried by the error, if any.
    pub fn code(&self) -> Option<i32> {
        match self {
            OpenError::AddressFormat(_) => None,
            OpenError::ConnectionCreate { code, .. }
            | OpenError::ConnectionEstablish { code, .. } => Some(*code),
        }
    }

    /// Whether trying again later can succeed without the caller changing
    /// the arguments.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, OpenError::AddressFormat(_))
    }
}

fn os_code(err: &io::Error) -> i32 {
    err.raw_os_error().unwrap_or(-1)
}

fn hint_suffix(hint: &Option<&'static str>) -> String {
    match hint {
        Some(h) => format!(" ({h})"),
        None => String::new(),
    }
}
