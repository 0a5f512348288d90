//! Formatted output on top of the raw byte primitive.
//!
//! `SocketFile` is an `io::Write`, so `write!`/`writeln!` work on it.
//! `Append` adds chainable appends for any writer:
//!
//! ```no_run
//! use sockfile_core::{Append, SocketFile};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut f = SocketFile::new();
//! f.append('1')?.append("23456")?.append(78)?;
//! # Ok(())
//! # }
//! ```

use std::fmt::Display;
use std::io::{self, Write};

use crate::socket_file::SocketFile;
use crate::transport::Connector;

impl<C: Connector> Write for SocketFile<C> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // 0 for a non-empty buf tells write_all the sink is gone (WriteZero).
        Ok(self.write_bytes(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sync()
    }
}

pub trait Append: Write {
    fn append_bytes(&mut self, bytes: &[u8]) -> io::Result<&mut Self> {
        self.write_all(bytes)?;
        Ok(self)
    }

    /// Append `value` rendered with `Display`.
    fn append<T: Display>(&mut self, value: T) -> io::Result<&mut Self> {
        write!(self, "{value}")?;
        Ok(self)
    }
}

impl<W: Write + ?Sized> Append for W {}
