//! In-memory transport that records every transmission.

use std::io;
use std::net::SocketAddrV4;
use std::sync::{Arc, Mutex};

use crate::error::OpenError;
use crate::transport::{Connector, Link};

#[derive(Debug, Clone, Copy, Default)]
pub enum Behavior {
    #[default]
    Deliver,
    /// Deliver this many transmissions, then fail with `BrokenPipe`.
    FailAfter(usize),
    /// Accept one byte fewer than asked.
    ShortSends,
    /// Report `Interrupted` on the first attempt only.
    InterruptedOnce,
}

#[derive(Debug, Default, Clone)]
pub struct RecordedSession {
    pub addr: Option<SocketAddrV4>,
    pub chunks: Vec<Vec<u8>>,
    pub shut_down: bool,
    pub released: bool,
}

impl RecordedSession {
    pub fn bytes(&self) -> Vec<u8> {
        self.chunks.concat()
    }
}

/// Shared view of everything the recording links saw.
#[derive(Debug, Default, Clone)]
pub struct Wire {
    sessions: Arc<Mutex<Vec<RecordedSession>>>,
}

impl Wire {
    pub fn sessions(&self) -> Vec<RecordedSession> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn session(&self, index: usize) -> RecordedSession {
        self.sessions()[index].clone()
    }

    fn begin(&self, addr: Option<SocketAddrV4>) -> usize {
        let mut sessions = self.sessions.lock().unwrap();
        sessions.push(RecordedSession {
            addr,
            ..RecordedSession::default()
        });
        sessions.len() - 1
    }

    fn with<R>(&self, index: usize, f: impl FnOnce(&mut RecordedSession) -> R) -> R {
        f(&mut self.sessions.lock().unwrap()[index])
    }
}

#[derive(Debug)]
pub struct RecordingLink {
    wire: Wire,
    index: usize,
    behavior: Behavior,
    attempts: usize,
}

impl Default for RecordingLink {
    fn default() -> Self {
        Self::with_behavior(Wire::default(), None, Behavior::Deliver)
    }
}

impl RecordingLink {
    fn with_behavior(wire: Wire, addr: Option<SocketAddrV4>, behavior: Behavior) -> Self {
        let index = wire.begin(addr);
        Self {
            wire,
            index,
            behavior,
            attempts: 0,
        }
    }

    pub fn failing_after(n: usize) -> Self {
        Self::with_behavior(Wire::default(), None, Behavior::FailAfter(n))
    }

    pub fn short_sends() -> Self {
        Self::with_behavior(Wire::default(), None, Behavior::ShortSends)
    }

    pub fn interrupted_once() -> Self {
        Self::with_behavior(Wire::default(), None, Behavior::InterruptedOnce)
    }

    pub fn chunks(&self) -> Vec<Vec<u8>> {
        self.wire.session(self.index).chunks
    }
}

impl Link for RecordingLink {
    fn transmit(&mut self, chunk: &[u8]) -> io::Result<usize> {
        self.attempts += 1;
        let delivered = self.wire.session(self.index).chunks.len();
        let taken = match self.behavior {
            Behavior::Deliver => chunk.len(),
            Behavior::FailAfter(n) if delivered >= n => {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "link down"));
            }
            Behavior::FailAfter(_) => chunk.len(),
            Behavior::ShortSends => chunk.len().saturating_sub(1),
            Behavior::InterruptedOnce if self.attempts == 1 => {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            Behavior::InterruptedOnce => chunk.len(),
        };
        self.wire
            .with(self.index, |s| s.chunks.push(chunk[..taken].to_vec()));
        Ok(taken)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        self.wire.with(self.index, |s| s.shut_down = true);
        Ok(())
    }
}

impl Drop for RecordingLink {
    fn drop(&mut self) {
        self.wire.with(self.index, |s| s.released = true);
    }
}

/// Hands out recording links; can be told to refuse connections.
#[derive(Debug, Default)]
pub struct RecordingConnector {
    pub wire: Wire,
    pub behavior: Behavior,
    pub refuse: bool,
    pub attempts: usize,
}

impl RecordingConnector {
    pub fn new() -> (Self, Wire) {
        let connector = Self::default();
        let wire = connector.wire.clone();
        (connector, wire)
    }
}

impl Connector for RecordingConnector {
    type Link = RecordingLink;

    fn connect(&mut self, addr: SocketAddrV4) -> Result<RecordingLink, OpenError> {
        self.attempts += 1;
        if self.refuse {
            return Err(OpenError::establish(
                addr,
                io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
            ));
        }
        Ok(RecordingLink::with_behavior(
            self.wire.clone(),
            Some(addr),
            self.behavior,
        ))
    }
}
