//! Chunking engine: batches writes into capacity-sized transmissions.
//!
//! The buffer holds fewer than `capacity` bytes between calls. A chunk
//! shorter than `capacity` leaves only through `flush`; ordinary writes
//! always transmit exactly `capacity` bytes at a time.

use std::io;
use std::num::NonZeroUsize;

use crate::transport::Link;

/// Fixed-capacity staging area for the next chunk.
#[derive(Debug)]
pub struct ChunkBuffer {
    data: Box<[u8]>,
    len: usize,
}

impl ChunkBuffer {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            data: vec![0u8; capacity.get()].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Copy as much of `input` as fits. Returns the number of bytes taken.
    fn fill(&mut self, input: &[u8]) -> usize {
        let take = input.len().min(self.capacity() - self.len);
        self.data[self.len..self.len + take].copy_from_slice(&input[..take]);
        self.len += take;
        take
    }
}

/// Per-session transmission counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub bytes_sent: u64,
    pub transmissions: u64,
}

/// A write that stopped at a failed transmission.
#[derive(Debug)]
pub struct PartialWrite {
    /// Input bytes that made it onto the wire before the failure.
    pub accepted: usize,
    pub source: io::Error,
}

/// Send `chunk` as one transmission. Anything but a complete send fails.
fn transmit_exact<L: Link>(
    link: &mut L,
    chunk: &[u8],
    stats: &mut SessionStats,
) -> io::Result<()> {
    let sent = loop {
        match link.transmit(chunk) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => break other?,
        }
    };
    if sent != chunk.len() {
        return Err(io::Error::new(
            io::ErrorKind::WriteZero,
            format!("short send: {sent} of {} bytes", chunk.len()),
        ));
    }
    stats.bytes_sent += sent as u64;
    stats.transmissions += 1;
    tracing::trace!(bytes = sent, "chunk transmitted");
    Ok(())
}

/// Accept `input` into the stream: buffer it, or transmit full chunks
/// straight through when the buffer would fill.
///
/// On success the whole input is accepted. On failure the accepted count
/// covers only bytes actually transmitted; the buffer's content is then
/// meaningless and the caller must discard it.
pub fn write_through<L: Link>(
    buffer: &mut ChunkBuffer,
    link: &mut L,
    input: &[u8],
    stats: &mut SessionStats,
) -> Result<usize, PartialWrite> {
    let capacity = buffer.capacity();

    if buffer.len() + input.len() < capacity {
        buffer.fill(input);
        return Ok(input.len());
    }

    let mut consumed = 0;

    // Top up the partial chunk and send it.
    if !buffer.is_empty() {
        let taken = buffer.fill(input);
        transmit_exact(link, buffer.as_slice(), stats)
            .map_err(|source| PartialWrite { accepted: 0, source })?;
        buffer.clear();
        consumed = taken;
    }

    // Whole chunks go out from the caller's slice without copying.
    let mut pieces = input[consumed..].chunks_exact(capacity);
    for piece in pieces.by_ref() {
        transmit_exact(link, piece, stats).map_err(|source| PartialWrite {
            accepted: consumed,
            source,
        })?;
        consumed += capacity;
    }

    buffer.fill(pieces.remainder());
    Ok(input.len())
}

/// Transmit whatever is buffered as one (possibly short) chunk.
pub fn flush<L: Link>(
    buffer: &mut ChunkBuffer,
    link: &mut L,
    stats: &mut SessionStats,
) -> io::Result<()> {
    if buffer.is_empty() {
        return Ok(());
    }
    transmit_exact(link, buffer.as_slice(), stats)?;
    buffer.clear();
    Ok(())
}
