use std::num::NonZeroUsize;

use sockfile_core::SocketFile;

use crate::*;

const BULK_BUFFER_SIZE: usize = 26 * 1000;

/// Repeated 26,000-byte writes arrive complete and in order.
#[test]
fn test_bulk_transfer_arrives_intact() {
    let mut listener = Listener::start().unwrap();
    let buffer = alphabet(BULK_BUFFER_SIZE);
    let count = 40;

    let mut f = SocketFile::connect(&listener.ip(), listener.port()).unwrap();
    for _ in 0..count {
        assert_eq!(f.write_bytes(&buffer), BULK_BUFFER_SIZE);
    }
    f.sync().unwrap();
    let stats = f.stats();
    f.close();

    let total = BULK_BUFFER_SIZE * count;
    assert_eq!(stats.bytes_sent, total as u64);
    assert!(stats.transmissions >= (total / f.capacity()) as u64);

    let contents = listener.next_contents().unwrap();
    assert_eq!(contents.len(), total);
    assert!(contents
        .chunks(BULK_BUFFER_SIZE)
        .all(|piece| piece == buffer.as_slice()));
}

/// Writes of every size around the chunk boundary keep their bytes in order.
#[test]
fn test_uneven_writes_across_chunk_boundaries() {
    let mut listener = Listener::start().unwrap();
    let capacity = 7;
    let mut f = SocketFile::with_capacity(NonZeroUsize::new(capacity).unwrap());
    f.open(&listener.ip(), listener.port()).unwrap();

    let mut expected = Vec::new();
    let mut next: u8 = 0;
    for len in [1, 6, 7, 8, 0, 13, 14, 15, 3, 21, 2] {
        let piece: Vec<u8> = (0..len)
            .map(|_| {
                next = next.wrapping_add(1);
                next
            })
            .collect();
        assert_eq!(f.write_bytes(&piece), len);
        assert!(f.buffered() < capacity);
        expected.extend_from_slice(&piece);
    }
    f.close();

    assert_eq!(listener.next_contents().unwrap(), expected);
}

/// A session left open is flushed and closed when the adapter is dropped.
#[test]
fn test_drop_flushes_partial_chunk() {
    let mut listener = Listener::start().unwrap();
    let payload = alphabet(3 * 1000 + 17);

    {
        let mut f = SocketFile::connect(&listener.ip(), listener.port()).unwrap();
        assert_eq!(f.write_bytes(&payload), payload.len());
        assert!(f.buffered() > 0);
    }

    assert_eq!(listener.next_contents().unwrap(), payload);
}

/// `io::Write` lets the adapter sit behind std writers.
#[test]
fn test_io_write_through_bufwriter() {
    use std::io::{BufWriter, Write};

    let mut listener = Listener::start().unwrap();
    let f = SocketFile::connect(&listener.ip(), listener.port()).unwrap();

    let mut out = BufWriter::new(f);
    for i in 0..100 {
        writeln!(out, "line {i}").unwrap();
    }
    out.flush().unwrap();
    drop(out);

    let text = String::from_utf8(listener.next_contents().unwrap()).unwrap();
    assert_eq!(text.lines().count(), 100);
    assert_eq!(text.lines().last(), Some("line 99"));
}
