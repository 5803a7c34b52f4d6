use std::{
    io::{self, Read, Write},
    sync::mpsc,
};

use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};

/// Default upper bound on the size of a single message.
pub const DEFAULT_MAX_MESSAGE_BYTES: u64 = 1 << 28;

fn codec(limit: u64) -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_limit(limit)
}

fn invalid_data(err: bincode::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, err)
}

/// A blocking, message-oriented channel to the peer.
///
/// Messages are serialized with bincode using fixed-width integers. A message
/// that fails to decode as the expected type, or that carries trailing bytes,
/// is reported as [`io::ErrorKind::InvalidData`].
pub trait Channel {
    /// Sends a message to the peer.
    fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> io::Result<()>;

    /// Blocks until the next message from the peer arrives.
    fn recv<T: DeserializeOwned>(&mut self) -> io::Result<T>;

    /// Flushes buffered outgoing data.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Returns the number of payload bytes sent.
    fn bytes_sent(&self) -> u64;

    /// Returns the number of payload bytes received.
    fn bytes_received(&self) -> u64;
}

impl<C: Channel + ?Sized> Channel for &mut C {
    fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> io::Result<()> {
        (**self).send(msg)
    }

    fn recv<T: DeserializeOwned>(&mut self) -> io::Result<T> {
        (**self).recv()
    }

    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }

    fn bytes_sent(&self) -> u64 {
        (**self).bytes_sent()
    }

    fn bytes_received(&self) -> u64 {
        (**self).bytes_received()
    }
}

/// An in-memory channel, one end of a [`memory_duplex`].
#[derive(Debug)]
pub struct MemoryChannel {
    tx: mpsc::Sender<Vec<u8>>,
    rx: mpsc::Receiver<Vec<u8>>,
    limit: u64,
    sent: u64,
    received: u64,
}

/// Creates a pair of connected in-memory channels.
pub fn memory_duplex() -> (MemoryChannel, MemoryChannel) {
    let (tx_a, rx_b) = mpsc::channel();
    let (tx_b, rx_a) = mpsc::channel();

    let new = |tx, rx| MemoryChannel {
        tx,
        rx,
        limit: DEFAULT_MAX_MESSAGE_BYTES,
        sent: 0,
        received: 0,
    };

    (new(tx_a, rx_a), new(tx_b, rx_b))
}

impl MemoryChannel {
    /// Sets the maximum message size accepted by this end.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Sends raw bytes as a single message, bypassing serialization.
    pub fn send_raw(&mut self, bytes: Vec<u8>) -> io::Result<()> {
        self.sent += bytes.len() as u64;
        self.tx
            .send(bytes)
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer hung up"))
    }
}

impl Channel for MemoryChannel {
    fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> io::Result<()> {
        let bytes = codec(self.limit).serialize(msg).map_err(invalid_data)?;
        self.send_raw(bytes)
    }

    fn recv<T: DeserializeOwned>(&mut self) -> io::Result<T> {
        let bytes = self
            .rx
            .recv()
            .map_err(|_| io::Error::new(io::ErrorKind::UnexpectedEof, "peer hung up"))?;
        self.received += bytes.len() as u64;

        if bytes.len() as u64 > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "message of {} bytes exceeds limit of {}",
                    bytes.len(),
                    self.limit
                ),
            ));
        }

        codec(self.limit).deserialize(&bytes).map_err(invalid_data)
    }

    fn bytes_sent(&self) -> u64 {
        self.sent
    }

    fn bytes_received(&self) -> u64 {
        self.received
    }
}

/// A channel over a byte stream.
///
/// Each message is framed with its length as a little-endian `u32`.
#[derive(Debug)]
pub struct IoChannel<R, W> {
    reader: R,
    writer: W,
    limit: u64,
    sent: u64,
    received: u64,
}

impl<R: Read, W: Write> IoChannel<R, W> {
    /// Creates a new channel reading from `reader` and writing to `writer`.
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            limit: DEFAULT_MAX_MESSAGE_BYTES,
            sent: 0,
            received: 0,
        }
    }

    /// Sets the maximum message size accepted by this end.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit.min(u64::from(u32::MAX));
        self
    }

    /// Returns the underlying reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

#[cfg(unix)]
impl IoChannel<std::os::unix::net::UnixStream, std::os::unix::net::UnixStream> {
    /// Creates a pair of channels connected by a unix socket.
    pub fn unix_pair() -> io::Result<(Self, Self)> {
        let (a, b) = std::os::unix::net::UnixStream::pair()?;
        Ok((
            Self::new(a.try_clone()?, a),
            Self::new(b.try_clone()?, b),
        ))
    }
}

impl<R: Read, W: Write> Channel for IoChannel<R, W> {
    fn send<T: Serialize + ?Sized>(&mut self, msg: &T) -> io::Result<()> {
        let bytes = codec(self.limit).serialize(msg).map_err(invalid_data)?;
        let len = u32::try_from(bytes.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "message too large"))?;

        self.writer.write_all(&len.to_le_bytes())?;
        self.writer.write_all(&bytes)?;
        self.writer.flush()?;
        self.sent += bytes.len() as u64;

        Ok(())
    }

    fn recv<T: DeserializeOwned>(&mut self) -> io::Result<T> {
        let mut len = [0u8; 4];
        self.reader.read_exact(&mut len)?;
        let len = u32::from_le_bytes(len);

        if u64::from(len) > self.limit {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("message of {len} bytes exceeds limit of {}", self.limit),
            ));
        }

        let mut bytes = vec![0u8; len as usize];
        self.reader.read_exact(&mut bytes)?;
        self.received += u64::from(len);

        codec(self.limit).deserialize(&bytes).map_err(invalid_data)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn bytes_sent(&self) -> u64 {
        self.sent
    }

    fn bytes_received(&self) -> u64 {
        self.received
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Msg {
        bits: Vec<bool>,
        words: Vec<u64>,
    }

    fn msg() -> Msg {
        Msg {
            bits: vec![true, false, true],
            words: vec![1, 2, u64::MAX],
        }
    }

    fn exchange<C: Channel + Send + 'static>(mut a: C, mut b: C) {
        let handle = std::thread::spawn(move || {
            let received: Msg = b.recv().unwrap();
            b.send(&received.words).unwrap();
            b
        });

        a.send(&msg()).unwrap();
        let words: Vec<u64> = a.recv().unwrap();
        let b = handle.join().unwrap();

        assert_eq!(words, msg().words);
        assert_eq!(a.bytes_sent(), b.bytes_received());
        assert_eq!(a.bytes_received(), b.bytes_sent());
    }

    #[test]
    fn test_memory_channel() {
        let (a, b) = memory_duplex();
        exchange(a, b);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_channel() {
        let (a, b) = IoChannel::unix_pair().unwrap();
        exchange(a, b);
    }

    #[test]
    fn test_fixed_width_encoding() {
        let (mut a, mut b) = memory_duplex();
        a.send(&vec![7u64; 4]).unwrap();
        let _: Vec<u64> = b.recv().unwrap();

        // length prefix plus four fixed-width words
        assert_eq!(a.bytes_sent(), 8 + 4 * 8);
    }

    #[test]
    fn test_wrong_type_is_invalid_data() {
        let (mut a, mut b) = memory_duplex();
        a.send(&msg()).unwrap();

        let err = b.recv::<u8>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_message_limit() {
        let (mut a, b) = memory_duplex();
        let mut b = b.with_limit(16);
        a.send(&vec![0u64; 16]).unwrap();

        let err = b.recv::<Vec<u64>>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn test_message_limit_rejects_large_vectors() {
        let (mut a, b) = memory_duplex();
        let mut b = b.with_limit(16);
        a.send(&vec![0u64; 1000]).unwrap();
        a.send(&1u64).unwrap();

        let err = b.recv::<Vec<u64>>().unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);

        // Messages within the limit still pass.
        assert_eq!(b.recv::<u64>().unwrap(), 1);
    }

    #[test]
    fn test_hung_up_peer() {
        let (mut a, b) = memory_duplex();
        drop(b);

        assert_eq!(
            a.send(&1u8).unwrap_err().kind(),
            io::ErrorKind::BrokenPipe
        );
        assert_eq!(
            a.recv::<u8>().unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
