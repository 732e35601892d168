use std::io::{ErrorKind, Read};

use bytes::BytesMut;

use crate::codec::{is_filler, Packet, FILLER_SIZE};
use crate::error::{FrameError, Result};
use crate::header::{PacketHeader, HEADER_SIZE};

/// Reads packets from any `Read` source.
///
/// The reader never reads past the packet it returns, so the position of
/// the inner source always sits on a packet boundary (or at end of data).
/// Wrap files in a `BufReader` for throughput.
pub struct PacketReader<T> {
    inner: T,
    offset: u64,
}

impl<T: Read> PacketReader<T> {
    /// Create a reader whose offsets count from zero.
    pub fn new(inner: T) -> Self {
        Self::with_offset(inner, 0)
    }

    /// Create a reader for a source already positioned at `offset`.
    pub fn with_offset(inner: T, offset: u64) -> Self {
        Self { inner, offset }
    }

    /// Read the next packet (blocking).
    ///
    /// Returns `Ok(None)` at end of stream, including when the stream ends
    /// inside filler or inside a packet's payload.
    pub fn read_packet(&mut self) -> Result<Option<Packet>> {
        let mut window = [0u8; HEADER_SIZE];
        if self.read_full(&mut window)? < HEADER_SIZE {
            return Ok(None);
        }
        let mut window_start = self.offset - HEADER_SIZE as u64;

        let header = loop {
            let header = PacketHeader::parse(&window);
            if header.is_valid() {
                break header;
            }
            if !is_filler(&window) {
                return Err(FrameError::LostSync {
                    offset: window_start,
                });
            }

            tracing::trace!(offset = window_start, "skipping filler word");
            window.copy_within(FILLER_SIZE.., 0);
            if self.read_full(&mut window[HEADER_SIZE - FILLER_SIZE..])? < FILLER_SIZE {
                return Ok(None);
            }
            window_start += FILLER_SIZE as u64;
        };

        let mut payload = BytesMut::zeroed(header.payload_bytes());
        if self.read_full(&mut payload)? < payload.len() {
            tracing::debug!(
                offset = window_start,
                declared = header.len,
                "capture ends inside packet payload"
            );
            return Ok(None);
        }

        Ok(Some(Packet {
            header,
            payload: payload.freeze(),
        }))
    }

    /// Bytes consumed from the source, plus the starting offset.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Fill `buf` as far as the source allows. Returns the byte count read,
    /// which is short only at end of stream.
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0usize;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        self.offset += filled as u64;
        Ok(filled)
    }
}
