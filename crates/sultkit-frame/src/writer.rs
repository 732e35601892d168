use std::collections::HashMap;
use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_packet, FILLER_SIZE};
use crate::error::{FrameError, Result};
use crate::header::{PacketHeader, SYNC};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Builds packet headers for one channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketBuilder {
    type_code: u8,
    id: u8,
    flags: u8,
    rtc: u64,
    seq_len: u32,
}

impl PacketBuilder {
    pub fn new(type_code: u8, id: u8) -> Self {
        Self {
            type_code,
            id,
            flags: 0,
            rtc: 0,
            seq_len: 0,
        }
    }

    pub fn flags(mut self, flags: u8) -> Self {
        self.flags = flags;
        self
    }

    /// Clock value; split into the 16-bit low and 32-bit high fields.
    pub fn rtc(mut self, rtc: u64) -> Self {
        self.rtc = rtc;
        self
    }

    pub fn seq_len(mut self, seq_len: u32) -> Self {
        self.seq_len = seq_len;
        self
    }

    /// Build a header declaring `len` payload words.
    pub fn header(&self, len: u16) -> PacketHeader {
        PacketHeader {
            sync: SYNC,
            type_code: self.type_code,
            id: self.id,
            flags: self.flags,
            len,
            rtc_low: self.rtc as u16,
            rtc_high: (self.rtc >> 16) as u32,
            seq_len: self.seq_len,
        }
    }
}

/// Writes packets to any `Write` sink.
///
/// [`PacketWriter::send`] keeps a running per-channel sequence length, so
/// captures it produces pass continuity checks.
pub struct PacketWriter<T> {
    inner: T,
    buf: BytesMut,
    seq_lens: HashMap<u16, u32>,
}

impl<T: Write> PacketWriter<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            seq_lens: HashMap::new(),
        }
    }

    /// Write a packet with an explicit header.
    pub fn write_packet(&mut self, header: &PacketHeader, words: &[u32]) -> Result<()> {
        self.buf.clear();
        encode_packet(header, words, &mut self.buf)?;
        let wire = self.buf.split();
        self.write_all(&wire)
    }

    /// Write `words` on the builder's channel, filling in `len` and the
    /// running `seq_len`.
    pub fn send(&mut self, builder: PacketBuilder, words: &[u32]) -> Result<()> {
        let len = u16::try_from(words.len()).map_err(|_| FrameError::PayloadTooLarge {
            words: words.len(),
            max: u16::MAX as usize,
        })?;
        let header = builder.header(len);
        let key = header.key().as_u16();
        let seq_len = self.seq_lens.get(&key).copied().unwrap_or(0);

        self.write_packet(&PacketHeader { seq_len, ..header }, words)?;
        self.seq_lens.insert(key, seq_len.wrapping_add(len as u32));
        Ok(())
    }

    /// Write `words` zero filler words.
    pub fn write_filler(&mut self, words: usize) -> Result<()> {
        let zeros = vec![0u8; words * FILLER_SIZE];
        self.write_all(&zeros)
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }

    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            match self.inner.write(data) {
                Ok(0) => return Err(FrameError::Io(ErrorKind::WriteZero.into())),
                Ok(n) => data = &data[n..],
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
        Ok(())
    }
}
