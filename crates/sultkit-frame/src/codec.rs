use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::channel::ChannelKey;
use crate::error::{FrameError, Result};
use crate::header::{PacketHeader, HEADER_SIZE};

/// Payload word size in bytes.
pub const WORD_SIZE: usize = 4;

/// Filler granule skipped while hunting for a header.
pub(crate) const FILLER_SIZE: usize = 4;

/// A decoded packet: header plus `header.len` payload words.
///
/// The payload is kept as raw big-endian bytes so it can be reinterpreted
/// at any element width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub header: PacketHeader,
    pub payload: Bytes,
}

impl Packet {
    pub fn key(&self) -> ChannelKey {
        self.header.key()
    }

    /// Payload as big-endian 32-bit words.
    pub fn words(&self) -> impl Iterator<Item = u32> + '_ {
        self.payload
            .chunks_exact(WORD_SIZE)
            .map(|w| u32::from_be_bytes([w[0], w[1], w[2], w[3]]))
    }

    pub fn word_count(&self) -> usize {
        self.payload.len() / WORD_SIZE
    }

    /// The total wire size of this packet (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }
}

/// Encode a packet into the wire format.
///
/// `words.len()` must equal `header.len`.
pub fn encode_packet(header: &PacketHeader, words: &[u32], dst: &mut BytesMut) -> Result<()> {
    if words.len() != header.len as usize {
        return Err(FrameError::LengthMismatch {
            declared: header.len as usize,
            actual: words.len(),
        });
    }
    dst.reserve(HEADER_SIZE + words.len() * WORD_SIZE);
    header.write_to(dst);
    for word in words {
        dst.put_u32(*word);
    }
    Ok(())
}

/// Decode a packet from an in-memory buffer.
///
/// Leading zero filler words are consumed. Returns `Ok(None)` if the buffer
/// doesn't contain a complete packet yet. A `LostSync` offset is relative
/// to the start of `src` at call time.
pub fn decode_packet(src: &mut BytesMut) -> Result<Option<Packet>> {
    let mut skipped = 0u64;
    loop {
        let Some(window) = src.get(..HEADER_SIZE) else {
            return Ok(None); // Need more data
        };
        let mut head = [0u8; HEADER_SIZE];
        head.copy_from_slice(window);

        let header = PacketHeader::parse(&head);
        if header.is_valid() {
            let total = HEADER_SIZE + header.payload_bytes();
            if src.len() < total {
                return Ok(None); // Need more data
            }
            src.advance(HEADER_SIZE);
            let payload = src.split_to(header.payload_bytes()).freeze();
            return Ok(Some(Packet { header, payload }));
        }

        if !is_filler(&head) {
            return Err(FrameError::LostSync { offset: skipped });
        }
        src.advance(FILLER_SIZE);
        skipped += FILLER_SIZE as u64;
    }
}

/// True if the leading filler granule of a rejected header window is zero.
pub(crate) fn is_filler(window: &[u8; HEADER_SIZE]) -> bool {
    window[..FILLER_SIZE].iter().all(|b| *b == 0)
}
