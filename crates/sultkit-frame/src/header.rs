use std::fmt;

use bytes::{Buf, BufMut};

use crate::channel::{ChannelKey, FLAG_DATA_LOSS, FLAG_END_OF_FRAME, FLAG_START_OF_FRAME};

/// Packet header size in bytes.
pub const HEADER_SIZE: usize = 16;

/// Sync sentinel that starts every header.
pub const SYNC: u8 = 0xAA;

/// Fixed-layout SULT packet header.
///
/// Wire format (all multi-byte fields big-endian):
/// ```text
/// ┌──────┬──────┬────┬───────┬──────────┬────────────┬─────────────┬─────────────┐
/// │ sync │ type │ id │ flags │ len (2B) │ rtcLow (2B)│ rtcHigh (4B)│ seqLen (4B) │
/// │ 0xAA │      │    │       │ words    │            │             │ words       │
/// └──────┴──────┴────┴───────┴──────────┴────────────┴─────────────┴─────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub sync: u8,
    /// Channel type code. For typed channels the low nibble is the element
    /// width in bytes and the high nibble the lane count.
    pub type_code: u8,
    pub id: u8,
    pub flags: u8,
    /// Payload length in 32-bit words.
    pub len: u16,
    pub rtc_low: u16,
    pub rtc_high: u32,
    /// Payload words previously sent on this channel.
    pub seq_len: u32,
}

impl PacketHeader {
    /// Split a header window into fields. Does not check the sync byte.
    pub fn parse(bytes: &[u8; HEADER_SIZE]) -> Self {
        let mut src = &bytes[..];
        Self {
            sync: src.get_u8(),
            type_code: src.get_u8(),
            id: src.get_u8(),
            flags: src.get_u8(),
            len: src.get_u16(),
            rtc_low: src.get_u16(),
            rtc_high: src.get_u32(),
            seq_len: src.get_u32(),
        }
    }

    /// Append the wire representation of this header to `dst`.
    pub fn write_to(&self, dst: &mut impl BufMut) {
        dst.put_u8(self.sync);
        dst.put_u8(self.type_code);
        dst.put_u8(self.id);
        dst.put_u8(self.flags);
        dst.put_u16(self.len);
        dst.put_u16(self.rtc_low);
        dst.put_u32(self.rtc_high);
        dst.put_u32(self.seq_len);
    }

    /// Returns true if the sync byte matches the sentinel.
    pub fn is_valid(&self) -> bool {
        self.sync == SYNC
    }

    /// Real-time clock counter, `(rtc_high << 16) | rtc_low`.
    pub fn rtc(&self) -> u64 {
        ((self.rtc_high as u64) << 16) | self.rtc_low as u64
    }

    pub fn key(&self) -> ChannelKey {
        ChannelKey::new(self.type_code, self.id)
    }

    pub fn start_of_frame(&self) -> bool {
        self.flags & FLAG_START_OF_FRAME != 0
    }

    pub fn end_of_frame(&self) -> bool {
        self.flags & FLAG_END_OF_FRAME != 0
    }

    pub fn data_loss(&self) -> bool {
        self.flags & FLAG_DATA_LOSS != 0
    }

    /// Payload size in bytes.
    pub fn payload_bytes(&self) -> usize {
        self.len as usize * crate::codec::WORD_SIZE
    }
}

impl fmt::Display for PacketHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "sync=0x{:X} type=0x{:X} id=0x{:X} flags=0x{:X} len=0x{:X} rtc=0x{:X} seqlen=0x{:X}",
            self.sync,
            self.type_code,
            self.id,
            self.flags,
            self.len,
            self.rtc(),
            self.seq_len
        )
    }
}
