//! Channel identities and header flag bits.
//!
//! A channel is a `(type, id)` pair. `0xFF` in either position is a
//! wildcard and never names a real channel.

use std::fmt;

/// Wildcard value for the type or id slot of a channel key.
pub const WILDCARD: u8 = 0xFF;

/// Channel type whose packets are never checked for sequence continuity.
pub const SEQ_EXEMPT_TYPE: u8 = 0xCC;

/// Raw sample channel type. Every payload starts with a sub-timing field.
pub const RAW_SAMPLE_TYPE: u8 = 0x22;

/// Number of leading decoded elements on a raw sample payload that hold
/// the sub-timing field rather than data.
pub const RAW_SAMPLE_PREFIX_ELEMENTS: usize = 2;

/// Flags bit 0: first packet of a frame.
pub const FLAG_START_OF_FRAME: u8 = 1 << 0;

/// Flags bit 1: last packet of a frame.
pub const FLAG_END_OF_FRAME: u8 = 1 << 1;

/// Flags bit 2: the producer dropped data before this packet.
pub const FLAG_DATA_LOSS: u8 = 1 << 2;

/// A `(type, id)` channel key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelKey {
    pub type_code: u8,
    pub id: u8,
}

impl ChannelKey {
    /// Matches every packet.
    pub const ANY: ChannelKey = ChannelKey::new(WILDCARD, WILDCARD);

    pub const fn new(type_code: u8, id: u8) -> Self {
        Self { type_code, id }
    }

    /// Composite 16-bit key: `type << 8 | id`.
    pub const fn as_u16(self) -> u16 {
        ((self.type_code as u16) << 8) | self.id as u16
    }

    pub const fn from_u16(value: u16) -> Self {
        Self {
            type_code: (value >> 8) as u8,
            id: value as u8,
        }
    }

    /// Returns true if either slot holds the wildcard value.
    pub fn is_wildcard(self) -> bool {
        self.type_code == WILDCARD || self.id == WILDCARD
    }

    /// The registration keys a packet on this channel resolves to, in
    /// dispatch order: exact, type-wildcard, id-wildcard, full wildcard.
    pub fn matching_keys(self) -> [ChannelKey; 4] {
        [
            self,
            ChannelKey::new(self.type_code, WILDCARD),
            ChannelKey::new(WILDCARD, self.id),
            ChannelKey::ANY,
        ]
    }

    /// Returns true if `concrete` is selected by this (possibly wildcard) key.
    pub fn matches(self, concrete: ChannelKey) -> bool {
        (self.type_code == WILDCARD || self.type_code == concrete.type_code)
            && (self.id == WILDCARD || self.id == concrete.id)
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02X}/0x{:02X}", self.type_code, self.id)
    }
}
