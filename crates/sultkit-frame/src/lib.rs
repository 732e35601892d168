//! Sync-delimited packet framing for SULT telemetry captures.
//!
//! A capture is a sequence of packets, each made of:
//! - A 16-byte big-endian header starting with the `0xAA` sync byte
//! - `len` big-endian 32-bit payload words
//!
//! Zero words between packets are filler and are skipped. Anything else
//! where a header is expected means synchronization was lost.

pub mod channel;
pub mod codec;
pub mod error;
pub mod header;
pub mod reader;
pub mod writer;

pub use channel::{
    ChannelKey, FLAG_DATA_LOSS, FLAG_END_OF_FRAME, FLAG_START_OF_FRAME, RAW_SAMPLE_PREFIX_ELEMENTS,
    RAW_SAMPLE_TYPE, SEQ_EXEMPT_TYPE, WILDCARD,
};
pub use codec::{decode_packet, encode_packet, Packet, WORD_SIZE};
pub use error::{FrameError, Result};
pub use header::{PacketHeader, HEADER_SIZE, SYNC};
pub use reader::PacketReader;
pub use writer::{PacketBuilder, PacketWriter};
