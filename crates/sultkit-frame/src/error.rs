/// Errors that can occur while framing SULT packets.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Non-filler bytes were found where a header was expected.
    #[error("lost sult sync at offset {offset} (0x{offset:X})")]
    LostSync { offset: u64 },

    /// The payload handed to the encoder does not match the header's `len`.
    #[error("payload length mismatch (header declares {declared} words, got {actual})")]
    LengthMismatch { declared: usize, actual: usize },

    /// The payload does not fit the 16-bit `len` field.
    #[error("payload too large ({words} words, max {max})")]
    PayloadTooLarge { words: usize, max: usize },

    /// An I/O error occurred while reading or writing packets.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl FrameError {
    /// Byte offset of the failure, when the error carries one.
    pub fn offset(&self) -> Option<u64> {
        match self {
            FrameError::LostSync { offset } => Some(*offset),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, FrameError>;
