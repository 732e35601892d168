use sultkit_frame::FrameError;

/// Errors that can occur while routing or extracting channel data.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Frame-level error (lost sync, I/O).
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// The channel type code does not map to a known lane count and width.
    #[error("cannot derive element type from channel type 0x{type_code:X}")]
    UnsupportedType { type_code: u8, offset: Option<u64> },

    /// Collected element count does not split into whole rows.
    #[error("{elements} elements do not reshape into rows of {lanes} lanes")]
    MalformedShape {
        elements: usize,
        lanes: usize,
        offset: Option<u64>,
    },

    /// A reassembly buffer needs room for at least one element.
    #[error("reassembly capacity must be non-zero")]
    ZeroCapacity,
}

impl RouteError {
    /// Byte offset in the capture where the error surfaced, if known.
    pub fn offset(&self) -> Option<u64> {
        match self {
            RouteError::Frame(err) => err.offset(),
            RouteError::UnsupportedType { offset, .. }
            | RouteError::MalformedShape { offset, .. } => *offset,
            RouteError::ZeroCapacity => None,
        }
    }

    /// Attach the capture offset the error was raised at.
    pub(crate) fn at(mut self, at: u64) -> Self {
        if let RouteError::UnsupportedType { offset, .. }
        | RouteError::MalformedShape { offset, .. } = &mut self
        {
            *offset = Some(at);
        }
        self
    }
}

pub type Result<T> = std::result::Result<T, RouteError>;
