//! Typed views over big-endian payload bytes.

use bytes::BufMut;

use crate::error::{Result, RouteError};

/// Element encoding of channel payload data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    I8,
    I16,
    I32,
    /// Raw payload words.
    U32,
}

impl ElementType {
    /// Element width in bytes.
    pub fn width(self) -> usize {
        match self {
            ElementType::I8 => 1,
            ElementType::I16 => 2,
            ElementType::I32 | ElementType::U32 => 4,
        }
    }

    fn decode(self, b: &[u8]) -> i64 {
        match self {
            ElementType::I8 => b[0] as i8 as i64,
            ElementType::I16 => i16::from_be_bytes([b[0], b[1]]) as i64,
            ElementType::I32 => i32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64,
            ElementType::U32 => u32::from_be_bytes([b[0], b[1], b[2], b[3]]) as i64,
        }
    }

    fn encode(self, value: i64, dst: &mut impl BufMut) {
        match self {
            ElementType::I8 => dst.put_i8(value as i8),
            ElementType::I16 => dst.put_i16(value as i16),
            ElementType::I32 => dst.put_i32(value as i32),
            ElementType::U32 => dst.put_u32(value as u32),
        }
    }
}

/// Element type plus the number of interleaved lanes per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementLayout {
    pub element: ElementType,
    pub lanes: usize,
}

impl ElementLayout {
    /// Derive the layout of a typed channel: high nibble = lanes (1 or 2),
    /// low nibble = signed element width in bytes (1, 2 or 4).
    pub fn for_type_code(type_code: u8) -> Result<Self> {
        let unsupported = || RouteError::UnsupportedType {
            type_code,
            offset: None,
        };

        let lanes = ((type_code >> 4) & 0xF) as usize;
        if !(lanes == 1 || lanes == 2) {
            return Err(unsupported());
        }
        let element = match type_code & 0xF {
            1 => ElementType::I8,
            2 => ElementType::I16,
            4 => ElementType::I32,
            _ => return Err(unsupported()),
        };
        Ok(Self { element, lanes })
    }
}

/// Decode big-endian payload bytes into elements. Trailing bytes that do
/// not fill a whole element are ignored.
pub fn decode_elements(bytes: &[u8], element: ElementType) -> Vec<i64> {
    bytes
        .chunks_exact(element.width())
        .map(|b| element.decode(b))
        .collect()
}

/// Channel data reshaped into rows of `lanes` columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Samples {
    element: ElementType,
    lanes: usize,
    values: Vec<i64>,
}

impl Samples {
    /// Wrap a flat, ordered element sequence. The length must be a multiple
    /// of `lanes`.
    pub fn new(element: ElementType, lanes: usize, values: Vec<i64>) -> Result<Self> {
        if lanes == 0 || values.len() % lanes != 0 {
            return Err(RouteError::MalformedShape {
                elements: values.len(),
                lanes,
                offset: None,
            });
        }
        Ok(Self {
            element,
            lanes,
            values,
        })
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn lanes(&self) -> usize {
        self.lanes
    }

    /// Flat element sequence in capture order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    pub fn rows(&self) -> impl Iterator<Item = &[i64]> + '_ {
        self.values.chunks_exact(self.lanes)
    }

    pub fn row_count(&self) -> usize {
        self.values.len() / self.lanes
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Elements re-encoded big-endian at their native width.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.values.len() * self.element.width());
        for value in &self.values {
            self.element.encode(*value, &mut out);
        }
        out
    }
}
