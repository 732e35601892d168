use crate::error::{Result, RouteError};

/// Accumulates payload fragments for one channel into a fixed-capacity
/// buffer and hands complete segments to a consumer.
///
/// A fragment that reaches the end of the buffer fills it, flushes the
/// whole buffer, and starts over at offset 0 with the remainder. An
/// end-of-frame fragment additionally flushes whatever is buffered. The
/// consumer only sees a borrowed view; it must copy to retain data.
pub struct Reassembler<T, F> {
    buf: Vec<T>,
    cursor: usize,
    consumer: F,
}

impl<T, F> Reassembler<T, F>
where
    T: Copy + Default,
    F: FnMut(&[T]),
{
    /// Create a reassembler holding up to `capacity` elements.
    pub fn new(capacity: usize, consumer: F) -> Result<Self> {
        if capacity == 0 {
            return Err(RouteError::ZeroCapacity);
        }
        Ok(Self {
            buf: vec![T::default(); capacity],
            cursor: 0,
            consumer,
        })
    }

    /// Append one packet's worth of elements.
    pub fn push(&mut self, fragment: &[T], end_of_frame: bool) {
        let capacity = self.buf.len();
        let end = self.cursor + fragment.len();

        if end >= capacity {
            let (head, mut rest) = fragment.split_at(capacity - self.cursor);
            self.buf[self.cursor..].copy_from_slice(head);
            (self.consumer)(&self.buf);

            if rest.len() > capacity {
                tracing::warn!(
                    dropped = rest.len() - capacity,
                    capacity,
                    "fragment overruns reassembly buffer twice; truncating"
                );
                rest = &rest[..capacity];
            }
            self.buf[..rest.len()].copy_from_slice(rest);
            self.cursor = rest.len();
        } else {
            self.buf[self.cursor..end].copy_from_slice(fragment);
            self.cursor = end;
        }

        if end_of_frame {
            (self.consumer)(&self.buf[..self.cursor]);
            self.cursor = 0;
        }
    }

    /// Write position inside the buffer.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Elements held since the last flush.
    pub fn buffered(&self) -> &[T] {
        &self.buf[..self.cursor]
    }
}
