use std::cell::RefCell;
use std::io::Read;

use sultkit_frame::{ChannelKey, PacketReader, RAW_SAMPLE_PREFIX_ELEMENTS, RAW_SAMPLE_TYPE};

use crate::error::Result;
use crate::router::{Router, RunOptions, RunOutcome};
use crate::sample::{decode_elements, ElementLayout, ElementType, Samples};

/// Pulls one frame of data for a single channel out of a capture.
///
/// Call [`extract`](Self::extract) repeatedly on the same reader to walk
/// the capture frame by frame; it returns `Ok(None)` once the channel has
/// no more data before end of stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelExtractor {
    key: ChannelKey,
    element: Option<ElementType>,
    max_offset: Option<u64>,
}

impl ChannelExtractor {
    /// Extract `(type_code, id)`, deriving the element layout from the type
    /// code.
    pub fn new(type_code: u8, id: u8) -> Self {
        Self {
            key: ChannelKey::new(type_code, id),
            element: None,
            max_offset: None,
        }
    }

    /// Decode payloads as `element` with a single lane instead of deriving
    /// the layout from the type code.
    pub fn with_element(mut self, element: ElementType) -> Self {
        self.element = Some(element);
        self
    }

    /// Stop reading once the reader offset reaches `max_offset`.
    pub fn with_max_offset(mut self, max_offset: u64) -> Self {
        self.max_offset = Some(max_offset);
        self
    }

    pub fn key(&self) -> ChannelKey {
        self.key
    }

    /// Layout the extracted samples will use.
    pub fn layout(&self) -> Result<ElementLayout> {
        match self.element {
            Some(element) => Ok(ElementLayout { element, lanes: 1 }),
            None => ElementLayout::for_type_code(self.key.type_code),
        }
    }

    /// Collect the channel's payload up to and including its next
    /// end-of-frame packet, or to end of stream.
    ///
    /// Raw sample payloads (type 0x22) lose their leading sub-timing
    /// elements. Returns `Ok(None)` if the channel produced nothing before
    /// the stream ended.
    pub fn extract<R: Read>(&self, reader: &mut PacketReader<R>) -> Result<Option<Samples>> {
        let layout = self.layout().map_err(|err| err.at(reader.offset()))?;
        let collected: RefCell<Option<Vec<i64>>> = RefCell::new(None);

        {
            let mut router = Router::new();
            router.register(self.key.type_code, self.key.id, |packet| {
                let values = decode_elements(&packet.payload, layout.element);
                let skip = if packet.header.type_code == RAW_SAMPLE_TYPE {
                    RAW_SAMPLE_PREFIX_ELEMENTS.min(values.len())
                } else {
                    0
                };
                collected
                    .borrow_mut()
                    .get_or_insert_with(Vec::new)
                    .extend_from_slice(&values[skip..]);
            });

            let options = RunOptions::default()
                .stop_at_frame_end(self.key)
                .max_offset(self.max_offset);
            loop {
                let outcome = router.run(reader, &options)?;
                if collected.borrow().is_some() || outcome != RunOutcome::FrameBoundary {
                    break;
                }
            }
        }

        match collected.into_inner() {
            Some(values) => Samples::new(layout.element, layout.lanes, values)
                .map(Some)
                .map_err(|err| err.at(reader.offset())),
            None => Ok(None),
        }
    }
}
