use std::collections::HashMap;
use std::io::Read;

use sultkit_frame::{ChannelKey, Packet, PacketReader, SEQ_EXEMPT_TYPE};

use crate::error::Result;
use crate::reassembly::Reassembler;
use crate::sample::{decode_elements, ElementType};

type Callback<'a> = Box<dyn FnMut(&Packet) + 'a>;

/// Why a [`Router::run`] call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The source has no more complete packets.
    StreamEnded,
    /// The reader reached `max_offset`.
    StoppedEarly,
    /// An end-of-frame packet on the stop channel was dispatched.
    FrameBoundary,
}

/// Stop conditions for [`Router::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// Channel whose end-of-frame stops the run. Wildcards allowed.
    pub stop: ChannelKey,
    /// Stop once the reader offset reaches this many bytes.
    pub max_offset: Option<u64>,
    /// Enable the frame-boundary stop.
    pub stop_at_frame_end: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            stop: ChannelKey::ANY,
            max_offset: None,
            stop_at_frame_end: false,
        }
    }
}

impl RunOptions {
    /// Stop after the first end-of-frame packet on `stop`.
    pub fn stop_at_frame_end(mut self, stop: ChannelKey) -> Self {
        self.stop = stop;
        self.stop_at_frame_end = true;
        self
    }

    pub fn max_offset(mut self, max_offset: Option<u64>) -> Self {
        self.max_offset = max_offset;
        self
    }
}

/// Advisory counters collected while dispatching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub packets: u64,
    pub data_loss: u64,
    pub sequence_anomalies: u64,
}

/// Dispatches packets to callbacks registered per channel and tracks
/// per-channel sequence continuity.
///
/// One router is one decoding session. Callbacks run synchronously on the
/// dispatching thread; a slow callback stalls decoding.
#[derive(Default)]
pub struct Router<'a> {
    callbacks: HashMap<u16, Vec<Callback<'a>>>,
    seq_lens: HashMap<u16, u32>,
    stats: RouterStats,
}

impl<'a> Router<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback on `(type_code, id)`. Either may be the 0xFF
    /// wildcard. Callbacks on the same key run in registration order.
    pub fn register(&mut self, type_code: u8, id: u8, callback: impl FnMut(&Packet) + 'a) {
        self.callbacks
            .entry(ChannelKey::new(type_code, id).as_u16())
            .or_default()
            .push(Box::new(callback));
    }

    /// Register a reassembling reader: payloads on the channel are decoded
    /// as `element` and accumulated into a `capacity`-element buffer that
    /// is flushed to `consumer` when full and at every end of frame.
    pub fn register_reassembler(
        &mut self,
        type_code: u8,
        id: u8,
        capacity: usize,
        element: ElementType,
        consumer: impl FnMut(&[i64]) + 'a,
    ) -> Result<()> {
        let mut reassembler = Reassembler::new(capacity, consumer)?;
        self.register(type_code, id, move |packet| {
            let values = decode_elements(&packet.payload, element);
            reassembler.push(&values, packet.header.end_of_frame());
        });
        Ok(())
    }

    /// Route one packet: check advisories, update the sequence table, then
    /// call every matching callback (exact, type-wildcard, id-wildcard,
    /// full wildcard).
    pub fn dispatch(&mut self, packet: &Packet) {
        let header = &packet.header;
        let key = packet.key();
        self.stats.packets += 1;

        if header.data_loss() {
            self.stats.data_loss += 1;
            tracing::warn!(channel = %key, header = %header, "data loss");
        }

        if header.type_code != SEQ_EXEMPT_TYPE {
            let slot = key.as_u16();
            if let Some(&expected) = self.seq_lens.get(&slot) {
                if expected != header.seq_len {
                    self.stats.sequence_anomalies += 1;
                    tracing::warn!(
                        channel = %key,
                        got = header.seq_len,
                        expected,
                        "sequence length mismatch"
                    );
                }
            }
            self.seq_lens
                .insert(slot, header.seq_len.wrapping_add(header.len as u32));
        }

        tracing::trace!(channel = %key, len = header.len, "dispatch");
        for candidate in key.matching_keys() {
            if let Some(callbacks) = self.callbacks.get_mut(&candidate.as_u16()) {
                for callback in callbacks.iter_mut() {
                    callback(packet);
                }
            }
        }
    }

    /// Decode and dispatch packets until the stream ends or a stop
    /// condition in `options` fires. Lost sync aborts the run.
    pub fn run<R: Read>(
        &mut self,
        reader: &mut PacketReader<R>,
        options: &RunOptions,
    ) -> Result<RunOutcome> {
        while let Some(packet) = reader.read_packet()? {
            self.dispatch(&packet);

            if options.stop_at_frame_end
                && packet.header.end_of_frame()
                && options.stop.matches(packet.key())
            {
                tracing::debug!(offset = reader.offset(), channel = %packet.key(), "frame boundary");
                return Ok(RunOutcome::FrameBoundary);
            }
            if let Some(max_offset) = options.max_offset {
                if reader.offset() >= max_offset {
                    tracing::debug!(offset = reader.offset(), max_offset, "read limit reached");
                    return Ok(RunOutcome::StoppedEarly);
                }
            }
        }

        tracing::debug!(offset = reader.offset(), "stream ended");
        Ok(RunOutcome::StreamEnded)
    }

    /// Expected `seq_len` of the next packet on `key`, if any was seen.
    pub fn expected_seq_len(&self, key: ChannelKey) -> Option<u32> {
        self.seq_lens.get(&key.as_u16()).copied()
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::io::Cursor;

    use sultkit_frame::{
        PacketBuilder, PacketHeader, PacketWriter, FLAG_DATA_LOSS, FLAG_END_OF_FRAME, WILDCARD,
    };

    use super::*;
    use crate::error::RouteError;

    fn packet(type_code: u8, id: u8, flags: u8, seq_len: u32, words: &[u32]) -> Packet {
        let header = PacketBuilder::new(type_code, id)
            .flags(flags)
            .seq_len(seq_len)
            .header(words.len() as u16);
        let mut wire = bytes::BytesMut::new();
        sultkit_frame::encode_packet(&header, words, &mut wire).unwrap();
        sultkit_frame::decode_packet(&mut wire).unwrap().unwrap()
    }

    fn capture(build: impl FnOnce(&mut PacketWriter<Vec<u8>>)) -> PacketReader<Cursor<Vec<u8>>> {
        let mut writer = PacketWriter::new(Vec::new());
        build(&mut writer);
        PacketReader::new(Cursor::new(writer.into_inner()))
    }

    #[test]
    fn exact_registration_receives_only_its_channel() {
        let seen = RefCell::new(Vec::new());
        let mut router = Router::new();
        router.register(0x14, 1, |p| seen.borrow_mut().push(p.key()));

        router.dispatch(&packet(0x14, 1, 0, 0, &[1]));
        router.dispatch(&packet(0x14, 2, 0, 0, &[1]));
        router.dispatch(&packet(0x22, 1, 0, 0, &[1]));

        assert_eq!(*seen.borrow(), vec![ChannelKey::new(0x14, 1)]);
    }

    #[test]
    fn full_wildcard_receives_every_packet() {
        let count = RefCell::new(0);
        let mut router = Router::new();
        router.register(WILDCARD, WILDCARD, |_| *count.borrow_mut() += 1);

        for (t, i) in [(0x14, 1), (0x22, 7), (0xCC, 0)] {
            router.dispatch(&packet(t, i, 0, 0, &[]));
        }
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn type_wildcard_receives_all_ids_of_type() {
        let seen = RefCell::new(Vec::new());
        let mut router = Router::new();
        router.register(0x14, WILDCARD, |p| seen.borrow_mut().push(p.header.id));

        router.dispatch(&packet(0x14, 1, 0, 0, &[]));
        router.dispatch(&packet(0x22, 1, 0, 0, &[]));
        router.dispatch(&packet(0x14, 9, 0, 0, &[]));

        assert_eq!(*seen.borrow(), vec![1, 9]);
    }

    #[test]
    fn id_wildcard_receives_all_types_with_id() {
        let seen = RefCell::new(Vec::new());
        let mut router = Router::new();
        router.register(WILDCARD, 3, |p| seen.borrow_mut().push(p.header.type_code));

        router.dispatch(&packet(0x14, 3, 0, 0, &[]));
        router.dispatch(&packet(0x22, 4, 0, 0, &[]));
        router.dispatch(&packet(0x22, 3, 0, 0, &[]));

        assert_eq!(*seen.borrow(), vec![0x14, 0x22]);
    }

    #[test]
    fn resolution_order_and_registration_order() {
        let order = RefCell::new(Vec::new());
        let mut router = Router::new();
        router.register(WILDCARD, WILDCARD, |_| order.borrow_mut().push("any"));
        router.register(WILDCARD, 1, |_| order.borrow_mut().push("id"));
        router.register(0x14, WILDCARD, |_| order.borrow_mut().push("type"));
        router.register(0x14, 1, |_| order.borrow_mut().push("exact-a"));
        router.register(0x14, 1, |_| order.borrow_mut().push("exact-b"));

        router.dispatch(&packet(0x14, 1, 0, 0, &[]));

        assert_eq!(
            *order.borrow(),
            vec!["exact-a", "exact-b", "type", "id", "any"]
        );
    }

    #[test]
    fn sequence_table_tracks_running_total() {
        let mut router = Router::new();
        let key = ChannelKey::new(0x14, 1);
        let mut seq = 0u32;
        for len in [3u32, 5, 1, 7] {
            let words = vec![0u32; len as usize];
            router.dispatch(&packet(0x14, 1, 0, seq, &words));
            seq += len;
        }

        assert_eq!(router.expected_seq_len(key), Some(16));
        assert_eq!(router.stats().sequence_anomalies, 0);
        assert_eq!(router.stats().packets, 4);
    }

    #[test]
    fn sequence_mismatch_is_reported_once_and_resyncs() {
        let mut router = Router::new();
        router.dispatch(&packet(0x14, 1, 0, 0, &[1, 2]));
        // Expected 2; a gap of 10 words.
        router.dispatch(&packet(0x14, 1, 0, 12, &[3, 4]));
        router.dispatch(&packet(0x14, 1, 0, 14, &[5]));
        router.dispatch(&packet(0x14, 1, 0, 15, &[6]));

        assert_eq!(router.stats().sequence_anomalies, 1);
        assert_eq!(router.expected_seq_len(ChannelKey::new(0x14, 1)), Some(16));
    }

    #[test]
    fn channels_are_tracked_independently() {
        let mut router = Router::new();
        router.dispatch(&packet(0x14, 1, 0, 0, &[1, 2]));
        router.dispatch(&packet(0x14, 2, 0, 0, &[1]));
        router.dispatch(&packet(0x14, 1, 0, 2, &[1]));
        router.dispatch(&packet(0x14, 2, 0, 1, &[1]));

        assert_eq!(router.stats().sequence_anomalies, 0);
        assert_eq!(router.expected_seq_len(ChannelKey::new(0x14, 1)), Some(3));
        assert_eq!(router.expected_seq_len(ChannelKey::new(0x14, 2)), Some(2));
    }

    #[test]
    fn exempt_type_is_not_sequence_checked() {
        let mut router = Router::new();
        router.dispatch(&packet(SEQ_EXEMPT_TYPE, 0, 0, 100, &[1]));
        router.dispatch(&packet(SEQ_EXEMPT_TYPE, 0, 0, 5, &[1]));

        assert_eq!(router.stats().sequence_anomalies, 0);
        assert_eq!(router.expected_seq_len(ChannelKey::new(SEQ_EXEMPT_TYPE, 0)), None);
    }

    #[test]
    fn data_loss_is_advisory() {
        let count = RefCell::new(0);
        let mut router = Router::new();
        router.register(0x14, 1, |_| *count.borrow_mut() += 1);

        router.dispatch(&packet(0x14, 1, FLAG_DATA_LOSS, 0, &[1]));
        router.dispatch(&packet(0x14, 1, 0, 1, &[1]));

        assert_eq!(router.stats().data_loss, 1);
        assert_eq!(*count.borrow(), 2);
    }

    #[test]
    fn run_until_stream_end() {
        let mut reader = capture(|w| {
            w.send(PacketBuilder::new(0x14, 1), &[1, 2]).unwrap();
            w.send(PacketBuilder::new(0x14, 2), &[3]).unwrap();
            w.send(PacketBuilder::new(0x14, 1), &[4]).unwrap();
        });
        let count = RefCell::new(0);
        let mut router = Router::new();
        router.register(WILDCARD, WILDCARD, |_| *count.borrow_mut() += 1);

        let outcome = router.run(&mut reader, &RunOptions::default()).unwrap();
        assert_eq!(outcome, RunOutcome::StreamEnded);
        assert_eq!(*count.borrow(), 3);
        assert_eq!(router.stats().sequence_anomalies, 0);
    }

    #[test]
    fn run_stops_at_matching_frame_end() {
        let mut reader = capture(|w| {
            let eof = PacketBuilder::new(0x14, 2).flags(FLAG_END_OF_FRAME);
            w.send(PacketBuilder::new(0x14, 1).flags(FLAG_END_OF_FRAME), &[1])
                .unwrap();
            w.send(eof, &[2]).unwrap();
            w.send(PacketBuilder::new(0x14, 2), &[3]).unwrap();
        });
        let mut router = Router::new();
        let options = RunOptions::default().stop_at_frame_end(ChannelKey::new(0x14, 2));

        assert_eq!(
            router.run(&mut reader, &options).unwrap(),
            RunOutcome::FrameBoundary
        );
        assert_eq!(router.stats().packets, 2);

        assert_eq!(
            router.run(&mut reader, &options).unwrap(),
            RunOutcome::StreamEnded
        );
        assert_eq!(router.stats().packets, 3);
    }

    #[test]
    fn end_of_frame_ignored_without_stop_flag() {
        let mut reader = capture(|w| {
            w.send(PacketBuilder::new(0x14, 1).flags(FLAG_END_OF_FRAME), &[1])
                .unwrap();
            w.send(PacketBuilder::new(0x14, 1), &[2]).unwrap();
        });
        let mut router = Router::new();
        assert_eq!(
            router.run(&mut reader, &RunOptions::default()).unwrap(),
            RunOutcome::StreamEnded
        );
    }

    #[test]
    fn run_stops_early_at_max_offset() {
        let mut reader = capture(|w| {
            for _ in 0..4 {
                w.send(PacketBuilder::new(0x14, 1), &[0]).unwrap();
            }
        });
        let mut router = Router::new();
        let options = RunOptions::default().max_offset(Some(40));

        assert_eq!(
            router.run(&mut reader, &options).unwrap(),
            RunOutcome::StoppedEarly
        );
        assert_eq!(router.stats().packets, 2);
        assert_eq!(reader.offset(), 40);
    }

    #[test]
    fn lost_sync_aborts_run_with_offset() {
        let mut bytes = Vec::new();
        {
            let mut writer = PacketWriter::new(&mut bytes);
            writer.send(PacketBuilder::new(0x14, 1), &[1]).unwrap();
        }
        bytes.extend_from_slice(&[0x01, 0, 0, 0]);
        bytes.extend_from_slice(&[0u8; 12]);

        let count = RefCell::new(0);
        let mut router = Router::new();
        router.register(WILDCARD, WILDCARD, |_| *count.borrow_mut() += 1);

        let mut reader = PacketReader::new(Cursor::new(bytes));
        let err = router.run(&mut reader, &RunOptions::default()).unwrap_err();
        assert!(matches!(err, RouteError::Frame(_)));
        assert_eq!(err.offset(), Some(20));
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn reassembler_registration_flushes_frames() {
        let mut reader = capture(|w| {
            w.send(PacketBuilder::new(0x14, 1), &[1, 2, 3]).unwrap();
            w.send(PacketBuilder::new(0x14, 1), &[4, 5, 6]).unwrap();
            w.send(PacketBuilder::new(0x14, 1).flags(FLAG_END_OF_FRAME), &[7])
                .unwrap();
        });
        let flushes = RefCell::new(Vec::new());
        let mut router = Router::new();
        router
            .register_reassembler(0x14, 1, 4, ElementType::I32, |seg| {
                flushes.borrow_mut().push(seg.to_vec())
            })
            .unwrap();

        router.run(&mut reader, &RunOptions::default()).unwrap();
        assert_eq!(*flushes.borrow(), vec![vec![1, 2, 3, 4], vec![5, 6, 7]]);
    }

    #[test]
    fn header_fields_reach_callbacks_unchanged() {
        let header = PacketHeader {
            rtc_low: 10,
            rtc_high: 1,
            ..PacketBuilder::new(0x22, 1).header(4)
        };
        let mut bytes = Vec::new();
        PacketWriter::new(&mut bytes)
            .write_packet(&header, &[1, 2, 3, 4])
            .unwrap();

        let seen = RefCell::new(None);
        let mut router = Router::new();
        router.register(0x22, 1, |p| *seen.borrow_mut() = Some(p.header));
        router
            .run(&mut PacketReader::new(Cursor::new(bytes)), &RunOptions::default())
            .unwrap();

        let got = seen.borrow().unwrap();
        assert_eq!(got, header);
        assert_eq!(got.rtc(), 65546);
    }
}
