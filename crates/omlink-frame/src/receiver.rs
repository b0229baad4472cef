use bytes::Bytes;
use tracing::{trace, warn};

use crate::codec::{FrameConfig, HEADER1, HEADER2, HEADER_SIZE, MAX_FRAME_SIZE};
use crate::crc::crc8;
use crate::error::{FrameError, Result};

/// Phase of the byte-at-a-time frame state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiverState {
    AwaitingHeader1,
    AwaitingHeader2,
    AwaitingLength,
    AwaitingData,
}

/// Running counters kept by a [`FrameReceiver`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Frames that passed the checksum.
    pub frames: u64,
    /// Second sentinel byte missing.
    pub framing_errors: u64,
    /// Length byte outside the configured bounds.
    pub length_errors: u64,
    /// Checksum did not match.
    pub checksum_errors: u64,
    /// Partial frames dropped by the staleness budget.
    pub stale_frames: u64,
}

impl ReceiverStats {
    /// Sum of every error counter.
    pub fn errors(&self) -> u64 {
        self.framing_errors + self.length_errors + self.checksum_errors + self.stale_frames
    }
}

/// Rebuilds frames from a byte stream, one byte per call.
///
/// One receiver serves one serial connection. It owns a fixed
/// [`MAX_FRAME_SIZE`] buffer and never grows it; length bytes are checked
/// against the configured bounds before any data is accepted, so the buffer
/// cannot overflow whatever arrives on the wire.
///
/// Any structural violation drops only the in-flight frame. Bytes that are
/// not a first sentinel are skipped while hunting for a header, so the
/// receiver always finds its way back to the next good frame.
pub struct FrameReceiver {
    config: FrameConfig,
    state: ReceiverState,
    buf: [u8; MAX_FRAME_SIZE],
    filled: usize,
    remaining: usize,
    last_byte_ms: Option<u64>,
    stats: ReceiverStats,
}

impl FrameReceiver {
    /// Create a receiver waiting for a first sentinel.
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config: config.normalized(),
            state: ReceiverState::AwaitingHeader1,
            buf: [0u8; MAX_FRAME_SIZE],
            filled: 0,
            remaining: 0,
            last_byte_ms: None,
            stats: ReceiverStats::default(),
        }
    }

    /// Drop any partial frame and wait for a first sentinel.
    ///
    /// Counters are kept; use [`reset_stats`](Self::reset_stats) to clear them.
    pub fn reset(&mut self) {
        self.state = ReceiverState::AwaitingHeader1;
        self.filled = 0;
        self.remaining = 0;
        self.last_byte_ms = None;
    }

    /// Zero every counter.
    pub fn reset_stats(&mut self) {
        self.stats = ReceiverStats::default();
    }

    /// Current phase.
    pub fn state(&self) -> ReceiverState {
        self.state
    }

    /// Bytes of the in-flight frame received so far.
    pub fn pending(&self) -> usize {
        self.filled
    }

    /// Counters since construction or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> ReceiverStats {
        self.stats
    }

    /// Effective (normalized) configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Feed one byte.
    ///
    /// Returns `Ok(Some(payload))` when the byte completes a frame with a
    /// valid checksum, `Ok(None)` while a frame is still being assembled or
    /// noise is being skipped, and an error when the current frame had to be
    /// thrown away. After an error the receiver is already resynchronizing;
    /// callers just keep feeding bytes.
    pub fn on_byte(&mut self, byte: u8) -> Result<Option<Bytes>> {
        match self.state {
            ReceiverState::AwaitingHeader1 => {
                if byte == HEADER1 {
                    self.start_frame();
                }
                Ok(None)
            }
            ReceiverState::AwaitingHeader2 => {
                if byte == HEADER2 {
                    self.push(byte);
                    self.state = ReceiverState::AwaitingLength;
                    return Ok(None);
                }

                self.stats.framing_errors += 1;
                warn!(found = byte, "framing error: second sentinel missing");
                if byte == HEADER1 {
                    // A doubled first sentinel may itself open the next frame.
                    self.start_frame();
                } else {
                    self.reset();
                }
                Err(FrameError::Framing { found: byte })
            }
            ReceiverState::AwaitingLength => {
                let (min, max) = (self.config.min_length, self.config.max_length);
                if byte < min || byte > max {
                    self.stats.length_errors += 1;
                    warn!(length = byte, min, max, "frame length out of range");
                    self.reset();
                    return Err(FrameError::LengthOutOfRange {
                        length: byte,
                        min,
                        max,
                    });
                }
                self.push(byte);
                self.remaining = byte as usize;
                self.state = ReceiverState::AwaitingData;
                Ok(None)
            }
            ReceiverState::AwaitingData => {
                self.push(byte);
                self.remaining -= 1;
                if self.remaining > 0 {
                    return Ok(None);
                }
                self.finish_frame()
            }
        }
    }

    /// Feed one byte that arrived at `now_ms`, enforcing
    /// [`FrameConfig::stale_after`].
    ///
    /// If a partial frame has been idle longer than the budget it is
    /// discarded first and the byte is then interpreted as the possible
    /// start of a new frame. The discard is reported as [`FrameError::Stale`].
    pub fn on_byte_at(&mut self, byte: u8, now_ms: u64) -> Result<Option<Bytes>> {
        let idle_ms = match (self.state, self.last_byte_ms) {
            (ReceiverState::AwaitingHeader1, _) | (_, None) => None,
            (_, Some(last)) => Some(now_ms.saturating_sub(last)),
        };

        let stale = match (idle_ms, self.config.stale_after) {
            (Some(idle), Some(budget)) => idle > budget.as_millis() as u64,
            _ => false,
        };

        if stale {
            let idle_ms = idle_ms.unwrap_or_default();
            self.stats.stale_frames += 1;
            warn!(idle_ms, pending = self.filled, "discarding stale partial frame");
            self.reset();
            self.last_byte_ms = Some(now_ms);
            // From AwaitingHeader1 this can neither complete nor fail a frame.
            let _ = self.on_byte(byte);
            return Err(FrameError::Stale { idle_ms });
        }

        self.last_byte_ms = Some(now_ms);
        self.on_byte(byte)
    }

    fn start_frame(&mut self) {
        self.filled = 0;
        self.remaining = 0;
        self.push(HEADER1);
        self.state = ReceiverState::AwaitingHeader2;
    }

    fn push(&mut self, byte: u8) {
        self.buf[self.filled] = byte;
        self.filled += 1;
    }

    fn finish_frame(&mut self) -> Result<Option<Bytes>> {
        let end = self.filled;
        let received = self.buf[end - 1];
        let computed = crc8(0, &self.buf[..end - 1]);
        let payload = &self.buf[HEADER_SIZE..end - 1];

        let outcome = if computed == received {
            self.stats.frames += 1;
            trace!(len = payload.len(), "frame received");
            Ok(Some(Bytes::copy_from_slice(payload)))
        } else {
            self.stats.checksum_errors += 1;
            warn!(
                computed,
                received,
                len = payload.len(),
                "frame checksum mismatch"
            );
            Err(FrameError::ChecksumMismatch { computed, received })
        };

        self.reset();
        outcome
    }
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new(FrameConfig::default())
    }
}

impl std::fmt::Debug for FrameReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReceiver")
            .field("state", &self.state)
            .field("pending", &self.filled)
            .field("remaining", &self.remaining)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::BytesMut;

    use super::*;
    use crate::codec::{encode_frame, MAX_PAYLOAD};

    fn frame(payload: &[u8]) -> Vec<u8> {
        let mut buf = BytesMut::new();
        encode_frame(payload, &mut buf).unwrap();
        buf.to_vec()
    }

    fn feed(rx: &mut FrameReceiver, bytes: &[u8]) -> (Vec<Bytes>, Vec<FrameError>) {
        let mut frames = Vec::new();
        let mut errors = Vec::new();
        for &b in bytes {
            match rx.on_byte(b) {
                Ok(Some(payload)) => frames.push(payload),
                Ok(None) => {}
                Err(err) => errors.push(err),
            }
        }
        (frames, errors)
    }

    #[test]
    fn reference_frame_dispatches_once() {
        let mut rx = FrameReceiver::default();
        let wire = [0xAA, 0x55, 0x05, 0x01, 0x02, 0x03, 0x04, 0x13];

        for &b in &wire[..wire.len() - 1] {
            assert!(rx.on_byte(b).unwrap().is_none());
        }
        let payload = rx.on_byte(wire[wire.len() - 1]).unwrap().unwrap();

        assert_eq!(payload.as_ref(), &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader1);
        assert_eq!(rx.stats().frames, 1);
    }

    #[test]
    fn states_advance_through_header() {
        let mut rx = FrameReceiver::default();
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader1);
        rx.on_byte(0xAA).unwrap();
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader2);
        rx.on_byte(0x55).unwrap();
        assert_eq!(rx.state(), ReceiverState::AwaitingLength);
        rx.on_byte(0x02).unwrap();
        assert_eq!(rx.state(), ReceiverState::AwaitingData);
        assert_eq!(rx.pending(), 3);
    }

    #[test]
    fn empty_payload_is_valid() {
        let mut rx = FrameReceiver::default();
        let (frames, errors) = feed(&mut rx, &[0xAA, 0x55, 0x01, 0x85]);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
        assert!(frames[0].is_empty());
    }

    #[test]
    fn max_length_frame() {
        let payload: Vec<u8> = (0..MAX_PAYLOAD).map(|i| i as u8).collect();
        let mut rx = FrameReceiver::default();
        let (frames, errors) = feed(&mut rx, &frame(&payload));
        assert!(errors.is_empty());
        assert_eq!(frames[0].as_ref(), payload.as_slice());
    }

    #[test]
    fn noise_before_header_is_ignored() {
        let mut rx = FrameReceiver::default();
        let mut wire = vec![0x00, 0x55, 0x13, 0xFF];
        wire.extend(frame(&[0x42]));
        let (frames, errors) = feed(&mut rx, &wire);

        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0x42]);
    }

    #[test]
    fn missing_second_sentinel_is_framing_error() {
        let mut rx = FrameReceiver::default();
        rx.on_byte(0xAA).unwrap();
        let err = rx.on_byte(0x00).unwrap_err();

        assert!(matches!(err, FrameError::Framing { found: 0x00 }));
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader1);
        assert_eq!(rx.stats().framing_errors, 1);
    }

    #[test]
    fn zero_length_rejected_then_next_frame_received() {
        let mut rx = FrameReceiver::default();
        let mut wire = vec![0xAA, 0x55, 0x00];
        wire.extend(frame(&[0x09]));

        let (frames, errors) = feed(&mut rx, &wire);

        assert_eq!(errors.len(), 1);
        assert!(matches!(
            errors[0],
            FrameError::LengthOutOfRange {
                length: 0,
                min: 1,
                max: 255
            }
        ));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0x09]);
        assert_eq!(rx.stats().length_errors, 1);
    }

    #[test]
    fn configured_max_length_enforced() {
        let mut rx = FrameReceiver::new(FrameConfig {
            max_length: 4,
            ..FrameConfig::default()
        });

        let (frames, errors) = feed(&mut rx, &frame(&[1, 2, 3, 4]));
        assert!(frames.is_empty());
        assert!(matches!(
            errors[0],
            FrameError::LengthOutOfRange { length: 5, .. }
        ));

        let (frames, errors) = feed(&mut rx, &frame(&[1, 2, 3]));
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn checksum_mismatch_drops_frame_and_recovers() {
        let mut rx = FrameReceiver::default();
        let mut bad = frame(&[0x01, 0x02]);
        let last = bad.len() - 1;
        bad[last] ^= 0xFF;
        let mut wire = bad;
        wire.extend(frame(&[0x03]));

        let (frames, errors) = feed(&mut rx, &wire);

        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], FrameError::ChecksumMismatch { .. }));
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0x03]);
        assert_eq!(rx.stats().checksum_errors, 1);
        assert_eq!(rx.stats().frames, 1);
    }

    #[test]
    fn stray_first_sentinel_between_frames() {
        let mut rx = FrameReceiver::default();
        let mut wire = frame(&[0x01, 0x02, 0x03, 0x04]);
        wire.push(0xAA);
        wire.extend(frame(&[0x05, 0x06]));

        let (frames, errors) = feed(&mut rx, &wire);

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].as_ref(), &[0x01, 0x02, 0x03, 0x04]);
        assert_eq!(frames[1].as_ref(), &[0x05, 0x06]);
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], FrameError::Framing { found: 0xAA }));
    }

    #[test]
    fn run_of_first_sentinels_never_overflows() {
        let mut rx = FrameReceiver::default();
        let mut wire = vec![0xAA; 1000];
        wire.extend(frame(&[0x77]));

        let (frames, _) = feed(&mut rx, &wire);
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0x77]);
    }

    #[test]
    fn arbitrary_noise_keeps_buffer_bounded() {
        let mut rx = FrameReceiver::default();
        let mut seed = 0x1234_5678u32;
        for _ in 0..200_000 {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            let byte = match seed >> 29 {
                0 => 0xAA,
                1 => 0x55,
                _ => (seed >> 16) as u8,
            };
            let _ = rx.on_byte(byte);
            assert!(rx.pending() <= MAX_FRAME_SIZE);
        }
    }

    #[test]
    fn no_single_bit_flip_is_delivered() {
        let payloads: [&[u8]; 4] = [
            &[0x01, 0x02, 0x03, 0x04],
            &[0x81, 0x00],
            &[0x0F, 0x10, 0x20, 0x30],
            &[0x8F, 0x56, 0x34, 0x12, 0x00],
        ];
        for payload in payloads {
            let wire = frame(payload);
            for index in 0..wire.len() {
                for bit in 0..8 {
                    let mut corrupted = wire.clone();
                    corrupted[index] ^= 1 << bit;
                    let mut rx = FrameReceiver::default();
                    let (frames, _) = feed(&mut rx, &corrupted);
                    assert!(
                        frames.is_empty(),
                        "flip of byte {index} bit {bit} delivered {frames:?}"
                    );
                }
            }
        }
    }

    #[test]
    fn reset_discards_partial_frame() {
        let mut rx = FrameReceiver::default();
        let wire = frame(&[1, 2, 3]);
        feed(&mut rx, &wire[..4]);
        assert_eq!(rx.state(), ReceiverState::AwaitingData);

        rx.reset();
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader1);
        assert_eq!(rx.pending(), 0);

        let (frames, errors) = feed(&mut rx, &wire);
        assert!(errors.is_empty());
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn stale_partial_frame_discarded() {
        let mut rx = FrameReceiver::new(FrameConfig {
            stale_after: Some(Duration::from_millis(50)),
            ..FrameConfig::default()
        });
        let wire = frame(&[0x10, 0x20]);

        for (i, &b) in wire[..3].iter().enumerate() {
            rx.on_byte_at(b, i as u64).unwrap();
        }
        assert_eq!(rx.state(), ReceiverState::AwaitingData);

        // The stall ends with a fresh frame starting.
        let err = rx.on_byte_at(wire[0], 500).unwrap_err();
        assert!(matches!(err, FrameError::Stale { idle_ms: 498 }));
        assert_eq!(rx.state(), ReceiverState::AwaitingHeader2);
        assert_eq!(rx.stats().stale_frames, 1);

        let mut frames = Vec::new();
        for (i, &b) in wire[1..].iter().enumerate() {
            if let Some(p) = rx.on_byte_at(b, 501 + i as u64).unwrap() {
                frames.push(p);
            }
        }
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref(), &[0x10, 0x20]);
    }

    #[test]
    fn slow_bytes_within_budget_are_kept() {
        let mut rx = FrameReceiver::new(FrameConfig {
            stale_after: Some(Duration::from_millis(50)),
            ..FrameConfig::default()
        });
        let mut delivered = None;
        for (i, &b) in frame(&[0x33]).iter().enumerate() {
            delivered = rx.on_byte_at(b, i as u64 * 40).unwrap();
        }
        assert_eq!(delivered.unwrap().as_ref(), &[0x33]);
    }

    #[test]
    fn staleness_disabled_by_default() {
        let mut rx = FrameReceiver::default();
        let wire = frame(&[0x01]);
        rx.on_byte_at(wire[0], 0).unwrap();
        rx.on_byte_at(wire[1], 0).unwrap();
        rx.on_byte_at(wire[2], 0).unwrap();
        rx.on_byte_at(wire[3], 1_000_000).unwrap();
        let payload = rx.on_byte_at(wire[4], 2_000_000).unwrap();
        assert_eq!(payload.unwrap().as_ref(), &[0x01]);
    }

    #[test]
    fn stats_accumulate_and_reset() {
        let mut rx = FrameReceiver::default();
        let mut wire = vec![0xAA, 0x00, 0xAA, 0x55, 0x00];
        wire.extend(frame(&[1]));
        wire.extend(frame(&[2]));
        feed(&mut rx, &wire);

        let stats = rx.stats();
        assert_eq!(stats.frames, 2);
        assert_eq!(stats.framing_errors, 1);
        assert_eq!(stats.length_errors, 1);
        assert_eq!(stats.errors(), 2);

        rx.reset_stats();
        assert_eq!(rx.stats(), ReceiverStats::default());
    }
}
