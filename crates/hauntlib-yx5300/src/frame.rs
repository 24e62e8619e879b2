//! Wire frame encoder/decoder for the YX5200/YX5300 serial protocol.
//!
//! The chip family speaks a fixed-size framed protocol at 9600 baud.
//!
//! # Frame format
//!
//! ```text
//! [0] start=0x7E  [1] version=0xFF  [2] length=0x06  [3] msg id
//! [4] feedback (0x00/0x01)  [5] param_hi  [6] param_lo
//! [7] checksum_hi  [8] checksum_lo  [9] end=0xEF
//! ```
//!
//! The checksum is the two's complement of the 16-bit sum of bytes 1
//! through 6 (version through the low parameter byte). Module firmware on
//! some clone boards omits the checksum entirely and terminates the frame
//! after the parameter bytes; the decoder accepts both the 10-byte and the
//! 8-byte form without configuration.

/// Start-of-frame marker.
pub const START: u8 = 0x7E;

/// Protocol version byte. Always `0xFF` for this chip family.
pub const VERSION: u8 = 0xFF;

/// Payload length byte. Always 6 (msg id through param_lo).
pub const PAYLOAD_LENGTH: u8 = 0x06;

/// End-of-frame marker.
pub const END: u8 = 0xEF;

/// One wire frame, filled either atomically by [`Frame::assemble`] for
/// transmission or progressively by [`Frame::push`] as bytes arrive.
///
/// A single instance is meant to be reused for the lifetime of a serial
/// session: after a complete frame has been consumed, the next `push`
/// starts matching a fresh frame in the same buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    buf: [u8; 10],
    len: usize,
}

impl Frame {
    /// Create an empty frame with the invariant framing bytes pre-seeded.
    ///
    /// The start, version, length, and end bytes are written once here and
    /// never touched again; both the encoder and the receive automaton rely
    /// on them as the template.
    pub fn new() -> Self {
        Frame {
            buf: [START, VERSION, PAYLOAD_LENGTH, 0, 0, 0, 0, 0, 0, END],
            len: 0,
        }
    }

    /// Compose a complete outbound frame for `msg_id` with a 16-bit
    /// parameter, computing the checksum.
    ///
    /// `feedback` requests that the module acknowledge the command with an
    /// ACK message. Queries leave it off because the query's own response
    /// acts as the acknowledgment.
    pub fn assemble(msg_id: u8, param: u16, feedback: bool) -> Self {
        let mut frame = Frame::new();
        frame.buf[3] = msg_id;
        frame.buf[4] = feedback as u8;
        frame.buf[5] = (param >> 8) as u8;
        frame.buf[6] = param as u8;
        let checksum = (!frame.sum()).wrapping_add(1);
        frame.buf[7] = (checksum >> 8) as u8;
        frame.buf[8] = checksum as u8;
        frame.len = 10;
        frame
    }

    /// Feed one received byte into the frame. Returns `true` exactly when
    /// the byte completes a frame.
    ///
    /// Positions 0, 1, 2, and 9 must match the frame template; a mismatch
    /// restarts matching, resynchronizing to position 1 when the offending
    /// byte is itself a start marker. Position 7 accepts an early end
    /// marker, completing the checksum-less 8-byte form.
    pub fn push(&mut self, b: u8) -> bool {
        if self.len > 9 {
            // Previous frame consumed; start fresh.
            self.len = 0;
        }
        match self.len {
            0 | 1 | 2 | 9 => {
                if b == self.buf[self.len] {
                    self.len += 1;
                    self.len == 10
                } else if b == START {
                    self.len = 1;
                    false
                } else {
                    self.len = 0;
                    false
                }
            }
            7 if b == END => {
                self.len = 8;
                true
            }
            _ => {
                // Payload and checksum bytes (3..=8) are stored verbatim.
                self.buf[self.len] = b;
                self.len += 1;
                false
            }
        }
    }

    /// Check the frame against the syntactic validity invariant: an
    /// 8-byte frame is unconditionally valid (nothing to check), a 10-byte
    /// frame must have a checksum that cancels the byte sum modulo 2^16,
    /// and any other length is invalid.
    pub fn is_valid(&self) -> bool {
        // The early-end path is the only way a complete frame stops at 8
        // bytes, and that form carries no checksum to check.
        if self.len == 8 {
            return true;
        }
        if self.len != 10 {
            return false;
        }
        let checksum = combine(self.buf[7], self.buf[8]);
        self.sum().wrapping_add(checksum) == 0
    }

    /// The message identifier (command / query / response / notification id).
    pub fn msg_id(&self) -> u8 {
        self.buf[3]
    }

    /// High byte of the 16-bit parameter.
    pub fn param_hi(&self) -> u8 {
        self.buf[5]
    }

    /// Low byte of the 16-bit parameter.
    pub fn param_lo(&self) -> u8 {
        self.buf[6]
    }

    /// The combined 16-bit parameter.
    pub fn param(&self) -> u16 {
        combine(self.buf[5], self.buf[6])
    }

    /// The frame as wire bytes (only meaningful once complete).
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Number of bytes filled so far.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no bytes have been matched yet.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Sum of the checksummed bytes (version through param_lo).
    fn sum(&self) -> u16 {
        self.buf[1..=6].iter().map(|&b| b as u16).fold(0, u16::wrapping_add)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Frame::new()
    }
}

/// Combine a high and low byte into a 16-bit value.
pub fn combine(hi: u8, lo: u8) -> u16 {
    ((hi as u16) << 8) | lo as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feed a byte slice one byte at a time, returning the indices at
    /// which `push` reported a complete frame.
    fn feed(frame: &mut Frame, bytes: &[u8]) -> Vec<usize> {
        bytes
            .iter()
            .enumerate()
            .filter_map(|(i, &b)| frame.push(b).then_some(i))
            .collect()
    }

    // ---------------------------------------------------------------
    // Encoding
    // ---------------------------------------------------------------

    #[test]
    fn assemble_set_volume() {
        // Set volume to 15, feedback requested.
        let frame = Frame::assemble(0x06, 0x000F, true);
        assert_eq!(
            frame.bytes(),
            &[0x7E, 0xFF, 0x06, 0x06, 0x01, 0x00, 0x0F, 0xFE, 0xE5, 0xEF]
        );
    }

    #[test]
    fn assemble_query_no_feedback() {
        let frame = Frame::assemble(0x42, 0x0000, false);
        assert_eq!(frame.bytes()[3], 0x42);
        assert_eq!(frame.bytes()[4], 0x00);
        assert!(frame.is_valid());
    }

    #[test]
    fn assemble_checksum_cancels_sum() {
        for (msg_id, param) in [(0x03u8, 0x0001u16), (0x0F, 0x0105), (0x14, 0x112C)] {
            let frame = Frame::assemble(msg_id, param, true);
            let sum: u16 = frame.bytes()[1..=6]
                .iter()
                .map(|&b| b as u16)
                .fold(0, u16::wrapping_add);
            let checksum = combine(frame.bytes()[7], frame.bytes()[8]);
            assert_eq!(sum.wrapping_add(checksum), 0);
        }
    }

    #[test]
    fn assemble_then_revalidate_round_trip() {
        // Decoding an encoded frame and re-deriving the checksum
        // reproduces the same checksum bytes.
        let encoded = Frame::assemble(0x0F, 0x0105, true);
        let mut decoded = Frame::new();
        let complete = feed(&mut decoded, encoded.bytes());
        assert_eq!(complete, vec![9]);
        assert!(decoded.is_valid());
        assert_eq!(decoded.bytes(), encoded.bytes());
    }

    // ---------------------------------------------------------------
    // Byte-driven receive
    // ---------------------------------------------------------------

    /// ACK frame: msg id 0x41, param 0.
    fn ack_bytes() -> Vec<u8> {
        Frame::assemble(0x41, 0, false).bytes().to_vec()
    }

    #[test]
    fn receive_complete_at_tenth_byte() {
        let bytes = ack_bytes();
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &bytes);
        assert_eq!(complete, vec![9]);
        assert!(frame.is_valid());
        assert_eq!(frame.msg_id(), 0x41);
    }

    #[test]
    fn receive_with_leading_noise() {
        let mut stream = vec![0x00, 0x12, 0xAB];
        stream.extend_from_slice(&ack_bytes());
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &stream);
        // Exactly one completion, at the last byte of the real frame.
        assert_eq!(complete, vec![stream.len() - 1]);
        assert!(frame.is_valid());
    }

    #[test]
    fn receive_resync_on_mid_frame_start_marker() {
        // A start marker arriving where a template byte is expected begins
        // a new frame at that byte.
        let mut stream = vec![0x7E, 0xFF, 0x7E];
        stream.extend_from_slice(&ack_bytes()[1..]);
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &stream);
        assert_eq!(complete, vec![stream.len() - 1]);
        assert!(frame.is_valid());
        assert_eq!(frame.msg_id(), 0x41);
    }

    #[test]
    fn receive_two_frames_back_to_back() {
        let mut stream = ack_bytes();
        stream.extend_from_slice(Frame::assemble(0x43, 0x000A, false).bytes());
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &stream);
        assert_eq!(complete, vec![9, 19]);
        assert_eq!(frame.msg_id(), 0x43);
        assert_eq!(frame.param(), 0x000A);
    }

    #[test]
    fn receive_version_mismatch_restarts() {
        // Wrong version byte after a start marker drops the frame.
        let mut stream = vec![0x7E, 0x00];
        stream.extend_from_slice(&ack_bytes());
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &stream);
        assert_eq!(complete, vec![stream.len() - 1]);
    }

    #[test]
    fn receive_checksumless_eight_byte_frame() {
        // Clone firmware: end marker directly after param_lo.
        let stream = [0x7E, 0xFF, 0x06, 0x41, 0x00, 0x00, 0x00, 0xEF];
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &stream);
        assert_eq!(complete, vec![7]);
        assert_eq!(frame.len(), 8);
        assert!(frame.is_valid());
        assert_eq!(frame.msg_id(), 0x41);
    }

    #[test]
    fn receive_incomplete_is_not_complete() {
        let bytes = ack_bytes();
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &bytes[..9]);
        assert!(complete.is_empty());
    }

    // ---------------------------------------------------------------
    // Validity
    // ---------------------------------------------------------------

    #[test]
    fn corrupted_checksum_is_invalid() {
        let mut bytes = ack_bytes();
        bytes[8] ^= 0x01;
        let mut frame = Frame::new();
        let complete = feed(&mut frame, &bytes);
        // Still framed correctly, but fails the checksum invariant.
        assert_eq!(complete, vec![9]);
        assert!(!frame.is_valid());
    }

    #[test]
    fn corrupted_payload_is_invalid() {
        let mut bytes = ack_bytes();
        bytes[6] ^= 0x10;
        let mut frame = Frame::new();
        feed(&mut frame, &bytes);
        assert!(!frame.is_valid());
    }

    #[test]
    fn partial_frame_is_invalid() {
        let mut frame = Frame::new();
        feed(&mut frame, &ack_bytes()[..5]);
        assert!(!frame.is_valid());
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    #[test]
    fn param_split_and_combined() {
        let frame = Frame::assemble(0x0F, 0x0105, true);
        assert_eq!(frame.param_hi(), 0x01);
        assert_eq!(frame.param_lo(), 0x05);
        assert_eq!(frame.param(), 0x0105);
    }

    #[test]
    fn combine_bytes() {
        assert_eq!(combine(0x12, 0x34), 0x1234);
        assert_eq!(combine(0x00, 0xFF), 0x00FF);
        assert_eq!(combine(0xFF, 0x00), 0xFF00);
    }
}
