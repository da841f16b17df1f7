//! Frame codec.
//!
//! Pure, stateless transforms between bus bytes and the logical units the
//! protocol works in: 16-bit words sent low byte first, and 32-bit
//! address/length values sent as two words, high half first.

/// Combines two bus bytes into a 16-bit word, low byte first.
pub fn word(lo: u8, hi: u8) -> u16 {
    u16::from_le_bytes([lo, hi])
}

/// Combines two words into a 32-bit value, high half first.
///
/// This is the field order of entry and destination addresses on the wire.
pub fn join(hi: u16, lo: u16) -> u32 {
    (u32::from(hi) << 16) | u32::from(lo)
}

/// One bus message on the data channel: the global sequence counter and a
/// single data word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    /// Sender-side message count, starting at 1 for the first word of the
    /// stream and never reset.
    pub seq: u16,
    /// The data word carried by this message.
    pub word: u16,
}

impl Frame {
    /// Payload length of a data-channel message in bytes.
    pub const LEN: usize = 4;

    /// Decodes a data-channel payload.
    ///
    /// Layout as produced by the host: counter high byte, counter low byte,
    /// data low byte, data high byte.
    pub fn parse(payload: [u8; Self::LEN]) -> Self {
        Self { seq: u16::from_be_bytes([payload[0], payload[1]]), word: word(payload[2], payload[3]) }
    }

    /// Encodes this frame into a data-channel payload.
    pub fn to_payload(self) -> [u8; Self::LEN] {
        let [seq_hi, seq_lo] = self.seq.to_be_bytes();
        let [lo, hi] = self.word.to_le_bytes();
        [seq_hi, seq_lo, lo, hi]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_is_low_byte_first() {
        assert_eq!(word(0xAA, 0x08), 0x08AA);
    }

    #[test]
    fn join_is_high_half_first() {
        assert_eq!(join(0xAABB, 0xCCDD), 0xAABB_CCDD);
    }

    #[test]
    fn frame_payload_layout() {
        let frame = Frame { seq: 0x0102, word: 0x08AA };
        assert_eq!(frame.to_payload(), [0x01, 0x02, 0xAA, 0x08]);
        assert_eq!(Frame::parse([0x01, 0x02, 0xAA, 0x08]), frame);
    }
}
