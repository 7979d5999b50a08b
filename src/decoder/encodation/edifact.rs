/// EDIFACT encodation
/// Three codewords carry four 6-bit values; 31 returns to ASCII
use super::{DecodeState, Mode};
use crate::error::EncodationError;

const UNLATCH: u8 = 0x1F;

/// Decoder for the EDIFACT scheme
pub struct EdifactDecoder;

impl EdifactDecoder {
    /// Decode codeword triples until the unlatch value or fewer than three
    /// codewords remain (which are then ASCII).
    pub fn decode(state: &mut DecodeState) -> Result<Mode, EncodationError> {
        loop {
            if state.remaining() < 3 {
                return Ok(Mode::Ascii);
            }
            let start = state.position();
            let mut bits = 0u32;
            for _ in 0..3 {
                bits = (bits << 8) | state.require()? as u32;
            }

            for i in 0..4usize {
                let value = ((bits >> (18 - 6 * i)) & 0x3F) as u8;
                if value == UNLATCH {
                    // Skip to the codeword boundary after the unlatch value
                    let consumed = (6 * (i + 1)).div_ceil(8);
                    state.rewind_to(start + consumed);
                    return Ok(Mode::Ascii);
                }
                let c = if value & 0x20 == 0 { value | 0x40 } else { value };
                state.push_char(c);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pack(values: [u8; 4]) -> [u8; 3] {
        let bits = values.iter().fold(0u32, |acc, &v| (acc << 6) | v as u32);
        [(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]
    }

    #[test]
    fn test_edifact_values() {
        // 'D' = 0x04 | 0x40, 'A', '1' = 0x31, '.' = 0x2E
        let data = pack([0x04, 0x01, 0x31, 0x2E]);
        let mut state = DecodeState::new(&data);
        assert_eq!(EdifactDecoder::decode(&mut state).unwrap(), Mode::Ascii);
        assert_eq!(state.finish(), b"DA1.");
    }

    #[test]
    fn test_edifact_unlatch() {
        // 'A', unlatch, then ASCII codeword 'B' + 1 after the boundary
        let mut data = pack([0x01, UNLATCH, 0, 0]).to_vec();
        data.truncate(2);
        data.extend([67, 129]);
        let mut state = DecodeState::new(&data);
        assert_eq!(EdifactDecoder::decode(&mut state).unwrap(), Mode::Ascii);
        assert_eq!(state.position(), 2);
        assert_eq!(state.finish(), b"A");
    }

    #[test]
    fn test_latch_edifact_then_ascii() {
        // Latch, 'A' + unlatch packed into two codewords, ASCII 'B', pad
        let [first, second, _] = pack([0x01, UNLATCH, 0, 0]);
        let data = [240, first, second, 67, 129];
        assert_eq!(super::super::EncodationDecoder::decode(&data).unwrap(), b"AB");
    }
}
