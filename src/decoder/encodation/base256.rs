/// Base 256 encodation
/// A length field followed by raw bytes, every codeword scrambled with the
/// 255-state algorithm keyed on its 1-based position in the data
use super::{DecodeState, Mode};
use crate::error::EncodationError;

/// Undo the 255-state randomisation of the codeword at 1-based `position`
pub fn unrandomize_255(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255 + 1) as u8;
    value.wrapping_sub(pseudo)
}

/// Apply the 255-state randomisation (encoder side)
pub fn randomize_255(value: u8, position: usize) -> u8 {
    let pseudo = ((149 * position) % 255 + 1) as u8;
    value.wrapping_add(pseudo)
}

/// Decoder for the Base 256 scheme
pub struct Base256Decoder;

impl Base256Decoder {
    /// Decode one length-prefixed field and return to ASCII
    pub fn decode(state: &mut DecodeState) -> Result<Mode, EncodationError> {
        let d1 = Self::read(state)?;
        let count = match d1 {
            0 => state.remaining(),
            1..=249 => d1 as usize,
            _ => 250 * (d1 as usize - 249) + Self::read(state)? as usize,
        };
        if count > state.remaining() {
            return Err(EncodationError::Truncated);
        }
        for _ in 0..count {
            let byte = Self::read(state)?;
            state.push_bytes(&[byte]);
        }
        Ok(Mode::Ascii)
    }

    fn read(state: &mut DecodeState) -> Result<u8, EncodationError> {
        let position = state.position() + 1;
        Ok(unrandomize_255(state.require()?, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Latch at index 0, then length and bytes scrambled by position
    fn field(bytes: &[u8]) -> Vec<u8> {
        let mut data = vec![231u8];
        let mut plain = vec![bytes.len() as u8];
        plain.extend_from_slice(bytes);
        for (i, &b) in plain.iter().enumerate() {
            data.push(randomize_255(b, i + 2));
        }
        data
    }

    #[test]
    fn test_unrandomize() {
        // Position 2: pseudo = (298 % 255) + 1 = 44
        assert_eq!(unrandomize_255(44, 2), 0);
        assert_eq!(unrandomize_255(randomize_255(200, 7), 7), 200);
    }

    #[test]
    fn test_base256_field() {
        let data = field(&[0x00, 0xFF, 0x80, b'x']);
        let mut state = DecodeState::new(&data);
        state.next_codeword();
        assert_eq!(Base256Decoder::decode(&mut state).unwrap(), Mode::Ascii);
        assert_eq!(state.finish(), vec![0x00, 0xFF, 0x80, b'x']);
    }

    #[test]
    fn test_base256_to_end() {
        let mut data = vec![231u8, randomize_255(0, 2)];
        data.push(randomize_255(0xAB, 3));
        data.push(randomize_255(0xCD, 4));
        let out = super::super::EncodationDecoder::decode(&data).unwrap();
        assert_eq!(out, vec![0xAB, 0xCD]);
    }

    #[test]
    fn test_base256_truncated() {
        let mut data = field(&[1, 2, 3]);
        data.pop();
        let mut state = DecodeState::new(&data);
        state.next_codeword();
        assert_eq!(Base256Decoder::decode(&mut state), Err(EncodationError::Truncated));
    }
}
