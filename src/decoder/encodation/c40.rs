/// C40, Text and ANSI X12 encodation
/// Two codewords carry three values: v = 1600*a + 40*b + c + 1
use super::ascii::GS;
use super::{DecodeState, Mode};
use crate::error::EncodationError;

/// Which triplet-packed character set is active
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TripletSet {
    /// Upper-case basic set
    C40,
    /// Lower-case basic set
    Text,
    /// ANSI X12 EDI set
    X12,
}

const UNLATCH: u8 = 254;

/// Shift 2 set shared by C40 and Text (values 0-26)
const SHIFT2_SET: &[u8; 27] = b"!\"#$%&'()*+,-./:;<=>?@[\\]^_";

/// Text shift 3 set (values 0-31)
const TEXT_SHIFT3_SET: &[u8; 32] = b"`ABCDEFGHIJKLMNOPQRSTUVWXYZ{|}~\x7F";

/// Split a codeword pair into its three values; `None` for the zero pair
pub fn unpack(first: u8, second: u8) -> Option<[u8; 3]> {
    let v = (((first as u32) << 8) + second as u32).checked_sub(1)?;
    Some([(v / 1600) as u8, ((v / 40) % 40) as u8, (v % 40) as u8])
}

/// Decoder for the triplet-packed schemes
pub struct TripletDecoder;

impl TripletDecoder {
    /// Decode codeword pairs until the unlatch value or the end of data.
    ///
    /// A single trailing codeword is ASCII.
    pub fn decode(state: &mut DecodeState, set: TripletSet) -> Result<Mode, EncodationError> {
        let mut shift = 0u8;
        loop {
            if state.remaining() < 2 {
                return Ok(Mode::Ascii);
            }
            let position = state.position();
            let first = state.require()?;
            if first == UNLATCH {
                return Ok(Mode::Ascii);
            }
            let second = state.require()?;
            let invalid = EncodationError::InvalidCodeword {
                position,
                value: first,
            };
            for value in unpack(first, second).ok_or(invalid)? {
                let ok = match set {
                    TripletSet::X12 => Self::x12_value(state, value),
                    _ => Self::shifted_value(state, set, &mut shift, value),
                };
                if !ok {
                    return Err(invalid);
                }
            }
        }
    }

    fn shifted_value(state: &mut DecodeState, set: TripletSet, shift: &mut u8, value: u8) -> bool {
        match *shift {
            0 => match value {
                0..=2 => *shift = value + 1,
                3 => state.push_char(b' '),
                4..=13 => state.push_char(b'0' + value - 4),
                14..=39 => match set {
                    TripletSet::Text => state.push_char(b'a' + value - 14),
                    _ => state.push_char(b'A' + value - 14),
                },
                _ => return false,
            },
            1 => {
                // Shift 1: control characters 0-31
                state.push_char(value);
                *shift = 0;
            }
            2 => {
                match value {
                    0..=26 => state.push_char(SHIFT2_SET[value as usize]),
                    27 => state.push_char(GS),
                    30 => state.set_upper_shift(),
                    _ => return false,
                }
                *shift = 0;
            }
            _ => {
                match set {
                    TripletSet::Text => match TEXT_SHIFT3_SET.get(value as usize) {
                        Some(&c) => state.push_char(c),
                        None => return false,
                    },
                    _ => state.push_char(value + 96),
                }
                *shift = 0;
            }
        }
        true
    }

    fn x12_value(state: &mut DecodeState, value: u8) -> bool {
        let c = match value {
            0 => b'\r',
            1 => b'*',
            2 => b'>',
            3 => b' ',
            4..=13 => b'0' + value - 4,
            14..=39 => b'A' + value - 14,
            _ => return false,
        };
        state.push_char(c);
        true
    }
}
