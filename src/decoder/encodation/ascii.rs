/// ASCII encodation (the default scheme)
/// 1-128 encode a character plus one, 130-229 a pair of digits, the rest are
/// pads, shifts, latches and function characters
use super::c40::TripletSet;
use super::{DecodeState, Mode};
use crate::error::EncodationError;

/// Macro 05 / 06 header prefixes
const MACRO_05_HEADER: &[u8] = b"[)>\x1E05\x1D";
const MACRO_06_HEADER: &[u8] = b"[)>\x1E06\x1D";
const MACRO_TRAILER: &[u8] = b"\x1E\x04";

/// Group separator emitted for FNC1
pub const GS: u8 = 0x1D;

/// Decoder for the ASCII scheme
pub struct AsciiDecoder;

impl AsciiDecoder {
    /// Decode ASCII codewords until a latch, the pad or the end of data
    pub fn decode(state: &mut DecodeState) -> Result<Mode, EncodationError> {
        while let Some((position, value)) = state.next_codeword() {
            match value {
                0 => return Err(EncodationError::InvalidCodeword { position, value }),
                1..=128 => state.push_char(value - 1),
                129 => return Ok(Mode::Done),
                130..=229 => {
                    let pair = value - 130;
                    state.push_bytes(&[b'0' + pair / 10, b'0' + pair % 10]);
                }
                230 => return Ok(Mode::Triplet(TripletSet::C40)),
                231 => return Ok(Mode::Base256),
                232 => {
                    // FNC1 in first position marks GS1 data and is not transmitted
                    if position != 0 {
                        state.push_char(GS);
                    }
                }
                233 => {
                    // Structured append: sequence indicator and two file id codewords
                    for _ in 0..3 {
                        state.require()?;
                    }
                }
                234 => {} // Reader programming
                235 => state.set_upper_shift(),
                236 => {
                    state.push_bytes(MACRO_05_HEADER);
                    state.set_trailer(MACRO_TRAILER);
                }
                237 => {
                    state.push_bytes(MACRO_06_HEADER);
                    state.set_trailer(MACRO_TRAILER);
                }
                238 => return Ok(Mode::Triplet(TripletSet::X12)),
                239 => return Ok(Mode::Triplet(TripletSet::Text)),
                240 => return Ok(Mode::Edifact),
                241 => Self::skip_eci(state)?,
                _ => return Err(EncodationError::InvalidCodeword { position, value }),
            }
        }
        Ok(Mode::Done)
    }

    /// ECI designators take one to three codewords
    fn skip_eci(state: &mut DecodeState) -> Result<(), EncodationError> {
        let first = state.require()?;
        let extra = match first {
            0..=127 => 0,
            128..=191 => 1,
            _ => 2,
        };
        for _ in 0..extra {
            state.require()?;
        }
        Ok(())
    }
}
