//! ECC 200 encodation schemes
//!
//! Corrected data codewords start in ASCII mode; latch codewords switch to
//! the other schemes, which return to ASCII through their unlatch value or
//! at the end of the data:
//! - ASCII: single characters, digit pairs, shifts, latches
//! - C40 / Text / ANSI X12: three values packed into two codewords
//! - EDIFACT: four 6-bit values packed into three codewords
//! - Base 256: length-prefixed raw bytes with position-dependent scrambling

pub mod ascii;
pub mod base256;
pub mod c40;
pub mod edifact;

use crate::error::EncodationError;

use ascii::AsciiDecoder;
use base256::Base256Decoder;
use c40::{TripletDecoder, TripletSet};
use edifact::EdifactDecoder;

/// Active encodation scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// ASCII (initial scheme)
    Ascii,
    /// C40, Text or ANSI X12
    Triplet(TripletSet),
    /// EDIFACT
    Edifact,
    /// Base 256
    Base256,
    /// Padding reached
    Done,
}

/// Cursor over the data codewords plus the decoded output
pub struct DecodeState<'a> {
    data: &'a [u8],
    pos: usize,
    out: Vec<u8>,
    upper_shift: bool,
    trailer: Option<&'static [u8]>,
}

impl<'a> DecodeState<'a> {
    /// Start at the first codeword
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            out: Vec::with_capacity(data.len() * 2),
            upper_shift: false,
            trailer: None,
        }
    }

    /// Next codeword and its index
    pub fn next_codeword(&mut self) -> Option<(usize, u8)> {
        let value = *self.data.get(self.pos)?;
        self.pos += 1;
        Some((self.pos - 1, value))
    }

    /// Next codeword, failing when the data ends
    pub fn require(&mut self) -> Result<u8, EncodationError> {
        self.next_codeword().map(|(_, v)| v).ok_or(EncodationError::Truncated)
    }

    /// Index of the next codeword
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Move the cursor back to an earlier codeword
    pub fn rewind_to(&mut self, position: usize) {
        self.pos = position.min(self.pos);
    }

    /// Codewords not yet consumed
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Append a character, applying a pending upper shift
    pub fn push_char(&mut self, c: u8) {
        if self.upper_shift {
            self.out.push(c.wrapping_add(128));
            self.upper_shift = false;
        } else {
            self.out.push(c);
        }
    }

    /// Append bytes as-is
    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.out.extend_from_slice(bytes);
    }

    /// Make the next character extended ASCII
    pub fn set_upper_shift(&mut self) {
        self.upper_shift = true;
    }

    /// Bytes appended when decoding finishes
    pub fn set_trailer(&mut self, trailer: &'static [u8]) {
        self.trailer = Some(trailer);
    }

    fn finish(mut self) -> Vec<u8> {
        if let Some(trailer) = self.trailer {
            self.out.extend_from_slice(trailer);
        }
        self.out
    }
}

/// Turns data codewords into payload bytes
pub struct EncodationDecoder;

impl EncodationDecoder {
    /// Decode the data codewords of one symbol (check codewords excluded)
    pub fn decode(data: &[u8]) -> Result<Vec<u8>, EncodationError> {
        let mut state = DecodeState::new(data);
        let mut mode = Mode::Ascii;
        while mode != Mode::Done && state.remaining() > 0 {
            mode = match mode {
                Mode::Ascii => AsciiDecoder::decode(&mut state)?,
                Mode::Triplet(set) => TripletDecoder::decode(&mut state, set)?,
                Mode::Edifact => EdifactDecoder::decode(&mut state)?,
                Mode::Base256 => Base256Decoder::decode(&mut state)?,
                Mode::Done => Mode::Done,
            };
        }
        Ok(state.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_with_padding() {
        // "123456" followed by nothing
        assert_eq!(EncodationDecoder::decode(&[142, 164, 186]).unwrap(), b"123456");
        // "A" then pad and randomised pads
        assert_eq!(EncodationDecoder::decode(&[66, 129, 70]).unwrap(), b"A");
    }

    #[test]
    fn test_mode_switches() {
        // ASCII "A", latch C40 "AIM", unlatch, ASCII "B"
        let data = [66, 230, 91, 11, 254, 67];
        assert_eq!(EncodationDecoder::decode(&data).unwrap(), b"AAIMB");
    }

    #[test]
    fn test_macro_trailer() {
        let data = [236, 66, 67];
        assert_eq!(
            EncodationDecoder::decode(&data).unwrap(),
            b"[)>\x1E05\x1DAB\x1E\x04"
        );
    }

    #[test]
    fn test_invalid_codeword() {
        assert_eq!(
            EncodationDecoder::decode(&[66, 0]),
            Err(EncodationError::InvalidCodeword { position: 1, value: 0 })
        );
    }
}
