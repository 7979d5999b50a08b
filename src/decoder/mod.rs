//! Data Matrix decoding modules
//!
//! This module turns a sampled module grid into payload bytes:
//! - Module placement (codeword bit positions in the mapping matrix)
//! - Reed-Solomon error correction over GF(256)
//! - Encodation schemes (ASCII, C40/Text/X12, EDIFACT, Base 256)
//! - Frame orchestration (locate, align, correct, decode)

/// Encodation scheme decoders
pub mod encodation;
/// ECC 200 module placement
pub mod placement;
/// Reed-Solomon error correction
pub mod reed_solomon;
/// Per-frame decoding pipeline
pub mod symbol_decoder;

pub use symbol_decoder::SymbolDecoder;
