use super::{Point, Region};
use serde::{Deserialize, Serialize};

/// Square ECC 200 symbol size with a single data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SymbolSize {
    /// Modules per side, including the finder ring
    pub modules: usize,
    /// Data codewords
    pub data_codewords: usize,
    /// Error-correction codewords
    pub ecc_codewords: usize,
}

/// Supported sizes, smallest first
pub const SYMBOL_SIZES: [SymbolSize; 9] = [
    SymbolSize::new(10, 3, 5),
    SymbolSize::new(12, 5, 7),
    SymbolSize::new(14, 8, 10),
    SymbolSize::new(16, 12, 12),
    SymbolSize::new(18, 18, 14),
    SymbolSize::new(20, 22, 18),
    SymbolSize::new(22, 30, 20),
    SymbolSize::new(24, 36, 24),
    SymbolSize::new(26, 44, 28),
];

/// Largest supported modules-per-side
pub const MAX_MODULES: usize = 26;

impl SymbolSize {
    const fn new(modules: usize, data_codewords: usize, ecc_codewords: usize) -> Self {
        Self {
            modules,
            data_codewords,
            ecc_codewords,
        }
    }

    /// Look up a supported size by modules per side
    pub fn for_modules(modules: usize) -> Option<SymbolSize> {
        SYMBOL_SIZES.iter().copied().find(|s| s.modules == modules)
    }

    /// Smallest size holding `data_codewords`
    pub fn smallest_for(data_codewords: usize) -> Option<SymbolSize> {
        SYMBOL_SIZES
            .iter()
            .copied()
            .find(|s| s.data_codewords >= data_codewords)
    }

    /// Data plus error-correction codewords
    pub fn total_codewords(&self) -> usize {
        self.data_codewords + self.ecc_codewords
    }

    /// Side of the mapping matrix (modules without the finder ring)
    pub fn mapping_size(&self) -> usize {
        self.modules - 2
    }

    /// Byte errors the Reed-Solomon code can correct
    pub fn correction_capacity(&self) -> usize {
        self.ecc_codewords / 2
    }
}

/// Read quality, ordered `Failed < Corrected < Ok`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SymbolStatus {
    /// Symbol present but unreadable
    Failed,
    /// Decoded after correcting one or more codewords
    Corrected,
    /// Decoded with zero corrections
    Ok,
}

impl SymbolStatus {
    /// `Ok` and `Corrected` carry a payload
    pub fn is_readable(&self) -> bool {
        !matches!(self, SymbolStatus::Failed)
    }
}

/// One symbol found in a frame
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedSymbol {
    /// Decoded payload; empty when `status` is `Failed`
    pub payload: Vec<u8>,
    /// Symbol outline in image space
    pub bounds: Region,
    /// Pixel centre used for slot assignment
    pub slot_hint: Point,
    /// Codewords repaired by Reed-Solomon
    pub correction_count: usize,
    /// Read quality
    pub status: SymbolStatus,
}

impl DecodedSymbol {
    /// Successfully decoded symbol; status follows from `correction_count`
    pub fn decoded(payload: Vec<u8>, bounds: Region, correction_count: usize) -> Self {
        let status = if correction_count == 0 {
            SymbolStatus::Ok
        } else {
            SymbolStatus::Corrected
        };
        Self {
            payload,
            slot_hint: bounds.center(),
            bounds,
            correction_count,
            status,
        }
    }

    /// Symbol located but not decodable
    pub fn failed(bounds: Region) -> Self {
        Self {
            payload: Vec::new(),
            slot_hint: bounds.center(),
            bounds,
            correction_count: 0,
            status: SymbolStatus::Failed,
        }
    }

    /// Payload as text, replacing invalid UTF-8
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_table() {
        for size in SYMBOL_SIZES {
            let bits = size.mapping_size() * size.mapping_size();
            assert_eq!(bits / 8, size.total_codewords(), "size {}", size.modules);
        }
        assert_eq!(SymbolSize::for_modules(14).map(|s| s.data_codewords), Some(8));
        assert_eq!(SymbolSize::for_modules(13), None);
        assert_eq!(SymbolSize::smallest_for(6).map(|s| s.modules), Some(14));
        assert_eq!(SymbolSize::smallest_for(45), None);
    }

    #[test]
    fn test_status_order() {
        assert!(SymbolStatus::Failed < SymbolStatus::Corrected);
        assert!(SymbolStatus::Corrected < SymbolStatus::Ok);
        assert!(!SymbolStatus::Failed.is_readable());
    }

    #[test]
    fn test_decoded_status() {
        let bounds = Region::square(0.0, 0.0, 10.0);
        assert_eq!(DecodedSymbol::decoded(b"A".to_vec(), bounds, 0).status, SymbolStatus::Ok);
        let corrected = DecodedSymbol::decoded(b"A".to_vec(), bounds, 2);
        assert_eq!(corrected.status, SymbolStatus::Corrected);
        assert_eq!(corrected.slot_hint, Point::new(5.0, 5.0));
        let failed = DecodedSymbol::failed(bounds);
        assert!(failed.payload.is_empty());
        assert_eq!(failed.status, SymbolStatus::Failed);
    }
}
