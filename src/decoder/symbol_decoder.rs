/// Per-frame orchestration: locate, align, sample, correct, decode
use log::debug;
use rayon::prelude::*;

use super::encodation::EncodationDecoder;
use super::placement::Placement;
use super::reed_solomon::ReedSolomonDecoder;
use crate::config::DecoderConfig;
use crate::detector::{Aligner, SymbolLocator};
use crate::models::{DecodedSymbol, GrayscaleImage, ModuleGrid, Region};

/// Decodes every symbol in a frame
#[derive(Debug, Clone, Default)]
pub struct SymbolDecoder {
    config: DecoderConfig,
}

impl SymbolDecoder {
    /// Decoder with the given settings
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Active settings
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode all symbols in `image`.
    ///
    /// Regions that cannot be aligned are skipped; regions whose codewords
    /// cannot be corrected or interpreted come back as `Failed`. The output
    /// follows the locator's row-major order.
    pub fn decode_frame(&self, image: &GrayscaleImage) -> Vec<DecodedSymbol> {
        let regions = SymbolLocator::locate(image, &self.config.locator);
        regions
            .par_iter()
            .filter_map(|region| self.decode_region(image, region))
            .collect()
    }

    /// Align and decode one located region; `None` when alignment fails
    pub fn decode_region(&self, image: &GrayscaleImage, region: &Region) -> Option<DecodedSymbol> {
        match Aligner::align(image, region, &self.config.aligner) {
            Ok(grid) => Some(Self::decode_grid(&grid, *region)),
            Err(err) => {
                debug!("skipping region at {:?}: {err}", region.center());
                None
            }
        }
    }

    /// Read, correct and interpret the codewords of a sampled grid
    pub fn decode_grid(grid: &ModuleGrid, bounds: Region) -> DecodedSymbol {
        let size = grid.size();
        let mut codewords = Placement::for_size(size).read_codewords(grid);

        let corrections = match ReedSolomonDecoder::new(size.ecc_codewords).decode(&mut codewords) {
            Ok(n) => n,
            Err(err) => {
                debug!("{}x{} symbol at {:?}: {err}", size.modules, size.modules, bounds.center());
                return DecodedSymbol::failed(bounds);
            }
        };

        match EncodationDecoder::decode(&codewords[..size.data_codewords]) {
            Ok(payload) => DecodedSymbol::decoded(payload, bounds, corrections),
            Err(err) => {
                debug!("{}x{} symbol at {:?}: {err}", size.modules, size.modules, bounds.center());
                DecodedSymbol::failed(bounds)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::encode_symbol;
    use crate::models::SymbolStatus;

    #[test]
    fn test_decode_grid_clean() {
        let grid = encode_symbol(b"PIN-0042").unwrap();
        let bounds = Region::square(0.0, 0.0, 60.0);
        let symbol = SymbolDecoder::decode_grid(&grid, bounds);
        assert_eq!(symbol.payload, b"PIN-0042");
        assert_eq!(symbol.status, SymbolStatus::Ok);
        assert_eq!(symbol.correction_count, 0);
    }

    #[test]
    fn test_decode_grid_corrected() {
        let mut grid = encode_symbol(b"XTAL1234").unwrap();
        // Flip one module of the first codeword (mapping cell (4,0) for every size)
        grid.toggle(5, 1);
        let symbol = SymbolDecoder::decode_grid(&grid, Region::square(0.0, 0.0, 60.0));
        assert_eq!(symbol.payload, b"XTAL1234");
        assert_eq!(symbol.status, SymbolStatus::Corrected);
        assert_eq!(symbol.correction_count, 1);
    }

    #[test]
    fn test_decode_grid_failed() {
        let mut grid = encode_symbol(b"AB").unwrap();
        let n = grid.dimension();
        for row in 1..n - 1 {
            for col in 1..n - 1 {
                if (row + col) % 3 == 0 {
                    grid.toggle(row, col);
                }
            }
        }
        let bounds = Region::square(5.0, 5.0, 50.0);
        let symbol = SymbolDecoder::decode_grid(&grid, bounds);
        assert_eq!(symbol.status, SymbolStatus::Failed);
        assert!(symbol.payload.is_empty());
        assert_eq!(symbol.bounds, bounds);
    }

    #[test]
    fn test_empty_frame() {
        let decoder = SymbolDecoder::default();
        assert!(decoder.decode_frame(&GrayscaleImage::filled(64, 48, 255)).is_empty());
    }
}
