//! puck_scan - Data Matrix pin reading for sample-holder pucks
//!
//! Locates ECC 200 symbols in grayscale frames, rectifies and samples them,
//! repairs the codewords with Reed-Solomon and decodes the payload. Results
//! from successive frames are assigned to holder slots and aggregated into a
//! [`Plate`] that only ever improves.
//!
//! ```no_run
//! use std::sync::Arc;
//! use puck_scan::{PlateGeometry, Point, ScanSession, SymbolDecoder};
//!
//! let geometry = Arc::new(PlateGeometry::unipuck(Point::new(320.0, 240.0), 200.0, 0.0));
//! let mut session = ScanSession::new(SymbolDecoder::default(), geometry);
//! # let frames: Vec<puck_scan::GrayscaleImage> = Vec::new();
//! for frame in &frames {
//!     let report = session.ingest_frame(frame);
//!     println!("frame {}: {}", report.frame, report.completeness);
//!     if session.is_complete() {
//!         break;
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Tunable parameters and JSON configuration
pub mod config;
/// Data Matrix decoding modules (placement, Reed-Solomon, encodation)
pub mod decoder;
/// Symbol detection modules (location, finder checks, alignment, sampling)
pub mod detector;
/// Error types
pub mod error;
/// Synthetic symbols for tests and benchmarks
pub mod fixtures;
/// Core data structures (frames, regions, grids, decoded symbols)
pub mod models;
/// Slot layout and cross-frame aggregation
pub mod plate;
/// Frame-by-frame scan sessions
pub mod session;
/// File helpers for the command-line driver
pub mod tools;
/// Utility functions (grayscale, binarization, geometry)
pub mod utils;

pub use config::{DecoderConfig, GeometryConfig, ScanConfig, ScanLimits, load_config};
pub use decoder::SymbolDecoder;
pub use error::{AlignmentError, ConfigError, EncodationError, FixtureError, FrameError, ReedSolomonError};
pub use models::{DecodedSymbol, GrayscaleImage, ModuleGrid, Point, Region, SymbolSize, SymbolStatus};
pub use plate::{Completeness, MergeAction, MergeReport, PayloadConflict, Plate, PlateGeometry, PlateSummary};
pub use session::{FrameReport, ScanSession, StopReason};

/// Decode every symbol in a frame with default settings
///
/// # Arguments
/// * `image` - Grayscale frame
///
/// # Returns
/// Decoded symbols (including `Failed` ones) in row-major order
pub fn decode_frame(image: &GrayscaleImage) -> Vec<DecodedSymbol> {
    SymbolDecoder::default().decode_frame(image)
}

/// Decode every symbol in an RGB frame (3 bytes per pixel)
pub fn decode_rgb(rgb: &[u8], width: usize, height: usize) -> Result<Vec<DecodedSymbol>, FrameError> {
    let image = GrayscaleImage::from_rgb(rgb, width, height)?;
    Ok(decode_frame(&image))
}
