//! Data Matrix detection modules
//!
//! This module contains the logic that turns a grayscale frame into sampled
//! module grids:
//! - Connected components (blob grouping of the thresholded frame)
//! - Finder verification (solid L and clock tracks)
//! - Candidate location (rectangle fitting, filtering, de-duplication)
//! - Alignment (timing-track counting, perspective transform)
//! - Grid sampling (per-module intensity and binarisation)

/// Timing-track counting and region rectification
pub mod aligner;
/// Union-find labelling of binary masks
pub mod connected_components;
/// Finder pattern verification along candidate edges
pub mod finder;
/// Candidate symbol search over a whole frame
pub mod locator;
/// Module grid sampling through a perspective transform
pub mod sampler;

pub use aligner::Aligner;
pub use locator::SymbolLocator;
pub use sampler::GridSampler;
