//! Utility functions for image processing
//!
//! This module provides helper functions for symbol detection:
//! - Grayscale conversion (RGB/RGBA to luminance)
//! - Binarization (Otsu's method, fixed threshold, dilation)
//! - Geometry (perspective transforms, hulls, minimum-area rectangles)

pub mod binarization;
pub mod geometry;
pub mod grayscale;
