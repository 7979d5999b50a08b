//! Error types for every stage of the pipeline
//!
//! Nothing here is fatal to a scan: alignment and Reed-Solomon failures are
//! per-region / per-symbol outcomes that the frame pipeline absorbs.

/// Failure to rectify a located region into a module grid.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum AlignmentError {
    /// The timing tracks do not count out to a supported symbol size.
    #[error("unsupported symbol size (top track {horizontal} modules, right track {vertical} modules)")]
    UnsupportedSize {
        /// Modules counted along the top clock track
        horizontal: usize,
        /// Modules counted along the right clock track
        vertical: usize,
    },
    /// Dark/light reference cells are too close to separate.
    #[error("contrast {contrast:.1} below required margin {required:.1}")]
    LowContrast {
        /// Measured light minus dark reference intensity
        contrast: f32,
        /// Configured minimum
        required: f32,
    },
    /// The region corners do not define an invertible transform.
    #[error("region corners are degenerate")]
    DegenerateRegion,
}

/// Reed-Solomon decoding failure.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReedSolomonError {
    /// More errors than the code can correct (or an inconsistent locator).
    #[error("too many errors to correct (capacity {capacity})")]
    TooManyErrors {
        /// Correction capacity `t` of the code
        capacity: usize,
    },
}

/// Failure to turn corrected data codewords into payload bytes.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodationError {
    /// A codeword value that is not valid in the active encodation scheme.
    #[error("invalid codeword {value} at position {position}")]
    InvalidCodeword {
        /// Index into the data codewords
        position: usize,
        /// Offending value
        value: u8,
    },
    /// The data ended inside a multi-codeword construct.
    #[error("data codewords end inside an encoded segment")]
    Truncated,
}

/// Invalid raw frame buffer.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// Buffer length does not match the stated dimensions.
    #[error("frame buffer has {actual} bytes, expected {expected}")]
    DimensionMismatch {
        /// `width * height * channels`
        expected: usize,
        /// Length of the supplied buffer
        actual: usize,
    },
}

/// Failure to build a fixture symbol.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureError {
    /// The encoded payload does not fit the largest supported symbol.
    #[error("payload needs {codewords} data codewords, largest symbol holds {capacity}")]
    PayloadTooLarge {
        /// Data codewords required
        codewords: usize,
        /// Data codewords available in the largest supported size
        capacity: usize,
    },
}

/// Failure to load or validate a scan configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Reading the configuration file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The configuration is not valid JSON for the expected schema.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The holder geometry cannot be built.
    #[error("invalid plate geometry: {0}")]
    InvalidGeometry(String),
}
