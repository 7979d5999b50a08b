//! Frame-by-frame scan of one holder
//!
//! A [`ScanSession`] owns the [`Plate`] and is its only writer. Frames go
//! through [`ScanSession::ingest_frame`] until [`ScanSession::stop_reason`]
//! says otherwise. Decoding may also happen elsewhere (other threads, other
//! processes) and be fed in with [`ScanSession::merge_symbols`].

use std::sync::Arc;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::config::{ScanConfig, ScanLimits};
use crate::decoder::SymbolDecoder;
use crate::error::ConfigError;
use crate::models::{DecodedSymbol, GrayscaleImage};
use crate::plate::{Completeness, MergeReport, Plate, PlateGeometry};

/// Why a session should end
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Every slot is readable
    Complete,
    /// Frame budget used up
    FrameBudget,
    /// Time budget used up
    TimeBudget,
}

/// State after one ingested frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// 0-based index of the frame within the session
    pub frame: usize,
    /// What happened to each symbol found in the frame
    pub merge: MergeReport,
    /// Plate completeness after the merge
    pub completeness: Completeness,
}

/// Aggregates decoded frames into a plate
#[derive(Debug)]
pub struct ScanSession {
    decoder: SymbolDecoder,
    plate: Plate,
    frames_processed: usize,
    completed_after: Option<usize>,
    started: Instant,
}

impl ScanSession {
    /// New session with an empty plate; the clock starts now
    pub fn new(decoder: SymbolDecoder, geometry: Arc<PlateGeometry>) -> Self {
        Self {
            decoder,
            plate: Plate::new(geometry),
            frames_processed: 0,
            completed_after: None,
            started: Instant::now(),
        }
    }

    /// Session configured from a [`ScanConfig`]
    pub fn from_config(config: &ScanConfig) -> Result<Self, ConfigError> {
        let geometry = config.geometry.build()?;
        Ok(Self::new(
            SymbolDecoder::new(config.decoder.clone()),
            Arc::new(geometry),
        ))
    }

    /// Decode a frame and merge its symbols
    pub fn ingest_frame(&mut self, image: &GrayscaleImage) -> FrameReport {
        let symbols = self.decoder.decode_frame(image);
        debug!(
            "frame {}: {} symbol(s) decoded",
            self.frames_processed,
            symbols.len()
        );
        let frame = self.frames_processed;
        self.frames_processed += 1;
        let merge = self.merge_symbols(symbols);
        FrameReport {
            frame,
            merge,
            completeness: self.plate.completeness(),
        }
    }

    /// Merge symbols decoded outside the session. Does not count as a frame;
    /// completion reached here is credited to the frames ingested so far.
    pub fn merge_symbols(&mut self, symbols: impl IntoIterator<Item = DecodedSymbol>) -> MergeReport {
        let was_complete = self.plate.is_complete();
        let report = self.plate.merge(symbols);

        for conflict in &report.conflicts {
            warn!(
                "slot {}: payload conflict {:?} vs {:?} (replaced: {})",
                conflict.slot,
                String::from_utf8_lossy(&conflict.stored),
                String::from_utf8_lossy(&conflict.incoming),
                conflict.replaced
            );
        }
        if !was_complete && self.plate.is_complete() {
            self.completed_after = Some(self.frames_processed);
            info!(
                "plate complete after {} frame(s) in {:?}",
                self.frames_processed,
                self.elapsed()
            );
        }
        report
    }

    /// All slots hold an `Ok` or `Corrected` read
    pub fn is_complete(&self) -> bool {
        self.plate.is_complete()
    }

    /// Complete, or a budget is exhausted
    pub fn should_stop(&self, max_frames: usize, max_duration: Duration) -> bool {
        self.is_complete() || self.frames_processed >= max_frames || self.elapsed() >= max_duration
    }

    /// Why the session should stop, `None` to keep going
    pub fn stop_reason(&self, limits: &ScanLimits) -> Option<StopReason> {
        if self.is_complete() {
            Some(StopReason::Complete)
        } else if self.frames_processed >= limits.max_frames {
            Some(StopReason::FrameBudget)
        } else if self.elapsed() >= limits.max_duration() {
            Some(StopReason::TimeBudget)
        } else {
            None
        }
    }

    /// Time since the session was created
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Frames ingested so far
    pub fn frames_processed(&self) -> usize {
        self.frames_processed
    }

    /// Frames ingested when the plate first became complete
    pub fn completed_after_frames(&self) -> Option<usize> {
        self.completed_after
    }

    /// Current plate
    pub fn plate(&self) -> &Plate {
        &self.plate
    }

    /// End the session and hand off the plate
    pub fn into_plate(self) -> Plate {
        self.plate
    }
}
