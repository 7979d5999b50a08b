//! Slot layout and cross-frame aggregation
//!
//! [`PlateGeometry`] maps image points to holder slots; [`Plate`] keeps the
//! best read per slot. A slot never regresses: `Failed < Corrected < Ok`,
//! and a different payload read for an occupied slot is reported as a
//! conflict instead of silently replacing the stored one.

mod geometry;

pub use geometry::PlateGeometry;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::{DecodedSymbol, Region, SymbolStatus};

/// What a merge did with one incoming symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeAction {
    /// No slot within tolerance
    Discarded,
    /// Slot was unread
    Stored,
    /// Replaced a lower-confidence read of the same payload (or a failed read)
    Upgraded,
    /// Kept the existing read
    Unchanged,
    /// Both reads are readable but disagree on the payload
    Conflict,
}

/// Per-symbol merge result, also the overlay data for display
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolOutcome {
    /// Symbol outline in image space
    pub bounds: Region,
    /// Read quality of the incoming symbol
    pub status: SymbolStatus,
    /// Assigned slot, `None` when discarded
    pub slot: Option<usize>,
    /// What the merge did
    pub action: MergeAction,
}

/// Two readable, different payloads seen for one slot
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadConflict {
    /// Slot index
    pub slot: usize,
    /// Payload held before the merge
    pub stored: Vec<u8>,
    /// Payload of the incoming read
    pub incoming: Vec<u8>,
    /// Whether the incoming read replaced the stored one
    pub replaced: bool,
}

/// Result of merging one batch of symbols
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// One entry per incoming symbol, in input order
    pub outcomes: Vec<SymbolOutcome>,
    /// Payload disagreements found in this batch
    pub conflicts: Vec<PayloadConflict>,
}

impl MergeReport {
    /// Number of outcomes with the given action
    pub fn count(&self, action: MergeAction) -> usize {
        self.outcomes.iter().filter(|o| o.action == action).count()
    }
}

/// Readable slots out of all slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completeness {
    /// Slots holding an `Ok` or `Corrected` read
    pub read: usize,
    /// All slots
    pub total: usize,
}

impl Completeness {
    /// Every slot readable
    pub fn is_complete(&self) -> bool {
        self.read == self.total
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.read, self.total)
    }
}

/// One row of an exported plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotSummary {
    /// Slot index
    pub slot: usize,
    /// Payload text, `None` when unread or failed
    pub payload: Option<String>,
    /// Best status seen, `None` when unread
    pub status: Option<SymbolStatus>,
}

/// Ordered export of a plate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlateSummary {
    /// One entry per slot, in index order
    pub slots: Vec<SlotSummary>,
    /// Readable slots out of all slots
    pub completeness: Completeness,
}

/// Best read per slot for one holder
#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    geometry: Arc<PlateGeometry>,
    slots: Vec<Option<DecodedSymbol>>,
}

impl Plate {
    /// Empty plate over a shared geometry
    pub fn new(geometry: Arc<PlateGeometry>) -> Self {
        let slots = vec![None; geometry.num_slots()];
        Self { geometry, slots }
    }

    /// Holder layout
    pub fn geometry(&self) -> &PlateGeometry {
        &self.geometry
    }

    /// Stored read of a slot; `None` when unread or out of range
    pub fn slot(&self, index: usize) -> Option<&DecodedSymbol> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Stored reads in slot order
    pub fn slots(&self) -> &[Option<DecodedSymbol>] {
        &self.slots
    }

    /// Merge a batch of symbols (usually one frame's worth)
    pub fn merge(&mut self, symbols: impl IntoIterator<Item = DecodedSymbol>) -> MergeReport {
        let mut report = MergeReport::default();
        for symbol in symbols {
            let slot = self.geometry.closest_slot(symbol.slot_hint);
            let bounds = symbol.bounds;
            let status = symbol.status;
            let action = match slot {
                None => MergeAction::Discarded,
                Some(index) => self.merge_into(index, symbol, &mut report.conflicts),
            };
            report.outcomes.push(SymbolOutcome {
                bounds,
                status,
                slot,
                action,
            });
        }
        report
    }

    fn merge_into(
        &mut self,
        index: usize,
        incoming: DecodedSymbol,
        conflicts: &mut Vec<PayloadConflict>,
    ) -> MergeAction {
        let entry = &mut self.slots[index];
        let Some(existing) = entry.as_ref() else {
            *entry = Some(incoming);
            return MergeAction::Stored;
        };

        if !incoming.status.is_readable() {
            return MergeAction::Unchanged;
        }
        if !existing.status.is_readable() {
            *entry = Some(incoming);
            return MergeAction::Upgraded;
        }

        if existing.payload != incoming.payload {
            let replaced = incoming.status > existing.status;
            conflicts.push(PayloadConflict {
                slot: index,
                stored: existing.payload.clone(),
                incoming: incoming.payload.clone(),
                replaced,
            });
            if replaced {
                *entry = Some(incoming);
            }
            return MergeAction::Conflict;
        }

        if incoming.status > existing.status {
            *entry = Some(incoming);
            MergeAction::Upgraded
        } else {
            MergeAction::Unchanged
        }
    }

    /// Readable slots versus all slots
    pub fn completeness(&self) -> Completeness {
        let read = self
            .slots
            .iter()
            .flatten()
            .filter(|s| s.status.is_readable())
            .count();
        Completeness {
            read,
            total: self.slots.len(),
        }
    }

    /// Every slot holds an `Ok` or `Corrected` read
    pub fn is_complete(&self) -> bool {
        self.completeness().is_complete()
    }

    /// Ordered export for persistence collaborators
    pub fn summary(&self) -> PlateSummary {
        let slots = self
            .slots
            .iter()
            .enumerate()
            .map(|(slot, entry)| SlotSummary {
                slot,
                payload: entry
                    .as_ref()
                    .filter(|s| s.status.is_readable())
                    .map(DecodedSymbol::text),
                status: entry.as_ref().map(|s| s.status),
            })
            .collect();
        PlateSummary {
            slots,
            completeness: self.completeness(),
        }
    }
}
