use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::models::Point;

/// Distance below which two candidate slots count as equidistant
const TIE_EPSILON: f32 = 1e-4;

/// Fraction of the puck radius for the inner and outer slot rings
const UNIPUCK_INNER_RING: f32 = 0.371;
const UNIPUCK_OUTER_RING: f32 = 0.788;
const UNIPUCK_INNER_SLOTS: usize = 5;
const UNIPUCK_OUTER_SLOTS: usize = 11;
const UNIPUCK_TOLERANCE: f32 = 0.1;

/// Slot layout of a sample holder in image coordinates
///
/// Deserialisation goes through [`PlateGeometry::try_new`], so a loaded
/// layout is as valid as a constructed one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct PlateGeometry {
    slot_centers: Vec<Point>,
    tolerance: f32,
}

#[derive(Deserialize)]
struct RawGeometry {
    slot_centers: Vec<Point>,
    tolerance: f32,
}

impl TryFrom<RawGeometry> for PlateGeometry {
    type Error = ConfigError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        Self::try_new(raw.slot_centers, raw.tolerance)
    }
}

impl PlateGeometry {
    /// Layout with explicit slot centres, rejecting an empty slot list or a
    /// negative / non-finite tolerance
    pub fn try_new(slot_centers: Vec<Point>, tolerance: f32) -> Result<Self, ConfigError> {
        if slot_centers.is_empty() {
            return Err(ConfigError::InvalidGeometry("slot list is empty".to_string()));
        }
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(ConfigError::InvalidGeometry(format!(
                "tolerance must be finite and >= 0, got {tolerance}"
            )));
        }
        Ok(Self {
            slot_centers,
            tolerance,
        })
    }

    /// Layout with explicit slot centres.
    ///
    /// # Panics
    /// Where [`Self::try_new`] would return an error.
    pub fn new(slot_centers: Vec<Point>, tolerance: f32) -> Self {
        match Self::try_new(slot_centers, tolerance) {
            Ok(geometry) => geometry,
            Err(err) => panic!("{err}"),
        }
    }

    /// The 16-slot puck: 5 slots on an inner ring and 11 on an outer ring,
    /// numbered clockwise on screen starting at `rotation` (radians from +x),
    /// inner ring first.
    pub fn unipuck(center: Point, radius: f32, rotation: f32) -> Self {
        let mut centers = Vec::with_capacity(UNIPUCK_INNER_SLOTS + UNIPUCK_OUTER_SLOTS);
        for (count, ring) in [
            (UNIPUCK_INNER_SLOTS, UNIPUCK_INNER_RING),
            (UNIPUCK_OUTER_SLOTS, UNIPUCK_OUTER_RING),
        ] {
            let r = radius * ring;
            for i in 0..count {
                // y grows downward, so increasing angles run clockwise on screen
                let angle = rotation + std::f32::consts::TAU * i as f32 / count as f32;
                centers.push(Point::new(center.x + r * angle.cos(), center.y + r * angle.sin()));
            }
        }
        Self::new(centers, radius * UNIPUCK_TOLERANCE)
    }

    /// Rectangular rack numbered row-major from `origin` (centre of slot 0)
    pub fn grid(origin: Point, rows: usize, cols: usize, pitch: f32, tolerance: f32) -> Self {
        let centers = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| origin.translate(c as f32 * pitch, r as f32 * pitch)))
            .collect();
        Self::new(centers, tolerance)
    }

    /// Number of slots
    pub fn num_slots(&self) -> usize {
        self.slot_centers.len()
    }

    /// Slot centres in index order
    pub fn slot_centers(&self) -> &[Point] {
        &self.slot_centers
    }

    /// Maximum assignment distance
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Nearest slot within tolerance.
    ///
    /// Slots within `TIE_EPSILON` of the minimum distance tie; the lowest
    /// index among them wins.
    pub fn closest_slot(&self, point: Point) -> Option<usize> {
        let distances: Vec<f32> = self.slot_centers.iter().map(|c| c.distance(&point)).collect();
        let nearest = distances.iter().copied().fold(f32::INFINITY, f32::min);
        if nearest > self.tolerance {
            return None;
        }
        distances.iter().position(|&d| d <= nearest + TIE_EPSILON)
    }
}
