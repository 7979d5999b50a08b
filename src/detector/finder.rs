/// Finder pattern verification by sampling along candidate edges
/// A Data Matrix finder is a solid L on two adjacent sides and alternating
/// clock tracks on the other two
use crate::models::{GrayscaleImage, MAX_MODULES, Point, Region};

/// Dark/light signature of one sampled edge
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeProfile {
    /// Fraction of samples classified dark
    pub dark_fraction: f32,
    /// Number of maximal dark runs along the edge
    pub dark_runs: usize,
}

/// Classification of a sampled edge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// Part of the solid finder L
    Solid,
    /// Alternating clock track
    Clock,
    /// Neither
    Other,
}

impl EdgeProfile {
    /// Solid when almost entirely dark in at most two runs; clock when roughly
    /// half dark in many runs
    pub fn kind(&self) -> EdgeKind {
        if self.dark_fraction >= 0.85 && self.dark_runs <= 2 {
            EdgeKind::Solid
        } else if (0.25..=0.75).contains(&self.dark_fraction) && self.dark_runs >= 4 {
            EdgeKind::Clock
        } else {
            EdgeKind::Other
        }
    }
}

/// Finder pattern checks on candidate rectangles
pub struct FinderDetector;

impl FinderDetector {
    /// Inset (pixels) that keeps edge samples inside the outer module ring of
    /// any supported symbol with this side length
    pub fn edge_inset(side: f32) -> f32 {
        let outer = side / (2 * MAX_MODULES) as f32;
        outer.max(1.5).min(side / (1.4 * MAX_MODULES as f32))
    }

    /// Grey levels along the edge `a -> b`, pulled `inset` pixels toward
    /// `center` and shortened by `inset` at both ends.
    ///
    /// At least 16 samples, two per pixel of span; empty when the edge is no
    /// longer than twice the inset.
    pub fn edge_samples(image: &GrayscaleImage, a: Point, b: Point, center: Point, inset: f32) -> Vec<f32> {
        let dir = a.to(&b);
        let len = dir.norm();
        if len <= 2.0 * inset {
            return Vec::new();
        }
        let along = Point::new(dir.x / len, dir.y / len);

        let mid = Point::new((a.x + b.x) * 0.5, (a.y + b.y) * 0.5);
        let to_center = mid.to(&center);
        let inward_len = to_center.norm().max(1e-6);
        let inward = Point::new(to_center.x / inward_len, to_center.y / inward_len);

        let start = a.translate(
            (along.x + inward.x) * inset,
            (along.y + inward.y) * inset,
        );
        let span = len - 2.0 * inset;
        let count = ((span * 2.0).ceil() as usize).max(16);
        (0..count)
            .map(|i| {
                let t = span * i as f32 / (count - 1) as f32;
                image.sample(start.x + along.x * t, start.y + along.y * t)
            })
            .collect()
    }

    /// Dark/light profile of [`Self::edge_samples`] against `threshold`
    pub fn profile_edge(
        image: &GrayscaleImage,
        a: Point,
        b: Point,
        center: Point,
        inset: f32,
        threshold: f32,
    ) -> EdgeProfile {
        let samples = Self::edge_samples(image, a, b, center, inset);
        if samples.is_empty() {
            return EdgeProfile {
                dark_fraction: 0.0,
                dark_runs: 0,
            };
        }

        let mut dark = 0usize;
        let mut runs = 0usize;
        let mut in_run = false;
        for &v in &samples {
            let is_dark = v < threshold;
            if is_dark {
                dark += 1;
                if !in_run {
                    runs += 1;
                }
            }
            in_run = is_dark;
        }

        EdgeProfile {
            dark_fraction: dark as f32 / samples.len() as f32,
            dark_runs: runs,
        }
    }

    /// Verify the finder on a candidate rectangle and return it in symbol
    /// orientation.
    ///
    /// `corners` must wind with a positive shoelace sum (clockwise on screen);
    /// edge `k` runs from `corners[k]` to `corners[k + 1]`. The symbol's bottom
    /// and left edges are the solid pair, so when edges `k` and `k + 1` are
    /// solid and `k + 2`, `k + 3` are clock tracks, `corners[k]` is the
    /// bottom-right corner.
    pub fn orient(image: &GrayscaleImage, corners: &[Point; 4], threshold: u8) -> Option<Region> {
        let center = Point::centroid(corners)?;
        let side = (0..4)
            .map(|k| corners[k].distance(&corners[(k + 1) % 4]))
            .sum::<f32>()
            / 4.0;
        let inset = Self::edge_inset(side);
        let cutoff = threshold as f32 + 0.5;

        let kinds: Vec<EdgeKind> = (0..4)
            .map(|k| {
                Self::profile_edge(image, corners[k], corners[(k + 1) % 4], center, inset, cutoff)
                    .kind()
            })
            .collect();

        let k = (0..4).find(|&k| {
            kinds[k] == EdgeKind::Solid
                && kinds[(k + 1) % 4] == EdgeKind::Solid
                && kinds[(k + 2) % 4] == EdgeKind::Clock
                && kinds[(k + 3) % 4] == EdgeKind::Clock
        })?;

        Some(Region::new(
            corners[(k + 2) % 4],
            corners[(k + 3) % 4],
            corners[k],
            corners[(k + 1) % 4],
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModuleGrid, SymbolSize};

    fn finder_image(rotate_quarters: usize) -> GrayscaleImage {
        // 10x10 finder only, 6 px modules, 12 px quiet zone
        let mut grid = ModuleGrid::new(SymbolSize::for_modules(10).unwrap());
        grid.draw_finder();
        let size = 84;
        let mut data = vec![255u8; size * size];
        for y in 0..60 {
            for x in 0..60 {
                let (mut r, mut c) = (y / 6, x / 6);
                for _ in 0..rotate_quarters {
                    // Rotate the symbol a quarter turn clockwise on screen
                    let (nr, nc) = (9 - c, r);
                    r = nr;
                    c = nc;
                }
                if grid.get(r, c) {
                    data[(y + 12) * size + x + 12] = 0;
                }
            }
        }
        GrayscaleImage::new(size, size, data).unwrap()
    }

    fn square_corners() -> [Point; 4] {
        [
            Point::new(12.0, 12.0),
            Point::new(72.0, 12.0),
            Point::new(72.0, 72.0),
            Point::new(12.0, 72.0),
        ]
    }

    #[test]
    fn test_edge_kinds() {
        let img = finder_image(0);
        let c = square_corners();
        let center = Point::new(42.0, 42.0);
        let inset = FinderDetector::edge_inset(60.0);

        let top = FinderDetector::profile_edge(&img, c[0], c[1], center, inset, 128.0);
        assert_eq!(top.kind(), EdgeKind::Clock);
        let left = FinderDetector::profile_edge(&img, c[3], c[0], center, inset, 128.0);
        assert_eq!(left.kind(), EdgeKind::Solid);
        assert!(left.dark_fraction > 0.99);
    }

    #[test]
    fn test_edge_samples() {
        let img = finder_image(0);
        let c = square_corners();
        let center = Point::new(42.0, 42.0);

        // Left edge lies on the solid column; the inset keeps every sample dark
        let left = FinderDetector::edge_samples(&img, c[3], c[0], center, 2.0);
        assert_eq!(left.len(), 112);
        assert!(left.iter().all(|&v| v < 1.0));

        // Edges too short for the inset yield nothing
        assert!(FinderDetector::edge_samples(&img, c[0], c[0], center, 2.0).is_empty());
        let tiny = Point::new(15.0, 12.0);
        assert!(FinderDetector::edge_samples(&img, c[0], tiny, center, 2.0).is_empty());
        assert_eq!(
            FinderDetector::profile_edge(&img, c[0], tiny, center, 2.0, 128.0).dark_runs,
            0
        );
    }

    #[test]
    fn test_orient_upright() {
        let img = finder_image(0);
        let region = FinderDetector::orient(&img, &square_corners(), 127).unwrap();
        assert_eq!(region.bottom_left(), Point::new(12.0, 72.0));
        assert_eq!(region.top_right(), Point::new(72.0, 12.0));
    }

    #[test]
    fn test_orient_rotated() {
        let img = finder_image(1);
        let region = FinderDetector::orient(&img, &square_corners(), 127).unwrap();
        // A quarter turn clockwise moves the L vertex to the top-left
        assert_eq!(region.bottom_left(), Point::new(12.0, 12.0));
        assert_eq!(region.top_right(), Point::new(72.0, 72.0));
    }

    #[test]
    fn test_orient_rejects_solid_square() {
        let mut data = vec![255u8; 84 * 84];
        for y in 12..72 {
            for x in 12..72 {
                data[y * 84 + x] = 0;
            }
        }
        let img = GrayscaleImage::new(84, 84, data).unwrap();
        assert!(FinderDetector::orient(&img, &square_corners(), 127).is_none());
    }
}
