/// Region rectification: timing-track counting and perspective setup
use log::debug;

use super::finder::FinderDetector;
use super::sampler::GridSampler;
use crate::config::AlignerConfig;
use crate::error::AlignmentError;
use crate::models::{GrayscaleImage, ModuleGrid, Point, Region, SymbolSize};
use crate::utils::binarization::otsu_threshold;
use crate::utils::geometry::PerspectiveTransform;

/// Maps a located region to a sampled module grid
pub struct Aligner;

impl Aligner {
    /// Rectify `region` and sample its modules
    pub fn align(
        image: &GrayscaleImage,
        region: &Region,
        config: &AlignerConfig,
    ) -> Result<ModuleGrid, AlignmentError> {
        let size = Self::symbol_size(image, region)?;
        let transform = PerspectiveTransform::square_to_quad(size.modules as f32, &region.corners)
            .ok_or(AlignmentError::DegenerateRegion)?;
        GridSampler::sample(image, &transform, size, config.min_contrast)
    }

    /// Count the clock tracks and look up the symbol size.
    ///
    /// A coarse count close to the outer edge is confirmed by a second count
    /// half a module inside; both tracks must agree on both passes.
    pub fn symbol_size(image: &GrayscaleImage, region: &Region) -> Result<SymbolSize, AlignmentError> {
        if region.area() <= 1.0 {
            return Err(AlignmentError::DegenerateRegion);
        }
        let side = region.mean_side();

        let coarse = Self::count_tracks(image, region, FinderDetector::edge_inset(side));
        let size = Self::supported(coarse)?;

        let half_module = side / size.modules as f32 * 0.5;
        let confirmed = Self::count_tracks(image, region, half_module);
        if confirmed != coarse {
            debug!("track count {coarse:?} not confirmed ({confirmed:?})");
            return Err(AlignmentError::UnsupportedSize {
                horizontal: confirmed.0,
                vertical: confirmed.1,
            });
        }
        Ok(size)
    }

    fn supported((horizontal, vertical): (usize, usize)) -> Result<SymbolSize, AlignmentError> {
        if horizontal == vertical
            && let Some(size) = SymbolSize::for_modules(horizontal)
        {
            return Ok(size);
        }
        Err(AlignmentError::UnsupportedSize {
            horizontal,
            vertical,
        })
    }

    /// Modules counted along the top and right clock tracks
    fn count_tracks(image: &GrayscaleImage, region: &Region, inset: f32) -> (usize, usize) {
        let center = region.center();
        let top = Self::track_modules(image, region.top_left(), region.top_right(), center, inset);
        let right =
            Self::track_modules(image, region.top_right(), region.bottom_right(), center, inset);
        (top, right)
    }

    /// Twice the number of dark runs along one clock track
    pub fn track_modules(image: &GrayscaleImage, a: Point, b: Point, center: Point, inset: f32) -> usize {
        let samples = FinderDetector::edge_samples(image, a, b, center, inset);
        if samples.len() < 3 {
            return 0;
        }
        let (lo, hi) = samples
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        if hi - lo < 10.0 {
            return 0;
        }
        let levels: Vec<u8> = samples.iter().map(|v| v.round().clamp(0.0, 255.0) as u8).collect();
        let threshold = otsu_threshold(&levels) as f32 + 0.5;
        let dark: Vec<bool> = samples.iter().map(|&v| v < threshold).collect();

        // Majority of three removes single-sample flicker at module edges
        let smoothed: Vec<bool> = (0..dark.len())
            .map(|i| {
                let lo = i.saturating_sub(1);
                let hi = (i + 1).min(dark.len() - 1);
                let votes = dark[lo..=hi].iter().filter(|&&d| d).count();
                votes * 2 > hi - lo + 1
            })
            .collect();

        let mut runs = 0;
        let mut prev = false;
        for &d in &smoothed {
            if d && !prev {
                runs += 1;
            }
            prev = d;
        }
        runs * 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(grid: &ModuleGrid, px: usize, quiet: usize) -> GrayscaleImage {
        let n = grid.dimension();
        let side = n * px + 2 * quiet;
        let mut data = vec![240u8; side * side];
        for y in 0..n * px {
            for x in 0..n * px {
                if grid.get(y / px, x / px) {
                    data[(y + quiet) * side + x + quiet] = 15;
                }
            }
        }
        GrayscaleImage::new(side, side, data).unwrap()
    }

    #[test]
    fn test_counts_track_sizes() {
        for modules in [10, 16, 26] {
            let mut grid = ModuleGrid::new(SymbolSize::for_modules(modules).unwrap());
            grid.draw_finder();
            let img = render(&grid, 5, 10);
            let side = (modules * 5) as f32;
            let region = Region::square(10.0, 10.0, side);
            let size = Aligner::symbol_size(&img, &region).unwrap();
            assert_eq!(size.modules, modules);
        }
    }

    #[test]
    fn test_align_returns_grid() {
        let mut grid = ModuleGrid::new(SymbolSize::for_modules(14).unwrap());
        grid.draw_finder();
        grid.set(5, 6, true);
        grid.set(7, 2, true);
        let img = render(&grid, 6, 12);
        let region = Region::square(12.0, 12.0, 84.0);
        let aligned = Aligner::align(&img, &region, &AlignerConfig { min_contrast: 20.0 }).unwrap();
        assert_eq!(aligned, grid);
    }

    #[test]
    fn test_unsupported_size() {
        // Clock track claiming 11 modules is not a supported size
        let px = 6;
        let side = 11 * px + 24;
        let mut data = vec![240u8; side * side];
        for col in (0..11).step_by(2) {
            for y in 12..12 + px {
                for x in 12 + col * px..12 + (col + 1) * px {
                    data[y * side + x] = 15;
                }
            }
        }
        let img = GrayscaleImage::new(side, side, data).unwrap();
        let region = Region::square(12.0, 12.0, (11 * px) as f32);
        let err = Aligner::symbol_size(&img, &region).unwrap_err();
        assert!(matches!(err, AlignmentError::UnsupportedSize { .. }));
    }

    #[test]
    fn test_degenerate_region() {
        let img = GrayscaleImage::filled(50, 50, 128);
        let p = Point::new(10.0, 10.0);
        let region = Region::new(p, p, p, p);
        assert_eq!(
            Aligner::align(&img, &region, &AlignerConfig::default()).unwrap_err(),
            AlignmentError::DegenerateRegion
        );
    }
}
