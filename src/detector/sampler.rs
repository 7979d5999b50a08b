/// Module grid sampling through a perspective transform
use crate::error::AlignmentError;
use crate::models::grid::finder_module;
use crate::models::{GrayscaleImage, ModuleGrid, Point, SymbolSize};
use crate::utils::geometry::PerspectiveTransform;

/// Offsets (in modules) of the five samples averaged per module
const SAMPLE_OFFSETS: [(f32, f32); 5] = [(0.0, 0.0), (-0.2, 0.0), (0.2, 0.0), (0.0, -0.2), (0.0, 0.2)];

/// Converts a rectified region into a module grid
pub struct GridSampler;

impl GridSampler {
    /// Mean intensity of every module, row-major.
    ///
    /// `transform` maps module space (`0..modules` on both axes, row along y)
    /// into image pixels.
    pub fn module_intensities(
        image: &GrayscaleImage,
        transform: &PerspectiveTransform,
        modules: usize,
    ) -> Vec<f32> {
        let mut out = Vec::with_capacity(modules * modules);
        for row in 0..modules {
            for col in 0..modules {
                let cx = col as f32 + 0.5;
                let cy = row as f32 + 0.5;
                let sum: f32 = SAMPLE_OFFSETS
                    .iter()
                    .map(|(dx, dy)| {
                        let p = transform.transform(&Point::new(cx + dx, cy + dy));
                        image.sample(p.x, p.y)
                    })
                    .sum();
                out.push(sum / SAMPLE_OFFSETS.len() as f32);
            }
        }
        out
    }

    /// Sample and binarise a grid.
    ///
    /// The threshold is the midpoint between the mean of the finder cells
    /// known to be dark and the mean of those known to be light.
    pub fn sample(
        image: &GrayscaleImage,
        transform: &PerspectiveTransform,
        size: SymbolSize,
        min_contrast: f32,
    ) -> Result<ModuleGrid, AlignmentError> {
        let n = size.modules;
        let intensities = Self::module_intensities(image, transform, n);

        let (mut dark_sum, mut dark_count) = (0f32, 0usize);
        let (mut light_sum, mut light_count) = (0f32, 0usize);
        for row in 0..n {
            for col in 0..n {
                match finder_module(n, row, col) {
                    Some(true) => {
                        dark_sum += intensities[row * n + col];
                        dark_count += 1;
                    }
                    Some(false) => {
                        light_sum += intensities[row * n + col];
                        light_count += 1;
                    }
                    None => {}
                }
            }
        }
        let dark_ref = dark_sum / dark_count.max(1) as f32;
        let light_ref = light_sum / light_count.max(1) as f32;
        let contrast = light_ref - dark_ref;
        if contrast < min_contrast {
            return Err(AlignmentError::LowContrast {
                contrast,
                required: min_contrast,
            });
        }
        let threshold = (dark_ref + light_ref) * 0.5;

        let mut grid = ModuleGrid::new(size);
        for row in 0..n {
            for col in 0..n {
                if intensities[row * n + col] < threshold {
                    grid.set(row, col, true);
                }
            }
        }
        Ok(grid)
    }
}
