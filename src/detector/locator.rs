/// Candidate symbol search: threshold, blob grouping, rectangle fitting and
/// finder verification
use log::debug;

use super::connected_components::{group_pixels, label_components};
use super::finder::FinderDetector;
use crate::config::LocatorConfig;
use crate::models::{BitMatrix, GrayscaleImage, Point, Region};
use crate::utils::binarization::{adaptive_binarize, dilate, otsu_binarize, otsu_threshold};
use crate::utils::geometry::{convex_hull, min_area_rect, polygon_area};

/// Finds Data Matrix regions in a frame
pub struct SymbolLocator;

impl SymbolLocator {
    /// Locate candidate symbols, sorted row-major by centre.
    ///
    /// Candidates come from a global Otsu mask and, unless
    /// `adaptive_radius` is 0, from a local-mean mask that survives uneven
    /// lighting. Never fails; a frame without symbols yields an empty list.
    pub fn locate(image: &GrayscaleImage, config: &LocatorConfig) -> Vec<Region> {
        if image.width() < 3 || image.height() < 3 {
            return Vec::new();
        }

        let (global, threshold) = otsu_binarize(image);
        let mut regions = Self::candidates(image, &global, config);
        debug!("locator: global threshold {threshold}, {} verified regions", regions.len());

        if config.adaptive_radius > 0 {
            let local = adaptive_binarize(image, config.adaptive_radius, config.adaptive_offset);
            let extra = Self::candidates(image, &local, config);
            debug!("locator: local-mean mask, {} verified regions", extra.len());
            regions.extend(extra);
        }

        regions = Self::dedup(regions);
        regions.sort_by(|a, b| {
            let (ca, cb) = (a.center(), b.center());
            ca.y.total_cmp(&cb.y).then(ca.x.total_cmp(&cb.x))
        });
        regions
    }

    /// Verified regions for the blobs of one dark mask
    fn candidates(image: &GrayscaleImage, dark: &BitMatrix, config: &LocatorConfig) -> Vec<Region> {
        let joined = dilate(dark, config.close_radius);
        let labels = label_components(&joined);
        let groups = group_pixels(&labels, dark);
        debug!("locator: {} components", labels.count());

        groups
            .iter()
            .filter(|pixels| pixels.len() >= config.min_component_pixels)
            .filter_map(|pixels| Self::candidate(image, pixels, config))
            .collect()
    }

    fn candidate(image: &GrayscaleImage, pixels: &[Point], config: &LocatorConfig) -> Option<Region> {
        let hull = convex_hull(pixels);
        let rect = min_area_rect(&hull, 0.5)?;

        let short = rect.width.min(rect.height);
        if short < config.min_side || rect.aspect() > config.max_aspect {
            return None;
        }
        if polygon_area(&hull) / rect.area() < config.min_fill {
            return None;
        }
        let (w, h) = (image.width() as f32, image.height() as f32);
        let inside = rect
            .corners
            .iter()
            .all(|c| c.x >= 0.0 && c.y >= 0.0 && c.x <= w && c.y <= h);
        if !inside {
            return None;
        }

        FinderDetector::orient(image, &rect.corners, Self::local_threshold(image, &rect.corners))
    }

    /// Otsu threshold over the pixels of the corners' bounding box
    fn local_threshold(image: &GrayscaleImage, corners: &[Point; 4]) -> u8 {
        let (mut x0, mut y0, mut x1, mut y1) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
        for c in corners {
            x0 = x0.min(c.x);
            y0 = y0.min(c.y);
            x1 = x1.max(c.x);
            y1 = y1.max(c.y);
        }
        let x0 = (x0.max(0.0) as usize).min(image.width() - 1);
        let y0 = (y0.max(0.0) as usize).min(image.height() - 1);
        let x1 = (x1.ceil().max(0.0) as usize).clamp(x0 + 1, image.width());
        let y1 = (y1.ceil().max(0.0) as usize).clamp(y0 + 1, image.height());

        let width = image.width();
        let data = image.as_bytes();
        let pixels: Vec<u8> = (y0..y1)
            .flat_map(|y| data[y * width + x0..y * width + x1].iter().copied())
            .collect();
        otsu_threshold(&pixels)
    }

    /// Drop regions whose centre lies inside a larger kept region
    fn dedup(mut regions: Vec<Region>) -> Vec<Region> {
        if regions.len() < 2 {
            return regions;
        }
        regions.sort_by(|a, b| b.mean_side().total_cmp(&a.mean_side()));

        let mut kept: Vec<Region> = Vec::with_capacity(regions.len());
        for cand in regions {
            let center = cand.center();
            let covered = kept
                .iter()
                .any(|k| k.center().distance(&center) <= k.mean_side() * 0.5);
            if !covered {
                kept.push(cand);
            }
        }
        kept
    }
}
