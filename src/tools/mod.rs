//! File helpers for the command-line driver and benches

use crate::models::GrayscaleImage;
use image::GenericImageView;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "bmp"];

fn max_dim_from_env() -> Option<u32> {
    match env::var("DM_MAX_DIM") {
        Ok(value) => match value.trim().parse::<u32>() {
            Ok(0) => None,
            Ok(v) => Some(v),
            Err(_) => None,
        },
        Err(_) => None,
    }
}

/// Load an image file as a grayscale frame.
///
/// When `DM_MAX_DIM` is set, larger images are downscaled so their longest
/// side fits.
pub fn load_gray<P: AsRef<Path>>(path: P) -> Result<GrayscaleImage, image::ImageError> {
    let img = image::open(path)?;
    let img = match max_dim_from_env() {
        Some(max_dim) if img.dimensions().0.max(img.dimensions().1) > max_dim => {
            img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
        }
        _ => img,
    };
    Ok(GrayscaleImage::from_dynamic(&img))
}

/// Write a grayscale frame; the format follows the file extension.
pub fn save_gray<P: AsRef<Path>>(image: &GrayscaleImage, path: P) -> Result<(), image::ImageError> {
    image::GrayImage::from(image).save(path)
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn grayscale_stats(gray: &[u8]) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let avg = if gray.is_empty() {
        0
    } else {
        (sum / gray.len() as u64) as u8
    };
    GrayStats { min, max, avg }
}

/// Expand frame arguments into image paths.
///
/// Files are taken as given; directories contribute their images (recursively,
/// sorted by path) so a directory of numbered captures plays back in order.
pub fn frame_paths<P: AsRef<Path>>(inputs: &[P]) -> Vec<PathBuf> {
    let mut frames = Vec::new();
    for input in inputs {
        let path = input.as_ref();
        if path.is_dir() {
            let mut images = collect_images(path);
            images.sort();
            frames.extend(images);
        } else {
            frames.push(path.to_path_buf());
        }
    }
    frames
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

fn collect_images(root: &Path) -> Vec<PathBuf> {
    let mut stack = vec![root.to_path_buf()];
    let mut images = Vec::new();

    while let Some(dir) = stack.pop() {
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => continue,
        };

        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                stack.push(path);
            } else if is_image(&path) {
                images.push(path);
            }
        }
    }

    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEMP_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let sequence = TEMP_DIR_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("puck_scan_tools_{}_{sequence}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_grayscale_stats() {
        let stats = grayscale_stats(&[10, 20, 30]);
        assert_eq!((stats.min, stats.max, stats.avg), (10, 30, 20));
        assert_eq!(grayscale_stats(&[]).avg, 0);
    }

    #[test]
    fn test_frame_paths_orders_directory() {
        let dir = temp_dir();
        for name in ["frame_002.png", "frame_001.png", "notes.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let extra = dir.join("single.bmp");
        let frames = frame_paths(&[dir.clone(), extra.clone()]);
        assert_eq!(
            frames,
            vec![dir.join("frame_001.png"), dir.join("frame_002.png"), extra]
        );
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_save_and_load_gray() {
        let dir = temp_dir();
        let path = dir.join("frame.png");
        let image = GrayscaleImage::new(3, 2, vec![0, 50, 100, 150, 200, 250]).unwrap();
        save_gray(&image, &path).unwrap();
        let loaded = load_gray(&path).unwrap();
        assert_eq!(loaded.as_bytes(), image.as_bytes());
        assert!(load_gray(dir.join("missing.png")).is_err());
        fs::remove_dir_all(&dir).ok();
    }
}
