/// Convert RGB/RGBA frames to grayscale
/// Y = 0.299*R + 0.587*G + 0.114*B
/// Uses fast integer arithmetic: Y = (76*R + 150*G + 29*B) >> 8
///
/// Rows are processed in parallel with rayon; each row is independent.
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luma(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

fn to_grayscale(pixels: &[u8], width: usize, height: usize, channels: usize) -> Vec<u8> {
    let mut gray = vec![0u8; width * height];
    if width == 0 {
        return gray;
    }

    gray.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
        let row_start = y * width * channels;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * channels;
            *out = luma(pixels[idx], pixels[idx + 1], pixels[idx + 2]);
        }
    });

    gray
}

/// Convert an RGB buffer (3 bytes per pixel) to grayscale
pub fn rgb_to_grayscale(rgb: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgb, width, height, 3)
}

/// Convert an RGBA buffer (4 bytes per pixel) to grayscale, ignoring alpha
pub fn rgba_to_grayscale(rgba: &[u8], width: usize, height: usize) -> Vec<u8> {
    to_grayscale(rgba, width, height, 4)
}
