//! Synthetic ECC 200 symbols for tests, benchmarks and the `render` command
//!
//! ASCII encodation only. Symbols are laid out exactly as a printer would:
//! padded data, Reed-Solomon check codewords, module placement, finder ring.

use crate::decoder::placement::Placement;
use crate::decoder::reed_solomon::ReedSolomonEncoder;
use crate::error::FixtureError;
use crate::models::{GrayscaleImage, ModuleGrid, Point, Region, SymbolSize, MAX_MODULES};

const PAD: u8 = 129;
const UPPER_SHIFT: u8 = 235;
const DIGIT_PAIR_BASE: u8 = 130;

/// ASCII-encode a payload: digit pairs packed, bytes above 127 upper-shifted
pub fn encode_ascii(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len());
    let mut i = 0;
    while i < payload.len() {
        let b = payload[i];
        match payload.get(i + 1) {
            Some(&next) if b.is_ascii_digit() && next.is_ascii_digit() => {
                out.push(DIGIT_PAIR_BASE + (b - b'0') * 10 + (next - b'0'));
                i += 2;
                continue;
            }
            _ => {}
        }
        if b > 127 {
            out.push(UPPER_SHIFT);
            out.push(b - 127);
        } else {
            out.push(b + 1);
        }
        i += 1;
    }
    out
}

/// Fill `codewords` up to `capacity`: one plain pad, then 253-state
/// randomised pads keyed on their 1-based position
pub fn pad_codewords(codewords: &mut Vec<u8>, capacity: usize) {
    if codewords.len() < capacity {
        codewords.push(PAD);
    }
    while codewords.len() < capacity {
        let position = codewords.len() + 1;
        let pseudo = (149 * position) % 253 + 1;
        let mut value = PAD as usize + pseudo;
        if value > 254 {
            value -= 254;
        }
        codewords.push(value as u8);
    }
}

/// Smallest fitting size plus the full codeword stream (data then check)
pub fn symbol_codewords(payload: &[u8]) -> Result<(SymbolSize, Vec<u8>), FixtureError> {
    let mut data = encode_ascii(payload);
    let size = SymbolSize::smallest_for(data.len()).ok_or(FixtureError::PayloadTooLarge {
        codewords: data.len(),
        capacity: largest_capacity(),
    })?;
    pad_codewords(&mut data, size.data_codewords);
    let codewords = ReedSolomonEncoder::new(size.ecc_codewords).encode(&data);
    Ok((size, codewords))
}

fn largest_capacity() -> usize {
    SymbolSize::for_modules(MAX_MODULES).map_or(0, |s| s.data_codewords)
}

/// Build the module grid of a payload in the smallest size that fits
pub fn encode_symbol(payload: &[u8]) -> Result<ModuleGrid, FixtureError> {
    let (size, codewords) = symbol_codewords(payload)?;
    let placement = Placement::for_size(size);
    let mut grid = ModuleGrid::new(size);
    placement.write_codewords(&mut grid, &codewords);

    // Uncovered bottom-right corner gets the fixed checkerboard
    let last = size.mapping_size() - 1;
    for (r, c) in placement.unused_cells() {
        let dark = (r == last && c == last) || (r == last - 1 && c == last - 1);
        grid.set(r + 1, c + 1, dark);
    }
    grid.draw_finder();
    Ok(grid)
}

/// Axis-aligned rendering with `quiet_zone` light modules on every side
pub fn render_symbol(grid: &ModuleGrid, module_px: usize, quiet_zone: usize) -> GrayscaleImage {
    let n = grid.dimension();
    let side = (n + 2 * quiet_zone) * module_px;
    let mut image = GrayscaleImage::filled(side, side, 255);
    let data = image.data_mut();
    for row in 0..n {
        for col in 0..n {
            if !grid.get(row, col) {
                continue;
            }
            let y0 = (row + quiet_zone) * module_px;
            let x0 = (col + quiet_zone) * module_px;
            for y in y0..y0 + module_px {
                data[y * side + x0..y * side + x0 + module_px].fill(0);
            }
        }
    }
    image
}

/// Paint a symbol onto `canvas`, centred at `center` and rotated by `angle`
/// radians (clockwise on screen). Edge pixels are 2x2 supersampled against
/// the existing background. Returns the symbol outline.
pub fn paint_symbol(
    canvas: &mut GrayscaleImage,
    grid: &ModuleGrid,
    center: Point,
    module_px: f32,
    angle: f32,
) -> Region {
    let n = grid.dimension();
    let half = n as f32 / 2.0;
    let (sin, cos) = angle.sin_cos();
    let to_image = |u: f32, v: f32| {
        let dx = (u - half) * module_px;
        let dy = (v - half) * module_px;
        Point::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
    };
    let outline = Region::new(
        to_image(0.0, 0.0),
        to_image(n as f32, 0.0),
        to_image(n as f32, n as f32),
        to_image(0.0, n as f32),
    );

    let reach = half * module_px * std::f32::consts::SQRT_2 + 1.0;
    let width = canvas.width();
    let height = canvas.height();
    let x0 = (center.x - reach).floor().max(0.0) as usize;
    let y0 = (center.y - reach).floor().max(0.0) as usize;
    let x1 = ((center.x + reach).ceil().max(0.0) as usize).min(width);
    let y1 = ((center.y + reach).ceil().max(0.0) as usize).min(height);

    let data = canvas.data_mut();
    for y in y0..y1 {
        for x in x0..x1 {
            let background = data[y * width + x] as f32;
            let mut sum = 0.0;
            let mut inside = false;
            for (ox, oy) in [(0.25, 0.25), (0.75, 0.25), (0.25, 0.75), (0.75, 0.75)] {
                let dx = x as f32 + ox - center.x;
                let dy = y as f32 + oy - center.y;
                let u = (dx * cos + dy * sin) / module_px + half;
                let v = (-dx * sin + dy * cos) / module_px + half;
                if u >= 0.0 && v >= 0.0 && u < n as f32 && v < n as f32 {
                    inside = true;
                    sum += if grid.get(v as usize, u as usize) { 0.0 } else { 255.0 };
                } else {
                    sum += background;
                }
            }
            if inside {
                data[y * width + x] = (sum / 4.0).round() as u8;
            }
        }
    }
    outline
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_ascii() {
        assert_eq!(encode_ascii(b"123456"), vec![142, 164, 186]);
        assert_eq!(encode_ascii(b"A1B"), vec![66, 50, 67]);
        assert_eq!(encode_ascii(b"12a3"), vec![142, 98, 52]);
        assert_eq!(encode_ascii(&[0xE9]), vec![235, 106]);
    }

    #[test]
    fn test_padding() {
        let mut data = vec![66];
        pad_codewords(&mut data, 3);
        assert_eq!(data, vec![66, 129, 70]);
    }

    #[test]
    fn test_iso_reference_codewords() {
        let (size, codewords) = symbol_codewords(b"123456").unwrap();
        assert_eq!(size.modules, 10);
        assert_eq!(codewords, vec![142, 164, 186, 114, 25, 5, 88, 102]);
    }

    #[test]
    fn test_payload_too_large() {
        let payload = vec![b'A'; 45];
        assert_eq!(
            encode_symbol(&payload),
            Err(FixtureError::PayloadTooLarge {
                codewords: 45,
                capacity: 44
            })
        );
    }

    #[test]
    fn test_encode_symbol_finder_and_corner() {
        // 5 data codewords: 12x12, whose 10x10 mapping leaves a 2x2 corner
        let grid = encode_symbol(b"HELLO").unwrap();
        assert_eq!(grid.dimension(), 12);
        assert_eq!(grid.finder_agreement(), 1.0);
        assert!(grid.get(10, 10));
        assert!(grid.get(9, 9));
        assert!(!grid.get(9, 10));
        assert!(!grid.get(10, 9));
    }

    #[test]
    fn test_render_symbol() {
        let grid = encode_symbol(b"123456").unwrap();
        let image = render_symbol(&grid, 4, 2);
        assert_eq!(image.width(), 56);
        assert_eq!(image.height(), 56);
        assert_eq!(image.get(1, 1), 255);
        // Module (9, 0) is the finder L vertex
        assert_eq!(image.get(9, 45), 0);
        // Module (0, 9) is the light clock corner
        assert_eq!(image.get(45, 9), 255);
    }

    #[test]
    fn test_paint_symbol_upright() {
        let grid = encode_symbol(b"123456").unwrap();
        let mut canvas = GrayscaleImage::filled(100, 100, 200);
        let outline = paint_symbol(&mut canvas, &grid, Point::new(50.0, 50.0), 4.0, 0.0);
        assert!(outline.top_left().distance(&Point::new(30.0, 30.0)) < 1e-3);
        assert!(outline.bottom_left().distance(&Point::new(30.0, 70.0)) < 1e-3);
        assert_eq!(canvas.get(31, 69), 0);
        assert_eq!(canvas.get(69, 31), 255);
        assert_eq!(canvas.get(5, 5), 200);
    }

    #[test]
    fn test_paint_symbol_rotated_outline() {
        let grid = encode_symbol(b"ROT").unwrap();
        let mut canvas = GrayscaleImage::filled(120, 120, 255);
        let angle = std::f32::consts::FRAC_PI_2;
        let outline = paint_symbol(&mut canvas, &grid, Point::new(60.0, 60.0), 5.0, angle);
        // A quarter turn clockwise brings the L vertex to the top-left
        assert!(outline.bottom_left().distance(&Point::new(35.0, 35.0)) < 1e-3);
        assert_eq!(canvas.get(36, 36), 0);
    }
}
