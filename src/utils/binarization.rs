/// Binarization of grayscale frames
/// Returns BitMatrix values where true = dark, false = light
use crate::models::{BitMatrix, GrayscaleImage};

/// Otsu's optimal threshold over a set of samples.
///
/// Samples `<= threshold` belong to the dark class.
pub fn otsu_threshold(samples: &[u8]) -> u8 {
    if samples.is_empty() {
        return 127;
    }

    let mut histogram = [0u32; 256];
    let mut min_v = 255u8;
    let mut max_v = 0u8;
    for &v in samples {
        histogram[v as usize] += 1;
        min_v = min_v.min(v);
        max_v = max_v.max(v);
    }
    if min_v == max_v {
        return min_v;
    }
    let nonzero_bins = histogram.iter().filter(|&&h| h > 0).count();
    if nonzero_bins <= 2 {
        return ((min_v as u16 + max_v as u16) / 2) as u8;
    }

    let total = samples.len() as f64;
    let sum_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(i, &h)| i as f64 * h as f64)
        .sum();

    let mut sum_dark = 0f64;
    let mut weight_dark = 0f64;
    let mut best_variance = -1f64;
    let mut best_threshold = 127u8;

    for (t, &h) in histogram.iter().enumerate() {
        weight_dark += h as f64;
        if weight_dark < 1.0 {
            continue;
        }
        let weight_light = total - weight_dark;
        if weight_light < 1.0 {
            break;
        }

        sum_dark += t as f64 * h as f64;
        let mean_dark = sum_dark / weight_dark;
        let mean_light = (sum_total - sum_dark) / weight_light;

        let variance = weight_dark * weight_light * (mean_dark - mean_light).powi(2);
        if variance > best_variance {
            best_variance = variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

/// Convert grayscale image to binary using Otsu's thresholding method
pub fn otsu_binarize(image: &GrayscaleImage) -> (BitMatrix, u8) {
    let threshold = otsu_threshold(image.as_bytes());
    (threshold_binarize(image, threshold), threshold)
}

/// Simple global threshold binarization
pub fn threshold_binarize(image: &GrayscaleImage, threshold: u8) -> BitMatrix {
    let width = image.width();
    let data = image.as_bytes();
    BitMatrix::from_fn(width, image.height(), |x, y| data[y * width + x] <= threshold)
}

/// Local-mean binarization for unevenly lit frames.
///
/// A pixel is dark when it is more than `offset` below the mean of the
/// `(2 * radius + 1)^2` window around it (clipped at the border). Window sums
/// come from an integral image, so the cost does not depend on the radius.
pub fn adaptive_binarize(image: &GrayscaleImage, radius: usize, offset: f32) -> BitMatrix {
    let width = image.width();
    let height = image.height();
    let data = image.as_bytes();

    // integral[(y + 1) * stride + x + 1] = sum of data[..=y][..=x]
    let stride = width + 1;
    let mut integral = vec![0u64; stride * (height + 1)];
    for y in 0..height {
        let mut row_sum = 0u64;
        for x in 0..width {
            row_sum += data[y * width + x] as u64;
            integral[(y + 1) * stride + x + 1] = integral[y * stride + x + 1] + row_sum;
        }
    }

    BitMatrix::from_fn(width, height, |x, y| {
        let x0 = x.saturating_sub(radius);
        let y0 = y.saturating_sub(radius);
        let x1 = (x + radius + 1).min(width);
        let y1 = (y + radius + 1).min(height);
        let sum = integral[y1 * stride + x1] + integral[y0 * stride + x0]
            - integral[y0 * stride + x1]
            - integral[y1 * stride + x0];
        let mean = sum as f32 / ((x1 - x0) * (y1 - y0)) as f32;
        (data[y * width + x] as f32) < mean - offset
    })
}

/// Dilate the set bits with a square structuring element of the given radius.
///
/// Separable: a horizontal pass followed by a vertical pass, each using a
/// running count so the cost does not depend on the radius.
pub fn dilate(matrix: &BitMatrix, radius: usize) -> BitMatrix {
    if radius == 0 {
        return matrix.clone();
    }
    let width = matrix.width();
    let height = matrix.height();

    let mut horizontal = BitMatrix::new(width, height);
    for y in 0..height {
        dilate_line(width, radius, |x| matrix.get(x, y), |x| horizontal.set(x, y, true));
    }

    let mut result = BitMatrix::new(width, height);
    for x in 0..width {
        dilate_line(height, radius, |y| horizontal.get(x, y), |y| result.set(x, y, true));
    }
    result
}

fn dilate_line(
    len: usize,
    radius: usize,
    get: impl Fn(usize) -> bool,
    mut set: impl FnMut(usize),
) {
    // Number of set bits in the window [i - radius, i + radius]
    let mut count = 0usize;
    for i in 0..radius.min(len) {
        count += get(i) as usize;
    }
    for i in 0..len {
        let entering = i + radius;
        if entering < len {
            count += get(entering) as usize;
        }
        if i > radius {
            count -= get(i - radius - 1) as usize;
        }
        if count > 0 {
            set(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_binarize() {
        let gray = GrayscaleImage::new(2, 2, vec![100, 150, 200, 50]).unwrap();
        let binary = threshold_binarize(&gray, 128);

        assert!(binary.get(0, 0)); // 100 <= 128
        assert!(!binary.get(1, 0)); // 150 > 128
        assert!(!binary.get(0, 1)); // 200 > 128
        assert!(binary.get(1, 1)); // 50 <= 128
    }

    #[test]
    fn test_otsu_binarize() {
        // Two-class image: dark top half, light bottom half
        let mut data = vec![50u8; 50];
        data.extend(vec![200u8; 50]);
        let gray = GrayscaleImage::new(10, 10, data).unwrap();

        let (binary, threshold) = otsu_binarize(&gray);
        assert!((50..200).contains(&threshold));
        assert!(binary.get(0, 0));
        assert!(!binary.get(0, 7));
    }

    #[test]
    fn test_otsu_threshold_spread() {
        let mut samples = Vec::new();
        for v in [20u8, 25, 30, 35] {
            samples.extend(std::iter::repeat_n(v, 10));
        }
        for v in [180u8, 190, 200] {
            samples.extend(std::iter::repeat_n(v, 10));
        }
        let t = otsu_threshold(&samples);
        assert!((35..180).contains(&t), "threshold {t}");
        assert_eq!(otsu_threshold(&[9, 9, 9]), 9);
    }

    #[test]
    fn test_adaptive_binarize_gradient() {
        // Brightness falls from 240 to 60 across the frame; two 6x6 dark
        // patches sit at the bright and the dim end
        let (w, h) = (120usize, 40usize);
        let mut data = Vec::with_capacity(w * h);
        for y in 0..h {
            for x in 0..w {
                let light = 240.0 - 180.0 * x as f32 / (w - 1) as f32;
                let patch = (17..23).contains(&y) && ((10..16).contains(&x) || (100..106).contains(&x));
                data.push(if patch { (light * 0.3) as u8 } else { light as u8 });
            }
        }
        let gray = GrayscaleImage::new(w, h, data).unwrap();

        let mask = adaptive_binarize(&gray, 7, 8.0);
        assert!(mask.get(12, 19) && mask.get(103, 19));
        assert!(!mask.get(60, 5) && !mask.get(119, 39) && !mask.get(0, 0));
        assert_eq!(mask.count_ones(), 72);

        // One global threshold lands mid-gradient and swallows the dim background
        let (global, _) = otsu_binarize(&gray);
        assert!(global.get(110, 5));
    }

    #[test]
    fn test_adaptive_binarize_uniform() {
        let gray = GrayscaleImage::filled(30, 20, 128);
        assert_eq!(adaptive_binarize(&gray, 5, 4.0).count_ones(), 0);
    }

    #[test]
    fn test_dilate() {
        let mut m = BitMatrix::new(9, 9);
        m.set(4, 4, true);
        let d = dilate(&m, 2);
        assert_eq!(d.count_ones(), 25);
        assert!(d.get(2, 2) && d.get(6, 6));
        assert!(!d.get(1, 4) && !d.get(7, 4));

        // Clipped at the border
        let mut corner = BitMatrix::new(5, 5);
        corner.set(0, 0, true);
        assert_eq!(dilate(&corner, 1).count_ones(), 4);
    }
}
