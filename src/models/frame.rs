use crate::error::FrameError;
use crate::utils::grayscale::{rgb_to_grayscale, rgba_to_grayscale};

/// Single-channel 8-bit frame, row-major, immutable once built
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrayscaleImage {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl GrayscaleImage {
    /// Wrap an existing grayscale buffer
    pub fn new(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        check_len(width * height, data.len())?;
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Image of uniform intensity
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Convert an RGB buffer (3 bytes per pixel)
    pub fn from_rgb(rgb: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        check_len(width * height * 3, rgb.len())?;
        Ok(Self {
            width,
            height,
            data: rgb_to_grayscale(rgb, width, height),
        })
    }

    /// Convert an RGBA buffer (4 bytes per pixel)
    pub fn from_rgba(rgba: &[u8], width: usize, height: usize) -> Result<Self, FrameError> {
        check_len(width * height * 4, rgba.len())?;
        Ok(Self {
            width,
            height,
            data: rgba_to_grayscale(rgba, width, height),
        })
    }

    /// Convert any decoded `image` frame
    pub fn from_dynamic(img: &image::DynamicImage) -> Self {
        Self::from(img.to_luma8())
    }

    /// Image width in pixels
    pub fn width(&self) -> usize {
        self.width
    }

    /// Image height in pixels
    pub fn height(&self) -> usize {
        self.height
    }

    /// Raw row-major samples
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Intensity at (x, y); out of range reads as 0
    pub fn get(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.data[y * self.width + x]
    }

    /// Bilinear sample at sub-pixel coordinates, clamped to the image.
    ///
    /// Pixel `(i, j)` has its centre at `(i + 0.5, j + 0.5)`.
    pub fn sample(&self, x: f32, y: f32) -> f32 {
        if self.width == 0 || self.height == 0 {
            return 0.0;
        }
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let fx = (x - 0.5).clamp(0.0, max_x);
        let fy = (y - 0.5).clamp(0.0, max_y);

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let tx = fx - x0 as f32;
        let ty = fy - y0 as f32;

        let p00 = self.get(x0, y0) as f32;
        let p10 = self.get(x1, y0) as f32;
        let p01 = self.get(x0, y1) as f32;
        let p11 = self.get(x1, y1) as f32;

        let top = p00 + (p10 - p00) * tx;
        let bottom = p01 + (p11 - p01) * tx;
        top + (bottom - top) * ty
    }

    /// Mutable access for fixture painting
    pub(crate) fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

impl From<image::GrayImage> for GrayscaleImage {
    fn from(img: image::GrayImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width: width as usize,
            height: height as usize,
            data: img.into_raw(),
        }
    }
}

impl From<&GrayscaleImage> for image::GrayImage {
    fn from(img: &GrayscaleImage) -> Self {
        image::GrayImage::from_fn(img.width as u32, img.height as u32, |x, y| {
            image::Luma([img.get(x as usize, y as usize)])
        })
    }
}

fn check_len(expected: usize, actual: usize) -> Result<(), FrameError> {
    if expected != actual {
        return Err(FrameError::DimensionMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_mismatch() {
        let err = GrayscaleImage::new(4, 4, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            FrameError::DimensionMismatch {
                expected: 16,
                actual: 15
            }
        );
        assert!(GrayscaleImage::from_rgb(&[0; 11], 2, 2).is_err());
    }

    #[test]
    fn test_bilinear_sample() {
        let img = GrayscaleImage::new(2, 1, vec![0, 200]).unwrap();
        // Exact pixel centres
        assert_eq!(img.sample(0.5, 0.5), 0.0);
        assert_eq!(img.sample(1.5, 0.5), 200.0);
        // Halfway between the centres
        assert!((img.sample(1.0, 0.5) - 100.0).abs() < 1e-3);
        // Clamped outside the image
        assert_eq!(img.sample(-5.0, 0.5), 0.0);
        assert_eq!(img.sample(10.0, 3.0), 200.0);
    }

    #[test]
    fn test_image_crate_round_trip() {
        let img = GrayscaleImage::new(3, 2, vec![1, 2, 3, 4, 5, 6]).unwrap();
        let luma: image::GrayImage = (&img).into();
        assert_eq!(luma.get_pixel(2, 1).0, [6]);
        assert_eq!(GrayscaleImage::from(luma), img);
    }
}
