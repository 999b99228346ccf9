use crate::error::PixelBufferError;

/// Linear floating-point RGBA image, rows stored top to bottom.
///
/// Used both for probe images on their way to the GPU and for equirect
/// targets read back from it.
#[derive(Clone, Debug, PartialEq)]
pub struct HdrImage {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl HdrImage {
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Result<Self, PixelBufferError> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(PixelBufferError::SizeMismatch {
                width,
                height,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Builds an image from interleaved RGBA floats.
    pub fn from_rgba_f32(width: u32, height: u32, data: &[f32]) -> Result<Self, PixelBufferError> {
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(PixelBufferError::SizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        let pixels = data
            .chunks_exact(4)
            .map(|p| [p[0], p[1], p[2], p[3]])
            .collect();
        Self::new(width, height, pixels)
    }

    /// For callers that produce exactly `width * height` pixels by construction.
    pub(crate) fn from_vec(width: u32, height: u32, pixels: Vec<[f32; 4]>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn uniform(width: u32, height: u32, color: [f32; 4]) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// RGB triples with alpha dropped, the layout radiance files store.
    pub fn rgb(&self) -> impl Iterator<Item = [f32; 3]> + '_ {
        self.pixels.iter().map(|p| [p[0], p[1], p[2]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffers() {
        let err = HdrImage::new(2, 2, vec![[0.0; 4]; 3]).unwrap_err();
        assert_eq!(
            err,
            PixelBufferError::SizeMismatch {
                width: 2,
                height: 2,
                expected: 4,
                actual: 3
            }
        );
        assert!(HdrImage::from_rgba_f32(1, 1, &[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn rows_are_top_to_bottom() {
        let data: Vec<f32> = (0..2 * 3 * 4).map(|v| v as f32).collect();
        let image = HdrImage::from_rgba_f32(2, 3, &data).unwrap();
        assert_eq!(image.pixel(0, 0), Some([0.0, 1.0, 2.0, 3.0]));
        assert_eq!(image.pixel(1, 2), Some([20.0, 21.0, 22.0, 23.0]));
        assert_eq!(image.pixel(2, 0), None);
        let flat: Vec<f32> = image.pixels().iter().flatten().copied().collect();
        assert_eq!(flat, data);
    }

    #[test]
    fn keeps_values_above_one() {
        let image = HdrImage::uniform(3, 1, [12.5, 0.0, 1e4, 1.0]);
        assert!(image.rgb().all(|p| p == [12.5, 0.0, 1e4]));
    }
}
