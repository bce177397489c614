use perceptual_color::{LinearRgb, Srgb};

use crate::error::ImageError;

/// A row-major grid of device colors.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelGrid {
    width: u32,
    height: u32,
    pixels: Vec<Srgb>,
}

impl PixelGrid {
    pub fn new(width: u32, height: u32, pixels: Vec<Srgb>) -> Result<Self, ImageError> {
        if pixels.len() != width as usize * height as usize {
            return Err(ImageError::InvalidDimensions {
                width,
                height,
                pixels: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Build from packed 8-bit RGB bytes.
    pub fn from_rgb8(width: u32, height: u32, data: &[u8]) -> Result<Self, ImageError> {
        let pixels = data
            .chunks_exact(3)
            .map(|p| Srgb::from_u8(p[0], p[1], p[2]))
            .collect();
        Self::new(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Srgb] {
        &self.pixels
    }

    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Packed 8-bit RGB bytes, row-major.
    pub fn to_rgb8(&self) -> Vec<u8> {
        self.pixels.iter().flat_map(|p| p.to_bytes()).collect()
    }

    /// Size after fitting the longer side into `max_resolution`, keeping the
    /// aspect ratio. Grids that already fit keep their size.
    pub fn fitted_size(&self, max_resolution: u32) -> (u32, u32) {
        let longest = self.width.max(self.height);
        if longest <= max_resolution || longest == 0 {
            return (self.width, self.height);
        }
        let scale = max_resolution as f64 / longest as f64;
        let fit = |side: u32| ((side as f64 * scale).round() as u32).clamp(1, max_resolution);
        (fit(self.width), fit(self.height))
    }

    /// Shrink so the longer side is at most `max_resolution`.
    ///
    /// Every output pixel is the linear-light average of the source box it
    /// covers, so thin bright details darken the way they would optically
    /// instead of being dropped or overweighted.
    pub fn downsample(&self, max_resolution: u32) -> PixelGrid {
        let (tw, th) = self.fitted_size(max_resolution);
        if (tw, th) == (self.width, self.height) {
            return self.clone();
        }

        let (w, h) = (self.width as usize, self.height as usize);
        let (tw_us, th_us) = (tw as usize, th as usize);
        let mut pixels = Vec::with_capacity(tw_us * th_us);

        for ty in 0..th_us {
            let y0 = ty * h / th_us;
            let y1 = ((ty + 1) * h / th_us).max(y0 + 1);
            for tx in 0..tw_us {
                let x0 = tx * w / tw_us;
                let x1 = ((tx + 1) * w / tw_us).max(x0 + 1);

                let mut sum = [0.0f64; 3];
                for y in y0..y1 {
                    for p in &self.pixels[y * w + x0..y * w + x1] {
                        let lin = LinearRgb::from(*p);
                        sum[0] += lin.r as f64;
                        sum[1] += lin.g as f64;
                        sum[2] += lin.b as f64;
                    }
                }
                let n = ((y1 - y0) * (x1 - x0)) as f64;
                pixels.push(Srgb::from(LinearRgb::new(
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                )));
            }
        }

        PixelGrid {
            width: tw,
            height: th,
            pixels,
        }
    }
}
