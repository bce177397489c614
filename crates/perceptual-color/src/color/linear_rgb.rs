//! Linear-light RGB
//!
//! The space where averaging pixel values is physically meaningful, and the
//! entry point of the Oklab transform.

use super::lut::srgb_to_linear;
use super::srgb::Srgb;

/// A color in linear-light sRGB primaries.
///
/// In-gamut colors have channels in 0.0..=1.0; results of Oklab conversion
/// are not clamped and may lie outside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearRgb {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Strictly inside the unit cube.
    ///
    /// Matches the early-out test of chroma-preserving gamut clipping, which
    /// treats colors sitting exactly on a face as needing projection.
    #[inline]
    pub fn is_strictly_inside_gamut(self) -> bool {
        self.r > 0.0 && self.g > 0.0 && self.b > 0.0 && self.r < 1.0 && self.g < 1.0 && self.b < 1.0
    }

    #[inline]
    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
        }
    }
}

impl From<Srgb> for LinearRgb {
    fn from(srgb: Srgb) -> Self {
        Self {
            r: srgb_to_linear(srgb.r),
            g: srgb_to_linear(srgb.g),
            b: srgb_to_linear(srgb.b),
        }
    }
}
