//! Okhsl cylindrical color space
//!
//! A reparameterization of Oklab restricted to the sRGB gamut: saturation 1.0
//! is the gamut edge at every hue and lightness, and lightness goes through
//! the toe so that it tracks perceived lightness near black.
//!
//! Björn Ottosson, "Okhsv and Okhsl"
//! <https://bottosson.github.io/posts/colorpicker/>

use std::f32::consts::{PI, TAU};

use super::oklab::Oklab;
use crate::gamut::{get_cs, toe, toe_inv};

/// Chroma below this is treated as achromatic and gets hue 0.
pub(crate) const ACHROMATIC_CHROMA: f32 = 1e-5;

/// Oklab lightness this close to 0 or 1 maps straight to black or white.
pub(crate) const LIGHTNESS_EPSILON: f32 = 1e-6;

const MID: f32 = 0.8;
const MID_INV: f32 = 1.25;

/// A color in Okhsl.
///
/// - `h`: hue as a fraction of a full turn, 0.0..1.0
/// - `s`: saturation, 0.0..=1.0 within the sRGB gamut
/// - `l`: perceived lightness, 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Okhsl {
    pub h: f32,
    pub s: f32,
    pub l: f32,
}

impl Okhsl {
    #[inline]
    pub fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Cartesian form `(s cos 2πh, s sin 2πh, l)`.
    #[inline]
    pub fn to_cartesian(self) -> [f32; 3] {
        let angle = self.h * TAU;
        [self.s * angle.cos(), self.s * angle.sin(), self.l]
    }

    /// Euclidean distance between the cartesian forms: hue is the angle,
    /// saturation the radius and lightness the height.
    ///
    /// ```
    /// use perceptual_color::Okhsl;
    ///
    /// // Opposite hues at full saturation are two radii apart
    /// let a = Okhsl::new(0.0, 1.0, 0.5);
    /// let b = Okhsl::new(0.5, 1.0, 0.5);
    /// assert!((a.distance(b) - 2.0).abs() < 1e-5);
    /// ```
    #[inline]
    pub fn distance(self, other: Okhsl) -> f32 {
        self.distance_squared(other).sqrt()
    }

    #[inline]
    pub fn distance_squared(self, other: Okhsl) -> f32 {
        let [x0, y0, z0] = self.to_cartesian();
        let [x1, y1, z1] = other.to_cartesian();
        let (dx, dy, dz) = (x0 - x1, y0 - y1, z0 - z1);
        dx * dx + dy * dy + dz * dz
    }
}

/// Chroma, unit hue vector and hue fraction of an Oklab color.
///
/// Colors without measurable chroma get chroma 0 and the stable hue
/// fallback `(1, 0)`, which is hue fraction 0.
pub(crate) fn polar(lab: Oklab) -> (f32, f32, f32, f32) {
    let c = lab.chroma();
    if c < ACHROMATIC_CHROMA {
        return (0.0, 1.0, 0.0, 0.0);
    }
    let mut h = 0.5 + 0.5 * (-lab.b).atan2(-lab.a) / PI;
    if h >= 1.0 {
        h -= 1.0;
    }
    (c, lab.a / c, lab.b / c, h)
}

impl From<Oklab> for Okhsl {
    fn from(lab: Oklab) -> Self {
        if lab.l <= LIGHTNESS_EPSILON {
            return Okhsl::new(0.0, 0.0, 0.0);
        }
        if lab.l >= 1.0 - LIGHTNESS_EPSILON {
            return Okhsl::new(0.0, 0.0, 1.0);
        }

        let (c, a_, b_, h) = polar(lab);

        let cs = get_cs(lab.l, a_, b_);

        // Inverse of the two-segment interpolation in `From<Okhsl> for Oklab`.
        // Chroma at or past the gamut boundary saturates at 1.
        let s = if c >= cs.c_max {
            1.0
        } else if c < cs.c_mid {
            let k_1 = MID * cs.c_0;
            let k_2 = 1.0 - k_1 / cs.c_mid;
            let t = c / (k_1 + k_2 * c);
            t * MID
        } else {
            let k_0 = cs.c_mid;
            let k_1 = (1.0 - MID) * cs.c_mid * cs.c_mid * MID_INV * MID_INV / cs.c_0;
            let k_2 = 1.0 - k_1 / (cs.c_max - cs.c_mid);
            let t = (c - k_0) / (k_1 + k_2 * (c - k_0));
            MID + (1.0 - MID) * t
        };

        Okhsl::new(h, s, toe(lab.l))
    }
}

impl From<Okhsl> for Oklab {
    fn from(hsl: Okhsl) -> Self {
        if hsl.l >= 1.0 {
            return Oklab::new(1.0, 0.0, 0.0);
        }
        if hsl.l <= 0.0 {
            return Oklab::new(0.0, 0.0, 0.0);
        }

        let l = toe_inv(hsl.l);
        if hsl.s <= 0.0 {
            return Oklab::new(l, 0.0, 0.0);
        }

        let angle = TAU * hsl.h;
        let a_ = angle.cos();
        let b_ = angle.sin();
        let cs = get_cs(l, a_, b_);

        let c = if hsl.s < MID {
            let t = MID_INV * hsl.s;
            let k_1 = MID * cs.c_0;
            let k_2 = 1.0 - k_1 / cs.c_mid;
            t * k_1 / (1.0 - k_2 * t)
        } else {
            let t = (hsl.s - MID) / (1.0 - MID);
            let k_0 = cs.c_mid;
            let k_1 = (1.0 - MID) * cs.c_mid * cs.c_mid * MID_INV * MID_INV / cs.c_0;
            let k_2 = 1.0 - k_1 / (cs.c_max - cs.c_mid);
            k_0 + t * k_1 / (1.0 - k_2 * t)
        };

        Oklab::new(l, c * a_, c * b_)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LinearRgb, Srgb};

    fn srgb_to_okhsl(srgb: Srgb) -> Okhsl {
        Okhsl::from(Oklab::from(LinearRgb::from(srgb)))
    }

    fn okhsl_to_srgb(hsl: Okhsl) -> Srgb {
        Srgb::from(LinearRgb::from(Oklab::from(hsl)))
    }

    #[test]
    fn test_round_trip_over_srgb_cube() {
        let steps = [0u8, 1, 17, 64, 128, 200, 254, 255];
        for r in steps {
            for g in steps {
                for b in steps {
                    let original = Srgb::from_u8(r, g, b);
                    let back = okhsl_to_srgb(srgb_to_okhsl(original));
                    let diff = original.max_channel_difference(back);
                    assert!(
                        diff < 1e-3,
                        "({r}, {g}, {b}) came back as {back:?} (diff {diff})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_primaries_are_fully_saturated() {
        for bytes in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 0]] {
            let hsl = srgb_to_okhsl(Srgb::from_bytes(bytes));
            assert!(
                (hsl.s - 1.0).abs() < 1e-2,
                "{bytes:?} saturation {}",
                hsl.s
            );
        }
    }

    #[test]
    fn test_achromatic_colors_fall_back_to_zero_hue() {
        for v in [0u8, 50, 128, 255] {
            let hsl = srgb_to_okhsl(Srgb::from_u8(v, v, v));
            assert_eq!(hsl.h, 0.0, "gray {v}");
            assert!(hsl.s.abs() < 1e-3, "gray {v} saturation {}", hsl.s);
            assert!(hsl.h.is_finite() && hsl.s.is_finite() && hsl.l.is_finite());
        }
        assert_eq!(srgb_to_okhsl(Srgb::new(0.0, 0.0, 0.0)), Okhsl::new(0.0, 0.0, 0.0));
        assert_eq!(srgb_to_okhsl(Srgb::new(1.0, 1.0, 1.0)).l, 1.0);
    }

    #[test]
    fn test_hue_range() {
        for bytes in [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 0, 128], [255, 0, 1]] {
            let hsl = srgb_to_okhsl(Srgb::from_bytes(bytes));
            assert!((0.0..1.0).contains(&hsl.h), "{bytes:?} hue {}", hsl.h);
        }
    }

    #[test]
    fn test_saturation_stays_in_unit_range_outside_gamut() {
        // Far past the sRGB boundary at any hue
        for (a, b) in [(0.4, 0.0), (0.0, -0.45), (-0.35, 0.3)] {
            let hsl = Okhsl::from(Oklab::new(0.6, a, b));
            assert_eq!(hsl.s, 1.0, "a={a} b={b}");
        }

        // Midpoint of two in-gamut colors that leaves the gamut
        let blue = Oklab::from(LinearRgb::from(Srgb::from_u8(0, 64, 255)));
        let green = Oklab::from(LinearRgb::from(Srgb::from_u8(0, 128, 64)));
        let mid = Oklab::new(
            (blue.l + green.l) / 2.0,
            (blue.a + green.a) / 2.0,
            (blue.b + green.b) / 2.0,
        );
        let hsl = Okhsl::from(mid);
        assert!((0.0..=1.0).contains(&hsl.s), "saturation {}", hsl.s);
    }

    #[test]
    fn test_matches_palette_crate() {
        use palette::convert::FromColorUnclamped;
        use palette::{Okhsl as PaletteOkhsl, Oklab as PaletteOklab};

        for bytes in [[255, 0, 0], [30, 160, 90], [10, 20, 200], [250, 200, 30], [120, 60, 140]] {
            let lab = Oklab::from(LinearRgb::from(Srgb::from_bytes(bytes)));
            let ours = Okhsl::from(lab);
            let theirs =
                PaletteOkhsl::from_color_unclamped(PaletteOklab::new(lab.l, lab.a, lab.b));
            let their_h = theirs.hue.into_positive_degrees() / 360.0;

            assert!(
                (ours.h - their_h).abs() < 1e-3,
                "{bytes:?} hue: ours={}, palette={their_h}",
                ours.h
            );
            assert!(
                (ours.s - theirs.saturation).abs() < 1e-2,
                "{bytes:?} saturation: ours={}, palette={}",
                ours.s,
                theirs.saturation
            );
            assert!(
                (ours.l - theirs.lightness).abs() < 1e-3,
                "{bytes:?} lightness: ours={}, palette={}",
                ours.l,
                theirs.lightness
            );
        }
    }

    #[test]
    fn test_cylindrical_distance() {
        let gray = Okhsl::new(0.3, 0.0, 0.5);
        let other_gray = Okhsl::new(0.9, 0.0, 0.5);
        // Hue is irrelevant on the neutral axis
        assert!(gray.distance(other_gray) < 1e-6);

        let a = Okhsl::new(0.0, 0.5, 0.2);
        let b = Okhsl::new(0.0, 0.5, 0.6);
        assert!((a.distance(b) - 0.4).abs() < 1e-6);

        // Wrapping hue: 0.99 and 0.01 are neighbours
        let a = Okhsl::new(0.99, 1.0, 0.5);
        let b = Okhsl::new(0.01, 1.0, 0.5);
        assert!(a.distance(b) < 0.13, "distance {}", a.distance(b));
    }
}
