//! The color value passed between clustering, filtering and persistence.

use std::fmt;
use std::str::FromStr;

use crate::color::{LinearRgb, Okhsl, Okhsv, Oklab, Srgb};
use crate::error::ParseColorError;
use crate::gamut::gamut_clip_preserve_chroma;

/// An immutable color carrying its device, Oklab and Okhsl forms.
///
/// Whichever form it is built from, the other two are derived from it, so
/// the three always describe the same color. Building from Oklab (a cluster
/// mean, say) may yield a device color outside the gamut; use
/// [`displayable`](Self::displayable) for a renderable one.
///
/// ```
/// use perceptual_color::{PerceptualColor, Srgb};
///
/// let red = PerceptualColor::from_srgb(Srgb::from_u8(255, 0, 0));
/// let again = PerceptualColor::from_oklab(red.oklab());
/// assert!(red.srgb().max_channel_difference(again.srgb()) < 1e-3);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerceptualColor {
    srgb: Srgb,
    lab: Oklab,
    hsl: Okhsl,
}

impl PerceptualColor {
    pub fn from_srgb(srgb: Srgb) -> Self {
        let lab = Oklab::from(LinearRgb::from(srgb));
        Self {
            srgb,
            lab,
            hsl: Okhsl::from(lab),
        }
    }

    pub fn from_oklab(lab: Oklab) -> Self {
        Self {
            srgb: Srgb::from(LinearRgb::from(lab)),
            lab,
            hsl: Okhsl::from(lab),
        }
    }

    /// Like [`from_oklab`](Self::from_oklab), but a Lab value outside the
    /// gamut is first clipped to the color [`displayable`](Self::displayable)
    /// would show, so all three forms describe a renderable color.
    pub fn from_oklab_clipped(lab: Oklab) -> Self {
        let color = Self::from_oklab(lab);
        if color.srgb.is_in_gamut() {
            color
        } else {
            Self::from_srgb(color.displayable())
        }
    }

    pub fn from_okhsl(hsl: Okhsl) -> Self {
        let lab = Oklab::from(hsl);
        Self {
            srgb: Srgb::from(LinearRgb::from(lab)),
            lab,
            hsl,
        }
    }

    #[inline]
    pub fn srgb(&self) -> Srgb {
        self.srgb
    }

    #[inline]
    pub fn oklab(&self) -> Oklab {
        self.lab
    }

    #[inline]
    pub fn okhsl(&self) -> Okhsl {
        self.hsl
    }

    pub fn okhsv(&self) -> Okhsv {
        Okhsv::from(self.lab)
    }

    /// 2-D position for palette display: (saturation, lightness).
    #[inline]
    pub fn position(&self) -> (f32, f32) {
        (self.hsl.s, self.hsl.l)
    }

    /// Perceptual distance in Okhsl cylindrical coordinates.
    #[inline]
    pub fn perceptual_distance(&self, other: &PerceptualColor) -> f32 {
        self.hsl.distance(other.hsl)
    }

    #[inline]
    pub fn lab_distance_squared(&self, other: &PerceptualColor) -> f32 {
        self.lab.distance_squared(other.lab)
    }

    /// The device color, gamut-clipped with hue and chroma preserved where
    /// possible. In-gamut colors are returned as stored.
    pub fn displayable(&self) -> Srgb {
        if self.srgb.is_in_gamut() {
            return self.srgb;
        }
        let clipped = gamut_clip_preserve_chroma(LinearRgb::from(self.lab));
        Srgb::from(clipped.clamped())
    }

    /// `#rrggbb` of the displayable color.
    pub fn to_hex(&self) -> String {
        self.displayable().to_hex()
    }
}

impl From<Srgb> for PerceptualColor {
    fn from(srgb: Srgb) -> Self {
        Self::from_srgb(srgb)
    }
}

impl From<Oklab> for PerceptualColor {
    fn from(lab: Oklab) -> Self {
        Self::from_oklab(lab)
    }
}

impl From<Okhsl> for PerceptualColor {
    fn from(hsl: Okhsl) -> Self {
        Self::from_okhsl(hsl)
    }
}

impl FromStr for PerceptualColor {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Srgb>().map(Self::from_srgb)
    }
}

impl fmt::Display for PerceptualColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn sample_colors() -> Vec<Srgb> {
        let mut colors = Vec::new();
        for r in (0..=255u8).step_by(51) {
            for g in (0..=255u8).step_by(85) {
                for b in (0..=255u8).step_by(51) {
                    colors.push(Srgb::from_u8(r, g, b));
                }
            }
        }
        colors
    }

    /// Building from any one form reproduces the other two.
    #[test]
    fn test_triangular_consistency() {
        for srgb in sample_colors() {
            let from_srgb = PerceptualColor::from_srgb(srgb);
            let from_lab = PerceptualColor::from_oklab(from_srgb.oklab());
            let from_hsl = PerceptualColor::from_okhsl(from_srgb.okhsl());

            assert!(
                srgb.max_channel_difference(from_lab.srgb()) < EPSILON,
                "{srgb:?} via Oklab gave {:?}",
                from_lab.srgb()
            );
            assert!(
                srgb.max_channel_difference(from_hsl.srgb()) < EPSILON,
                "{srgb:?} via Okhsl gave {:?}",
                from_hsl.srgb()
            );
            assert!(
                from_srgb.oklab().distance(from_hsl.oklab()) < EPSILON,
                "{srgb:?}: Oklab {:?} vs {:?}",
                from_srgb.oklab(),
                from_hsl.oklab()
            );
        }
    }

    #[test]
    fn test_position_is_saturation_and_lightness() {
        let color = PerceptualColor::from_srgb(Srgb::from_u8(30, 140, 200));
        let hsl = color.okhsl();
        assert_eq!(color.position(), (hsl.s, hsl.l));
    }

    #[test]
    fn test_displayable_is_in_gamut() {
        // Far outside the sRGB gamut
        let wild = PerceptualColor::from_oklab(Oklab::new(0.7, 0.35, 0.2));
        assert!(!wild.srgb().is_in_gamut());
        let shown = wild.displayable();
        assert!(shown.is_in_gamut(), "{shown:?}");

        let tame = PerceptualColor::from_srgb(Srgb::from_u8(90, 120, 30));
        assert!(tame.displayable().max_channel_difference(tame.srgb()) < EPSILON);
    }

    #[test]
    fn test_clipped_mean_matches_its_displayed_color() {
        let blue = PerceptualColor::from_srgb(Srgb::from_u8(0, 64, 255)).oklab();
        let green = PerceptualColor::from_srgb(Srgb::from_u8(0, 128, 64)).oklab();
        let mean = Oklab::new(
            (blue.l + green.l) / 2.0,
            (blue.a + green.a) / 2.0,
            (blue.b + green.b) / 2.0,
        );

        let color = PerceptualColor::from_oklab_clipped(mean);
        assert!(color.srgb().is_in_gamut(), "{:?}", color.srgb());
        assert!((0.0..=1.0).contains(&color.okhsl().s), "{:?}", color.okhsl());
        assert_eq!(color.displayable(), color.srgb());

        let shown = PerceptualColor::from_srgb(color.displayable());
        assert!(color.perceptual_distance(&shown) < 1e-6);
    }

    #[test]
    fn test_clipped_keeps_in_gamut_colors() {
        let lab = PerceptualColor::from_srgb(Srgb::from_u8(90, 120, 30)).oklab();
        assert_eq!(
            PerceptualColor::from_oklab_clipped(lab),
            PerceptualColor::from_oklab(lab)
        );
    }

    #[test]
    fn test_hex_round_trip() {
        let color: PerceptualColor = "#3366cc".parse().unwrap();
        assert_eq!(color.to_hex(), "#3366cc");
        assert_eq!(color.to_string(), "#3366cc");
    }

    #[test]
    fn test_perceptual_distance() {
        let red = PerceptualColor::from_srgb(Srgb::from_u8(255, 0, 0));
        let dark_red = PerceptualColor::from_srgb(Srgb::from_u8(200, 0, 0));
        let blue = PerceptualColor::from_srgb(Srgb::from_u8(0, 0, 255));

        assert!(red.perceptual_distance(&red) < 1e-6);
        assert!(red.perceptual_distance(&dark_red) < red.perceptual_distance(&blue));
        assert!(
            (red.perceptual_distance(&blue) - blue.perceptual_distance(&red)).abs() < 1e-6
        );
    }
}
