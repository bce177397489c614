//! Okhsv cylindrical color space
//!
//! Like Okhsl but with value instead of lightness: `v = 1, s = 1` is the cusp
//! of each hue, and `v = 1, s = 0` is white.

use std::f32::consts::TAU;

use super::linear_rgb::LinearRgb;
use super::okhsl::{polar, LIGHTNESS_EPSILON};
use super::oklab::Oklab;
use crate::gamut::{find_cusp, to_st, toe, toe_inv};

const S_0: f32 = 0.5;

/// A color in Okhsv: hue fraction, saturation and value, all in 0.0..=1.0
/// for in-gamut colors.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Okhsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

impl Okhsv {
    #[inline]
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self { h, s, v }
    }
}

/// Cube-root scale that pushes the brightest linear channel of `lab` to 1.
#[inline]
fn value_scale(lab: Oklab) -> f32 {
    let rgb = LinearRgb::from(lab);
    (1.0 / rgb.r.max(rgb.g).max(rgb.b).max(0.0)).cbrt()
}

impl From<Oklab> for Okhsv {
    fn from(lab: Oklab) -> Self {
        if lab.l <= LIGHTNESS_EPSILON {
            return Okhsv::new(0.0, 0.0, 0.0);
        }

        let (c, a_, b_, h) = polar(lab);

        let st_max = to_st(find_cusp(a_, b_));
        let k = 1.0 - S_0 / st_max.s;

        // Where the ray from black through the color meets the v = 1 edge
        let t = st_max.t / (c + lab.l * st_max.t);
        let l_v = t * lab.l;
        let c_v = t * c;

        let l_vt = toe_inv(l_v);
        let c_vt = c_v * l_vt / l_v;

        // Undo the compensation for the toe and the curved upper edge
        let scale_l = value_scale(Oklab::new(l_vt, a_ * c_vt, b_ * c_vt));
        let l = toe(lab.l / scale_l);

        let v = l / l_v;
        let s = (S_0 + st_max.t) * c_v / (st_max.t * S_0 + st_max.t * k * c_v);

        Okhsv::new(h, s, v)
    }
}

impl From<Okhsv> for Oklab {
    fn from(hsv: Okhsv) -> Self {
        if hsv.v <= 0.0 {
            return Oklab::new(0.0, 0.0, 0.0);
        }

        let angle = TAU * hsv.h;
        let a_ = angle.cos();
        let b_ = angle.sin();

        let st_max = to_st(find_cusp(a_, b_));
        let k = 1.0 - S_0 / st_max.s;

        // L and C as if the gamut were a perfect triangle
        let denom = S_0 + st_max.t - st_max.t * k * hsv.s;
        let l_v = 1.0 - hsv.s * S_0 / denom;
        let c_v = hsv.s * st_max.t * S_0 / denom;

        let mut l = hsv.v * l_v;
        let mut c = hsv.v * c_v;

        // Compensate for the toe and the curved upper edge
        let l_vt = toe_inv(l_v);
        let c_vt = c_v * l_vt / l_v;

        let l_new = toe_inv(l);
        c *= l_new / l;
        l = l_new;

        let scale_l = value_scale(Oklab::new(l_vt, a_ * c_vt, b_ * c_vt));
        l *= scale_l;
        c *= scale_l;

        Oklab::new(l, c * a_, c * b_)
    }
}
