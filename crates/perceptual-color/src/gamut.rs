//! sRGB gamut geometry in Oklab
//!
//! For a fixed hue the sRGB gamut, seen in the lightness/chroma plane, is
//! close to a triangle spanned by black, white and the *cusp*: the point of
//! maximum chroma. These helpers locate the cusp and intersect lines with the
//! gamut boundary. They are the building blocks of Okhsl, Okhsv and
//! chroma-preserving gamut clipping.
//!
//! All hue arguments are the normalized opponent axes `(a, b)` with
//! `a² + b² = 1`.
//!
//! Björn Ottosson, "sRGB gamut clipping"
//! <https://bottosson.github.io/posts/gamutclipping/>

use crate::color::{LinearRgb, Oklab};

/// A point in the lightness/chroma plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lc {
    pub l: f32,
    pub c: f32,
}

/// Slopes of the gamut triangle: `s = C / L` and `t = C / (1 - L)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct St {
    pub s: f32,
    pub t: f32,
}

/// Chroma anchors used by Okhsl at one lightness and hue.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cs {
    pub c_0: f32,
    pub c_mid: f32,
    pub c_max: f32,
}

// Rows of the inverse M1 matrix, shared by the root finders below.
const RED: [f32; 3] = [4.0767416621, -3.3077115913, 0.2309699292];
const GREEN: [f32; 3] = [-1.2684380046, 2.6097574011, -0.3413193965];
const BLUE: [f32; 3] = [-0.0041960863, -0.7034186147, 1.7076147010];

/// Derivatives of the cone responses with respect to chroma along a hue.
#[inline]
fn cone_slopes(a: f32, b: f32) -> [f32; 3] {
    [
        0.3963377774 * a + 0.2158037573 * b,
        -0.1055613458 * a - 0.0638541728 * b,
        -0.0894841775 * a - 1.2914855480 * b,
    ]
}

#[inline]
fn dot(row: [f32; 3], v: [f32; 3]) -> f32 {
    row[0] * v[0] + row[1] * v[1] + row[2] * v[2]
}

/// Maximum saturation `S = C / L` reachable at this hue before one of the
/// linear channels drops below zero.
///
/// A fitted polynomial gives the first estimate, one Halley step refines it.
pub fn compute_max_saturation(a: f32, b: f32) -> f32 {
    // Which channel clips first decides the coefficient set.
    let (k, w) = if -1.88170328 * a - 0.80936493 * b > 1.0 {
        (
            [1.19086277, 1.76576728, 0.59662641, 0.75515197, 0.56771245],
            RED,
        )
    } else if 1.81444104 * a - 1.19445276 * b > 1.0 {
        (
            [0.73956515, -0.45954404, 0.08285427, 0.12541070, 0.14503204],
            GREEN,
        )
    } else {
        (
            [1.35733652, -0.00915799, -1.15130210, -0.50559606, 0.00692167],
            BLUE,
        )
    };

    let mut s = k[0] + k[1] * a + k[2] * b + k[3] * a * a + k[4] * a * b;

    // Error after one step is below 1e-6 except for a few blue hues where
    // dS/dh is nearly unbounded.
    let slopes = cone_slopes(a, b);
    let roots = slopes.map(|slope| 1.0 + s * slope);

    let lms = roots.map(|x| x * x * x);
    let d1 = [0, 1, 2].map(|i| 3.0 * slopes[i] * roots[i] * roots[i]);
    let d2 = [0, 1, 2].map(|i| 6.0 * slopes[i] * slopes[i] * roots[i]);

    let f = dot(w, lms);
    let f1 = dot(w, d1);
    let f2 = dot(w, d2);

    s -= f * f1 / (f1 * f1 - 0.5 * f * f2);
    s
}

/// Lightness and chroma of the cusp for a hue.
pub fn find_cusp(a: f32, b: f32) -> Lc {
    let s_cusp = compute_max_saturation(a, b);

    // Scale L so that the largest channel lands exactly on 1.0
    let rgb = LinearRgb::from(Oklab::new(1.0, s_cusp * a, s_cusp * b));
    let l_cusp = (1.0 / rgb.r.max(rgb.g).max(rgb.b)).cbrt();

    Lc {
        l: l_cusp,
        c: l_cusp * s_cusp,
    }
}

/// Parameter `t` where the line `L = l0 * (1 - t) + t * l1`, `C = t * c1`
/// leaves the gamut.
///
/// Below the cusp the boundary is the straight black-cusp edge. Above it the
/// triangle estimate is refined with one Halley step per channel.
pub fn find_gamut_intersection(a: f32, b: f32, l1: f32, c1: f32, l0: f32, cusp: Lc) -> f32 {
    if (l1 - l0) * cusp.c - (cusp.l - l0) * c1 <= 0.0 {
        return cusp.c * l0 / (c1 * cusp.l + cusp.c * (l0 - l1));
    }

    let mut t = cusp.c * (l0 - 1.0) / (c1 * (cusp.l - 1.0) + cusp.c * (l0 - l1));

    let dl = l1 - l0;
    let dc = c1;
    let slopes = cone_slopes(a, b);
    let dt = slopes.map(|slope| dl + dc * slope);

    let l = l0 * (1.0 - t) + t * l1;
    let c = t * c1;
    let roots = slopes.map(|slope| l + c * slope);

    let lms = roots.map(|x| x * x * x);
    let d1 = [0, 1, 2].map(|i| 3.0 * dt[i] * roots[i] * roots[i]);
    let d2 = [0, 1, 2].map(|i| 6.0 * dt[i] * dt[i] * roots[i]);

    let step = |row: [f32; 3]| {
        let f = dot(row, lms) - 1.0;
        let f1 = dot(row, d1);
        let f2 = dot(row, d2);
        let u = f1 / (f1 * f1 - 0.5 * f * f2);
        // Only channels moving towards the boundary are candidates
        if u >= 0.0 {
            -f * u
        } else {
            f32::MAX
        }
    };

    t += step(RED).min(step(GREEN)).min(step(BLUE));
    t
}

const K_1: f32 = 0.206;
const K_2: f32 = 0.03;
const K_3: f32 = (1.0 + K_1) / (1.0 + K_2);

/// Lightness estimate closer to CIELab L* near black.
#[inline]
pub fn toe(x: f32) -> f32 {
    let y = K_3 * x - K_1;
    0.5 * (y + (y * y + 4.0 * K_2 * K_3 * x).sqrt())
}

#[inline]
pub fn toe_inv(x: f32) -> f32 {
    (x * x + K_1 * x) / (K_3 * (x + K_2))
}

#[inline]
pub fn to_st(cusp: Lc) -> St {
    St {
        s: cusp.c / cusp.l,
        t: cusp.c / (1.0 - cusp.l),
    }
}

/// Smooth approximation of the cusp slopes, kept below the true values.
pub fn get_st_mid(a: f32, b: f32) -> St {
    let s = 0.11516993
        + 1.0
            / (7.44778970
                + 4.15901240 * b
                + a * (-2.19557347
                    + 1.75198401 * b
                    + a * (-2.13704948 - 10.02301043 * b
                        + a * (-4.24894561 + 5.38770819 * b + 4.69891013 * a))));

    let t = 0.11239642
        + 1.0
            / (1.61320320 - 0.68124379 * b
                + a * (0.40370612
                    + 0.90148123 * b
                    + a * (-0.27087943
                        + 0.61223990 * b
                        + a * (0.00299215 - 0.45399568 * b - 0.14661872 * a))));

    St { s, t }
}

/// Chroma anchors for Okhsl at Oklab lightness `l`.
pub fn get_cs(l: f32, a: f32, b: f32) -> Cs {
    let cusp = find_cusp(a, b);

    let c_max = find_gamut_intersection(a, b, l, 1.0, l, cusp);
    let st_max = to_st(cusp);

    // Compensates for the curved upper edge of the gamut
    let k = c_max / (l * st_max.s).min((1.0 - l) * st_max.t);

    // Soft minimum instead of the sharp triangle, for a smooth chroma
    let c_mid = {
        let st_mid = get_st_mid(a, b);
        let c_a = l * st_mid.s;
        let c_b = (1.0 - l) * st_mid.t;
        0.9 * k * (1.0 / (1.0 / c_a.powi(4) + 1.0 / c_b.powi(4))).sqrt().sqrt()
    };

    // Hue independent, roughly the average slopes
    let c_0 = {
        let c_a = l * 0.4;
        let c_b = (1.0 - l) * 0.8;
        (1.0 / (1.0 / (c_a * c_a) + 1.0 / (c_b * c_b))).sqrt()
    };

    Cs { c_0, c_mid, c_max }
}

/// Project an out-of-gamut color onto the gamut boundary, keeping its hue and
/// moving towards the neutral axis at constant (clamped) lightness.
///
/// Colors strictly inside the gamut are returned untouched.
pub fn gamut_clip_preserve_chroma(rgb: LinearRgb) -> LinearRgb {
    if rgb.is_strictly_inside_gamut() {
        return rgb;
    }

    let lab = Oklab::from(rgb);
    let c = lab.chroma().max(1e-5);
    let a = lab.a / c;
    let b = lab.b / c;

    let l0 = lab.l.clamp(0.0, 1.0);
    let cusp = find_cusp(a, b);
    let t = find_gamut_intersection(a, b, lab.l, c, l0, cusp);

    let l = l0 * (1.0 - t) + t * lab.l;
    let c = t * c;
    LinearRgb::from(Oklab::new(l, c * a, c * b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::TAU;

    fn hue(h: f32) -> (f32, f32) {
        ((TAU * h).cos(), (TAU * h).sin())
    }

    #[test]
    fn test_toe_is_inverted_by_toe_inv() {
        for i in 0..=100 {
            let x = i as f32 / 100.0;
            let back = toe_inv(toe(x));
            assert!((back - x).abs() < 1e-5, "toe round trip of {x} gave {back}");
        }
        assert!((toe(1.0) - 1.0).abs() < 1e-6);
        assert!(toe(0.0).abs() < 1e-6);
    }

    #[test]
    fn test_cusp_touches_gamut_boundary() {
        for i in 0..36 {
            let (a, b) = hue(i as f32 / 36.0);
            let cusp = find_cusp(a, b);
            let rgb = LinearRgb::from(Oklab::new(cusp.l, cusp.c * a, cusp.c * b));
            let max = rgb.r.max(rgb.g).max(rgb.b);
            let min = rgb.r.min(rgb.g).min(rgb.b);
            assert!((max - 1.0).abs() < 1e-3, "hue {i}: max channel {max}");
            assert!(min.abs() < 1e-2, "hue {i}: min channel {min}");
        }
    }

    #[test]
    fn test_red_cusp_is_pure_red() {
        let red = Oklab::from(LinearRgb::new(1.0, 0.0, 0.0));
        let c = red.chroma();
        let cusp = find_cusp(red.a / c, red.b / c);
        assert!((cusp.l - red.l).abs() < 2e-3, "cusp L {} vs {}", cusp.l, red.l);
        assert!((cusp.c - c).abs() < 2e-3, "cusp C {} vs {}", cusp.c, c);
    }

    #[test]
    fn test_gamut_intersection_lands_on_boundary() {
        // Horizontal lines towards very high chroma at several lightnesses
        for i in 0..12 {
            let (a, b) = hue(i as f32 / 12.0);
            let cusp = find_cusp(a, b);
            for l in [0.2f32, 0.5, 0.8] {
                let t = find_gamut_intersection(a, b, l, 1.0, l, cusp);
                let rgb = LinearRgb::from(Oklab::new(l, t * a, t * b));
                let max = rgb.r.max(rgb.g).max(rgb.b);
                let min = rgb.r.min(rgb.g).min(rgb.b);
                assert!(
                    (max - 1.0).abs() < 5e-3 || min.abs() < 5e-3,
                    "hue {i}, L {l}: {rgb:?} is not on the boundary"
                );
            }
        }
    }

    #[test]
    fn test_clip_keeps_in_gamut_colors() {
        let rgb = LinearRgb::new(0.2, 0.4, 0.6);
        assert_eq!(gamut_clip_preserve_chroma(rgb), rgb);
    }

    #[test]
    fn test_clip_projects_out_of_gamut_colors() {
        let wild = LinearRgb::new(1.4, -0.2, 0.3);
        let clipped = gamut_clip_preserve_chroma(wild);
        for ch in [clipped.r, clipped.g, clipped.b] {
            assert!((-5e-3..=1.0 + 5e-3).contains(&ch), "{clipped:?} out of gamut");
        }

        // Hue is preserved
        let before = Oklab::from(wild);
        let after = Oklab::from(clipped);
        let h_before = before.b.atan2(before.a);
        let h_after = after.b.atan2(after.a);
        assert!((h_before - h_after).abs() < 1e-2, "{h_before} vs {h_after}");
    }

    #[test]
    fn test_chroma_anchors_are_ordered() {
        for i in 0..24 {
            let (a, b) = hue(i as f32 / 24.0);
            for l in [0.1f32, 0.4, 0.7, 0.95] {
                let cs = get_cs(l, a, b);
                assert!(
                    cs.c_0 > 0.0 && cs.c_mid > 0.0 && cs.c_mid < cs.c_max,
                    "hue {i}, L {l}: {cs:?}"
                );
            }
        }
    }
}
