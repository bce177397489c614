//! Gamma transfer functions
//!
//! Inside 0.0..=1.0 the curves are read from tables generated by build.rs
//! and linearly interpolated. Outside that range (unclamped Oklab results)
//! the exact IEC 61966-2-1 formula is evaluated, mirrored for negative input.

include!(concat!(env!("OUT_DIR"), "/gamma_lut.rs"));

const LAST: usize = 4095;

#[inline]
fn interpolate(table: &[f32; 4096], x: f32) -> f32 {
    let scaled = x * LAST as f32;
    let index = scaled as usize;
    if index >= LAST {
        return table[LAST];
    }
    let frac = scaled - index as f32;
    let a = table[index];
    let b = table[index + 1];
    a + (b - a) * frac
}

fn srgb_to_linear_exact(srgb: f32) -> f32 {
    let magnitude = srgb.abs();
    let linear = if magnitude <= 0.04045 {
        magnitude / 12.92
    } else {
        ((magnitude + 0.055) / 1.055).powf(2.4)
    };
    linear.copysign(srgb)
}

fn linear_to_srgb_exact(linear: f32) -> f32 {
    let magnitude = linear.abs();
    let srgb = if magnitude <= 0.0031308 {
        magnitude * 12.92
    } else {
        1.055 * magnitude.powf(1.0 / 2.4) - 0.055
    };
    srgb.copysign(linear)
}

/// Decode an sRGB channel value to linear light.
#[inline]
pub fn srgb_to_linear(srgb: f32) -> f32 {
    if (0.0..=1.0).contains(&srgb) {
        interpolate(&SRGB_TO_LINEAR, srgb)
    } else {
        srgb_to_linear_exact(srgb)
    }
}

/// Encode a linear light channel value to sRGB.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    if (0.0..=1.0).contains(&linear) {
        interpolate(&LINEAR_TO_SRGB, linear)
    } else {
        linear_to_srgb_exact(linear)
    }
}
