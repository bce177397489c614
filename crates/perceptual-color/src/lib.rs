// Generated LUT tables and fitted polynomial coefficients
#![allow(clippy::excessive_precision, clippy::manual_range_contains)]

//! perceptual-color: gamut-aware color conversions for palette work
//!
//! This library converts between device sRGB, the perceptually uniform Oklab
//! space and the cylindrical Okhsl/Okhsv spaces, and bundles the three main
//! forms into [`PerceptualColor`].
//!
//! # Conversion Chain
//!
//! ```text
//! Srgb <--gamma LUT--> LinearRgb <--M1, cbrt, M2--> Oklab <--cusp, toe--> Okhsl
//!                                                        <--cusp, toe--> Okhsv
//! ```
//!
//! - sRGB to Oklab is a total function with no failure mode.
//! - Oklab to sRGB is **not** gamut-clamped. Means of clusters and other
//!   synthesized colors can land outside sRGB. [`PerceptualColor::displayable`]
//!   clips them back while preserving hue.
//! - Okhsl and Okhsv are defined relative to the sRGB gamut boundary for each
//!   hue. The boundary's *cusp* (maximum chroma) is found with a polynomial
//!   estimate and one Halley refinement step, see [`gamut`].
//!
//! # Degenerate Colors
//!
//! Colors without measurable chroma have no hue. They are given hue 0 and
//! saturation 0 instead of producing NaN. Oklab lightness at or beyond the
//! black and white ends maps to Okhsl lightness 0 and 1.
//!
//! # Accuracy
//!
//! Round trips sRGB → Oklab → sRGB and sRGB → Oklab → Okhsl → Oklab → sRGB
//! reproduce the input within 1e-3 per channel for every in-gamut color.

pub mod color;
mod error;
pub mod gamut;
mod perceptual;

pub use color::{LinearRgb, Okhsl, Okhsv, Oklab, Srgb};
pub use error::ParseColorError;
pub use perceptual::PerceptualColor;
