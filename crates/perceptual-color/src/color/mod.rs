//! Color types and conversions
//!
//! - [`Srgb`]: gamma-encoded device color, used for I/O
//! - [`LinearRgb`]: linear light, used for averaging and as the Oklab input
//! - [`Oklab`]: perceptually uniform, used for clustering
//! - [`Okhsl`] / [`Okhsv`]: gamut-relative cylindrical forms, used for
//!   perceptual distance and display
//!
//! ```
//! use perceptual_color::{LinearRgb, Okhsl, Oklab, Srgb};
//!
//! let srgb = Srgb::from_u8(200, 80, 40);
//! let lab = Oklab::from(LinearRgb::from(srgb));
//! let hsl = Okhsl::from(lab);
//! let back = Srgb::from(LinearRgb::from(Oklab::from(hsl)));
//! assert!(srgb.max_channel_difference(back) < 1e-3);
//! ```

mod linear_rgb;
mod lut;
mod okhsl;
mod okhsv;
mod oklab;
mod srgb;

pub use linear_rgb::LinearRgb;
pub use okhsl::Okhsl;
pub use okhsv::Okhsv;
pub use oklab::Oklab;
pub use srgb::Srgb;
