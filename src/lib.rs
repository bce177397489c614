//! okpalette - perceptual palette extraction
//!
//! Extracts a small set of perceptually distinct colors from images.
//! Pixels are converted to Oklab, clustered (k-means over a range of K with
//! the knee of the cost curve choosing K, or DBSCAN), and the candidates are
//! thinned out so no two kept colors are closer than a threshold in Okhsl.
//!
//! ```no_run
//! use okpalette::models::ExtractionConfig;
//! use okpalette::services::{extract_palette, image_io};
//!
//! let grid = image_io::load_png("photo.png".as_ref())?;
//! let palette = extract_palette(&grid, &ExtractionConfig::default())?;
//! for color in &palette {
//!     println!("{color}");
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod clustering;
pub mod error;
pub mod models;
mod parallel;
pub mod services;

pub use perceptual_color;
