pub mod config;
pub mod image;
pub mod palette;

pub use config::{Clustering, DensityArgs, ExtractionConfig, KMeansArgs};
pub use image::PixelGrid;
pub use palette::{ColorRecord, Palette, PaletteRecord};
