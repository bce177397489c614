//! Test fixtures: pixel grids, configurations and PNG files on disk.

use std::path::{Path, PathBuf};

use okpalette::models::{Clustering, DensityArgs, ExtractionConfig, KMeansArgs, PixelGrid};
use okpalette::perceptual_color::Srgb;
use okpalette::services::image_io::write_png;

/// Named sRGB colors used across tests
pub mod colors {
    pub const RED: [u8; 3] = [255, 0, 0];
    pub const BLUE: [u8; 3] = [0, 0, 255];
    pub const GREEN: [u8; 3] = [0, 170, 0];
    pub const YELLOW: [u8; 3] = [240, 220, 40];
    pub const WHITE: [u8; 3] = [255, 255, 255];
}

/// Grid filled with `bands` horizontal stripes of equal height.
pub fn striped_grid(width: u32, height: u32, bands: &[[u8; 3]]) -> PixelGrid {
    let band_height = height.div_ceil(bands.len() as u32).max(1);
    let pixels = (0..height)
        .flat_map(|y| {
            let band = bands[((y / band_height) as usize).min(bands.len() - 1)];
            (0..width).map(move |_| Srgb::from_bytes(band))
        })
        .collect();
    PixelGrid::new(width, height, pixels).unwrap()
}

/// The 2x2 grid {red, red, blue, blue}.
pub fn red_blue_grid() -> PixelGrid {
    striped_grid(2, 2, &[colors::RED, colors::BLUE])
}

/// Bands of `base` colors with a small deterministic ripple, so no K fits
/// exactly and the knee has to be found.
pub fn noisy_bands(width: u32, height: u32, bands: &[[u8; 3]]) -> PixelGrid {
    let band_height = height.div_ceil(bands.len() as u32).max(1);
    let mut pixels = Vec::with_capacity((width * height) as usize);
    for y in 0..height {
        let band = bands[((y / band_height) as usize).min(bands.len() - 1)];
        for x in 0..width {
            let ripple = ((x * 7 + y * 13) % 9) as i16 - 4;
            let channel = |c: u8| (c as i16 + ripple).clamp(0, 255) as u8;
            pixels.push(Srgb::from_u8(
                channel(band[0]),
                channel(band[1]),
                channel(band[2]),
            ));
        }
    }
    PixelGrid::new(width, height, pixels).unwrap()
}

pub fn kmeans_config(min_k: usize, max_k: usize, threshold: f32) -> ExtractionConfig {
    ExtractionConfig {
        clustering: Clustering::KMeans(KMeansArgs {
            min_k,
            max_k,
            ..Default::default()
        }),
        dedup_threshold: threshold,
        ..Default::default()
    }
}

pub fn density_config(epsilon: f32, min_points: usize, threshold: f32) -> ExtractionConfig {
    ExtractionConfig {
        clustering: Clustering::Density(DensityArgs {
            epsilon,
            min_points,
        }),
        dedup_threshold: threshold,
        ..Default::default()
    }
}

/// Write `grid` as `<dir>/<name>` and return the path.
pub fn write_png_file(dir: &Path, name: &str, grid: &PixelGrid) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    write_png(grid, &path).unwrap();
    path
}
