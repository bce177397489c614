use std::path::PathBuf;

use perceptual_color::ParseColorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("min_k must be at least 1, got {0}")]
    MinKTooSmall(usize),

    #[error("max_k ({max_k}) must be greater than min_k ({min_k})")]
    EmptyKRange { min_k: usize, max_k: usize },

    #[error("trials must be at least 1")]
    NoTrials,

    #[error("max_iterations must be at least 1")]
    NoIterations,

    #[error("epsilon must be a positive distance, got {0}")]
    InvalidEpsilon(f32),

    #[error("min_points must be at least 1")]
    NoMinPoints,

    #[error("dedup_threshold must be a non-negative distance, got {0}")]
    InvalidThreshold(f32),

    #[error("max_resolution must be at least 1")]
    ZeroResolution,

    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum ClusterError {
    #[error("no samples to cluster")]
    NoSamples,

    #[error("K must be at least 1")]
    ZeroK,

    #[error("K = {k} exceeds the sample count {samples}")]
    TooManyClusters { k: usize, samples: usize },

    #[error("cannot seed {k} clusters from {distinct} distinct samples")]
    InsufficientDistinct { k: usize, distinct: usize },

    #[error("trials must be at least 1")]
    NoTrials,
}

#[derive(Debug, Error, PartialEq)]
pub enum KneeError {
    #[error("knee detection needs at least 3 points, got {len}")]
    TooFewPoints { len: usize },

    #[error("got {ks} cluster counts but {costs} costs")]
    LengthMismatch { ks: usize, costs: usize },

    #[error("cost curve is flat: {costs:?}")]
    Degenerate { costs: Vec<f64> },

    #[error("cost curve for K = {ks:?} never drops below its chord: {costs:?}")]
    NoBend { ks: Vec<usize>, costs: Vec<f64> },
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Clustering error: {0}")]
    Cluster(#[from] ClusterError),

    #[error("No knee found for K in {min_k}..={max_k}: {source}")]
    Knee {
        min_k: usize,
        max_k: usize,
        #[source]
        source: KneeError,
    },

    #[error("No pixels to analyse")]
    EmptyInput,

    #[error("Density clustering found no cluster among {points} points (epsilon {epsilon}, min_points {min_points})")]
    NoClusters {
        points: usize,
        epsilon: f32,
        min_points: usize,
    },
}

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Pixel count {pixels} does not match {width}x{height}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        pixels: usize,
    },

    #[error("Unsupported PNG layout: {0}")]
    UnsupportedLayout(String),

    #[error("PNG decode error: {0}")]
    PngDecode(#[from] png::DecodingError),

    #[error("Image decode error: {0}")]
    Decode(#[from] image::ImageError),

    #[error("PNG encode error: {0}")]
    PngEncode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PaletteIoError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid palette JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid color {hex:?}: {source}")]
    Color {
        hex: String,
        #[source]
        source: ParseColorError,
    },
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),

    #[error("Video input is not supported: {0}")]
    UnsupportedVideo(PathBuf),

    #[error("Not an image: {0}")]
    NotAnImage(PathBuf),

    #[error("{input} would overwrite the outputs of {first}")]
    OutputCollision { input: PathBuf, first: PathBuf },

    #[error("Image error: {0}")]
    Image(#[from] ImageError),

    #[error("Extraction error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Palette error: {0}")]
    PaletteIo(#[from] PaletteIoError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
