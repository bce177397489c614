use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Palette extraction configuration, usually loaded from a YAML file.
///
/// ```yaml
/// clustering:
///   method: kmeans
///   min_k: 2
///   max_k: 10
///   trials: 3
/// dedup_threshold: 0.1
/// max_resolution: 128
/// seed: 42
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Clustering method and its parameters
    #[serde(default)]
    pub clustering: Clustering,

    /// Minimum Okhsl distance between two palette colors (0 disables)
    #[serde(default = "default_dedup_threshold")]
    pub dedup_threshold: f32,

    /// Longest image side analysed; larger images are downsampled
    #[serde(default = "default_max_resolution")]
    pub max_resolution: u32,

    /// Seconds between sampled video frames
    #[serde(default = "default_frame_interval")]
    pub frame_interval: f32,

    /// Seed for every random choice made during one extraction
    #[serde(default)]
    pub seed: u64,
}

fn default_dedup_threshold() -> f32 {
    0.1
}

fn default_max_resolution() -> u32 {
    128
}

fn default_frame_interval() -> f32 {
    0.5
}

/// Which clustering algorithm produces the candidate colors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "lowercase")]
pub enum Clustering {
    /// K-means over a range of K, with K chosen at the knee of the cost curve
    KMeans(KMeansArgs),
    /// DBSCAN; one representative per dense region
    Density(DensityArgs),
}

impl Default for Clustering {
    fn default() -> Self {
        Clustering::KMeans(KMeansArgs::default())
    }
}

impl Clustering {
    pub fn name(&self) -> &'static str {
        match self {
            Clustering::KMeans(_) => "kmeans",
            Clustering::Density(_) => "density",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KMeansArgs {
    /// Smallest K tried
    #[serde(default = "default_min_k")]
    pub min_k: usize,

    /// Largest K tried (inclusive)
    #[serde(default = "default_max_k")]
    pub max_k: usize,

    /// Independently seeded runs per K; the cheapest is kept
    #[serde(default = "default_trials")]
    pub trials: usize,

    /// Lloyd iteration cap per run
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
}

fn default_min_k() -> usize {
    2
}

fn default_max_k() -> usize {
    10
}

fn default_trials() -> usize {
    3
}

fn default_max_iterations() -> usize {
    100
}

impl Default for KMeansArgs {
    fn default() -> Self {
        Self {
            min_k: default_min_k(),
            max_k: default_max_k(),
            trials: default_trials(),
            max_iterations: default_max_iterations(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityArgs {
    /// Neighbourhood radius as a linear Oklab distance
    #[serde(default = "default_epsilon")]
    pub epsilon: f32,

    /// Neighbours (including the point itself) needed for a core point
    #[serde(default = "default_min_points")]
    pub min_points: usize,
}

fn default_epsilon() -> f32 {
    0.01
}

fn default_min_points() -> usize {
    3
}

impl Default for DensityArgs {
    fn default() -> Self {
        Self {
            epsilon: default_epsilon(),
            min_points: default_min_points(),
        }
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            clustering: Clustering::default(),
            dedup_threshold: default_dedup_threshold(),
            max_resolution: default_max_resolution(),
            frame_interval: default_frame_interval(),
            seed: 0,
        }
    }
}

impl KMeansArgs {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_k == 0 {
            return Err(ConfigError::MinKTooSmall(self.min_k));
        }
        if self.max_k <= self.min_k {
            return Err(ConfigError::EmptyKRange {
                min_k: self.min_k,
                max_k: self.max_k,
            });
        }
        if self.trials == 0 {
            return Err(ConfigError::NoTrials);
        }
        if self.max_iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        Ok(())
    }
}

impl DensityArgs {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.epsilon.is_finite() && self.epsilon > 0.0) {
            return Err(ConfigError::InvalidEpsilon(self.epsilon));
        }
        if self.min_points == 0 {
            return Err(ConfigError::NoMinPoints);
        }
        Ok(())
    }
}

impl ExtractionConfig {
    /// Check every parameter the selected method uses. Runs before any
    /// clustering work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.clustering {
            Clustering::KMeans(args) => args.validate()?,
            Clustering::Density(args) => args.validate()?,
        }
        if !(self.dedup_threshold.is_finite() && self.dedup_threshold >= 0.0) {
            return Err(ConfigError::InvalidThreshold(self.dedup_threshold));
        }
        if self.max_resolution == 0 {
            return Err(ConfigError::ZeroResolution);
        }
        Ok(())
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            method = config.clustering.name(),
            "Loaded configuration"
        );
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
