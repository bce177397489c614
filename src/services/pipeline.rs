use std::collections::HashSet;

use perceptual_color::{LinearRgb, Oklab, PerceptualColor, Srgb};
use rand::rngs::StdRng;
use rand::SeedableRng;

use super::dedup::PaletteDeduplicator;
use crate::clustering::{distinct_count, select_knee, ClusteringSweep, Dbscan, KMeans};
use crate::error::ExtractError;
use crate::models::{Clustering, DensityArgs, ExtractionConfig, KMeansArgs, Palette, PixelGrid};

/// Outcome of one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Final colors after deduplication
    pub palette: Palette,
    /// K chosen by model selection (k-means only)
    pub chosen_k: Option<usize>,
    /// Candidate colors before deduplication
    pub cluster_count: usize,
    /// `(K, WCSS)` for every K fitted (k-means only)
    pub sweep_costs: Vec<(usize, f64)>,
    /// Samples analysed after downsampling
    pub samples: usize,
}

/// Turns pixels into a palette: convert to Oklab, cluster, pick the
/// candidates, deduplicate.
///
/// Every random choice draws from one generator seeded with
/// `config.seed`, so equal inputs give equal palettes.
#[derive(Debug, Clone)]
pub struct PaletteExtractionPipeline {
    config: ExtractionConfig,
}

impl PaletteExtractionPipeline {
    /// Validates the configuration up front.
    pub fn new(config: ExtractionConfig) -> Result<Self, ExtractError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Extract from an image, downsampled to `max_resolution` first.
    pub fn extract(&self, grid: &PixelGrid) -> Result<Extraction, ExtractError> {
        if grid.is_empty() {
            return Err(ExtractError::EmptyInput);
        }
        let analysed = grid.downsample(self.config.max_resolution);
        self.extract_samples(analysed.pixels())
    }

    /// Extract from an already sampled list of colors, e.g. video frames.
    pub fn extract_samples(&self, samples: &[Srgb]) -> Result<Extraction, ExtractError> {
        if samples.is_empty() {
            return Err(ExtractError::EmptyInput);
        }
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let lab: Vec<Oklab> = samples
            .iter()
            .map(|&s| Oklab::from(LinearRgb::from(s)))
            .collect();

        let (candidates, chosen_k, sweep_costs) = match &self.config.clustering {
            Clustering::KMeans(args) => kmeans_candidates(args, samples, &lab, &mut rng)?,
            Clustering::Density(args) => (density_candidates(args, samples, &lab)?, None, vec![]),
        };

        let colors = PaletteDeduplicator::new(self.config.dedup_threshold)
            .filter(&candidates, &mut rng);

        tracing::info!(
            method = self.config.clustering.name(),
            samples = samples.len(),
            chosen_k = ?chosen_k,
            candidates = candidates.len(),
            colors = colors.len(),
            "Extracted palette"
        );

        Ok(Extraction {
            palette: Palette::new(colors),
            chosen_k,
            cluster_count: candidates.len(),
            sweep_costs,
            samples: samples.len(),
        })
    }
}

type KMeansOutcome = (Vec<PerceptualColor>, Option<usize>, Vec<(usize, f64)>);

fn kmeans_candidates(
    args: &KMeansArgs,
    samples: &[Srgb],
    lab: &[Oklab],
    rng: &mut StdRng,
) -> Result<KMeansOutcome, ExtractError> {
    let distinct = distinct_count(lab);
    if distinct < args.min_k {
        // Nothing to choose: every distinct color is a cluster of its own
        tracing::debug!(distinct, min_k = args.min_k, "Fewer colors than clusters");
        return Ok((distinct_colors(samples), Some(distinct), vec![]));
    }

    let kmeans = KMeans::new(args.max_iterations);
    let sweep = ClusteringSweep::run(&kmeans, lab, args.min_k, args.max_k, args.trials, rng)?;
    let (ks, costs) = (sweep.ks(), sweep.costs());

    // A perfect fit leaves no curve to bend
    let k = match sweep.best_exact_fit() {
        Some(k) => k,
        None => select_knee(&ks, &costs).map_err(|source| ExtractError::Knee {
            min_k: args.min_k,
            max_k: args.max_k,
            source,
        })?,
    };

    // `k` was taken from the sweep itself
    let colors: Vec<PerceptualColor> = sweep
        .model(k)
        .map(|model| model.means().iter().map(|&mean| mean_color(mean)).collect())
        .unwrap_or_default();

    Ok((colors, Some(k), ks.into_iter().zip(costs).collect()))
}

/// A cluster mean as a palette color. Means of in-gamut samples can fall
/// outside the gamut, so they are clipped to the color that will be shown.
fn mean_color(mean: Oklab) -> PerceptualColor {
    PerceptualColor::from_oklab_clipped(mean)
}

fn density_candidates(
    args: &DensityArgs,
    samples: &[Srgb],
    lab: &[Oklab],
) -> Result<Vec<PerceptualColor>, ExtractError> {
    let points: Vec<[f32; 3]> = lab.iter().map(|l| l.to_array()).collect();
    let clustering = Dbscan::new(args.epsilon, args.min_points).cluster(&points);
    if clustering.cluster_count() == 0 {
        return Err(ExtractError::NoClusters {
            points: points.len(),
            epsilon: args.epsilon,
            min_points: args.min_points,
        });
    }

    Ok(clustering
        .representatives(&points)
        .into_iter()
        .map(|i| PerceptualColor::from_srgb(samples[i]))
        .collect())
}

/// Bitwise-distinct colors in first-seen order.
fn distinct_colors(samples: &[Srgb]) -> Vec<PerceptualColor> {
    let mut seen = HashSet::new();
    samples
        .iter()
        .filter(|s| seen.insert([s.r, s.g, s.b].map(f32::to_bits)))
        .map(|&s| PerceptualColor::from_srgb(s))
        .collect()
}

/// Extract a palette from an image with a one-off pipeline.
pub fn extract_palette(grid: &PixelGrid, config: &ExtractionConfig) -> Result<Palette, ExtractError> {
    let pipeline = PaletteExtractionPipeline::new(config.clone())?;
    Ok(pipeline.extract(grid)?.palette)
}

/// Extract a palette from pre-sampled colors with a one-off pipeline.
pub fn extract_palette_from_samples(
    samples: &[Srgb],
    config: &ExtractionConfig,
) -> Result<Palette, ExtractError> {
    let pipeline = PaletteExtractionPipeline::new(config.clone())?;
    Ok(pipeline.extract_samples(samples)?.palette)
}
