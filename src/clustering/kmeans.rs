use perceptual_color::Oklab;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::distinct_count;
use crate::error::ClusterError;
use crate::parallel::map_ordered;

/// One fitted partition of the samples into K clusters.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterModel {
    means: Vec<Oklab>,
    assignments: Vec<usize>,
    wcss: f64,
}

impl ClusterModel {
    /// Build a model from a complete assignment. Means are the cluster
    /// centroids. Returns `None` if any of the `k` clusters has no member.
    pub(crate) fn from_assignments(
        samples: &[Oklab],
        assignments: Vec<usize>,
        k: usize,
    ) -> Option<Self> {
        let means = centroids(samples, &assignments, k)?;
        let wcss = wcss(samples, &assignments, &means);
        Some(Self {
            means,
            assignments,
            wcss,
        })
    }

    pub fn k(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[Oklab] {
        &self.means
    }

    /// Cluster id of every sample, in sample order.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Within-cluster sum of squared Oklab distances.
    pub fn wcss(&self) -> f64 {
        self.wcss
    }

    /// Member count of every cluster.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.k()];
        for &a in &self.assignments {
            counts[a] += 1;
        }
        counts
    }

    /// Indices of the samples assigned to `cluster`.
    pub fn members(&self, cluster: usize) -> Vec<usize> {
        self.assignments
            .iter()
            .enumerate()
            .filter(|&(_, &a)| a == cluster)
            .map(|(i, _)| i)
            .collect()
    }
}

/// Lloyd's algorithm with k-means++ seeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    max_iterations: usize,
}

impl Default for KMeans {
    fn default() -> Self {
        Self::new(100)
    }
}

impl KMeans {
    pub fn new(max_iterations: usize) -> Self {
        Self {
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Best of `trials` independently seeded runs for a fixed `k`.
    ///
    /// Every trial gets its own seed drawn from `rng` before any trial runs,
    /// so the result is the same whether trials run serially or in
    /// parallel. The cheapest trial wins; equal costs go to the earlier one.
    pub fn cluster(
        &self,
        samples: &[Oklab],
        k: usize,
        trials: usize,
        rng: &mut impl Rng,
    ) -> Result<ClusterModel, ClusterError> {
        if samples.is_empty() {
            return Err(ClusterError::NoSamples);
        }
        if k == 0 {
            return Err(ClusterError::ZeroK);
        }
        if k > samples.len() {
            return Err(ClusterError::TooManyClusters {
                k,
                samples: samples.len(),
            });
        }
        if trials == 0 {
            return Err(ClusterError::NoTrials);
        }

        let seeds: Vec<u64> = (0..trials).map(|_| rng.gen()).collect();
        let results = map_ordered(&seeds, |&seed| {
            self.run_trial(samples, k, &mut StdRng::seed_from_u64(seed))
        });

        let mut best: Option<ClusterModel> = None;
        for result in results {
            let model = result?;
            if best.as_ref().map_or(true, |b| model.wcss < b.wcss) {
                best = Some(model);
            }
        }
        best.ok_or(ClusterError::NoTrials)
    }

    /// Lloyd iterations starting from the given means.
    ///
    /// Returns `None` when the first assignment already leaves one of the
    /// means without samples.
    pub fn refine(&self, samples: &[Oklab], initial_means: &[Oklab]) -> Option<ClusterModel> {
        let k = initial_means.len();
        if k == 0 || samples.is_empty() {
            return None;
        }
        let assignments = assign(samples, initial_means);
        if has_empty_cluster(&assignments, k) {
            return None;
        }
        Some(self.iterate(samples, assignments, k))
    }

    fn run_trial(
        &self,
        samples: &[Oklab],
        k: usize,
        rng: &mut StdRng,
    ) -> Result<ClusterModel, ClusterError> {
        let seeds = plus_plus_seeds(samples, k, rng)?;
        self.refine(samples, &seeds)
            .ok_or_else(|| ClusterError::InsufficientDistinct {
                k,
                distinct: distinct_count(samples),
            })
    }

    /// Alternate centroid update and reassignment until nothing moves, a
    /// proposal would empty a cluster, or the iteration cap is hit.
    fn iterate(&self, samples: &[Oklab], mut assignments: Vec<usize>, k: usize) -> ClusterModel {
        for _ in 0..self.max_iterations {
            let Some(means) = centroids(samples, &assignments, k) else {
                break;
            };
            let proposed = assign(samples, &means);
            if proposed == assignments || has_empty_cluster(&proposed, k) {
                break;
            }
            assignments = proposed;
        }

        // `assignments` never has an empty cluster here, so the centroids exist
        let means = centroids(samples, &assignments, k).unwrap_or_default();
        let wcss = wcss(samples, &assignments, &means);
        ClusterModel {
            means,
            assignments,
            wcss,
        }
    }
}

/// k-means++: the first mean uniformly, every further mean with
/// probability proportional to its squared distance from the nearest
/// mean chosen so far.
fn plus_plus_seeds(
    samples: &[Oklab],
    k: usize,
    rng: &mut impl Rng,
) -> Result<Vec<Oklab>, ClusterError> {
    let mut means = Vec::with_capacity(k);
    means.push(samples[rng.gen_range(0..samples.len())]);

    let mut nearest: Vec<f64> = samples
        .iter()
        .map(|s| s.distance_squared(means[0]) as f64)
        .collect();

    while means.len() < k {
        let insufficient = || ClusterError::InsufficientDistinct {
            k,
            distinct: distinct_count(samples),
        };
        let wheel = WeightedIndex::new(&nearest).map_err(|_| insufficient())?;
        let chosen = samples[wheel.sample(rng)];
        means.push(chosen);

        for (d, s) in nearest.iter_mut().zip(samples) {
            *d = d.min(s.distance_squared(chosen) as f64);
        }
    }

    Ok(means)
}

/// Index of the nearest mean; the lower index wins ties.
pub(crate) fn nearest_mean(sample: Oklab, means: &[Oklab]) -> (usize, f32) {
    let mut best = (0, f32::INFINITY);
    for (i, m) in means.iter().enumerate() {
        let d = sample.distance_squared(*m);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

fn assign(samples: &[Oklab], means: &[Oklab]) -> Vec<usize> {
    samples.iter().map(|s| nearest_mean(*s, means).0).collect()
}

fn has_empty_cluster(assignments: &[usize], k: usize) -> bool {
    let mut seen = vec![false; k];
    for &a in assignments {
        seen[a] = true;
    }
    seen.contains(&false)
}

fn centroids(samples: &[Oklab], assignments: &[usize], k: usize) -> Option<Vec<Oklab>> {
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    for (s, &a) in samples.iter().zip(assignments) {
        sums[a][0] += s.l as f64;
        sums[a][1] += s.a as f64;
        sums[a][2] += s.b as f64;
        counts[a] += 1;
    }

    sums.iter()
        .zip(&counts)
        .map(|(sum, &n)| {
            (n > 0).then(|| {
                let n = n as f64;
                Oklab::new(
                    (sum[0] / n) as f32,
                    (sum[1] / n) as f32,
                    (sum[2] / n) as f32,
                )
            })
        })
        .collect()
}

fn wcss(samples: &[Oklab], assignments: &[usize], means: &[Oklab]) -> f64 {
    samples
        .iter()
        .zip(assignments)
        .map(|(s, &a)| s.distance_squared(means[a]) as f64)
        .sum()
}
