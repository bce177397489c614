use std::collections::BTreeMap;

use perceptual_color::Oklab;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::distinct_count;
use super::kmeans::{nearest_mean, ClusterModel, KMeans};
use crate::error::ClusterError;
use crate::parallel::map_ordered;

/// WCSS at or below this counts as a perfect fit.
const EXACT_FIT: f64 = 1e-12;

/// Best model for every K of an inclusive range.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusteringSweep {
    models: BTreeMap<usize, ClusterModel>,
}

impl ClusteringSweep {
    /// Fit every K in `min_k..=max_k`, with `max_k` lowered to the number of
    /// distinct samples.
    ///
    /// Each K gets its own seed from `rng`, so K values can be fitted in
    /// parallel. Afterwards costs are made non-increasing in K: a K that came
    /// out worse than K - 1 is re-fitted from the K - 1 means plus the sample
    /// farthest from them.
    pub fn run(
        kmeans: &KMeans,
        samples: &[Oklab],
        min_k: usize,
        max_k: usize,
        trials: usize,
        rng: &mut impl Rng,
    ) -> Result<Self, ClusterError> {
        if samples.is_empty() {
            return Err(ClusterError::NoSamples);
        }
        if min_k == 0 {
            return Err(ClusterError::ZeroK);
        }
        let distinct = distinct_count(samples);
        let max_k = max_k.min(distinct);
        if min_k > max_k {
            return Err(ClusterError::InsufficientDistinct { k: min_k, distinct });
        }

        let jobs: Vec<(usize, u64)> = (min_k..=max_k).map(|k| (k, rng.gen())).collect();
        let fitted = map_ordered(&jobs, |&(k, seed)| -> Result<_, ClusterError> {
            let model = kmeans.cluster(samples, k, trials, &mut StdRng::seed_from_u64(seed))?;
            tracing::debug!(k, wcss = model.wcss(), "Fitted clusters");
            Ok((k, model))
        });

        let mut models = BTreeMap::new();
        let mut previous: Option<ClusterModel> = None;
        for result in fitted {
            let (k, mut model) = result?;
            if let Some(prev) = &previous {
                if model.wcss() > prev.wcss() {
                    if let Some(warm) = warm_start(kmeans, samples, prev) {
                        if warm.wcss() < model.wcss() {
                            tracing::debug!(
                                k,
                                cold = model.wcss(),
                                warm = warm.wcss(),
                                "Replaced fit with warm start"
                            );
                            model = warm;
                        }
                    }
                }
            }
            previous = Some(model.clone());
            models.insert(k, model);
        }

        Ok(Self { models })
    }

    /// Cluster counts, ascending.
    pub fn ks(&self) -> Vec<usize> {
        self.models.keys().copied().collect()
    }

    /// Best WCSS per K, in the order of [`ks`](Self::ks).
    pub fn costs(&self) -> Vec<f64> {
        self.models.values().map(ClusterModel::wcss).collect()
    }

    pub fn model(&self, k: usize) -> Option<&ClusterModel> {
        self.models.get(&k)
    }

    /// Smallest K whose model reproduces every sample exactly.
    pub fn best_exact_fit(&self) -> Option<usize> {
        self.models
            .iter()
            .find(|(_, m)| m.wcss() <= EXACT_FIT)
            .map(|(&k, _)| k)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

/// A K + 1 model built from `previous`: the sample farthest from its mean
/// becomes a cluster of its own, then Lloyd iterations polish the split.
/// Never costs more than `previous`.
fn warm_start(kmeans: &KMeans, samples: &[Oklab], previous: &ClusterModel) -> Option<ClusterModel> {
    let farthest = samples
        .iter()
        .enumerate()
        .map(|(i, s)| (i, nearest_mean(*s, previous.means()).1))
        .fold((0, f32::NEG_INFINITY), |best, cur| {
            if cur.1 > best.1 {
                cur
            } else {
                best
            }
        })
        .0;

    let k = previous.k() + 1;
    let mut assignments = previous.assignments().to_vec();
    assignments[farthest] = k - 1;
    let split = ClusterModel::from_assignments(samples, assignments, k)?;

    match kmeans.refine(samples, split.means()) {
        Some(refined) if refined.wcss() <= split.wcss() => Some(refined),
        _ => Some(split),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scattered(n: usize, seed: u64) -> Vec<Oklab> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..n)
            .map(|_| {
                Oklab::new(
                    rng.gen_range(0.0..1.0),
                    rng.gen_range(-0.3..0.3),
                    rng.gen_range(-0.3..0.3),
                )
            })
            .collect()
    }

    #[test]
    fn test_costs_never_increase_with_k() {
        let samples = scattered(200, 17);
        let sweep = ClusteringSweep::run(
            &KMeans::default(),
            &samples,
            1,
            12,
            1,
            &mut StdRng::seed_from_u64(4),
        )
        .unwrap();

        assert_eq!(sweep.ks(), (1..=12).collect::<Vec<_>>());
        let costs = sweep.costs();
        for pair in costs.windows(2) {
            assert!(pair[1] <= pair[0], "costs increased: {costs:?}");
        }
    }

    #[test]
    fn test_max_k_clamped_to_distinct_samples() {
        let samples = vec![
            Oklab::new(0.2, 0.0, 0.0),
            Oklab::new(0.2, 0.0, 0.0),
            Oklab::new(0.8, 0.0, 0.0),
        ];
        let sweep = ClusteringSweep::run(
            &KMeans::default(),
            &samples,
            1,
            5,
            2,
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap();

        assert_eq!(sweep.ks(), vec![1, 2]);
        assert_eq!(sweep.best_exact_fit(), Some(2));
        assert_eq!(sweep.model(2).map(ClusterModel::k), Some(2));
        assert!(sweep.model(3).is_none());
    }

    #[test]
    fn test_min_k_above_distinct_samples() {
        let samples = vec![Oklab::new(0.5, 0.0, 0.0); 10];
        let result = ClusteringSweep::run(
            &KMeans::default(),
            &samples,
            2,
            4,
            1,
            &mut StdRng::seed_from_u64(0),
        );
        assert_eq!(
            result,
            Err(ClusterError::InsufficientDistinct { k: 2, distinct: 1 })
        );
    }

    #[test]
    fn test_no_exact_fit_for_spread_samples() {
        let samples = scattered(50, 2);
        let sweep = ClusteringSweep::run(
            &KMeans::default(),
            &samples,
            2,
            5,
            2,
            &mut StdRng::seed_from_u64(1),
        )
        .unwrap();
        assert_eq!(sweep.best_exact_fit(), None);
        assert_eq!(sweep.len(), 4);
    }

    #[test]
    fn test_warm_start_splits_farthest_sample() {
        let samples = vec![
            Oklab::new(0.1, 0.0, 0.0),
            Oklab::new(0.12, 0.0, 0.0),
            Oklab::new(0.9, 0.0, 0.0),
        ];
        let one = ClusterModel::from_assignments(&samples, vec![0, 0, 0], 1).unwrap();
        let two = warm_start(&KMeans::default(), &samples, &one).unwrap();

        assert_eq!(two.k(), 2);
        assert_eq!(two.members(1), vec![2]);
        assert!(two.wcss() < one.wcss());
    }
}
