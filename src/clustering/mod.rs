//! Clustering of Oklab samples into candidate palette colors.
//!
//! - [`KMeans`] fits a fixed number of clusters, [`ClusteringSweep`] fits a
//!   whole range of K and [`select_knee`] picks the K worth keeping.
//! - [`Dbscan`] finds dense regions without a preset count.

mod dbscan;
mod kmeans;
mod knee;
mod sweep;

use std::collections::HashSet;

use perceptual_color::Oklab;

pub use dbscan::{Dbscan, DensityClustering, PointLabel};
pub use kmeans::{ClusterModel, KMeans};
pub use knee::select_knee;
pub use sweep::ClusteringSweep;

/// Number of bitwise-distinct samples. K cannot exceed it.
pub fn distinct_count(samples: &[Oklab]) -> usize {
    samples
        .iter()
        .map(|s| s.to_array().map(f32::to_bits))
        .collect::<HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_count() {
        let samples = [
            Oklab::new(0.5, 0.1, 0.0),
            Oklab::new(0.5, 0.1, 0.0),
            Oklab::new(0.2, 0.0, 0.0),
        ];
        assert_eq!(distinct_count(&samples), 2);
        assert_eq!(distinct_count(&[]), 0);
    }
}
