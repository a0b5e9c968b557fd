//! Point-partitioning seam. The clusterer hands over points and `k`, and gets back
//! one group id per point.

use linfa::dataset::AsTargets;
use linfa::traits::{Fit, Predict};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::Array2;
use rand_xoshiro::rand_core::SeedableRng;
use rand_xoshiro::Xoshiro256Plus;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PartitionError {
    #[error("cannot partition {points} points into {k} groups")]
    InvalidGroupCount { points: usize, k: usize },

    #[error("partitioner returned {actual} labels for {expected} points")]
    LabelCount { expected: usize, actual: usize },

    #[error("partitioner returned group {label}, expected fewer than {k}")]
    LabelOutOfRange { label: usize, k: usize },

    #[error("K-Means fit failed: {0}")]
    Fit(String),
}

/// Splits the rows of `points` into `k` groups. Ids must be in `[0, k)`.
/// Same input and seed must give the same output.
pub trait Partitioner: Send + Sync {
    fn partition(&self, points: &Array2<f64>, k: usize, seed: u64)
        -> Result<Vec<usize>, PartitionError>;

    fn name(&self) -> &'static str;
}

/// K-Means with k-means++ initialisation and a seeded RNG.
#[derive(Debug, Clone)]
pub struct KMeansPartitioner {
    pub max_iterations: u64,
    pub tolerance: f64,
    pub n_runs: usize,
}

impl Default for KMeansPartitioner {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-4,
            n_runs: 10,
        }
    }
}

impl Partitioner for KMeansPartitioner {
    fn partition(
        &self,
        points: &Array2<f64>,
        k: usize,
        seed: u64,
    ) -> Result<Vec<usize>, PartitionError> {
        let n_points = points.nrows();
        if k == 0 || n_points == 0 || k > n_points {
            return Err(PartitionError::InvalidGroupCount { points: n_points, k });
        }
        if k == 1 {
            return Ok(vec![0; n_points]);
        }

        let dataset = DatasetBase::from(points.clone());
        let rng = Xoshiro256Plus::seed_from_u64(seed);

        let model = KMeans::params_with_rng(k, rng)
            .n_runs(self.n_runs)
            .max_n_iterations(self.max_iterations)
            .tolerance(self.tolerance)
            .fit(&dataset)
            .map_err(|e| PartitionError::Fit(format!("{e:?}")))?;

        let predictions = model.predict(&dataset);
        let labels: Vec<usize> = predictions.as_targets().iter().copied().collect();
        Ok(labels)
    }

    fn name(&self) -> &'static str {
        "kmeans"
    }
}

/// Checks a partitioner's answer before anyone indexes with it.
pub(crate) fn validate_labels(
    labels: &[usize],
    expected: usize,
    k: usize,
) -> Result<(), PartitionError> {
    if labels.len() != expected {
        return Err(PartitionError::LabelCount {
            expected,
            actual: labels.len(),
        });
    }
    if let Some(&label) = labels.iter().find(|&&l| l >= k) {
        return Err(PartitionError::LabelOutOfRange { label, k });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn test_separated_groups_are_split() {
        let points = array![
            [1.0, 1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 1.0],
            [0.0, 0.0, 1.0, 1.0],
        ];
        let labels = KMeansPartitioner::default()
            .partition(&points, 2, 42)
            .unwrap();
        assert_eq!(labels.len(), 4);
        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[2], labels[3]);
        assert_ne!(labels[0], labels[2]);
        assert!(labels.iter().all(|&l| l < 2));
    }

    #[test]
    fn test_same_seed_same_labels() {
        let points = array![
            [1.0, 0.0, 0.0],
            [0.0, 1.0, 0.0],
            [0.0, 0.0, 1.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 1.0],
        ];
        let p = KMeansPartitioner::default();
        assert_eq!(
            p.partition(&points, 3, 42).unwrap(),
            p.partition(&points, 3, 42).unwrap()
        );
    }

    #[test]
    fn test_single_group_short_circuits() {
        let points = array![[1.0], [0.0], [1.0]];
        let labels = KMeansPartitioner::default()
            .partition(&points, 1, 42)
            .unwrap();
        assert_eq!(labels, vec![0, 0, 0]);
    }

    #[test]
    fn test_rejects_more_groups_than_points() {
        let points = array![[1.0], [0.0]];
        assert!(matches!(
            KMeansPartitioner::default().partition(&points, 3, 42),
            Err(PartitionError::InvalidGroupCount { points: 2, k: 3 })
        ));
    }

    #[test]
    fn test_validate_labels() {
        assert!(validate_labels(&[0, 1, 1], 3, 2).is_ok());
        assert!(matches!(
            validate_labels(&[0, 1], 3, 2),
            Err(PartitionError::LabelCount { .. })
        ));
        assert!(matches!(
            validate_labels(&[0, 2, 1], 3, 2),
            Err(PartitionError::LabelOutOfRange { label: 2, k: 2 })
        ));
    }
}
