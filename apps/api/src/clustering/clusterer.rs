use std::collections::HashMap;
use std::sync::Arc;

use ndarray::{Array2, Axis};
use tracing::{debug, info};

use crate::clustering::matrix::SkillMatrix;
use crate::clustering::partition::{validate_labels, PartitionError, Partitioner};

/// Cluster id per matrix row, plus the fixed `k` for the batch. Ids are in `[0, k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterAssignment {
    pub k: usize,
    pub labels: Vec<usize>,
}

impl ClusterAssignment {
    pub fn members(&self, cluster_id: usize) -> impl Iterator<Item = usize> + '_ {
        self.labels
            .iter()
            .enumerate()
            .filter(move |(_, &label)| label == cluster_id)
            .map(|(row, _)| row)
    }
}

/// Groups resume rows into at most `max_clusters` career buckets.
///
/// - `k = min(max_clusters, rows)`, computed once per batch
/// - a matrix with no columns puts every row in cluster 0 with `k = 1`
/// - identical rows are partitioned once, so they always share a cluster and the
///   partitioner never sees more groups than distinct points
#[derive(Clone)]
pub struct ResumeClusterer {
    partitioner: Arc<dyn Partitioner>,
    max_clusters: usize,
    seed: u64,
}

impl ResumeClusterer {
    pub fn new(partitioner: Arc<dyn Partitioner>, max_clusters: usize, seed: u64) -> Self {
        Self {
            partitioner,
            max_clusters: max_clusters.max(1),
            seed,
        }
    }

    pub fn cluster_count(&self, documents: usize) -> usize {
        self.max_clusters.min(documents)
    }

    pub fn cluster(&self, matrix: &SkillMatrix) -> Result<ClusterAssignment, PartitionError> {
        let rows = matrix.n_rows();
        if rows == 0 {
            return Err(PartitionError::InvalidGroupCount { points: 0, k: 0 });
        }

        if matrix.is_degenerate() {
            info!(rows, "no skills in batch; assigning every resume to one cluster");
            return Ok(ClusterAssignment {
                k: 1,
                labels: vec![0; rows],
            });
        }

        let k = self.cluster_count(rows);
        let (distinct, row_to_distinct) = distinct_rows(matrix);
        let effective_k = k.min(distinct.nrows());

        let distinct_labels = self
            .partitioner
            .partition(&distinct, effective_k, self.seed)?;
        validate_labels(&distinct_labels, distinct.nrows(), effective_k)?;

        let labels: Vec<usize> = row_to_distinct
            .iter()
            .map(|&d| distinct_labels[d])
            .collect();

        debug!(
            rows,
            k,
            distinct = distinct.nrows(),
            partitioner = self.partitioner.name(),
            "clustered resumes"
        );
        Ok(ClusterAssignment { k, labels })
    }
}

/// Unique rows of the matrix (first-seen order) and, per original row, its unique-row index.
fn distinct_rows(matrix: &SkillMatrix) -> (Array2<f64>, Vec<usize>) {
    let mut seen: HashMap<Vec<u8>, usize> = HashMap::new();
    let mut order: Vec<usize> = Vec::new();
    let mut row_to_distinct = Vec::with_capacity(matrix.n_rows());

    for (row_idx, row) in matrix.cells.axis_iter(Axis(0)).enumerate() {
        let key = row.to_vec();
        let next = seen.len();
        let id = *seen.entry(key).or_insert_with(|| {
            order.push(row_idx);
            next
        });
        row_to_distinct.push(id);
    }

    let points = matrix.to_f64().select(Axis(0), &order);
    (points, row_to_distinct)
}
