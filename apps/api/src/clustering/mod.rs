// Batch clustering: skill matrix -> k-way partition -> career label per cluster.
// The partitioner sits behind a trait so tests can substitute a deterministic one.

pub mod clusterer;
pub mod labeler;
pub mod matrix;
pub mod partition;
