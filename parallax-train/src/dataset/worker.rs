//! Worker partitioning and per-pass shuffling
//!
//! Parallel data-loading workers statically own disjoint chunk subsets via
//! position-modulo assignment; no chunk is read by two workers and no
//! locking is involved. Partitioning happens on the collected order, before
//! each worker's own shuffle, so different per-worker shuffles cannot break
//! disjointness.

use std::path::PathBuf;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;

/// Identity of one data-loading worker within a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkerInfo {
    /// Zero-based worker id, `id < count`.
    pub id: usize,
    /// Total workers pulling from the dataset.
    pub count: usize,
}

impl WorkerInfo {
    /// The single-worker pool: every chunk is assigned to this worker.
    pub fn single() -> Self {
        Self { id: 0, count: 1 }
    }
}

impl Default for WorkerInfo {
    fn default() -> Self {
        Self::single()
    }
}

/// The subset of chunks owned by `worker`, by position modulo.
pub fn partition_chunks(chunks: &[PathBuf], worker: WorkerInfo) -> Vec<PathBuf> {
    debug_assert!(worker.count > 0 && worker.id < worker.count);
    chunks
        .iter()
        .enumerate()
        .filter(|(i, _)| i % worker.count == worker.id)
        .map(|(_, chunk)| chunk.clone())
        .collect()
}

/// Shuffle a chunk list in place with the pass-local RNG.
pub fn shuffle_chunks(chunks: &mut [PathBuf], rng: &mut StdRng) {
    chunks.shuffle(rng);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn chunk_list(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("{i:03}.zst"))).collect()
    }

    #[test]
    fn test_partition_complete_and_disjoint() {
        let chunks = chunk_list(13);
        let workers = 4;

        let mut seen = HashSet::new();
        let mut total = 0;
        for id in 0..workers {
            let part = partition_chunks(&chunks, WorkerInfo { id, count: workers });
            total += part.len();
            for chunk in part {
                assert!(seen.insert(chunk), "chunk assigned twice");
            }
        }
        assert_eq!(total, chunks.len());
        assert_eq!(seen.len(), chunks.len());
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let chunks = chunk_list(5);
        let part = partition_chunks(&chunks, WorkerInfo::single());
        assert_eq!(part, chunks);
    }

    #[test]
    fn test_shuffle_is_seed_deterministic() {
        let mut a = chunk_list(20);
        let mut b = chunk_list(20);
        shuffle_chunks(&mut a, &mut StdRng::seed_from_u64(7));
        shuffle_chunks(&mut b, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);

        let mut c = chunk_list(20);
        shuffle_chunks(&mut c, &mut StdRng::seed_from_u64(8));
        assert_ne!(a, c);
    }
}
