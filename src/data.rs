//! Datasets and mini-batch selection

use crate::error::{Error, Result};
use crate::Tensor;
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::Rng;

/// An in-memory classification dataset: one row per sample
#[derive(Debug, Clone)]
pub struct Dataset {
    inputs: Array2<f32>,
    labels: Array1<usize>,
}

impl Dataset {
    /// Create a dataset; input rows and labels must line up
    pub fn new(inputs: Array2<f32>, labels: Array1<usize>) -> Result<Self> {
        if inputs.nrows() != labels.len() {
            return Err(Error::Shape(format!(
                "{} input rows but {} labels",
                inputs.nrows(),
                labels.len()
            )));
        }
        Ok(Self { inputs, labels })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Select the rows at `indices` into a fresh batch
    pub fn batch(&self, indices: &[usize]) -> Batch {
        let inputs = self.inputs.select(Axis(0), indices);
        let labels = Array1::from_iter(indices.iter().map(|&i| self.labels[i]));
        Batch {
            inputs: Tensor::new(inputs, false),
            labels,
        }
    }

    /// The whole dataset as a single batch (evaluation path)
    pub fn full_batch(&self) -> Batch {
        Batch {
            inputs: Tensor::new(self.inputs.clone(), false),
            labels: self.labels.clone(),
        }
    }
}

/// A mini-batch: input tensor plus the matching labels
pub struct Batch {
    pub inputs: Tensor,
    pub labels: Array1<usize>,
}

impl Batch {
    /// Number of samples in the batch
    pub fn size(&self) -> usize {
        self.labels.len()
    }
}

/// Iterator over index chunks of a fresh random permutation of `0..n`.
///
/// Chunks have `batchsize` elements except the final one, which may be
/// short. Every index appears in exactly one chunk.
pub struct MiniBatches {
    order: Vec<usize>,
    batchsize: usize,
    pos: usize,
}

impl MiniBatches {
    /// Shuffle `0..n` with `rng` and chunk it
    pub fn new<R: Rng + ?Sized>(n: usize, batchsize: usize, rng: &mut R) -> Self {
        let mut order: Vec<usize> = (0..n).collect();
        order.shuffle(rng);
        Self {
            order,
            batchsize: batchsize.max(1),
            pos: 0,
        }
    }

    /// Total number of chunks this iterator will yield
    pub fn num_batches(&self) -> usize {
        self.order.len().div_ceil(self.batchsize)
    }
}

impl Iterator for MiniBatches {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Vec<usize>> {
        if self.pos >= self.order.len() {
            return None;
        }
        let end = (self.pos + self.batchsize).min(self.order.len());
        let chunk = self.order[self.pos..end].to_vec();
        self.pos = end;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dataset_creation() {
        let data = Dataset::new(arr2(&[[1.0, 2.0], [3.0, 4.0]]), arr1(&[0, 1])).unwrap();
        assert_eq!(data.len(), 2);
        assert!(!data.is_empty());
    }

    #[test]
    fn test_dataset_length_mismatch() {
        let result = Dataset::new(arr2(&[[1.0], [2.0]]), arr1(&[0]));
        assert!(matches!(result, Err(crate::Error::Shape(_))));
    }

    #[test]
    fn test_batch_selects_rows() {
        let data = Dataset::new(
            arr2(&[[1.0, 1.0], [2.0, 2.0], [3.0, 3.0]]),
            arr1(&[0, 1, 2]),
        )
        .unwrap();

        let batch = data.batch(&[2, 0]);
        assert_eq!(batch.size(), 2);
        assert_eq!(batch.inputs.data()[[0, 0]], 3.0);
        assert_eq!(batch.inputs.data()[[1, 0]], 1.0);
        assert_eq!(batch.labels[0], 2);
        assert_eq!(batch.labels[1], 0);
    }

    #[test]
    fn test_full_batch() {
        let data = Dataset::new(arr2(&[[1.0], [2.0]]), arr1(&[0, 1])).unwrap();
        let batch = data.full_batch();
        assert_eq!(batch.size(), 2);
    }

    #[test]
    fn test_minibatches_cover_every_index_once() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen: Vec<usize> = MiniBatches::new(10, 3, &mut rng).flatten().collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_minibatches_chunk_sizes() {
        let mut rng = StdRng::seed_from_u64(1);
        let sizes: Vec<usize> = MiniBatches::new(10, 3, &mut rng).map(|c| c.len()).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
    }

    #[test]
    fn test_minibatches_num_batches() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(MiniBatches::new(10, 3, &mut rng).num_batches(), 4);
        assert_eq!(MiniBatches::new(9, 3, &mut rng).num_batches(), 3);
        assert_eq!(MiniBatches::new(0, 3, &mut rng).num_batches(), 0);
    }

    #[test]
    fn test_minibatches_batchsize_larger_than_n() {
        let mut rng = StdRng::seed_from_u64(7);
        let chunks: Vec<Vec<usize>> = MiniBatches::new(4, 100, &mut rng).collect();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4);
    }

    #[test]
    fn test_minibatches_zero_batchsize_clamped() {
        let mut rng = StdRng::seed_from_u64(7);
        let chunks: Vec<Vec<usize>> = MiniBatches::new(3, 0, &mut rng).collect();
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_minibatches_empty_dataset() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(MiniBatches::new(0, 10, &mut rng).count(), 0);
    }
}
