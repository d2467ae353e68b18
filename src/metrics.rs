//! Evaluation metrics

use crate::Tensor;
use ndarray::ArrayView1;

/// Trait for evaluation metrics over logits and integer labels
pub trait Metric {
    /// Compute the metric for a batch
    fn compute(&self, logits: &Tensor, labels: ArrayView1<usize>) -> f32;

    /// Name of the metric
    fn name(&self) -> &str;

    /// Whether higher values are better
    fn higher_is_better(&self) -> bool {
        true
    }
}

/// Classification accuracy: fraction of rows whose argmax matches the label
#[derive(Debug, Clone, Copy, Default)]
pub struct Accuracy;

impl Accuracy {
    fn argmax(row: ArrayView1<f32>) -> usize {
        let mut best = 0;
        let mut best_val = f32::NEG_INFINITY;
        for (i, &v) in row.iter().enumerate() {
            if v > best_val {
                best_val = v;
                best = i;
            }
        }
        best
    }
}

impl Metric for Accuracy {
    fn compute(&self, logits: &Tensor, labels: ArrayView1<usize>) -> f32 {
        let data = logits.data();
        assert_eq!(
            data.nrows(),
            labels.len(),
            "Logit rows and labels must have same length"
        );

        if labels.is_empty() {
            return 0.0;
        }

        let correct = data
            .rows()
            .into_iter()
            .zip(labels.iter())
            .filter(|(row, label)| Self::argmax(row.view()) == **label)
            .count();

        correct as f32 / labels.len() as f32
    }

    fn name(&self) -> &'static str {
        "Accuracy"
    }
}
