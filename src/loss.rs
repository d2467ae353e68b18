//! Loss functions

use crate::autograd::{BackwardOp, Tensor};
use ndarray::{Array2, ArrayView1};
use std::cell::RefCell;
use std::rc::Rc;

/// A differentiable loss over a batch of logits and integer class labels.
///
/// Returns a `1 x 1` loss tensor carrying a backward op when the logits
/// require gradients.
pub trait LossFn {
    fn forward(&self, logits: &Tensor, labels: ArrayView1<usize>) -> Tensor;

    /// Name of the loss function
    fn name(&self) -> &str;
}

/// Mean softmax cross-entropy for classification.
///
/// `L = -(1/N) * sum_i log(softmax(logits_i)[label_i])`, with the usual
/// max-shift for numerical stability. The gradient into the logits is
/// `(softmax - onehot) / N`.
pub struct SoftmaxCrossEntropy;

impl SoftmaxCrossEntropy {
    /// Row-wise softmax with max subtraction
    pub(crate) fn softmax_rows(logits: &Array2<f32>) -> Array2<f32> {
        let mut probs = logits.clone();
        for mut row in probs.rows_mut() {
            let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            row.mapv_inplace(|v| (v - max).exp());
            let sum: f32 = row.sum();
            row.mapv_inplace(|v| v / sum);
        }
        probs
    }
}

impl LossFn for SoftmaxCrossEntropy {
    fn forward(&self, logits: &Tensor, labels: ArrayView1<usize>) -> Tensor {
        let data = logits.data();
        assert_eq!(
            data.nrows(),
            labels.len(),
            "Logit rows and labels must have same length"
        );

        let n = data.nrows();
        let probs = Self::softmax_rows(&data);
        drop(data);

        let nll: f32 = labels
            .iter()
            .enumerate()
            .map(|(i, &label)| -(probs[[i, label]] + 1e-10).max(f32::MIN_POSITIVE).ln())
            .sum();
        let mean = nll / n as f32;

        // grad = (probs - onehot) / N
        let mut grad = probs;
        for (i, &label) in labels.iter().enumerate() {
            grad[[i, label]] -= 1.0;
        }
        grad.mapv_inplace(|v| v / n as f32);

        let mut loss = Tensor::new(ndarray::arr2(&[[mean]]), true);

        if logits.requires_grad() {
            loss.set_backward_op(Rc::new(CrossEntropyBackward {
                logits: logits.clone(),
                grad,
                result_grad: loss.grad_cell(),
            }));
        }

        loss
    }

    fn name(&self) -> &'static str {
        "SoftmaxCrossEntropy"
    }
}

struct CrossEntropyBackward {
    logits: Tensor,
    grad: Array2<f32>,
    result_grad: Rc<RefCell<Option<Array2<f32>>>>,
}

impl BackwardOp for CrossEntropyBackward {
    fn backward(&self) {
        if let Some(upstream) = self.result_grad.borrow().as_ref() {
            let scale = upstream[[0, 0]];
            self.logits.accumulate_grad(&self.grad * scale);

            if let Some(op) = self.logits.backward_op() {
                op.backward();
            }
        }
    }
}
