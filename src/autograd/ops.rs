//! Differentiable operations: affine, relu

use super::{BackwardOp, Tensor};
use ndarray::{Array2, Axis};
use std::cell::RefCell;
use std::rc::Rc;

/// Affine transform `x W + b`.
///
/// `x` is `N x I`, `w` is `I x O`, `b` is a `1 x O` row broadcast over the
/// batch.
pub fn affine(x: &Tensor, w: &Tensor, b: &Tensor) -> Tensor {
    let data = x.data().dot(&*w.data()) + &*b.data();
    let requires_grad = x.requires_grad() || w.requires_grad() || b.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(AffineBackward {
            x: x.clone(),
            w: w.clone(),
            b: b.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct AffineBackward {
    x: Tensor,
    w: Tensor,
    b: Tensor,
    result_grad: Rc<RefCell<Option<Array2<f32>>>>,
}

impl BackwardOp for AffineBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                // dL/dx = g W^T
                let grad_x = grad.dot(&self.w.data().t());
                self.x.accumulate_grad(grad_x);
            }
            if self.w.requires_grad() {
                // dL/dW = x^T g
                let grad_w = self.x.data().t().dot(grad);
                self.w.accumulate_grad(grad_w);
            }
            if self.b.requires_grad() {
                // dL/db = column sums of g
                let grad_b = grad.sum_axis(Axis(0)).insert_axis(Axis(0));
                self.b.accumulate_grad(grad_b);
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
            if let Some(op) = self.w.backward_op() {
                op.backward();
            }
            if let Some(op) = self.b.backward_op() {
                op.backward();
            }
        }
    }
}

/// Rectified linear unit, elementwise `max(0, x)`
pub fn relu(x: &Tensor) -> Tensor {
    let data = x.data().mapv(|v| v.max(0.0));
    let requires_grad = x.requires_grad();

    let mut result = Tensor::new(data, requires_grad);

    if requires_grad {
        result.set_backward_op(Rc::new(ReluBackward {
            x: x.clone(),
            result_grad: result.grad_cell(),
        }));
    }

    result
}

struct ReluBackward {
    x: Tensor,
    result_grad: Rc<RefCell<Option<Array2<f32>>>>,
}

impl BackwardOp for ReluBackward {
    fn backward(&self) {
        if let Some(grad) = self.result_grad.borrow().as_ref() {
            if self.x.requires_grad() {
                // dL/dx = g where x > 0, else 0
                let mask = self.x.data().mapv(|v| if v > 0.0 { 1.0 } else { 0.0 });
                self.x.accumulate_grad(grad * &mask);
            }

            if let Some(op) = self.x.backward_op() {
                op.backward();
            }
        }
    }
}
