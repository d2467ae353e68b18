//! Differentiable 2-D tensor

use super::BackwardOp;
use ndarray::Array2;
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

/// A 2-D `f32` tensor with shared data and an optional gradient.
///
/// Rows are samples, columns are features. Cloning a `Tensor` is cheap and
/// aliases the same data and gradient cells, which is what lets backward
/// objects hold their inputs without copying.
#[derive(Clone)]
pub struct Tensor {
    data: Rc<RefCell<Array2<f32>>>,
    grad: Rc<RefCell<Option<Array2<f32>>>>,
    requires_grad: bool,
    backward_op: Option<Rc<dyn BackwardOp>>,
}

impl Tensor {
    /// Wrap an array as a tensor
    pub fn new(data: Array2<f32>, requires_grad: bool) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
            grad: Rc::new(RefCell::new(None)),
            requires_grad,
            backward_op: None,
        }
    }

    /// Zero-filled tensor of the given `(rows, cols)` shape
    pub fn zeros(shape: (usize, usize), requires_grad: bool) -> Self {
        Self::new(Array2::zeros(shape), requires_grad)
    }

    /// Single-row tensor from a flat vector (handy for biases)
    pub fn from_row(values: Vec<f32>, requires_grad: bool) -> Self {
        let cols = values.len();
        let data = Array2::from_shape_vec((1, cols), values)
            .unwrap_or_else(|_| Array2::zeros((1, cols)));
        Self::new(data, requires_grad)
    }

    /// Borrow the underlying array
    pub fn data(&self) -> Ref<'_, Array2<f32>> {
        self.data.borrow()
    }

    /// Mutably borrow the underlying array
    pub fn data_mut(&self) -> RefMut<'_, Array2<f32>> {
        self.data.borrow_mut()
    }

    /// `(rows, cols)` of the underlying array
    pub fn shape(&self) -> (usize, usize) {
        let d = self.data.borrow();
        (d.nrows(), d.ncols())
    }

    /// Total number of elements
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn requires_grad(&self) -> bool {
        self.requires_grad
    }

    /// Current gradient, if any (cloned out of the cell)
    pub fn grad(&self) -> Option<Array2<f32>> {
        self.grad.borrow().clone()
    }

    /// Shared handle to the gradient cell, for backward objects
    pub fn grad_cell(&self) -> Rc<RefCell<Option<Array2<f32>>>> {
        Rc::clone(&self.grad)
    }

    /// Overwrite the gradient
    pub fn set_grad(&self, grad: Array2<f32>) {
        *self.grad.borrow_mut() = Some(grad);
    }

    /// Add into the gradient, initializing it on first touch
    pub fn accumulate_grad(&self, grad: Array2<f32>) {
        let mut cell = self.grad.borrow_mut();
        match cell.as_mut() {
            Some(existing) => *existing = &*existing + &grad,
            None => *cell = Some(grad),
        }
    }

    /// Clear the gradient
    pub fn zero_grad(&self) {
        *self.grad.borrow_mut() = None;
    }

    /// Backward op recorded for this tensor, if it is an op result
    pub fn backward_op(&self) -> Option<Rc<dyn BackwardOp>> {
        self.backward_op.clone()
    }

    /// Attach the backward op (called by differentiable operations)
    pub fn set_backward_op(&mut self, op: Rc<dyn BackwardOp>) {
        self.backward_op = Some(op);
    }

    /// Same data, cut off from the tape: no gradient, no backward op
    pub fn detach(&self) -> Tensor {
        Tensor {
            data: Rc::clone(&self.data),
            grad: Rc::new(RefCell::new(None)),
            requires_grad: false,
            backward_op: None,
        }
    }
}

impl std::fmt::Debug for Tensor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tensor")
            .field("shape", &self.shape())
            .field("requires_grad", &self.requires_grad)
            .field("has_grad", &self.grad.borrow().is_some())
            .finish()
    }
}
