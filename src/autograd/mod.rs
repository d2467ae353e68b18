//! Tape-based gradient engine
//!
//! Tensors carry shared data and gradient cells; differentiable operations
//! attach a backward object that knows how to push gradients into its
//! inputs. Calling [`backward`] on a scalar loss seeds the gradient with
//! ones and walks the tape.

mod backward;
pub mod ops;
mod tensor;

pub use backward::BackwardOp;
pub use tensor::Tensor;

/// Run the backward pass from a loss tensor.
///
/// Seeds the loss gradient with ones (scalar losses), then invokes the
/// recorded backward op, which recurses through the tape.
pub fn backward(loss: &Tensor) {
    let (rows, cols) = loss.shape();
    loss.set_grad(ndarray::Array2::ones((rows, cols)));

    if let Some(op) = loss.backward_op() {
        op.backward();
    }
}
