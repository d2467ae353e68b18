//! Optimizer trait

use crate::Tensor;

/// Trait for optimization algorithms.
///
/// An optimizer is bound to a parameter list by the network at
/// `set_optimizer` time; `step` consumes whatever gradients the backward
/// pass left on the tensors.
pub trait Optimizer {
    /// Apply one update using the current gradients
    fn step(&mut self, params: &mut [Tensor]);

    /// Clear gradients on all parameters
    fn zero_grad(&mut self, params: &mut [Tensor]) {
        for param in params {
            param.zero_grad();
        }
    }

    /// Get learning rate
    fn lr(&self) -> f32;

    /// Set learning rate
    fn set_lr(&mut self, lr: f32);
}
