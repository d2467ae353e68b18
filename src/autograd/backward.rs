//! Backward-pass trait

/// A recorded backward computation on the gradient tape.
///
/// Implementations read the gradient of their result (via the result's
/// gradient cell), accumulate gradients into their inputs, and recurse into
/// the inputs' own backward ops.
pub trait BackwardOp {
    /// Propagate gradients into this op's inputs
    fn backward(&self);
}
