//! Optimizers: update rules mapping per-weight gradients to weight deltas.
//!
//! An optimizer keeps one slot of state per trainable weight, allocated
//! once with [`Optimizer::init`] before training begins and addressed by a
//! stable weight index afterwards. Given identical inputs and the same
//! ordered sequence of calls an optimizer is fully deterministic.

pub mod adam;
pub mod sgd;

pub use adam::Adam;
pub use sgd::SGD;

/// Update rule for a single weight.
pub trait Optimizer {
    /// Allocate per-weight state for a network with `size` trainable
    /// weights. Must be called before the first [`Optimizer::update`] and
    /// resets any previous state.
    fn init(&mut self, size: usize);

    /// Weight delta for one synapse.
    ///
    /// `gradient` is the (batch-averaged, regularized) loss gradient for
    /// the weight, `iteration` is the 1-based training iteration and `idx`
    /// addresses this weight's state slot. The returned delta is *added*
    /// to the weight by the caller; the learning-rate sign convention
    /// lives entirely inside the optimizer.
    fn update(&mut self, weight: f64, gradient: f64, iteration: usize, idx: usize) -> f64;
}
