//! Loss functions and their derivatives.
//!
//! Each loss is a tag with a batch-level value `f` and a pointwise
//! derivative `df`. The derivative is a three-argument function of the
//! network output, the target and the local activation derivative: for
//! certain pairings (cross-entropy with softmax, binary cross-entropy with
//! sigmoid) the composed derivative collapses to `estimate - ideal`, while
//! mean-squared error needs the explicit activation term.

use serde::{Deserialize, Serialize};

/// Additive guard inside logarithms so that zero-probability estimates do
/// not produce infinities.
const LOG_EPSILON: f64 = 1e-16;

/// Loss function tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Loss {
    /// Cross-entropy, paired with softmax outputs.
    CrossEntropy,
    /// Binary cross-entropy, paired with sigmoid outputs.
    BinaryCrossEntropy,
    /// Mean-squared error.
    MeanSquared,
}

impl Loss {
    /// Mean loss over a batch of estimates against their targets.
    ///
    /// `estimates` and `ideals` are row-per-example and must have matching
    /// shapes.
    pub fn f(self, estimates: &[Vec<f64>], ideals: &[Vec<f64>]) -> f64 {
        match self {
            Loss::CrossEntropy => {
                let mut sum = 0.0;
                for (estimate, ideal) in estimates.iter().zip(ideals) {
                    for (e, i) in estimate.iter().zip(ideal) {
                        sum -= i * (e + LOG_EPSILON).ln();
                    }
                }
                sum / estimates.len() as f64
            }
            Loss::BinaryCrossEntropy => {
                let mut sum = 0.0;
                for (estimate, ideal) in estimates.iter().zip(ideals) {
                    for (e, i) in estimate.iter().zip(ideal) {
                        sum -= i * (e + LOG_EPSILON).ln()
                            + (1.0 - i) * (1.0 - e + LOG_EPSILON).ln();
                    }
                }
                sum / estimates.len() as f64
            }
            Loss::MeanSquared => {
                let mut sum = 0.0;
                let mut count = 0usize;
                for (estimate, ideal) in estimates.iter().zip(ideals) {
                    for (e, i) in estimate.iter().zip(ideal) {
                        sum += (e - i) * (e - i);
                        count += 1;
                    }
                }
                sum / count as f64
            }
        }
    }

    /// Pointwise derivative of the loss with respect to one output neuron.
    ///
    /// `activation` is the derivative of the output activation evaluated at
    /// the forward value. Cross-entropy variants ignore it because the
    /// composed derivative already cancels the activation term.
    pub fn df(self, estimate: f64, ideal: f64, activation: f64) -> f64 {
        match self {
            Loss::CrossEntropy | Loss::BinaryCrossEntropy => estimate - ideal,
            Loss::MeanSquared => activation * (estimate - ideal),
        }
    }
}
