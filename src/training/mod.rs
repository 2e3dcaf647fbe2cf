//! Training: example pairs, validation helpers, and the two trainers.
//!
//! [`Trainer`] updates weights after every example (online training);
//! [`BatchTrainer`] accumulates gradients over mini-batches in parallel
//! worker threads and applies one synchronized optimizer step per batch.

mod batch;
mod deltas;
mod trainer;

pub use batch::BatchTrainer;
pub use trainer::Trainer;

pub(crate) use deltas::{accumulate_gradients, compute_deltas, delta_buffer};

use rand::rngs::StdRng;
use rand::Rng;

use crate::error::NetworkError;
use crate::network::Network;

/// One training example: an input vector and the expected response.
#[derive(Debug, Clone, PartialEq)]
pub struct Example {
    pub input: Vec<f64>,
    pub response: Vec<f64>,
}

impl Example {
    pub fn new(input: Vec<f64>, response: Vec<f64>) -> Self {
        Example { input, response }
    }
}

/// Split examples into two sets, assigning each example to the first set
/// with probability `p`.
pub fn split(examples: &[Example], p: f64, rng: &mut StdRng) -> (Vec<Example>, Vec<Example>) {
    let mut first = Vec::new();
    let mut second = Vec::new();
    for example in examples {
        if p > rng.random::<f64>() {
            first.push(example.clone());
        } else {
            second.push(example.clone());
        }
    }
    (first, second)
}

/// Mean loss of the network over a validation set, using the network's
/// configured loss function.
pub fn cross_validate(net: &mut Network, validation: &[Example]) -> Result<f64, NetworkError> {
    let mut predictions = Vec::with_capacity(validation.len());
    let mut responses = Vec::with_capacity(validation.len());
    for example in validation {
        predictions.push(net.predict(&example.input)?);
        responses.push(example.response.clone());
    }
    Ok(net.loss().f(&predictions, &responses))
}

/// Check every example against the network's input and output dimensions
/// before any training state is touched.
pub(crate) fn validate_examples(net: &Network, examples: &[Example]) -> Result<(), NetworkError> {
    let inputs = net.config().inputs;
    let outputs = net.config().output_size();
    for example in examples {
        if example.input.len() != inputs {
            return Err(NetworkError::Dimension {
                expected: inputs,
                got: example.input.len(),
            });
        }
        if example.response.len() != outputs {
            return Err(NetworkError::Dimension {
                expected: outputs,
                got: example.response.len(),
            });
        }
    }
    Ok(())
}
