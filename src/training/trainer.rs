//! Online trainer: one optimizer step per example.

use std::time::Instant;

use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::error::NetworkError;
use crate::network::Network;
use crate::optimizers::Optimizer;
use crate::training::{compute_deltas, cross_validate, delta_buffer, validate_examples, Example};

/// Sequential trainer.
///
/// Every iteration shuffles the example set and, for each example in turn,
/// runs a forward pass, computes deltas and immediately applies the
/// optimizer to every synapse using that single example's gradient.
pub struct Trainer<O> {
    optimizer: O,
    l2: f64,
    verbosity: usize,
}

impl<O: Optimizer> Trainer<O> {
    /// New trainer.
    ///
    /// `l2` is the weight-decay coefficient (0 disables it); it is scaled
    /// by the input dimensionality once per training run and never applied
    /// to bias synapses. `verbosity` reports validation loss every that
    /// many iterations, 0 silences reporting.
    pub fn new(optimizer: O, l2: f64, verbosity: usize) -> Self {
        Trainer {
            optimizer,
            l2,
            verbosity,
        }
    }

    /// Train `net` for `iterations` passes over `examples`.
    ///
    /// All example dimensions are validated before the first weight is
    /// touched. Progress reporting against `validation` is a side effect
    /// only and does not participate in the numerical result.
    pub fn train(
        &mut self,
        net: &mut Network,
        examples: &[Example],
        validation: &[Example],
        iterations: usize,
        rng: &mut StdRng,
    ) -> Result<(), NetworkError> {
        validate_examples(net, examples)?;
        validate_examples(net, validation)?;

        self.optimizer.init(net.num_weights());
        let l2 = self.l2 / net.config().inputs as f64;
        let mut deltas = delta_buffer(net);
        let mut order: Vec<usize> = (0..examples.len()).collect();

        let start = Instant::now();
        for iteration in 1..=iterations {
            order.shuffle(rng);
            for &i in &order {
                let example = &examples[i];
                net.propagate(&example.input);
                compute_deltas(net, &example.response, &mut deltas);
                self.apply(net, &deltas, l2, iteration);
            }

            if self.verbosity > 0 && iteration % self.verbosity == 0 && !validation.is_empty() {
                let loss = cross_validate(net, validation)?;
                info!(
                    "iteration {iteration}/{iterations}: validation loss {loss:.5} ({:.2?})",
                    start.elapsed()
                );
            }
        }
        Ok(())
    }

    /// One optimizer step per synapse from the current deltas.
    fn apply(&mut self, net: &mut Network, deltas: &[Vec<f64>], l2: f64, iteration: usize) {
        let (arena, layers) = net.parts_mut();
        let mut idx = 0;
        for (i, layer) in layers.iter().enumerate() {
            for (j, neuron) in layer.neurons.iter().enumerate() {
                for &id in &neuron.incoming {
                    let synapse = &mut arena[id];
                    let mut gradient = deltas[i][j] * synapse.input;
                    if !synapse.is_bias {
                        gradient += l2 * synapse.weight;
                    }
                    let delta = self.optimizer.update(synapse.weight, gradient, iteration, idx);
                    synapse.weight += delta;
                    idx += 1;
                }
            }
        }
    }
}
