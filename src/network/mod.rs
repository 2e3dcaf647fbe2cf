//! The layered network: construction from a configuration, forward
//! propagation, and positional weight access.

mod graph;

pub(crate) use graph::{Layer, Synapse, SynapseId};

use rand::rngs::StdRng;

use crate::activations::Activation;
use crate::config::{Mode, NetworkConfig};
use crate::error::NetworkError;
use crate::loss::Loss;
use crate::math;

/// A feedforward network.
///
/// The topology is fixed at construction: layers are fully connected to
/// their successors, every first-layer neuron owns one dangling input
/// synapse per declared input dimension, and each layer optionally gets
/// one bias synapse per neuron that fires a constant 1 on every forward
/// pass. Weights are the only numeric state that training mutates.
#[derive(Debug, Clone)]
pub struct Network {
    pub(crate) arena: Vec<Synapse>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) biases: Vec<Vec<SynapseId>>,
    config: NetworkConfig,
    loss: Loss,
}

impl Network {
    /// Build a network from a configuration, sampling initial weights from
    /// the configured initializer.
    ///
    /// The final layer's activation is overridden by the training mode's
    /// canonical output activation when a mode is set. In regression mode
    /// the output layer gets no bias synapses.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] for an empty layout, a zero input
    /// count or a zero-size layer.
    pub fn new(config: &NetworkConfig, rng: &mut StdRng) -> Result<Network, NetworkError> {
        let config = config.resolved()?;
        let loss = config.loss.unwrap_or_else(|| config.mode.default_loss());

        let last = config.layout.len() - 1;
        let layers: Vec<Layer> = config
            .layout
            .iter()
            .enumerate()
            .map(|(i, &size)| {
                let activation = if i == last && config.mode != Mode::Default {
                    config.mode.output_activation()
                } else {
                    config.activation
                };
                Layer::new(size, activation)
            })
            .collect();

        let mut net = Network {
            arena: Vec::new(),
            layers,
            biases: Vec::new(),
            config,
            loss,
        };

        for i in 0..last {
            net.connect(i, rng);
        }
        net.attach_inputs(rng);
        net.attach_biases(rng);
        Ok(net)
    }

    /// Fully connect layer `i` to layer `i + 1` with freshly sampled
    /// synapses. Edge order matters: the k-th outgoing synapse of any
    /// neuron leads to the k-th neuron of the next layer, which the
    /// backward pass relies on.
    fn connect(&mut self, i: usize, rng: &mut StdRng) {
        for j in 0..self.layers[i].neurons.len() {
            for k in 0..self.layers[i + 1].neurons.len() {
                let id = self.arena.len();
                self.arena.push(Synapse::new(self.config.weight.sample(rng)));
                self.layers[i].neurons[j].outgoing.push(id);
                self.layers[i + 1].neurons[k].incoming.push(id);
            }
        }
    }

    /// Give every first-layer neuron one dangling synapse per input.
    fn attach_inputs(&mut self, rng: &mut StdRng) {
        for j in 0..self.layers[0].neurons.len() {
            for _ in 0..self.config.inputs {
                let id = self.arena.len();
                self.arena.push(Synapse::new(self.config.weight.sample(rng)));
                self.layers[0].neurons[j].incoming.push(id);
            }
        }
    }

    /// Inject one bias synapse per neuron, appended after the regular
    /// incoming edges. Regression mode leaves the output layer bias-free.
    fn attach_biases(&mut self, rng: &mut StdRng) {
        let last = self.layers.len() - 1;
        for i in 0..self.layers.len() {
            let mut layer_biases = Vec::new();
            if self.config.bias && !(self.config.mode == Mode::Regression && i == last) {
                for j in 0..self.layers[i].neurons.len() {
                    let id = self.arena.len();
                    self.arena.push(Synapse::bias(self.config.weight.sample(rng)));
                    self.layers[i].neurons[j].incoming.push(id);
                    layer_biases.push(id);
                }
            }
            self.biases.push(layer_biases);
        }
    }

    /// Run forward propagation and return the output vector.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Dimension`] when `input` does not match the
    /// configured input count; no cached state is touched in that case.
    pub fn predict(&mut self, input: &[f64]) -> Result<Vec<f64>, NetworkError> {
        if input.len() != self.config.inputs {
            return Err(NetworkError::Dimension {
                expected: self.config.inputs,
                got: input.len(),
            });
        }
        self.propagate(input);
        Ok(self.output())
    }

    /// Forward pass without validation. Callers are responsible for having
    /// checked the input dimension.
    pub(crate) fn propagate(&mut self, input: &[f64]) {
        let Network {
            arena,
            layers,
            biases,
            ..
        } = self;

        for neuron in &layers[0].neurons {
            for (k, &value) in input.iter().enumerate() {
                arena[neuron.incoming[k]].fire(value);
            }
        }
        for layer_biases in biases.iter() {
            for &id in layer_biases {
                arena[id].fire(1.0);
            }
        }

        for layer in layers.iter_mut() {
            for neuron in layer.neurons.iter_mut() {
                let sum: f64 = neuron.incoming.iter().map(|&id| arena[id].output).sum();
                neuron.value = neuron.activation.f(sum);
                for &id in &neuron.outgoing {
                    arena[id].fire(neuron.value);
                }
            }
            if layer.activation == Activation::Softmax {
                let raw: Vec<f64> = layer.neurons.iter().map(|n| n.value).collect();
                for (neuron, value) in layer.neurons.iter_mut().zip(math::softmax(&raw)) {
                    neuron.value = value;
                }
            }
        }
    }

    /// Output-layer values from the most recent forward pass.
    pub fn output(&self) -> Vec<f64> {
        self.layers[self.layers.len() - 1]
            .neurons
            .iter()
            .map(|n| n.value)
            .collect()
    }

    /// The resolved configuration this network was built from.
    pub fn config(&self) -> &NetworkConfig {
        &self.config
    }

    /// The loss function selected by the configuration.
    pub fn loss(&self) -> Loss {
        self.loss
    }

    /// Total number of trainable weights (incoming synapses over all
    /// neurons, bias and input synapses included). Optimizer state vectors
    /// are sized with this.
    pub fn num_weights(&self) -> usize {
        self.layers
            .iter()
            .map(|l| l.neurons.iter().map(|n| n.incoming.len()).sum::<usize>())
            .sum()
    }

    /// All weights as `weights[layer][neuron][incoming synapse]`.
    ///
    /// The innermost order is the neuron's incoming-edge order: previous
    /// layer (or declared inputs) first, then the bias synapse if present.
    pub fn weights(&self) -> Vec<Vec<Vec<f64>>> {
        self.layers
            .iter()
            .map(|layer| {
                layer
                    .neurons
                    .iter()
                    .map(|neuron| {
                        neuron
                            .incoming
                            .iter()
                            .map(|&id| self.arena[id].weight)
                            .collect()
                    })
                    .collect()
            })
            .collect()
    }

    /// Overwrite every weight positionally from a
    /// `weights[layer][neuron][incoming synapse]` tensor.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::WeightShape`] if the tensor does not match
    /// the topology exactly. The shape is checked in full before anything
    /// is written, so a failed call leaves the network unchanged.
    pub fn apply_weights(&mut self, weights: &[Vec<Vec<f64>>]) -> Result<(), NetworkError> {
        if weights.len() != self.layers.len() {
            return Err(NetworkError::WeightShape(format!(
                "expected {} layers, got {}",
                self.layers.len(),
                weights.len()
            )));
        }
        for (i, (layer, layer_weights)) in self.layers.iter().zip(weights).enumerate() {
            if layer_weights.len() != layer.neurons.len() {
                return Err(NetworkError::WeightShape(format!(
                    "layer {i}: expected {} neurons, got {}",
                    layer.neurons.len(),
                    layer_weights.len()
                )));
            }
            for (j, (neuron, neuron_weights)) in
                layer.neurons.iter().zip(layer_weights).enumerate()
            {
                if neuron_weights.len() != neuron.incoming.len() {
                    return Err(NetworkError::WeightShape(format!(
                        "layer {i}, neuron {j}: expected {} incoming weights, got {}",
                        neuron.incoming.len(),
                        neuron_weights.len()
                    )));
                }
            }
        }

        for (layer, layer_weights) in self.layers.iter().zip(weights) {
            for (neuron, neuron_weights) in layer.neurons.iter().zip(layer_weights) {
                for (&id, &weight) in neuron.incoming.iter().zip(neuron_weights) {
                    self.arena[id].weight = weight;
                }
            }
        }
        Ok(())
    }

    /// Split borrow for weight updates: the synapse arena mutably, the
    /// layer structure read-only.
    pub(crate) fn parts_mut(&mut self) -> (&mut [Synapse], &[Layer]) {
        (&mut self.arena, &self.layers)
    }

    /// Flat weight snapshot in canonical traversal order (layers, then
    /// neurons, then incoming synapses). Used to broadcast authoritative
    /// weights to replicas cheaply.
    pub(crate) fn weight_vector(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.num_weights());
        for layer in &self.layers {
            for neuron in &layer.neurons {
                for &id in &neuron.incoming {
                    out.push(self.arena[id].weight);
                }
            }
        }
        out
    }

    /// Overwrite weights from a flat snapshot taken on a network with the
    /// same topology.
    pub(crate) fn set_weight_vector(&mut self, weights: &[f64]) {
        debug_assert_eq!(weights.len(), self.num_weights());
        let Network { arena, layers, .. } = self;
        let mut idx = 0;
        for layer in layers.iter() {
            for neuron in &layer.neurons {
                for &id in &neuron.incoming {
                    arena[id].weight = weights[idx];
                    idx += 1;
                }
            }
        }
    }
}
