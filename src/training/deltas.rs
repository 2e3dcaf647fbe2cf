//! Backpropagation: per-neuron error terms and raw per-synapse gradients.

use crate::network::Network;

/// Per-layer, per-neuron delta scratch space shaped for `net`.
pub(crate) fn delta_buffer(net: &Network) -> Vec<Vec<f64>> {
    net.layers
        .iter()
        .map(|l| vec![0.0; l.neurons.len()])
        .collect()
}

/// Compute every neuron's delta for the current forward state against
/// `target`.
///
/// Output layer: `loss.df(value, target, activation.df(value))`. Hidden
/// layer: `activation.df(value) * sum(weight(j->k) * delta_k)` over the
/// next layer. All activation derivatives take the cached forward value,
/// never the pre-activation sum.
pub(crate) fn compute_deltas(net: &Network, target: &[f64], deltas: &mut [Vec<f64>]) {
    let last = net.layers.len() - 1;
    for (i, neuron) in net.layers[last].neurons.iter().enumerate() {
        deltas[last][i] = net.loss().df(
            neuron.value,
            target[i],
            neuron.activation.df(neuron.value),
        );
    }

    for i in (0..last).rev() {
        for (j, neuron) in net.layers[i].neurons.iter().enumerate() {
            let mut sum = 0.0;
            // the k-th outgoing synapse leads to the k-th neuron of layer i+1
            for (k, &id) in neuron.outgoing.iter().enumerate() {
                sum += net.arena[id].weight * deltas[i + 1][k];
            }
            deltas[i][j] = neuron.activation.df(neuron.value) * sum;
        }
    }
}

/// Accumulate the raw per-synapse gradients (consumer delta times cached
/// synapse input) into `grads`, indexed in canonical traversal order.
pub(crate) fn accumulate_gradients(net: &Network, deltas: &[Vec<f64>], grads: &mut [f64]) {
    let mut idx = 0;
    for (i, layer) in net.layers.iter().enumerate() {
        for (j, neuron) in layer.neurons.iter().enumerate() {
            for &id in &neuron.incoming {
                grads[idx] += deltas[i][j] * net.arena[id].input;
                idx += 1;
            }
        }
    }
}
