//! Persisted model shape: the configuration plus every weight.
//!
//! Encoding and file handling belong to the caller; this module only
//! fixes the serializable shape and guarantees that restoring either
//! yields a network identical to the one that was dumped or fails without
//! producing a partially restored network.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::config::NetworkConfig;
use crate::error::NetworkError;
use crate::network::Network;

/// Serializable snapshot of a network: its resolved configuration and the
/// full weight tensor as `weights[layer][neuron][incoming synapse]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dump {
    pub config: NetworkConfig,
    pub weights: Vec<Vec<Vec<f64>>>,
}

impl Network {
    /// Snapshot the network for persistence.
    pub fn dump(&self) -> Dump {
        Dump {
            config: self.config().clone(),
            weights: self.weights(),
        }
    }

    /// Rebuild a network from a dump.
    ///
    /// The topology is reconstructed from the configuration first, then
    /// every weight is overwritten positionally.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::Config`] for an invalid configuration and
    /// [`NetworkError::WeightShape`] when the weight tensor does not match
    /// the reconstructed topology.
    pub fn from_dump(dump: &Dump) -> Result<Network, NetworkError> {
        // the sampled initial weights are overwritten wholesale, so a
        // fixed seed is fine here
        let mut rng = StdRng::seed_from_u64(0);
        let mut net = Network::new(&dump.config, &mut rng)?;
        net.apply_weights(&dump.weights)?;
        Ok(net)
    }
}
