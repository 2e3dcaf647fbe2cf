//! Feedforward neural networks: a layered synapse graph with forward
//! inference, backpropagation, pluggable optimizers and a data-parallel
//! mini-batch trainer.
//!
//! The computation graph stores all synapses in one arena owned by the
//! [`Network`]; neurons reference their edges by index. Activation and
//! loss functions are tagged enums with explicit dispatch, keeping the hot
//! forward/backward loops free of dynamic dispatch. All randomness flows
//! through an explicitly passed, seedable source, so training runs are
//! reproducible.
//!
//! # Modules
//!
//! - `network`: graph construction, forward propagation, weight access
//! - `activations` / `loss`: function catalogs and their derivatives
//! - `optimizers`: SGD (momentum/Nesterov, decay) and Adam
//! - `training`: online trainer, parallel batch trainer, validation helpers
//! - `persist`: serializable model snapshot
//!
//! # Example
//!
//! ```
//! use feedforward::{Example, Mode, Network, NetworkConfig, SGD, Trainer};
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! let mut net = Network::new(
//!     &NetworkConfig {
//!         inputs: 2,
//!         layout: vec![3, 1],
//!         mode: Mode::Binary,
//!         bias: true,
//!         ..NetworkConfig::default()
//!     },
//!     &mut rng,
//! )
//! .unwrap();
//!
//! let data = vec![
//!     Example::new(vec![0.0, 0.0], vec![0.0]),
//!     Example::new(vec![1.0, 1.0], vec![1.0]),
//! ];
//! let mut trainer = Trainer::new(SGD::new(0.5, 0.1, 0.0, false), 0.0, 0);
//! trainer.train(&mut net, &data, &[], 100, &mut rng).unwrap();
//! let out = net.predict(&[1.0, 1.0]).unwrap();
//! assert_eq!(out.len(), 1);
//! ```

pub mod activations;
pub mod config;
pub mod error;
pub mod loss;
pub mod math;
pub mod network;
pub mod optimizers;
pub mod persist;
pub mod training;

pub use activations::Activation;
pub use config::{Mode, NetworkConfig, WeightInit};
pub use error::NetworkError;
pub use loss::Loss;
pub use network::Network;
pub use optimizers::{Adam, Optimizer, SGD};
pub use persist::Dump;
pub use training::{cross_validate, split, BatchTrainer, Example, Trainer};
