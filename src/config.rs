//! Network configuration: topology, training mode, loss selection and
//! weight initialization.
//!
//! A configuration is plain serializable data. Defaults that depend on
//! other fields (output activation, loss) are resolved once when a network
//! is built, so a persisted configuration always reconstructs the same
//! topology.

use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

use crate::activations::Activation;
use crate::error::NetworkError;
use crate::loss::Loss;

/// Training mode. Determines the output-layer activation and the default
/// loss when those are not set explicitly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// No mode-specific behavior; the configured activation applies to the
    /// output layer as well.
    #[default]
    Default,
    /// Regression with a linear output layer.
    Regression,
    /// Binary classification with a sigmoid output layer.
    Binary,
    /// One-hot multi-class classification with a softmax output layer.
    MultiClass,
    /// Multi-label classification with a sigmoid output layer.
    MultiLabel,
}

impl Mode {
    /// Canonical output-layer activation for the mode.
    pub fn output_activation(self) -> Activation {
        match self {
            Mode::MultiClass => Activation::Softmax,
            Mode::Regression => Activation::Linear,
            Mode::Binary | Mode::MultiLabel => Activation::Sigmoid,
            Mode::Default => Activation::None,
        }
    }

    pub(crate) fn default_loss(self) -> Loss {
        match self {
            Mode::MultiClass | Mode::MultiLabel => Loss::CrossEntropy,
            Mode::Binary => Loss::BinaryCrossEntropy,
            Mode::Regression | Mode::Default => Loss::MeanSquared,
        }
    }
}

/// Weight initializer: the distribution initial synapse weights are
/// sampled from.
///
/// The random source is passed in explicitly so that runs are reproducible
/// from a seed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightInit {
    /// Uniform sample from `(mean - std_dev/2, mean + std_dev/2)`.
    Uniform { std_dev: f64, mean: f64 },
    /// Normal sample from `N(mean, std_dev)`.
    Normal { std_dev: f64, mean: f64 },
}

impl Default for WeightInit {
    fn default() -> Self {
        WeightInit::Uniform {
            std_dev: 0.5,
            mean: 0.0,
        }
    }
}

impl WeightInit {
    /// Draw one initial weight.
    pub fn sample(&self, rng: &mut StdRng) -> f64 {
        match *self {
            WeightInit::Uniform { std_dev, mean } => (rng.random::<f64>() - 0.5) * std_dev + mean,
            WeightInit::Normal { std_dev, mean } => rand_distr::Normal::new(mean, std_dev)
                .expect("standard deviation validated at construction")
                .sample(rng),
        }
    }

    fn std_dev(&self) -> f64 {
        match *self {
            WeightInit::Uniform { std_dev, .. } | WeightInit::Normal { std_dev, .. } => std_dev,
        }
    }
}

/// Complete description of a network topology and its training behavior.
///
/// `layout` lists the neuron count of every layer; the last entry is the
/// output dimension. Unset fields resolve to defaults when the network is
/// built: activation `None` becomes sigmoid, a missing loss derives from
/// the mode, and the initializer defaults to uniform(0.5, 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Input dimension.
    pub inputs: usize,
    /// Neurons per layer, in order.
    pub layout: Vec<usize>,
    /// Nominal activation for every layer.
    #[serde(default)]
    pub activation: Activation,
    /// Training mode; overrides the output-layer activation when not
    /// `Default`.
    #[serde(default)]
    pub mode: Mode,
    /// Loss function; derived from the mode when unset.
    #[serde(default)]
    pub loss: Option<Loss>,
    /// Initial weight distribution.
    #[serde(default)]
    pub weight: WeightInit,
    /// Whether each layer gets an extra synapse firing a constant 1.
    #[serde(default)]
    pub bias: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            inputs: 0,
            layout: Vec::new(),
            activation: Activation::None,
            mode: Mode::Default,
            loss: None,
            weight: WeightInit::default(),
            bias: false,
        }
    }
}

impl NetworkConfig {
    /// Output dimension, i.e. the size of the last layer.
    pub fn output_size(&self) -> usize {
        self.layout.last().copied().unwrap_or(0)
    }

    /// Validate the configuration and fill in the field-dependent defaults.
    pub(crate) fn resolved(&self) -> Result<NetworkConfig, NetworkError> {
        if self.inputs == 0 {
            return Err(NetworkError::Config(
                "input count must be greater than zero".to_string(),
            ));
        }
        if self.layout.is_empty() {
            return Err(NetworkError::Config(
                "layout must contain at least one layer".to_string(),
            ));
        }
        if let Some(i) = self.layout.iter().position(|&n| n == 0) {
            return Err(NetworkError::Config(format!("layer {i} has zero neurons")));
        }
        let std_dev = self.weight.std_dev();
        if !std_dev.is_finite() || std_dev < 0.0 {
            return Err(NetworkError::Config(format!(
                "weight initializer standard deviation {std_dev} must be a non-negative finite number"
            )));
        }

        let mut config = self.clone();
        if config.activation == Activation::None {
            config.activation = Activation::Sigmoid;
        }
        if config.loss.is_none() {
            config.loss = Some(config.mode.default_loss());
        }
        Ok(config)
    }
}
