//! Adam (adaptive moment estimation) optimizer.

use crate::optimizers::Optimizer;

/// Adam optimizer.
///
/// Keeps an exponential moving average of the gradient (`m`) and of its
/// square (`v`) per weight, and corrects both for their zero
/// initialization through the iteration count:
///
/// ```text
/// lr_t = lr * sqrt(1 - beta2^t) / (1 - beta1^t)
/// m    = beta1 * m + (1 - beta1) * gradient
/// v    = beta2 * v + (1 - beta2) * gradient^2
/// delta = -lr_t * m / (sqrt(v) + epsilon)
/// ```
///
/// The iteration index is supplied by the caller and is 1-based, so the
/// bias correction is well-defined from the first step.
///
/// # Reference
///
/// Kingma, D. P., & Ba, J. (2014). Adam: A method for stochastic
/// optimization. arXiv:1412.6980.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    m: Vec<f64>,
    v: Vec<f64>,
}

impl Adam {
    /// New Adam optimizer.
    ///
    /// The paper's defaults (`0.001, 0.9, 0.999, 1e-8`) are available via
    /// [`Adam::default`] and work well for a wide range of problems.
    pub fn new(learning_rate: f64, beta1: f64, beta2: f64, epsilon: f64) -> Self {
        Adam {
            learning_rate,
            beta1,
            beta2,
            epsilon,
            m: Vec::new(),
            v: Vec::new(),
        }
    }
}

impl Default for Adam {
    fn default() -> Self {
        Adam::new(0.001, 0.9, 0.999, 1e-8)
    }
}

impl Optimizer for Adam {
    fn init(&mut self, size: usize) {
        self.m = vec![0.0; size];
        self.v = vec![0.0; size];
    }

    fn update(&mut self, _weight: f64, gradient: f64, iteration: usize, idx: usize) -> f64 {
        let t = iteration as f64;
        let lr_t =
            self.learning_rate * (1.0 - self.beta2.powf(t)).sqrt() / (1.0 - self.beta1.powf(t));

        self.m[idx] = self.beta1 * self.m[idx] + (1.0 - self.beta1) * gradient;
        self.v[idx] = self.beta2 * self.v[idx] + (1.0 - self.beta2) * gradient * gradient;

        -lr_t * self.m[idx] / (self.v[idx].sqrt() + self.epsilon)
    }
}
