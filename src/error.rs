//! Error types for network construction, propagation and weight restore.

use thiserror::Error;

/// Errors reported by the network engine.
///
/// `Dimension` is recoverable: it is returned before any cached state is
/// touched, so the caller can fix the offending vector and retry.
/// `WeightShape` is raised while restoring persisted weights and always
/// leaves the target network unmodified.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// An input or target vector does not match the configured dimensions.
    #[error("dimension mismatch: expected {expected} values, got {got}")]
    Dimension {
        /// Number of values the topology requires.
        expected: usize,
        /// Number of values the caller supplied.
        got: usize,
    },

    /// The configuration cannot produce a valid topology.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Persisted weights do not match the topology reconstructed from the
    /// configuration.
    #[error("weight shape mismatch: {0}")]
    WeightShape(String),
}
