// Forward propagation: exact values on a hand-weighted network,
// determinism, softmax normalization and dimension validation.

use feedforward::{Activation, Mode, Network, NetworkConfig, NetworkError, WeightInit};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// 3-3-3 network, relu hidden layers, multi-class softmax output, bias on
/// every layer.
fn hand_weighted() -> Network {
    let mut net = Network::new(
        &NetworkConfig {
            inputs: 3,
            layout: vec![3, 3, 3],
            activation: Activation::Relu,
            mode: Mode::MultiClass,
            weight: WeightInit::Normal {
                std_dev: 1.0,
                mean: 0.0,
            },
            bias: true,
            ..NetworkConfig::default()
        },
        &mut rng(1),
    )
    .unwrap();

    // per neuron: three incoming weights plus a bias weight of 1
    let weights = vec![
        vec![
            vec![0.1, 0.4, 0.3, 1.0],
            vec![0.3, 0.7, 0.7, 1.0],
            vec![0.5, 0.2, 0.9, 1.0],
        ],
        vec![
            vec![0.2, 0.3, 0.5, 1.0],
            vec![0.3, 0.5, 0.7, 1.0],
            vec![0.6, 0.4, 0.8, 1.0],
        ],
        vec![
            vec![0.1, 0.4, 0.8, 1.0],
            vec![0.3, 0.7, 0.2, 1.0],
            vec![0.5, 0.2, 0.9, 1.0],
        ],
    ];
    net.apply_weights(&weights).unwrap();
    net
}

#[test]
fn test_forward_exact_values() {
    let mut net = hand_weighted();
    let out = net.predict(&[0.1, 0.2, 0.7]).unwrap();

    // relu layer 1: [1.3, 1.66, 1.72]
    // relu layer 2: [2.618, 3.424, 3.82]
    // softmax over the linear output sums
    let expected = [
        0.2791954959462845,
        0.13304830247069685,
        0.5877562015830187,
    ];
    for (got, want) in out.iter().zip(&expected) {
        assert!(
            (got - want).abs() < 1e-12,
            "expected {want}, got {got}"
        );
    }
}

#[test]
fn test_forward_is_deterministic() {
    let mut net = hand_weighted();
    let first = net.predict(&[0.1, 0.2, 0.7]).unwrap();
    for _ in 0..10 {
        let again = net.predict(&[0.1, 0.2, 0.7]).unwrap();
        assert_eq!(first, again, "repeated forward passes must be bit-identical");
    }
}

#[test]
fn test_softmax_output_sums_to_one() {
    let mut net = Network::new(
        &NetworkConfig {
            inputs: 4,
            layout: vec![8, 5],
            activation: Activation::Tanh,
            mode: Mode::MultiClass,
            bias: true,
            ..NetworkConfig::default()
        },
        &mut rng(7),
    )
    .unwrap();

    let inputs: [&[f64]; 4] = [
        &[0.0, 0.0, 0.0, 0.0],
        &[0.5, -0.25, 1.0, 2.0],
        &[1000.0, -1000.0, 500.0, -500.0],
        &[1e8, -1e8, 1e8, -1e8],
    ];
    for input in inputs {
        let out = net.predict(input).unwrap();
        let sum: f64 = out.iter().sum();
        assert!(
            (sum - 1.0).abs() < 1e-9,
            "softmax outputs for {input:?} sum to {sum}"
        );
        assert!(out.iter().all(|v| v.is_finite() && *v >= 0.0));
    }
}

#[test]
fn test_softmax_sums_to_one_with_large_weights() {
    let mut net = Network::new(
        &NetworkConfig {
            inputs: 2,
            layout: vec![3, 3],
            activation: Activation::Linear,
            mode: Mode::MultiClass,
            weight: WeightInit::Uniform {
                std_dev: 200.0,
                mean: 0.0,
            },
            bias: true,
            ..NetworkConfig::default()
        },
        &mut rng(11),
    )
    .unwrap();
    let out = net.predict(&[30.0, -45.0]).unwrap();
    let sum: f64 = out.iter().sum();
    assert!((sum - 1.0).abs() < 1e-9);
    assert!(out.iter().all(|v| v.is_finite()));
}

#[test]
fn test_wrong_input_length_is_rejected_and_state_preserved() {
    let mut net = hand_weighted();
    let before = net.predict(&[0.1, 0.2, 0.7]).unwrap();

    let err = net.predict(&[0.1, 0.2]).unwrap_err();
    assert!(matches!(
        err,
        NetworkError::Dimension {
            expected: 3,
            got: 2
        }
    ));
    // cached neuron values are untouched by the failed call
    assert_eq!(net.output(), before);

    let err = net.predict(&[0.1, 0.2, 0.3, 0.4]).unwrap_err();
    assert!(matches!(err, NetworkError::Dimension { .. }));
    assert_eq!(net.output(), before);
}

#[test]
fn test_mode_default_keeps_configured_output_activation() {
    // sigmoid everywhere: outputs stay in (0, 1) and do not normalize
    let mut net = Network::new(
        &NetworkConfig {
            inputs: 2,
            layout: vec![4, 3],
            activation: Activation::Sigmoid,
            bias: true,
            ..NetworkConfig::default()
        },
        &mut rng(13),
    )
    .unwrap();
    let out = net.predict(&[0.3, -0.8]).unwrap();
    assert_eq!(out.len(), 3);
    assert!(out.iter().all(|v| *v > 0.0 && *v < 1.0));
}
