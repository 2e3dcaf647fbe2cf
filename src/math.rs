//! Small numeric helpers shared by the forward pass and by classifier
//! consumers.

/// Softmax of a vector, computed with max subtraction so that inputs of
/// large magnitude do not overflow the exponential.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut out: Vec<f64> = values.iter().map(|v| (v - max).exp()).collect();
    let sum: f64 = out.iter().sum();
    for v in &mut out {
        *v /= sum;
    }
    out
}

/// Index of the largest element. Ties resolve to the earliest index.
pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
