use ndarray::{Array1, ArrayView1};

/// Numerically stable softmax over a row of logits.
pub(crate) fn softmax(logits: ArrayView1<f32>) -> Array1<f32> {
    if logits.is_empty() {
        return Array1::zeros(0);
    }
    let max = logits.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
    let exp = logits.mapv(|x| (x - max).exp());
    let sum: f32 = exp.sum();
    if sum > 0.0 && sum.is_finite() {
        exp / sum
    } else {
        Array1::zeros(logits.len())
    }
}

/// Independent per-label sigmoid, for multi-label heads.
pub(crate) fn sigmoid(logits: ArrayView1<f32>) -> Array1<f32> {
    logits.mapv(|x| 1.0 / (1.0 + (-x).exp()))
}
