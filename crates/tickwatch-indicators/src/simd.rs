//! SIMD window helpers.
//!
//! These use the `wide` crate for portable SIMD operations. Every indicator
//! that averages a window goes through [`mean`] so that, for example, the
//! Bollinger middle band is bit-identical to the SMA over the same window.

use wide::f64x4;

/// SIMD-optimized sum of a slice.
pub fn sum(data: &[f64]) -> f64 {
    let chunks = data.chunks_exact(4);
    let remainder = chunks.remainder();

    let mut simd_sum = f64x4::splat(0.0);
    for chunk in chunks {
        simd_sum += f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }

    let mut result = simd_sum.reduce_add();
    for &value in remainder {
        result += value;
    }
    result
}

/// Arithmetic mean of a non-empty window.
#[inline]
pub fn mean(window: &[f64]) -> f64 {
    sum(window) / window.len() as f64
}

/// Population variance of a window around a precomputed mean.
pub fn variance(window: &[f64], mean: f64) -> f64 {
    let chunks = window.chunks_exact(4);
    let remainder = chunks.remainder();
    let mean_vec = f64x4::splat(mean);

    let mut sum_sq = f64x4::splat(0.0);
    for chunk in chunks {
        let diff = f64x4::new([chunk[0], chunk[1], chunk[2], chunk[3]]) - mean_vec;
        sum_sq += diff * diff;
    }

    let mut result = sum_sq.reduce_add();
    for &value in remainder {
        let diff = value - mean;
        result += diff * diff;
    }
    result / window.len() as f64
}

/// Split close-to-close changes into gains and losses.
///
/// Both outputs have `data.len() - 1` entries; losses are positive.
pub fn gains_losses(data: &[f64]) -> (Vec<f64>, Vec<f64>) {
    let n = data.len().saturating_sub(1);
    let mut gains = Vec::with_capacity(n);
    let mut losses = Vec::with_capacity(n);
    let zero = f64x4::splat(0.0);

    let mut i = 0;
    while i + 4 <= n {
        let prev = f64x4::new([data[i], data[i + 1], data[i + 2], data[i + 3]]);
        let curr = f64x4::new([data[i + 1], data[i + 2], data[i + 3], data[i + 4]]);
        let diff = curr - prev;

        gains.extend(diff.max(zero).to_array());
        losses.extend((-diff).max(zero).to_array());
        i += 4;
    }

    while i < n {
        let change = data[i + 1] - data[i];
        gains.push(change.max(0.0));
        losses.push((-change).max(0.0));
        i += 1;
    }

    (gains, losses)
}
