//! Single-threaded host reference implementations.
//!
//! These are the baselines device results are timed and checked against, so
//! they stay deliberately plain: one thread, one loop, no SIMD tricks.

use std::time::{Duration, Instant};

/// Elementwise `out[i] = a[i] + b[i]`.
///
/// # Panics
///
/// Panics if the three slices differ in length.
pub fn vector_add(a: &[f32], b: &[f32], out: &mut [f32]) {
    assert_eq!(a.len(), b.len(), "input lengths differ");
    assert_eq!(a.len(), out.len(), "output length differs");

    for i in 0..a.len() {
        out[i] = a[i] + b[i];
    }
}

/// Sequential sum with an `f32` accumulator.
pub fn vector_sum(a: &[f32]) -> f32 {
    let mut sum = 0.0f32;
    for &x in a {
        sum += x;
    }
    sum
}

/// Row-major `n x n` matrix product.
///
/// # Panics
///
/// Panics if any slice is not `n * n` long.
pub fn matmul(a: &[f32], b: &[f32], out: &mut [f32], n: usize) {
    assert_eq!(a.len(), n * n, "lhs is not n x n");
    assert_eq!(b.len(), n * n, "rhs is not n x n");
    assert_eq!(out.len(), n * n, "output is not n x n");

    for row in 0..n {
        for col in 0..n {
            let mut sum = 0.0f32;
            for k in 0..n {
                sum += a[row * n + k] * b[k * n + col];
            }
            out[row * n + col] = sum;
        }
    }
}

/// Run `f` once and return its result with the elapsed wall time.
pub fn timed<T, F: FnOnce() -> T>(f: F) -> (T, Duration) {
    let start = Instant::now();
    let value = f();
    (value, start.elapsed())
}
