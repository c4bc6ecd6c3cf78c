//! Comparison of device output against host reference results.

use crate::error::{Error, Result};

/// Values whose magnitude is below this are compared absolutely.
const ABS_FLOOR: f32 = 1e-6;

/// Relative comparison with an absolute floor near zero.
pub fn approx_eq(expected: f32, actual: f32, rel_tol: f32) -> bool {
    if expected == actual {
        return true;
    }
    if expected.is_nan() || actual.is_nan() {
        return false;
    }
    let diff = (expected - actual).abs();
    let scale = expected.abs().max(actual.abs());
    if scale < ABS_FLOOR {
        return diff < ABS_FLOOR;
    }
    diff <= rel_tol * scale
}

/// Check two slices elementwise; the first mismatch becomes an error.
pub fn check_slices(expected: &[f32], actual: &[f32], rel_tol: f32) -> Result<()> {
    if expected.len() != actual.len() {
        return Err(Error::config(format!(
            "result has {} elements, expected {}",
            actual.len(),
            expected.len()
        )));
    }

    match expected
        .iter()
        .zip(actual)
        .position(|(&e, &a)| !approx_eq(e, a, rel_tol))
    {
        Some(index) => Err(Error::Verify {
            index,
            expected: expected[index],
            actual: actual[index],
        }),
        None => Ok(()),
    }
}

/// Check a single scalar result, such as a reduction.
pub fn check_scalar(expected: f32, actual: f32, rel_tol: f32) -> Result<()> {
    if approx_eq(expected, actual, rel_tol) {
        Ok(())
    } else {
        Err(Error::Verify {
            index: 0,
            expected,
            actual,
        })
    }
}

/// First, middle and last index of a non-empty buffer of `len` elements.
pub fn spot_indices(len: usize) -> [usize; 3] {
    if len == 0 {
        return [0; 3];
    }
    [0, len / 2, len - 1]
}
