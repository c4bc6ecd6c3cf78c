//! Host-side input generation.

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg64;

/// Seed used by the demo programs so runs are comparable.
pub const DEFAULT_SEED: u64 = 0x6b65_726e;

/// A vector of `len` copies of `value`.
pub fn filled(len: usize, value: f32) -> Vec<f32> {
    vec![value; len]
}

/// Deterministic generator of integer-valued matrices.
#[derive(Debug, Clone)]
pub struct MatrixGen {
    rng: Pcg64,
}

impl MatrixGen {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::seed_from_u64(seed),
        }
    }

    /// An `n x n` row-major matrix of integers in `[0, upper)` stored as `f32`.
    pub fn matrix(&mut self, n: usize, upper: u32) -> Vec<f32> {
        let upper = upper.max(1);
        (0..n * n)
            .map(|_| self.rng.gen_range(0..upper) as f32)
            .collect()
    }
}

impl Default for MatrixGen {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled() {
        let v = filled(10, 2.5);
        assert_eq!(v.len(), 10);
        assert!(v.iter().all(|&x| x == 2.5));
    }

    #[test]
    fn test_matrix_is_deterministic_and_bounded() {
        let a = MatrixGen::new(7).matrix(8, 100);
        let b = MatrixGen::new(7).matrix(8, 100);

        assert_eq!(a.len(), 64);
        assert_eq!(a, b);
        assert!(a.iter().all(|&x| (0.0..100.0).contains(&x) && x.fract() == 0.0));
    }

    #[test]
    fn test_successive_matrices_differ() {
        let mut matrices = MatrixGen::default();
        let a = matrices.matrix(16, 200);
        let b = matrices.matrix(16, 200);
        assert_ne!(a, b);
    }
}
