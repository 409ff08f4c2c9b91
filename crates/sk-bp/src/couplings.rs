use rand_distr::{Distribution, StandardNormal};
use sk_core::errors::ErrorInfo;
use sk_core::{RngHandle, SkError};

/// Symmetric random coupling matrix of the Sherrington-Kirkpatrick model.
///
/// Entries are `z / sqrt(N)` with `z` standard normal, which places the
/// spin-glass transition at `beta = 1`. The diagonal is zero. The matrix is
/// stored densely in row-major order and never mutated after sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Couplings {
    spins: usize,
    values: Vec<f64>,
}

impl Couplings {
    /// Samples a coupling matrix for `spins` spins.
    ///
    /// The upper triangle is drawn in row-major `i < j` order and mirrored, so
    /// a given RNG state always yields a bit-identical matrix.
    pub fn sample(spins: usize, rng: &mut RngHandle) -> Result<Self, SkError> {
        if spins <= 1 {
            return Err(SkError::Parameter(
                ErrorInfo::new("spins-number", "at least two spins are required")
                    .with_context("spins_number", spins),
            ));
        }
        let scale = 1.0 / (spins as f64).sqrt();
        let mut values = vec![0.0; spins * spins];
        for i in 0..spins {
            for j in (i + 1)..spins {
                let z: f64 = StandardNormal.sample(rng);
                values[i * spins + j] = z * scale;
                values[j * spins + i] = z * scale;
            }
        }
        Ok(Self { spins, values })
    }

    /// Builds a matrix from explicit row-major values.
    ///
    /// The input must be square, symmetric, finite, and have a zero diagonal.
    pub fn from_dense(spins: usize, values: Vec<f64>) -> Result<Self, SkError> {
        if spins <= 1 || values.len() != spins * spins {
            return Err(SkError::Parameter(
                ErrorInfo::new("couplings-shape", "expected a square matrix over at least two spins")
                    .with_context("spins_number", spins)
                    .with_context("len", values.len()),
            ));
        }
        for i in 0..spins {
            if values[i * spins + i] != 0.0 {
                return Err(SkError::Parameter(
                    ErrorInfo::new("couplings-diagonal", "self-couplings must be zero")
                        .with_context("spin", i),
                ));
            }
            for j in (i + 1)..spins {
                let upper = values[i * spins + j];
                if !upper.is_finite() || upper != values[j * spins + i] {
                    return Err(SkError::Parameter(
                        ErrorInfo::new("couplings-symmetry", "couplings must be finite and symmetric")
                            .with_context("i", i)
                            .with_context("j", j),
                    ));
                }
            }
        }
        Ok(Self { spins, values })
    }

    /// Number of spins.
    pub fn spins(&self) -> usize {
        self.spins
    }

    /// Coupling between spins `i` and `j`.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.spins + j]
    }

    /// Couplings of spin `i` to every spin, including the zero self-coupling.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.spins..(i + 1) * self.spins]
    }
}
