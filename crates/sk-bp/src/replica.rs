//! Replica-symmetric prediction for the SK free entropy.
//!
//! The overlap solves `q = E_z[tanh^2(beta sqrt(q) z)]` with `z` standard
//! normal, and the free entropy per spin is
//! `beta^2 / 4 (1 - q)^2 + E_z[ln 2cosh(beta sqrt(q) z)]`. In the
//! paramagnetic phase `q = 0` and the value is `ln 2 + beta^2 / 4`.
//! Nothing here depends on the system size or on any message state.

use nalgebra::{DMatrix, SymmetricEigen};
use serde::{Deserialize, Serialize};
use sk_core::errors::ErrorInfo;
use sk_core::SkError;
use tracing::debug;

use crate::config::ReplicaConfig;
use crate::numerics::ln_2cosh;

/// Gauss-Hermite rule for expectations over a standard normal variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussHermite {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussHermite {
    /// Builds an `order`-point rule with the Golub-Welsch method.
    ///
    /// The nodes are the eigenvalues of the Jacobi matrix of the monic
    /// probabilists' Hermite recurrence (zero diagonal, off-diagonal
    /// `sqrt(k)`), and each weight is the squared first component of the
    /// matching normalised eigenvector.
    pub fn new(order: usize) -> Result<Self, SkError> {
        if order < 2 {
            return Err(SkError::Parameter(
                ErrorInfo::new("quadrature-nodes", "at least two quadrature nodes are required")
                    .with_context("quadrature_nodes", order),
            ));
        }
        let mut jacobi = DMatrix::<f64>::zeros(order, order);
        for k in 1..order {
            let off = (k as f64).sqrt();
            jacobi[(k - 1, k)] = off;
            jacobi[(k, k - 1)] = off;
        }
        let eigen = SymmetricEigen::new(jacobi);
        let mut pairs: Vec<(f64, f64)> = eigen
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(col, &node)| (node, eigen.eigenvectors[(0, col)].powi(2)))
            .collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
        let (nodes, weights): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
        if nodes.iter().chain(&weights).any(|value| !value.is_finite()) {
            return Err(SkError::Numerical(
                ErrorInfo::new("quadrature-non-finite", "Gauss-Hermite rule is not finite")
                    .with_context("quadrature_nodes", order),
            ));
        }
        Ok(Self { nodes, weights })
    }

    /// Quadrature nodes in ascending order.
    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    /// Weights matching [`GaussHermite::nodes`]; they sum to one.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Approximates `E[f(z)]` for a standard normal `z`.
    pub fn expectation(&self, f: impl Fn(f64) -> f64) -> f64 {
        self.nodes
            .iter()
            .zip(&self.weights)
            .map(|(&z, &w)| w * f(z))
            .sum()
    }
}

/// Converged replica-symmetric overlap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSolution {
    /// Edwards-Anderson overlap `q`.
    pub overlap: f64,
    /// Number of fixed-point updates performed.
    pub iterations: usize,
}

/// Replica-symmetric free entropy together with the overlap it was evaluated at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicaEstimate {
    /// Free entropy per spin in the thermodynamic limit.
    pub free_entropy: f64,
    /// Edwards-Anderson overlap `q`.
    pub overlap: f64,
    /// Number of fixed-point updates performed.
    pub iterations: usize,
}

/// Iterates the overlap equation from `q = 1` until consecutive values differ
/// by less than the configured threshold.
///
/// Running out of iterations is an [`SkError::Oracle`] error.
pub fn solve_overlap(
    beta: f64,
    rule: &GaussHermite,
    config: &ReplicaConfig,
) -> Result<ReplicaSolution, SkError> {
    check_beta(beta)?;
    config.validate()?;
    let mut q = 1.0_f64;
    let mut delta = f64::INFINITY;
    for iteration in 1..=config.max_iter {
        let scale = beta * q.sqrt();
        let next = rule.expectation(|z| (scale * z).tanh().powi(2));
        if !next.is_finite() {
            return Err(SkError::Numerical(
                ErrorInfo::new("overlap-non-finite", "overlap update is not finite")
                    .with_context("beta", beta)
                    .with_context("iteration", iteration),
            ));
        }
        delta = (next - q).abs();
        q = next;
        if delta < config.threshold {
            debug!(beta, overlap = q, iterations = iteration, "replica overlap settled");
            return Ok(ReplicaSolution {
                overlap: q,
                iterations: iteration,
            });
        }
    }
    Err(SkError::Oracle(
        ErrorInfo::new("overlap-not-converged", "replica-symmetric overlap did not settle")
            .with_context("beta", beta)
            .with_context("overlap", q)
            .with_context("last_delta", delta)
            .with_context("max_iter", config.max_iter)
            .with_hint("raise replica.max_iter or loosen replica.threshold"),
    ))
}

/// Replica-symmetric free entropy per spin at a given overlap.
pub fn free_entropy_at(beta: f64, overlap: f64, rule: &GaussHermite) -> f64 {
    let scale = beta * overlap.sqrt();
    0.25 * beta * beta * (1.0 - overlap).powi(2) + rule.expectation(|z| ln_2cosh(scale * z))
}

/// Solves for the overlap and evaluates the replica-symmetric free entropy.
pub fn replica_symmetric(beta: f64, config: &ReplicaConfig) -> Result<ReplicaEstimate, SkError> {
    config.validate()?;
    let rule = GaussHermite::new(config.quadrature_nodes)?;
    let solution = solve_overlap(beta, &rule, config)?;
    let free_entropy = free_entropy_at(beta, solution.overlap, &rule);
    if !free_entropy.is_finite() {
        return Err(SkError::Numerical(
            ErrorInfo::new("replica-non-finite", "replica-symmetric free entropy is not finite")
                .with_context("beta", beta)
                .with_context("overlap", solution.overlap),
        ));
    }
    Ok(ReplicaEstimate {
        free_entropy,
        overlap: solution.overlap,
        iterations: solution.iterations,
    })
}

fn check_beta(beta: f64) -> Result<(), SkError> {
    if beta.is_finite() && beta >= 0.0 {
        Ok(())
    } else {
        Err(SkError::Parameter(
            ErrorInfo::new("beta", "inverse temperature must be finite and non-negative")
                .with_context("beta", beta),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::LN_2;

    #[test]
    fn quadrature_reproduces_gaussian_moments() {
        let rule = GaussHermite::new(40).unwrap();
        assert!((rule.weights().iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(rule.expectation(|z| z).abs() < 1e-10);
        assert!((rule.expectation(|z| z * z) - 1.0).abs() < 1e-10);
        assert!((rule.expectation(|z| z.powi(4)) - 3.0).abs() < 1e-9);
        assert!(rule.nodes().windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn paramagnetic_phase_matches_closed_form() {
        for beta in [0.0, 0.3, 0.8] {
            let estimate = replica_symmetric(beta, &ReplicaConfig::default()).unwrap();
            assert!(estimate.overlap < 1e-6, "beta {beta}: q = {}", estimate.overlap);
            let closed_form = LN_2 + 0.25 * beta * beta;
            assert!((estimate.free_entropy - closed_form).abs() < 1e-9);
        }
    }

    #[test]
    fn glass_phase_has_positive_overlap() {
        let estimate = replica_symmetric(1.5, &ReplicaConfig::default()).unwrap();
        assert!(estimate.overlap > 0.2 && estimate.overlap < 1.0);
        assert!(estimate.free_entropy.is_finite());
    }

    #[test]
    fn exhausted_budget_is_an_oracle_error() {
        let config = ReplicaConfig {
            max_iter: 3,
            ..ReplicaConfig::default()
        };
        let err = replica_symmetric(0.9, &config).unwrap_err();
        assert!(matches!(err, SkError::Oracle(_)));
        assert_eq!(err.info().code, "overlap-not-converged");
    }

    #[test]
    fn overflowing_free_entropy_is_a_numerical_error() {
        // The overlap saturates at one and beta^2 overflows, so the energy
        // term is inf * 0 or inf.
        let err = replica_symmetric(1e200, &ReplicaConfig::default()).unwrap_err();
        assert!(matches!(err, SkError::Numerical(_)), "{err}");
        assert_eq!(err.info().code, "replica-non-finite");
    }

    #[test]
    fn negative_beta_is_rejected() {
        let err = replica_symmetric(-0.1, &ReplicaConfig::default()).unwrap_err();
        assert!(err.is_parameter());
    }
}
