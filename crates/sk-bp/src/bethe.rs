//! Bethe free entropy of a message configuration.
//!
//! For pairwise Ising factors with cavity fields `h[i -> j]`, cavity biases
//! `u[k -> i] = u(J[i][k], h[k -> i])`, local fields `H_i = sum_k u[k -> i]`
//! and cavity magnetisations `m[i -> j] = tanh(beta h[i -> j])`, the Bethe
//! free entropy per spin is
//!
//! ```text
//! (1/N) [ sum_i ( ln 2cosh(beta H_i) - sum_{k != i} ln cosh(beta u[k -> i]) )
//!       + sum_{i<j} ( ln cosh(beta J_ij) - ln(1 + tanh(beta J_ij) m[i -> j] m[j -> i]) ) ]
//! ```
//!
//! i.e. site terms minus the edge terms they count twice. With all fields at
//! zero it reduces to `ln 2 + (1/N) sum_{i<j} ln cosh(beta J_ij)`.

use rayon::prelude::*;
use sk_core::errors::ErrorInfo;
use sk_core::SkError;

use crate::config::CavityRule;
use crate::couplings::Couplings;
use crate::messages::{slot_of, target_of, MessageStore};
use crate::numerics::{ln_2cosh, ln_cosh};

/// Full local field `H_i` on every spin, built from the latest incoming messages.
pub fn local_fields(
    couplings: &Couplings,
    store: &MessageStore,
    beta: f64,
    rule: CavityRule,
) -> Vec<f64> {
    (0..store.spins())
        .into_par_iter()
        .map(|i| incoming_biases(couplings, store, beta, rule, i).iter().sum::<f64>())
        .collect()
}

/// Belief-propagation magnetisations `m_i = tanh(beta H_i)`.
///
/// These are the single-spin marginals in magnetisation form,
/// `P(s_i = +1) = (1 + m_i) / 2`.
pub fn magnetizations(
    couplings: &Couplings,
    store: &MessageStore,
    beta: f64,
    rule: CavityRule,
) -> Vec<f64> {
    local_fields(couplings, store, beta, rule)
        .into_iter()
        .map(|field| (beta * field).tanh())
        .collect()
}

/// Bethe free entropy per spin for the latest message generation.
///
/// Pure in its inputs: evaluating the same store twice gives the same value.
pub fn bethe_free_entropy(
    couplings: &Couplings,
    store: &MessageStore,
    beta: f64,
    rule: CavityRule,
) -> Result<f64, SkError> {
    let spins = store.spins();
    if spins != couplings.spins() || spins < 2 {
        return Err(SkError::Parameter(
            ErrorInfo::new("store-shape", "message store and couplings disagree on the spin count")
                .with_context("store_spins", spins)
                .with_context("coupling_spins", couplings.spins()),
        ));
    }

    // Per-spin contributions are collected in order and summed sequentially,
    // keeping the result independent of the thread count.
    let contributions: Vec<f64> = (0..spins)
        .into_par_iter()
        .map(|i| spin_contribution(couplings, store, beta, rule, i))
        .collect();

    let mut total = 0.0;
    for (spin, value) in contributions.into_iter().enumerate() {
        if !value.is_finite() {
            return Err(SkError::Numerical(
                ErrorInfo::new("bethe-non-finite", "Bethe free entropy term is not finite")
                    .with_context("spin", spin)
                    .with_context("beta", beta),
            ));
        }
        total += value;
    }
    Ok(total / spins as f64)
}

/// Belief-propagation estimate of the Edwards-Anderson overlap,
/// `(1/N) sum_i tanh^2(beta H_i)`.
pub fn overlap(local_fields: &[f64], beta: f64) -> f64 {
    if local_fields.is_empty() {
        return 0.0;
    }
    let sum: f64 = local_fields
        .iter()
        .map(|field| (beta * field).tanh().powi(2))
        .sum();
    sum / local_fields.len() as f64
}

/// Biases `u[k -> i]` in row-slot order of spin `i`.
fn incoming_biases(
    couplings: &Couplings,
    store: &MessageStore,
    beta: f64,
    rule: CavityRule,
    i: usize,
) -> Vec<f64> {
    let width = store.spins() - 1;
    let messages = store.current();
    let coupling_row = couplings.row(i);
    (0..width)
        .map(|slot| {
            let k = target_of(i, slot);
            rule.bias(beta, coupling_row[k], messages[k * width + slot_of(k, i)])
        })
        .collect()
}

/// Site term of spin `i` plus the edge terms `(i, j)` with `j > i`.
fn spin_contribution(
    couplings: &Couplings,
    store: &MessageStore,
    beta: f64,
    rule: CavityRule,
    i: usize,
) -> f64 {
    let biases = incoming_biases(couplings, store, beta, rule, i);
    let local_field: f64 = biases.iter().sum();
    let mut site = ln_2cosh(beta * local_field);
    for bias in &biases {
        site -= ln_cosh(beta * bias);
    }

    let mut edges = 0.0;
    for j in (i + 1)..store.spins() {
        let coupling = couplings.get(i, j);
        let outgoing = (beta * store.get(i, j)).tanh();
        let incoming = (beta * store.get(j, i)).tanh();
        edges += ln_cosh(beta * coupling) - ((beta * coupling).tanh() * outgoing * incoming).ln_1p();
    }
    site + edges
}
