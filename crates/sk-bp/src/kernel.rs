use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sk_core::errors::ErrorInfo;
use sk_core::{RngHandle, SkError};
use tracing::{debug, info, warn};

use crate::bethe;
use crate::config::{BpConfig, RunConfig};
use crate::couplings::Couplings;
use crate::determinism;
use crate::messages::{slot_of, target_of, MessageStore};
use crate::replica;
use crate::summary::{Diagnostics, RunReport, RunSummary};

/// Terminal state of the belief-propagation iterator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Propagation {
    /// Whether the last discrepancy fell below the threshold.
    pub is_converged: bool,
    /// Number of sweeps actually performed.
    pub iterations_number: usize,
    /// Discrepancy measured by the last sweep.
    pub discrepancy: f64,
}

/// Runs damped synchronous sweeps until convergence or until `max_iter`
/// sweeps have been performed.
///
/// Exhausting the budget is reported through `is_converged = false`. Only a
/// non-finite message or a mismatched store aborts with an error. With an
/// annealing schedule each sweep runs at the scheduled inverse temperature and
/// convergence is only checked once the target `beta` is reached.
pub fn propagate(
    couplings: &Couplings,
    config: &BpConfig,
    store: &mut MessageStore,
) -> Result<Propagation, SkError> {
    config.validate()?;
    check_shape(couplings, store)?;

    let settled_from = config.schedule.settled_from();
    let mut discrepancy = f64::INFINITY;
    for iteration in 1..=config.max_iter {
        let step = BpConfig {
            beta: config.schedule.beta_at(config.beta, iteration),
            ..*config
        };
        discrepancy =
            sweep(couplings, &step, store).map_err(|err| err.with_context("sweep", iteration))?;
        debug!(sweep = iteration, beta = step.beta, discrepancy, "belief-propagation sweep");
        if iteration >= settled_from && discrepancy < config.threshold {
            info!(sweeps = iteration, discrepancy, "belief propagation converged");
            return Ok(Propagation {
                is_converged: true,
                iterations_number: iteration,
                discrepancy,
            });
        }
    }

    warn!(
        sweeps = config.max_iter,
        discrepancy,
        threshold = config.threshold,
        "belief propagation exhausted its sweep budget"
    );
    Ok(Propagation {
        is_converged: false,
        iterations_number: config.max_iter,
        discrepancy,
    })
}

/// Performs one synchronous sweep at `config.beta` and returns its discrepancy.
///
/// Every new message is computed from the latest generation only. Rows are
/// updated in parallel; each row is reduced in a fixed order, so the result
/// does not depend on the number of worker threads.
///
/// On a `Numerical` error some rows of the write buffer have already been
/// overwritten and no generation is committed; the store holds a partly
/// written buffer and should be discarded.
pub fn sweep(
    couplings: &Couplings,
    config: &BpConfig,
    store: &mut MessageStore,
) -> Result<f64, SkError> {
    check_shape(couplings, store)?;
    let width = store.spins() - 1;
    let (source, target) = store.sweep_buffers();
    let row_discrepancies = target
        .par_chunks_mut(width)
        .enumerate()
        .map(|(i, row)| update_row(couplings, config, source, i, row))
        .collect::<Result<Vec<f64>, SkError>>()?;
    store.commit();
    Ok(row_discrepancies.into_iter().fold(0.0, f64::max))
}

fn check_shape(couplings: &Couplings, store: &MessageStore) -> Result<(), SkError> {
    if store.spins() != couplings.spins() {
        return Err(SkError::Parameter(
            ErrorInfo::new("store-shape", "message store and couplings disagree on the spin count")
                .with_context("store_spins", store.spins())
                .with_context("coupling_spins", couplings.spins()),
        ));
    }
    Ok(())
}

/// Rewrites the messages leaving spin `i`.
///
/// `h[i -> j]` sums the biases of every neighbour of `i` except `j`, computed
/// as the full incoming sum minus the bias sent by `j`.
fn update_row(
    couplings: &Couplings,
    config: &BpConfig,
    source: &[f64],
    i: usize,
    row: &mut [f64],
) -> Result<f64, SkError> {
    let width = row.len();
    let coupling_row = couplings.row(i);
    let biases: Vec<f64> = (0..width)
        .map(|slot| {
            let k = target_of(i, slot);
            let incoming = source[k * width + slot_of(k, i)];
            config.rule.bias(config.beta, coupling_row[k], incoming)
        })
        .collect();
    let total: f64 = biases.iter().sum();

    let own = &source[i * width..(i + 1) * width];
    let mut row_discrepancy = 0.0_f64;
    for slot in 0..width {
        let raw = total - biases[slot];
        let updated = config.decay * own[slot] + (1.0 - config.decay) * raw;
        if !updated.is_finite() {
            return Err(SkError::Numerical(
                ErrorInfo::new("message-non-finite", "cavity field became non-finite")
                    .with_context("from", i)
                    .with_context("to", target_of(i, slot))
                    .with_context("beta", config.beta)
                    .with_context("decay", config.decay),
            ));
        }
        row_discrepancy = row_discrepancy.max((updated - own[slot]).abs());
        row[slot] = updated;
    }
    Ok(row_discrepancy)
}

/// Executes a full run and returns the five-field result record.
pub fn run(config: &RunConfig) -> Result<RunSummary, SkError> {
    run_report(config).map(|report| report.summary)
}

/// Executes a full run and keeps the overlap diagnostics alongside the record.
pub fn run_report(config: &RunConfig) -> Result<RunReport, SkError> {
    config.validate()?;
    let bp = config.bp();

    let mut coupling_rng = RngHandle::from_seed(determinism::couplings_seed(config.seed));
    let couplings = Couplings::sample(config.spins_number, &mut coupling_rng)?;
    let mut message_rng = RngHandle::from_seed(determinism::messages_seed(config.seed));
    let mut store = MessageStore::new(config.spins_number, &config.init, &mut message_rng);

    let propagation = propagate(&couplings, &bp, &mut store)?;

    let fields = bethe::local_fields(&couplings, &store, bp.beta, bp.rule);
    let bethe_free_entropy = bethe::bethe_free_entropy(&couplings, &store, bp.beta, bp.rule)?;
    let oracle = replica::replica_symmetric(bp.beta, &config.replica)?;

    let summary = RunSummary::assemble(&propagation, bethe_free_entropy, oracle.free_entropy);
    let spins = fields.len() as f64;
    let diagnostics = Diagnostics {
        bethe_magnetization: fields.iter().map(|h| (bp.beta * h).tanh()).sum::<f64>() / spins,
        bethe_overlap: bethe::overlap(&fields, bp.beta),
        replica_overlap: oracle.overlap,
        replica_iterations: oracle.iterations,
    };
    info!(
        beta = bp.beta,
        spins = config.spins_number,
        bethe = summary.bethe_free_entropy,
        replica_symmetric = summary.replica_symmetric_free_entropy,
        "run finished"
    );
    Ok(RunReport {
        summary,
        diagnostics,
    })
}
