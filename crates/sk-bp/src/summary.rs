use serde::{Deserialize, Serialize};
use sk_core::errors::ErrorInfo;
use sk_core::SkError;

use crate::kernel::Propagation;

/// Result record of one run, emitted once and never mutated.
///
/// Field order is the order of the serialized record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Whether belief propagation reached the threshold within its budget.
    pub is_converged: bool,
    /// Number of sweeps actually performed.
    pub iterations_number: usize,
    /// Discrepancy of the last sweep.
    pub discrepancy: f64,
    /// Bethe free entropy per spin of the final messages.
    pub bethe_free_entropy: f64,
    /// Replica-symmetric free entropy per spin.
    pub replica_symmetric_free_entropy: f64,
}

impl RunSummary {
    /// Packages the iterator outcome and both free entropies.
    pub fn assemble(
        propagation: &Propagation,
        bethe_free_entropy: f64,
        replica_symmetric_free_entropy: f64,
    ) -> Self {
        Self {
            is_converged: propagation.is_converged,
            iterations_number: propagation.iterations_number,
            discrepancy: propagation.discrepancy,
            bethe_free_entropy,
            replica_symmetric_free_entropy,
        }
    }

    /// Renders the record as line-oriented `key: value` YAML.
    pub fn to_yaml(&self) -> Result<String, SkError> {
        serde_yaml::to_string(self)
            .map_err(|err| SkError::Io(ErrorInfo::new("record-serialize", err.to_string())))
    }

    /// Absolute gap between the two free entropy estimates.
    pub fn free_entropy_gap(&self) -> f64 {
        (self.bethe_free_entropy - self.replica_symmetric_free_entropy).abs()
    }
}

/// Overlap diagnostics that are not part of the emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Mean of the final magnetisations `tanh(beta H_i)`.
    pub bethe_magnetization: f64,
    /// Edwards-Anderson overlap estimated from the final messages.
    pub bethe_overlap: f64,
    /// Overlap solving the replica-symmetric equation.
    pub replica_overlap: f64,
    /// Updates the replica-symmetric iteration needed.
    pub replica_iterations: usize,
}

/// Record plus diagnostics returned by [`crate::run_report`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// The five-field result record.
    pub summary: RunSummary,
    /// Overlap diagnostics.
    pub diagnostics: Diagnostics,
}
