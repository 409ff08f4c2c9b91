#![deny(missing_docs)]

//! Belief propagation for the Sherrington-Kirkpatrick spin glass, validated
//! against the replica-symmetric mean-field prediction.
//!
//! A run samples a coupling matrix, iterates damped cavity messages to a
//! fixed point, evaluates the Bethe free entropy of the result and compares it
//! with the replica-symmetric free entropy. Every run is self-contained and
//! fully determined by its [`RunConfig`].

/// Bethe free entropy and local fields of a message configuration.
pub mod bethe;
/// YAML configuration schema, defaults and validation.
pub mod config;
/// Random symmetric coupling matrix.
pub mod couplings;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Belief-propagation iterator and the public `run` entry points.
pub mod kernel;
/// Double-buffered message storage.
pub mod messages;
/// Overflow-free hyperbolic helpers.
pub mod numerics;
/// Replica-symmetric oracle.
pub mod replica;
/// Result record and diagnostics.
pub mod summary;
/// Parallel sweeps over the inverse temperature.
pub mod sweep;

pub use bethe::{local_fields, magnetizations};
pub use config::{BetaSchedule, BpConfig, CavityRule, MessageInit, ReplicaConfig, RunConfig};
pub use couplings::Couplings;
pub use kernel::{propagate, run, run_report, Propagation};
pub use messages::MessageStore;
pub use replica::{replica_symmetric, GaussHermite, ReplicaEstimate};
pub use summary::{Diagnostics, RunReport, RunSummary};
pub use sweep::{sweep, BetaGrid, SweepPoint};
