use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sk_core::errors::ErrorInfo;
use sk_core::SkError;

/// YAML-configurable parameters governing a single solver run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Inverse temperature of the spin system. Has no default.
    pub beta: f64,
    /// Number of spins in the fully connected system.
    #[serde(default = "default_spins_number")]
    pub spins_number: usize,
    /// Maximal number of belief-propagation sweeps.
    #[serde(default = "default_max_iter")]
    pub max_iter: usize,
    /// Discrepancy below which the iteration counts as converged.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    /// Weight of the previous message in the damped update, in `[0, 1)`.
    #[serde(default = "default_decay")]
    pub decay: f64,
    /// Cavity bias used by the message update and the Bethe evaluator.
    #[serde(default)]
    pub cavity_rule: CavityRule,
    /// Inverse temperature used by each sweep on the way to `beta`.
    #[serde(default)]
    pub schedule: BetaSchedule,
    /// Initial message scheme.
    #[serde(default)]
    pub init: MessageInit,
    /// Master seed from which the coupling and message substreams derive.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Settings of the replica-symmetric oracle.
    #[serde(default)]
    pub replica: ReplicaConfig,
}

fn default_spins_number() -> usize {
    1000
}

fn default_max_iter() -> usize {
    1000
}

fn default_threshold() -> f64 {
    1e-6
}

fn default_decay() -> f64 {
    0.5
}

fn default_seed() -> u64 {
    0x5EED_5EED_u64
}

impl RunConfig {
    /// Creates a configuration with every field but `beta` at its default.
    pub fn new(beta: f64) -> Self {
        Self {
            beta,
            spins_number: default_spins_number(),
            max_iter: default_max_iter(),
            threshold: default_threshold(),
            decay: default_decay(),
            cavity_rule: CavityRule::default(),
            schedule: BetaSchedule::default(),
            init: MessageInit::default(),
            seed: default_seed(),
            replica: ReplicaConfig::default(),
        }
    }

    /// Loads a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, SkError> {
        Self::load_with_beta(path, None)
    }

    /// Loads a YAML configuration file, letting `beta` fill in or replace the
    /// file's inverse temperature.
    pub fn load_with_beta(path: &Path, beta: Option<f64>) -> Result<Self, SkError> {
        let parse_error = |message: String| {
            SkError::Io(ErrorInfo::new("config-parse", message).with_context("path", path.display()))
        };
        let contents = fs::read_to_string(path).map_err(|err| {
            SkError::Io(
                ErrorInfo::new("config-read", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        let mut document: serde_yaml::Value =
            serde_yaml::from_str(&contents).map_err(|err| parse_error(err.to_string()))?;
        if document.is_null() {
            document = serde_yaml::Value::Mapping(serde_yaml::Mapping::new());
        }
        let Some(mapping) = document.as_mapping_mut() else {
            return Err(parse_error("configuration root must be a mapping".to_string()));
        };
        if let Some(beta) = beta {
            mapping.insert("beta".into(), beta.into());
        }
        serde_yaml::from_value(document).map_err(|err| parse_error(err.to_string()))
    }

    /// Returns the belief-propagation slice of the configuration.
    pub fn bp(&self) -> BpConfig {
        BpConfig {
            beta: self.beta,
            max_iter: self.max_iter,
            threshold: self.threshold,
            decay: self.decay,
            rule: self.cavity_rule,
            schedule: self.schedule,
        }
    }

    /// Rejects parameter combinations before any work is done.
    pub fn validate(&self) -> Result<(), SkError> {
        if self.spins_number <= 1 {
            return Err(SkError::Parameter(
                ErrorInfo::new("spins-number", "at least two spins are required")
                    .with_context("spins_number", self.spins_number),
            ));
        }
        self.bp().validate()?;
        self.init.validate()?;
        self.replica.validate()
    }
}

/// Parameters of the belief-propagation iterator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BpConfig {
    /// Inverse temperature.
    pub beta: f64,
    /// Maximal number of sweeps.
    pub max_iter: usize,
    /// Convergence threshold on the discrepancy.
    pub threshold: f64,
    /// Damping weight of the previous generation.
    pub decay: f64,
    /// Cavity bias.
    pub rule: CavityRule,
    /// Per-sweep inverse temperature ramp ending at `beta`.
    pub schedule: BetaSchedule,
}

impl BpConfig {
    /// Checks the iterator parameters.
    pub fn validate(&self) -> Result<(), SkError> {
        if !self.beta.is_finite() || self.beta < 0.0 {
            return Err(SkError::Parameter(
                ErrorInfo::new("beta", "inverse temperature must be finite and non-negative")
                    .with_context("beta", self.beta),
            ));
        }
        if self.max_iter == 0 {
            return Err(SkError::parameter(
                "max-iter",
                "at least one sweep must be allowed",
            ));
        }
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(SkError::Parameter(
                ErrorInfo::new("threshold", "threshold must be finite and positive")
                    .with_context("threshold", self.threshold),
            ));
        }
        if !(0.0..1.0).contains(&self.decay) {
            return Err(SkError::Parameter(
                ErrorInfo::new("decay", "decay must lie in [0, 1)")
                    .with_context("decay", self.decay)
                    .with_hint("decay = 1 freezes the messages; the default is 0.5"),
            ));
        }
        self.schedule.validate(self.max_iter)
    }
}

/// Inverse temperature seen by each sweep.
///
/// Convergence is only declared once the schedule has reached the target
/// `beta`, so the recorded discrepancy always refers to the target system.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum BetaSchedule {
    /// Every sweep runs at the target `beta`.
    #[default]
    Constant,
    /// Geometric ramp: sweep `t` runs at `start * (beta / start)^(t / sweeps)`
    /// and every sweep from `sweeps` on runs at `beta`.
    Exponential {
        /// Inverse temperature the ramp starts from.
        start: f64,
        /// Number of sweeps the ramp takes to reach `beta`.
        sweeps: usize,
    },
}

impl BetaSchedule {
    /// Inverse temperature of the `sweep`-th sweep (counted from 1).
    pub fn beta_at(&self, target: f64, sweep: usize) -> f64 {
        match *self {
            BetaSchedule::Constant => target,
            BetaSchedule::Exponential { sweeps, .. } if sweep >= sweeps => target,
            BetaSchedule::Exponential { start, sweeps } => {
                start * (target / start).powf(sweep as f64 / sweeps as f64)
            }
        }
    }

    /// First sweep that runs at the target inverse temperature.
    pub fn settled_from(&self) -> usize {
        match *self {
            BetaSchedule::Constant => 1,
            BetaSchedule::Exponential { sweeps, .. } => sweeps.max(1),
        }
    }

    fn validate(&self, max_iter: usize) -> Result<(), SkError> {
        match *self {
            BetaSchedule::Constant => Ok(()),
            BetaSchedule::Exponential { start, sweeps } => {
                if !(start.is_finite() && start > 0.0) || sweeps == 0 || sweeps > max_iter {
                    return Err(SkError::Parameter(
                        ErrorInfo::new(
                            "schedule",
                            "ramp needs a finite positive start and 1 <= sweeps <= max_iter",
                        )
                        .with_context("start", start)
                        .with_context("sweeps", sweeps)
                        .with_context("max_iter", max_iter),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Cavity bias `u(J, h)` transmitted from a spin with cavity field `h`
/// through a coupling `J`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CavityRule {
    /// `u = J tanh(beta h)`, the leading order in the `1/sqrt(N)` couplings.
    #[default]
    Linearized,
    /// `u = atanh(tanh(beta J) tanh(beta h)) / beta`, the full sum-product bias.
    Exact,
}

impl CavityRule {
    /// Evaluates the bias for one coupling and one incoming cavity field.
    #[inline]
    pub fn bias(self, beta: f64, coupling: f64, field: f64) -> f64 {
        match self {
            CavityRule::Linearized => coupling * (beta * field).tanh(),
            CavityRule::Exact => {
                if beta == 0.0 {
                    0.0
                } else {
                    ((beta * coupling).tanh() * (beta * field).tanh()).atanh() / beta
                }
            }
        }
    }
}

/// Initial message scheme.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessageInit {
    /// Every cavity field starts at zero, which is already the paramagnetic fixed point.
    Zero,
    /// Fields drawn independently from `U[-amplitude, amplitude)` in packed order.
    Uniform {
        /// Half-width of the uniform distribution.
        #[serde(default = "default_amplitude")]
        amplitude: f64,
    },
}

fn default_amplitude() -> f64 {
    0.5
}

impl Default for MessageInit {
    fn default() -> Self {
        MessageInit::Uniform {
            amplitude: default_amplitude(),
        }
    }
}

impl MessageInit {
    fn validate(&self) -> Result<(), SkError> {
        match *self {
            MessageInit::Zero => Ok(()),
            MessageInit::Uniform { amplitude } if amplitude.is_finite() && amplitude >= 0.0 => {
                Ok(())
            }
            MessageInit::Uniform { amplitude } => Err(SkError::Parameter(
                ErrorInfo::new("init-amplitude", "amplitude must be finite and non-negative")
                    .with_context("amplitude", amplitude),
            )),
        }
    }
}

/// Settings for the replica-symmetric self-consistency iteration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplicaConfig {
    /// Stop once consecutive overlaps differ by less than this.
    #[serde(default = "default_replica_threshold")]
    pub threshold: f64,
    /// Iteration budget; exhausting it is a fatal oracle error.
    #[serde(default = "default_replica_max_iter")]
    pub max_iter: usize,
    /// Number of Gauss-Hermite nodes for the Gaussian averages.
    #[serde(default = "default_quadrature_nodes")]
    pub quadrature_nodes: usize,
}

fn default_replica_threshold() -> f64 {
    1e-10
}

fn default_replica_max_iter() -> usize {
    1_000_000
}

fn default_quadrature_nodes() -> usize {
    96
}

impl Default for ReplicaConfig {
    fn default() -> Self {
        Self {
            threshold: default_replica_threshold(),
            max_iter: default_replica_max_iter(),
            quadrature_nodes: default_quadrature_nodes(),
        }
    }
}

impl ReplicaConfig {
    /// Checks the oracle parameters.
    pub fn validate(&self) -> Result<(), SkError> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(SkError::Parameter(
                ErrorInfo::new("replica-threshold", "threshold must be finite and positive")
                    .with_context("threshold", self.threshold),
            ));
        }
        if self.max_iter == 0 {
            return Err(SkError::parameter(
                "replica-max-iter",
                "at least one overlap update must be allowed",
            ));
        }
        if self.quadrature_nodes < 2 {
            return Err(SkError::Parameter(
                ErrorInfo::new("quadrature-nodes", "at least two quadrature nodes are required")
                    .with_context("quadrature_nodes", self.quadrature_nodes),
            ));
        }
        Ok(())
    }
}
