//! Argument handling shared by the `sk` and `sk-sweep` binaries.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use sk_bp::{BetaSchedule, CavityRule, MessageInit, RunConfig};
use sk_core::SkError;
use tracing::level_filters::LevelFilter;

/// Solver flags accepted by both binaries. Flags given on the command line
/// override the values read from `--config`.
#[derive(Args, Debug, Clone)]
pub struct SolverArgs {
    /// YAML run configuration; unspecified fields take their defaults.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Number of spins [default: 1000].
    #[arg(short = 's', long)]
    pub spins_number: Option<usize>,
    /// Maximal number of sweeps [default: 1000].
    #[arg(short = 'm', long)]
    pub max_iter: Option<usize>,
    /// Convergence threshold on the discrepancy [default: 1e-6].
    #[arg(short = 't', long)]
    pub threshold: Option<f64>,
    /// Damping weight of the previous messages, in [0, 1) [default: 0.5].
    #[arg(short = 'd', long)]
    pub decay: Option<f64>,
    /// Master seed for couplings and initial messages.
    #[arg(long)]
    pub seed: Option<u64>,
    /// Cavity bias used by the update and the Bethe evaluator.
    #[arg(long, value_enum)]
    pub cavity_rule: Option<RuleArg>,
    /// Anneal geometrically from this inverse temperature up to the target one.
    #[arg(long)]
    pub anneal_from: Option<f64>,
    /// Number of sweeps the annealing ramp takes [default: 100].
    #[arg(long, requires = "anneal_from")]
    pub anneal_sweeps: Option<usize>,
    /// Half-width of the uniform initial messages; 0 starts from zero fields.
    #[arg(long)]
    pub init_amplitude: Option<f64>,
    /// Log filter for stderr (error, warn, info, debug, trace, off).
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

/// Command-line spelling of [`CavityRule`].
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleArg {
    /// `u = J tanh(beta h)`.
    Linearized,
    /// `u = atanh(tanh(beta J) tanh(beta h)) / beta`.
    Exact,
}

impl From<RuleArg> for CavityRule {
    fn from(rule: RuleArg) -> Self {
        match rule {
            RuleArg::Linearized => CavityRule::Linearized,
            RuleArg::Exact => CavityRule::Exact,
        }
    }
}

impl SolverArgs {
    /// Builds the run configuration: file first, then `beta`, then flags.
    ///
    /// Without `--config`, `beta` must be given.
    pub fn run_config(&self, beta: Option<f64>) -> Result<RunConfig, SkError> {
        let mut config = match (&self.config, beta) {
            (Some(path), beta) => RunConfig::load_with_beta(path, beta)?,
            (None, Some(beta)) => RunConfig::new(beta),
            (None, None) => {
                return Err(SkError::parameter(
                    "beta",
                    "--beta is required unless the configuration file sets it",
                ))
            }
        };
        if let Some(spins_number) = self.spins_number {
            config.spins_number = spins_number;
        }
        if let Some(max_iter) = self.max_iter {
            config.max_iter = max_iter;
        }
        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(decay) = self.decay {
            config.decay = decay;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(rule) = self.cavity_rule {
            config.cavity_rule = rule.into();
        }
        if let Some(start) = self.anneal_from {
            config.schedule = BetaSchedule::Exponential {
                start,
                sweeps: self.anneal_sweeps.unwrap_or(100),
            };
        }
        match self.init_amplitude {
            Some(amplitude) if amplitude == 0.0 => config.init = MessageInit::Zero,
            Some(amplitude) => config.init = MessageInit::Uniform { amplitude },
            None => {}
        }
        Ok(config)
    }
}

/// Installs the stderr `fmt` subscriber. Unknown levels fall back to `warn`.
pub fn init_logging(level: &str) {
    let filter = level.parse::<LevelFilter>().unwrap_or(LevelFilter::WARN);
    tracing_subscriber::fmt()
        .with_max_level(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
