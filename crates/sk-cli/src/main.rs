use std::process::ExitCode;

use clap::Parser;
use sk_cli::{init_logging, SolverArgs};
use sk_core::SkError;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "sk",
    about = "Belief propagation on one Sherrington-Kirkpatrick sample, compared with the replica-symmetric free entropy"
)]
struct Cli {
    /// Inverse temperature; may instead come from `--config`.
    #[arg(short = 'b', long, required_unless_present = "config")]
    beta: Option<f64>,
    #[command(flatten)]
    solver: SolverArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli.solver.log_level);
    match execute(&cli) {
        Ok(record) => {
            print!("{record}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(code = err.info().code.as_str(), "run aborted");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: &Cli) -> Result<String, SkError> {
    let config = cli.solver.run_config(cli.beta)?;
    let report = sk_bp::run_report(&config)?;
    info!(
        bethe_magnetization = report.diagnostics.bethe_magnetization,
        bethe_overlap = report.diagnostics.bethe_overlap,
        replica_overlap = report.diagnostics.replica_overlap,
        replica_iterations = report.diagnostics.replica_iterations,
        "overlap diagnostics"
    );
    report.summary.to_yaml()
}
