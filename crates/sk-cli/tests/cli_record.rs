use std::process::Command;

use sk_bp::RunSummary;

fn sk() -> Command {
    Command::new(env!("CARGO_BIN_EXE_sk"))
}

#[test]
fn single_run_prints_the_yaml_record() {
    let output = sk()
        .args(["--beta", "0.5", "--spins-number", "60", "--seed", "11"])
        .output()
        .expect("run sk");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).unwrap();
    let keys: Vec<&str> = stdout
        .lines()
        .filter_map(|line| line.split(':').next())
        .collect();
    assert_eq!(
        keys,
        [
            "is_converged",
            "iterations_number",
            "discrepancy",
            "bethe_free_entropy",
            "replica_symmetric_free_entropy"
        ]
    );
    let summary: RunSummary = serde_yaml::from_str(&stdout).unwrap();
    assert!(summary.is_converged);
    assert!(summary.iterations_number >= 1);
    let closed_form = std::f64::consts::LN_2 + 0.25 * 0.5 * 0.5;
    assert!((summary.replica_symmetric_free_entropy - closed_form).abs() < 1e-9);
}

#[test]
fn same_flags_give_identical_records() {
    let run = || {
        sk().args(["--beta", "0.3", "--spins-number", "40", "--seed", "5"])
            .output()
            .expect("run sk")
            .stdout
    };
    assert_eq!(run(), run());
}

#[test]
fn invalid_decay_fails_without_a_record() {
    let output = sk()
        .args(["--beta", "0.5", "--spins-number", "20", "--decay", "1.0"])
        .output()
        .expect("run sk");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("decay"));
}

#[test]
fn missing_beta_is_rejected() {
    let output = sk().args(["--spins-number", "20"]).output().expect("run sk");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn config_file_supplies_beta() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("run.yaml");
    std::fs::write(&path, "beta: 0.0\nspins_number: 16\ninit:\n  type: zero\n").unwrap();
    let output = sk()
        .args(["--config", path.to_str().unwrap()])
        .output()
        .expect("run sk");
    assert!(output.status.success());
    let summary: RunSummary = serde_yaml::from_slice(&output.stdout).unwrap();
    assert_eq!(summary.iterations_number, 1);
    assert!((summary.bethe_free_entropy - std::f64::consts::LN_2).abs() < 1e-12);
}
